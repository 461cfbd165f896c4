//! Publish inputs
//!
//! [`PublishConfig`] holds what the caller collected (environment, `.env`,
//! flags) without judging it. [`PublishRequest::from_config`] is the only way
//! to obtain a request, so everything downstream can rely on a present token,
//! a present repository URL and an absolute working-tree path.

use std::fmt;
use std::path::PathBuf;

use super::credentials::AccessToken;
use crate::core::{
    DEFAULT_BRANCH, DEFAULT_COMMIT_MESSAGE, DEFAULT_REMOTE, ENV_BRANCH, ENV_REMOTE, ENV_REPO_DIR,
    ENV_REPO_URL, ENV_TOKEN,
};
use crate::error::PublishError;

/// Raw, unvalidated publish inputs
#[derive(Clone, Default)]
pub struct PublishConfig {
    pub repo_dir: Option<PathBuf>,
    pub token: Option<String>,
    pub repo_url: Option<String>,
    pub branch: Option<String>,
    pub remote: Option<String>,
    pub message: Option<String>,
}

impl PublishConfig {
    /// Collects inputs from the process environment
    ///
    /// Empty variables count as unset. The commit message is never read from
    /// the environment; it belongs to the individual invocation.
    pub fn from_env() -> Self {
        Self {
            repo_dir: env_value(ENV_REPO_DIR).map(PathBuf::from),
            token: env_value(ENV_TOKEN),
            repo_url: env_value(ENV_REPO_URL),
            branch: env_value(ENV_BRANCH),
            remote: env_value(ENV_REMOTE),
            message: None,
        }
    }
}

impl fmt::Debug for PublishConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PublishConfig")
            .field("repo_dir", &self.repo_dir)
            .field("token", &self.token.as_ref().map(|_| "***"))
            .field("repo_url", &self.repo_url)
            .field("branch", &self.branch)
            .field("remote", &self.remote)
            .field("message", &self.message)
            .finish()
    }
}

fn env_value(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

/// Validated parameters of one publish invocation
#[derive(Debug, Clone)]
pub struct PublishRequest {
    repo_dir: PathBuf,
    remote: String,
    branch: String,
    token: AccessToken,
    repo_url: String,
    message: String,
}

impl PublishRequest {
    pub fn from_config(config: PublishConfig) -> Result<Self, PublishError> {
        let token = non_blank(config.token);
        let repo_url = non_blank(config.repo_url);
        let (token, repo_url) = match (token, repo_url) {
            (Some(token), Some(repo_url)) => (token, repo_url),
            _ => {
                return Err(PublishError::Configuration(format!(
                    "{ENV_TOKEN} and {ENV_REPO_URL} must be set"
                )))
            }
        };

        let repo_dir = config.repo_dir.ok_or_else(|| {
            PublishError::Configuration(format!("{ENV_REPO_DIR} must be set"))
        })?;
        if !repo_dir.is_absolute() {
            return Err(PublishError::Configuration(format!(
                "repository path must be absolute: {}",
                repo_dir.display()
            )));
        }

        let branch = non_blank(config.branch).unwrap_or_else(|| DEFAULT_BRANCH.to_string());
        if !is_valid_ref_name(&branch) {
            return Err(PublishError::Configuration(format!(
                "invalid branch name: {branch}"
            )));
        }

        let remote = non_blank(config.remote).unwrap_or_else(|| DEFAULT_REMOTE.to_string());
        if !is_valid_remote_name(&remote) {
            return Err(PublishError::Configuration(format!(
                "invalid remote name: {remote}"
            )));
        }

        let message = config
            .message
            .filter(|message| !message.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_COMMIT_MESSAGE.to_string());

        Ok(Self {
            repo_dir,
            remote,
            branch,
            token: AccessToken::new(token),
            repo_url,
            message,
        })
    }

    pub fn repo_dir(&self) -> &PathBuf {
        &self.repo_dir
    }

    pub fn remote(&self) -> &str {
        &self.remote
    }

    pub fn branch(&self) -> &str {
        &self.branch
    }

    pub fn token(&self) -> &AccessToken {
        &self.token
    }

    pub fn repo_url(&self) -> &str {
        &self.repo_url
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Conservative subset of `git check-ref-format --branch`
///
/// The branch ends up in a refspec (`branch:branch`) and as a bare argument to
/// `git push`, so anything that could read as an option or a second refspec
/// is refused up front.
fn is_valid_ref_name(name: &str) -> bool {
    !name.starts_with('-')
        && !name.starts_with('/')
        && !name.ends_with('/')
        && !name.ends_with('.')
        && !name.ends_with(".lock")
        && !name.contains("..")
        && !name.contains("@{")
        && !name.contains("//")
        && !name
            .chars()
            .any(|c| c.is_whitespace() || c.is_control() || "~^:?*[\\".contains(c))
}

fn is_valid_remote_name(name: &str) -> bool {
    !name.starts_with('-')
        && !name
            .chars()
            .any(|c| c.is_whitespace() || c.is_control() || c == '/' || c == ':')
}
