//! Credentialed Push Stage
//!
//! ```text
//! START -> URL_REWRITTEN -> ATTEMPT_1 -> {SUCCESS, RETRY_FORCE} -> {SUCCESS, FAILED}
//!                                                           always -> URL_RESTORED
//! ```
//!
//! The remote's `url` key is owned by a [`RemoteUrlGuard`] for the whole
//! stage. The retry decision is a single dispatch over [`PushOutcome`]: only a
//! logical rejection earns the one forced retry.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::{error, info, instrument, warn};

use super::credentials::PushUrl;
use crate::error::PublishError;
use crate::git::config::set_remote_url_blocking;
use crate::git::{get_remote_url, push_branch, set_remote_url};

/// Why a push failed before any ref was updated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    NetworkUnreachable,
    AuthenticationFailed,
    RepositoryNotFound,
    Other,
}

impl TransportErrorKind {
    /// Classifies git's error text; the first matching class wins
    pub fn from_stderr(stderr: &str) -> Self {
        let stderr_lower = stderr.to_lowercase();

        if stderr_lower.contains("repository not found")
            || stderr_lower.contains("' not found")
            || stderr_lower.contains("does not appear to be a git repository")
            || stderr_lower.contains("error: 404")
        {
            TransportErrorKind::RepositoryNotFound
        } else if stderr_lower.contains("authentication failed")
            || stderr_lower.contains("invalid username or password")
            || stderr_lower.contains("could not read username")
            || stderr_lower.contains("terminal prompts disabled")
            || stderr_lower.contains("permission denied")
            || stderr_lower.contains("error: 403")
            || stderr_lower.contains("error: 401")
        {
            TransportErrorKind::AuthenticationFailed
        } else if stderr_lower.contains("could not resolve")
            || stderr_lower.contains("failed to connect")
            || stderr_lower.contains("couldn't connect")
            || stderr_lower.contains("connection refused")
            || stderr_lower.contains("connection timed out")
            || stderr_lower.contains("network is unreachable")
            || stderr_lower.contains("timed out")
        {
            TransportErrorKind::NetworkUnreachable
        } else {
            TransportErrorKind::Other
        }
    }

    fn into_error(self, detail: String) -> PublishError {
        match self {
            TransportErrorKind::NetworkUnreachable => PublishError::NetworkUnreachable(detail),
            TransportErrorKind::AuthenticationFailed => PublishError::AuthenticationFailed(detail),
            TransportErrorKind::RepositoryNotFound => PublishError::RepositoryNotFound(detail),
            TransportErrorKind::Other => PublishError::PushTransport(detail),
        }
    }
}

/// Result of one push attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushOutcome {
    Success,
    /// The remote has commits the local branch lacks
    Rejected { summary: String },
    TransportError { kind: TransportErrorKind, detail: String },
}

impl PushOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, PushOutcome::Success)
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, PushOutcome::Rejected { .. })
    }

    /// Raw status text of the attempt
    pub fn summary(&self) -> &str {
        match self {
            PushOutcome::Success => "ok",
            PushOutcome::Rejected { summary } => summary,
            PushOutcome::TransportError { detail, .. } => detail,
        }
    }

    /// Classifies a finished `git push --porcelain`
    ///
    /// The porcelain ref status (`<flag>\t<from>:<to>\t<summary>`) is the
    /// authoritative signal. Message matching on stderr is only a fallback
    /// for when git produced no ref line at all.
    pub fn classify(success: bool, stdout: &str, stderr: &str) -> Self {
        match parse_ref_status(stdout) {
            Some((flag, summary)) if flag == '!' => {
                let summary_lower = summary.to_lowercase();
                if summary_lower.starts_with("[rejected]") && is_fast_forward_reason(&summary_lower) {
                    PushOutcome::Rejected {
                        summary: summary.to_string(),
                    }
                } else {
                    // [remote rejected], [remote failure]: forcing cannot help
                    PushOutcome::TransportError {
                        kind: TransportErrorKind::Other,
                        detail: join_detail(summary, stderr),
                    }
                }
            }
            Some(_) if success => PushOutcome::Success,
            None if success => PushOutcome::Success,
            _ => {
                let stderr_lower = stderr.to_lowercase();
                if stderr_lower.contains("[rejected]") && is_fast_forward_reason(&stderr_lower) {
                    PushOutcome::Rejected {
                        summary: stderr.to_string(),
                    }
                } else {
                    PushOutcome::TransportError {
                        kind: TransportErrorKind::from_stderr(stderr),
                        detail: stderr.to_string(),
                    }
                }
            }
        }
    }
}

fn is_fast_forward_reason(text_lower: &str) -> bool {
    text_lower.contains("fetch first")
        || text_lower.contains("non-fast-forward")
        || text_lower.contains("stale info")
}

/// First porcelain ref status line: (flag, summary)
fn parse_ref_status(stdout: &str) -> Option<(char, &str)> {
    stdout.lines().find_map(|line| {
        let mut parts = line.splitn(3, '\t');
        let flag = parts.next()?;
        let _refs = parts.next()?;
        let summary = parts.next()?;
        let mut chars = flag.chars();
        match (chars.next(), chars.next()) {
            (Some(flag), None) => Some((flag, summary.trim())),
            _ => None,
        }
    })
}

fn join_detail(summary: &str, stderr: &str) -> String {
    if stderr.is_empty() {
        summary.to_string()
    } else {
        format!("{summary}: {stderr}")
    }
}

/// One push attempt of `branch:branch`
#[async_trait]
pub trait Pusher: Send + Sync {
    async fn push(&self, branch: &str, force: bool) -> PushOutcome;
}

/// Pushes through the system `git` binary
///
/// Holds the [`PushUrl`] only to scrub the token from git's output; the URL
/// itself reaches git through the remote configuration.
pub struct GitPusher {
    repo_path: PathBuf,
    remote: String,
    push_url: PushUrl,
}

impl GitPusher {
    pub fn new(repo_path: &Path, remote: &str, push_url: PushUrl) -> Self {
        Self {
            repo_path: repo_path.to_path_buf(),
            remote: remote.to_string(),
            push_url,
        }
    }
}

#[async_trait]
impl Pusher for GitPusher {
    #[instrument(skip(self), fields(remote = %self.remote))]
    async fn push(&self, branch: &str, force: bool) -> PushOutcome {
        match push_branch(&self.repo_path, &self.remote, branch, force).await {
            Ok((success, stdout, stderr)) => PushOutcome::classify(
                success,
                &self.push_url.scrub(&stdout),
                &self.push_url.scrub(&stderr),
            ),
            Err(e) => PushOutcome::classify(false, "", &self.push_url.scrub(&e.to_string())),
        }
    }
}

/// How a successful push got there
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushReport {
    Pushed,
    /// The first attempt was rejected and the forced retry replaced the remote branch
    ForcePushed,
}

/// Pushes `branch`, retrying exactly once with force on a logical rejection
pub async fn push_with_retry(pusher: &dyn Pusher, branch: &str) -> Result<PushReport, PublishError> {
    match pusher.push(branch, false).await {
        PushOutcome::Success => Ok(PushReport::Pushed),
        PushOutcome::TransportError { kind, detail } => Err(kind.into_error(detail)),
        PushOutcome::Rejected { summary } => {
            warn!(branch, %summary, "push rejected; force pushing local history");
            match pusher.push(branch, true).await {
                PushOutcome::Success => Ok(PushReport::ForcePushed),
                failed => Err(PublishError::ForcePushFailed(failed.summary().to_string())),
            }
        }
    }
}

/// Owns the remote's `url` key while it holds the credentialed URL
///
/// [`RemoteUrlGuard::restore`] is the normal release. A guard dropped without
/// it (panic, cancelled future) restores with a blocking `git config` call.
#[derive(Debug)]
pub struct RemoteUrlGuard {
    repo_path: PathBuf,
    remote: String,
    original_url: String,
    armed: bool,
}

impl RemoteUrlGuard {
    /// Saves the current URL of `remote` and points the remote at `push_url`
    pub async fn install(
        repo_path: &Path,
        remote: &str,
        push_url: &PushUrl,
    ) -> Result<Self, PublishError> {
        let original_url = get_remote_url(repo_path, remote).await?.ok_or_else(|| {
            PublishError::Configuration(format!("remote '{remote}' is not configured"))
        })?;

        let guard = Self {
            repo_path: repo_path.to_path_buf(),
            remote: remote.to_string(),
            original_url,
            armed: true,
        };

        match set_remote_url(repo_path, remote, push_url.expose()).await {
            Ok((true, _)) => Ok(guard),
            Ok((false, stderr)) => {
                let _ = guard.restore().await;
                Err(PublishError::Unexpected(format!(
                    "cannot set remote URL: {}",
                    push_url.scrub(&stderr)
                )))
            }
            Err(e) => {
                let _ = guard.restore().await;
                Err(PublishError::Unexpected(format!(
                    "cannot set remote URL: {}",
                    push_url.scrub(&e.to_string())
                )))
            }
        }
    }

    pub fn original_url(&self) -> &str {
        &self.original_url
    }

    /// Writes the saved URL back; returns git's error text on failure
    pub async fn restore(mut self) -> Result<(), String> {
        let result = match set_remote_url(&self.repo_path, &self.remote, &self.original_url).await {
            Ok((true, _)) => Ok(()),
            Ok((false, stderr)) => Err(stderr),
            Err(e) => Err(e.to_string()),
        };
        self.armed = false;
        result
    }
}

impl Drop for RemoteUrlGuard {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }

        warn!(remote = %self.remote, "remote URL still rewritten at drop; restoring");
        match set_remote_url_blocking(&self.repo_path, &self.remote, &self.original_url) {
            Ok((true, _)) => {}
            Ok((false, stderr)) => error!(remote = %self.remote, %stderr, "failed to restore remote URL"),
            Err(e) => error!(remote = %self.remote, error = %e, "failed to restore remote URL"),
        }
    }
}

/// Outcome of the whole push stage
#[derive(Debug)]
pub struct PushStage {
    pub result: Result<PushReport, PublishError>,
    /// Set when restoring the original remote URL failed
    pub restore_warning: Option<String>,
}

/// Rewrites the remote URL, pushes with retry, and restores the URL
pub async fn credentialed_push(
    repo_path: &Path,
    remote: &str,
    branch: &str,
    push_url: &PushUrl,
) -> PushStage {
    let guard = match RemoteUrlGuard::install(repo_path, remote, push_url).await {
        Ok(guard) => guard,
        Err(e) => {
            return PushStage {
                result: Err(e),
                restore_warning: None,
            }
        }
    };

    let pusher = GitPusher::new(repo_path, remote, push_url.clone());
    let result = push_with_retry(&pusher, branch).await;

    let restore_warning = match guard.restore().await {
        Ok(()) => None,
        Err(stderr) => {
            error!(remote, %stderr, "failed to restore remote URL");
            Some(format!(
                "failed to restore the URL of remote '{remote}': {stderr}"
            ))
        }
    };

    if let Ok(report) = &result {
        info!(branch, ?report, "push finished");
    }

    PushStage {
        result,
        restore_warning,
    }
}
