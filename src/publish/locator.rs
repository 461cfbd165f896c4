//! Repository Locator
//!
//! Validates that the configured path is a git working tree git is willing to
//! open. Repositories owned by another user (shared volumes, containers
//! running as a different uid) trip git's `safe.directory` check; the locator
//! registers the path once and retries before giving up.

use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::error::PublishError;
use crate::git::{
    add_safe_directory, check_work_tree, get_current_branch, is_ownership_error,
    safe_directory_command,
};

const GIT_METADATA: &str = ".git";

/// An opened working tree
#[derive(Debug, Clone)]
pub struct Repository {
    path: PathBuf,
    current_branch: Option<String>,
}

impl Repository {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Branch HEAD pointed at when the repository was opened (None if detached)
    pub fn current_branch(&self) -> Option<&str> {
        self.current_branch.as_deref()
    }
}

/// Opens the working tree at `path`
pub async fn locate(path: &Path) -> Result<Repository, PublishError> {
    // `.git` is a directory in a normal clone and a file in worktrees/submodules
    if !path.join(GIT_METADATA).exists() {
        return Err(PublishError::NotARepository(format!(
            "{}. Make sure the .git folder exists.",
            path.display()
        )));
    }

    match open(path).await {
        Ok(()) => {}
        Err(stderr) if is_ownership_error(&stderr) => {
            warn!(path = %path.display(), "repository ownership not trusted; registering safe.directory");
            match add_safe_directory(path).await {
                Ok((true, _)) => info!(path = %path.display(), "registered safe.directory"),
                Ok((false, stderr)) => warn!(%stderr, "could not register safe.directory"),
                Err(e) => warn!(error = %e, "could not register safe.directory"),
            }

            if open(path).await.is_err() {
                return Err(PublishError::RepositoryAccessDenied(format!(
                    "Try running: {}",
                    safe_directory_command(path)
                )));
            }
        }
        Err(stderr) => return Err(PublishError::RepositoryAccessDenied(stderr)),
    }

    Ok(Repository {
        path: path.to_path_buf(),
        current_branch: get_current_branch(path).await,
    })
}

/// Returns git's error text when the working tree cannot be opened
async fn open(path: &Path) -> Result<(), String> {
    match check_work_tree(path).await {
        Ok((true, _)) => Ok(()),
        Ok((false, stderr)) => Err(stderr),
        Err(e) => Err(e.to_string()),
    }
}
