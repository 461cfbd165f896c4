//! Publish orchestration
//!
//! One invocation is a sequential chain: locate the repository, detect
//! changes, commit, then the credentialed push stage. Every outcome, panics
//! included, ends as a [`PublishResult`].

use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, instrument, warn};

use super::changes::detect_changes;
use super::commit::commit_all;
use super::credentials::PushUrl;
use super::locator::locate;
use super::push::credentialed_push;
use super::request::{PublishConfig, PublishRequest};
use super::result::PublishResult;
use crate::core::{PublishLocks, DEFAULT_BRANCH};
use crate::error::PublishError;

/// Commits every pending change in the configured working tree and pushes it
///
/// Never fails: configuration problems, git failures and panics all come back
/// as a `PublishResult` with `ok == false`.
///
/// # Concurrency
///
/// Takes no lock. Two publishes on the same repository must not overlap;
/// callers that may run them concurrently should go through [`Publisher`].
pub async fn publish(config: PublishConfig) -> PublishResult {
    let branch = requested_branch(&config);
    match PublishRequest::from_config(config) {
        Ok(request) => publish_request(&request).await,
        Err(err) => {
            warn!(error = %err, "publish request rejected");
            PublishResult::failed(&branch, &err)
        }
    }
}

/// Same as [`publish`], for an already validated request
pub async fn publish_request(request: &PublishRequest) -> PublishResult {
    match AssertUnwindSafe(run(request)).catch_unwind().await {
        Ok(result) => result,
        Err(panic) => {
            let detail = panic_message(panic.as_ref());
            error!(%detail, "publish workflow panicked");
            PublishResult::failed(request.branch(), &PublishError::Unexpected(detail))
        }
    }
}

/// Runs [`publish`] under a caller deadline
///
/// On expiry the workflow is dropped mid-flight: running git children are
/// killed and the remote URL is restored before this returns.
pub async fn publish_with_deadline(config: PublishConfig, deadline: Duration) -> PublishResult {
    let branch = requested_branch(&config);
    match tokio::time::timeout(deadline, publish(config)).await {
        Ok(result) => result,
        Err(_) => {
            warn!(deadline_secs = deadline.as_secs(), "publish deadline exceeded");
            PublishResult::failed(&branch, &PublishError::DeadlineExceeded(deadline.as_secs()))
        }
    }
}

#[instrument(skip(request), fields(repo = %request.repo_dir().display(), branch = %request.branch()))]
async fn run(request: &PublishRequest) -> PublishResult {
    let branch = request.branch();
    let mut warnings = Vec::new();

    let repo = match locate(request.repo_dir()).await {
        Ok(repo) => repo,
        Err(err) => return fail(branch, err, warnings),
    };

    match repo.current_branch() {
        Some(current) if current != branch => {
            warn!(current, "HEAD is not on the publish branch");
            warnings.push(format!(
                "HEAD is on '{current}'; the commit is made there while '{branch}' is pushed"
            ));
        }
        None => {
            warn!("HEAD is detached");
            warnings.push(format!("HEAD is detached; the commit is not on '{branch}'"));
        }
        _ => {}
    }

    let changes = match detect_changes(&repo).await {
        Ok(changes) => changes,
        Err(err) => return fail(branch, err, warnings),
    };
    if !changes.has_changes() {
        info!("working tree clean; nothing to publish");
        return PublishResult::no_changes(branch).with_warnings(warnings);
    }

    let commit = match commit_all(&repo, &changes, request.message()).await {
        Ok(commit) => commit,
        Err(err) => return fail(branch, err, warnings),
    };

    let push_url = PushUrl::build(request.repo_url(), request.token());
    let stage = credentialed_push(repo.path(), request.remote(), branch, &push_url).await;
    warnings.extend(stage.restore_warning);

    match stage.result {
        Ok(report) => {
            info!(commit = commit.short(), files = changes.len(), "published");
            PublishResult::published(branch, &commit, &changes, report).with_warnings(warnings)
        }
        Err(err) => {
            warnings.push(format!(
                "commit {} was created locally but not pushed",
                commit.short()
            ));
            fail(branch, err, warnings)
        }
    }
}

fn fail(branch: &str, err: PublishError, warnings: Vec<String>) -> PublishResult {
    error!(error = %err, kind = ?err.kind(), "publish failed");
    PublishResult::failed(branch, &err).with_warnings(warnings)
}

fn requested_branch(config: &PublishConfig) -> String {
    config
        .branch
        .as_deref()
        .map(str::trim)
        .filter(|branch| !branch.is_empty())
        .unwrap_or(DEFAULT_BRANCH)
        .to_string()
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "panic with non-string payload".to_string()
    }
}

/// Serializes publishes per repository path
#[derive(Debug, Clone, Default)]
pub struct Publisher {
    locks: Arc<PublishLocks>,
}

impl Publisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shares `locks` with other publishers
    pub fn with_locks(locks: Arc<PublishLocks>) -> Self {
        Self { locks }
    }

    /// [`publish`] while holding the lock of the configured repository
    pub async fn publish(&self, config: PublishConfig) -> PublishResult {
        let _guard = match config.repo_dir.as_deref() {
            Some(path) => Some(self.locks.acquire(path).await),
            None => None,
        };
        publish(config).await
    }

    /// [`publish_with_deadline`] while holding the repository lock
    ///
    /// Time spent waiting for the lock does not count against `deadline`.
    pub async fn publish_with_deadline(
        &self,
        config: PublishConfig,
        deadline: Duration,
    ) -> PublishResult {
        let _guard = match config.repo_dir.as_deref() {
            Some(path) => Some(self.locks.acquire(path).await),
            None => None,
        };
        publish_with_deadline(config, deadline).await
    }
}
