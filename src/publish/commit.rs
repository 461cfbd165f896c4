//! Commit Stage

use tracing::info;

use super::changes::ChangeSet;
use super::locator::Repository;
use crate::core::SHORT_COMMIT_LENGTH;
use crate::error::PublishError;
use crate::git::{commit_changes, get_head_commit, stage_all};

/// Identifier of the commit created by a publish
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitId(String);

impl CommitId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn full(&self) -> &str {
        &self.0
    }

    /// Fixed-length display prefix
    pub fn short(&self) -> &str {
        let end = self
            .0
            .char_indices()
            .nth(SHORT_COMMIT_LENGTH)
            .map_or(self.0.len(), |(idx, _)| idx);
        &self.0[..end]
    }
}

/// Stages the whole working tree and commits it on the current branch tip
///
/// Callers only reach this with a non-empty change set; an empty one is a
/// programming error and reported as a commit failure rather than producing
/// an empty commit.
pub async fn commit_all(
    repo: &Repository,
    changes: &ChangeSet,
    message: &str,
) -> Result<CommitId, PublishError> {
    if !changes.has_changes() {
        return Err(PublishError::CommitFailed("nothing to commit".to_string()));
    }

    match stage_all(repo.path()).await {
        Ok((true, _, _)) => {}
        Ok((false, _, stderr)) => {
            return Err(PublishError::CommitFailed(format!("staging failed: {stderr}")))
        }
        Err(e) => return Err(PublishError::CommitFailed(format!("staging failed: {e}"))),
    }

    match commit_changes(repo.path(), message).await {
        Ok((true, _, _)) => {}
        Ok((false, stdout, stderr)) => {
            // "nothing to commit" is reported on stdout
            let detail = if stderr.is_empty() { stdout } else { stderr };
            return Err(PublishError::CommitFailed(detail));
        }
        Err(e) => return Err(PublishError::CommitFailed(e.to_string())),
    }

    let id = match get_head_commit(repo.path()).await {
        Ok(Some(id)) => CommitId::new(id),
        Ok(None) => {
            return Err(PublishError::CommitFailed(
                "commit created but HEAD cannot be resolved".to_string(),
            ))
        }
        Err(e) => return Err(PublishError::CommitFailed(e.to_string())),
    };

    info!(commit = id.short(), files = changes.len(), "created commit");
    Ok(id)
}
