//! Change Detector

use tracing::info;

use super::locator::Repository;
use crate::error::PublishError;
use crate::git::get_porcelain_status;

/// Snapshot of the working tree's pending changes
///
/// Holds paths with unstaged modifications (relative to the index) followed by
/// untracked paths, each group in git's order. Changes that are staged but
/// otherwise untouched are not listed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    paths: Vec<String>,
}

impl ChangeSet {
    pub fn has_changes(&self) -> bool {
        !self.paths.is_empty()
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn paths(&self) -> &[String] {
        &self.paths
    }

    /// The first `limit` paths, for display
    pub fn sample(&self, limit: usize) -> Vec<String> {
        self.paths.iter().take(limit).cloned().collect()
    }

    /// Builds a change set from `git status --porcelain=v1 -z` output
    pub fn from_porcelain(raw: &str) -> Self {
        let mut modified = Vec::new();
        let mut untracked = Vec::new();

        let mut fields = raw.split('\0');
        while let Some(entry) = fields.next() {
            // "XY " followed by at least one path byte
            if entry.len() < 4 {
                continue;
            }
            let (code, path) = entry.split_at(3);
            let code = code.as_bytes();
            let (index, worktree) = (code[0], code[1]);

            // Renames and copies, staged or not, carry the source path as a separate field
            if matches!(index, b'R' | b'C') || matches!(worktree, b'R' | b'C') {
                fields.next();
            }

            match (index, worktree) {
                (b'?', b'?') => untracked.push(path.to_string()),
                (b'!', b'!') | (_, b' ') => {}
                _ => modified.push(path.to_string()),
            }
        }

        modified.extend(untracked);
        Self { paths: modified }
    }
}

/// Lists the pending changes of `repo`
pub async fn detect_changes(repo: &Repository) -> Result<ChangeSet, PublishError> {
    let (success, stdout, stderr) = get_porcelain_status(repo.path()).await?;
    if !success {
        return Err(PublishError::RepositoryAccessDenied(stderr));
    }

    let changes = ChangeSet::from_porcelain(&stdout);
    info!(count = changes.len(), "detected working tree changes");
    Ok(changes)
}
