//! Result Reporter

use serde::Serialize;

use super::changes::ChangeSet;
use super::commit::CommitId;
use super::push::PushReport;
use crate::core::{CHANGES_DISPLAY_LIMIT, NO_CHANGES_MESSAGE};
use crate::error::{ErrorKind, PublishError};

/// Terminal state of a publish, for display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishStatus {
    /// New commit pushed as a fast-forward
    Published,
    /// New commit pushed after overwriting the remote branch
    ForcePublished,
    /// Clean working tree, nothing done
    NoChanges,
    Failed,
}

impl PublishStatus {
    /// Returns the emoji symbol for this status
    pub fn symbol(&self) -> &str {
        match self {
            PublishStatus::Published | PublishStatus::ForcePublished => "🟢",
            PublishStatus::NoChanges => "🟠",
            PublishStatus::Failed => "🔴",
        }
    }

    /// Returns the text representation of this status
    pub fn text(&self) -> &str {
        match self {
            PublishStatus::Published => "published",
            PublishStatus::ForcePublished => "force-published",
            PublishStatus::NoChanges => "no-changes",
            PublishStatus::Failed => "failed",
        }
    }
}

/// Structured response of one publish invocation
#[derive(Debug, Clone, Serialize)]
pub struct PublishResult {
    pub ok: bool,
    pub message: String,
    pub branch: String,
    /// Short id of the commit this invocation created and pushed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit: Option<String>,
    /// Up to the first ten changed paths
    pub changes: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    #[serde(skip)]
    status: PublishStatus,
    #[serde(skip)]
    status_code: u16,
}

impl PublishResult {
    pub fn no_changes(branch: &str) -> Self {
        Self {
            ok: true,
            message: NO_CHANGES_MESSAGE.to_string(),
            branch: branch.to_string(),
            commit: None,
            changes: Vec::new(),
            error: None,
            error_kind: None,
            warnings: Vec::new(),
            status: PublishStatus::NoChanges,
            status_code: 200,
        }
    }

    pub fn published(
        branch: &str,
        commit: &CommitId,
        changes: &ChangeSet,
        report: PushReport,
    ) -> Self {
        let count = changes.len();
        let noun = if count == 1 { "file" } else { "files" };
        let mut message = format!("published {count} {noun} to {branch} ({})", commit.short());
        let status = match report {
            PushReport::Pushed => PublishStatus::Published,
            PushReport::ForcePushed => {
                message.push_str("; remote history overwritten");
                PublishStatus::ForcePublished
            }
        };

        Self {
            ok: true,
            message,
            branch: branch.to_string(),
            commit: Some(commit.short().to_string()),
            changes: changes.sample(CHANGES_DISPLAY_LIMIT),
            error: None,
            error_kind: None,
            warnings: Vec::new(),
            status,
            status_code: 200,
        }
    }

    pub fn failed(branch: &str, err: &PublishError) -> Self {
        let message = match err.remediation() {
            Some(hint) => format!("{err}. {hint}"),
            None => err.to_string(),
        };

        Self {
            ok: false,
            message,
            branch: branch.to_string(),
            commit: None,
            changes: Vec::new(),
            error: Some(err.to_string()),
            error_kind: Some(err.kind()),
            warnings: Vec::new(),
            status: PublishStatus::Failed,
            status_code: err.status_code(),
        }
    }

    pub fn with_warnings(mut self, warnings: Vec<String>) -> Self {
        self.warnings.extend(warnings);
        self
    }

    pub fn status(&self) -> PublishStatus {
        self.status
    }

    /// HTTP-equivalent status: 200, 400 for client errors, 5xx otherwise
    pub fn status_code(&self) -> u16 {
        self.status_code
    }
}
