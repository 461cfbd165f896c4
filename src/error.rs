//! Error taxonomy for the publish workflow
//!
//! Every failure the workflow can hit maps to exactly one [`PublishError`]
//! variant. The variant decides the status class reported to the caller and
//! whether anything is retried: only a logical push rejection is, and that
//! never surfaces here (a rejected push either force-pushes successfully or
//! becomes [`PublishError::ForcePushFailed`]).
//!
//! Error text reaching these variants has already been scrubbed of the access
//! token.

use serde::Serialize;
use thiserror::Error;

/// Failure classes of one publish invocation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PublishError {
    /// Missing or malformed caller input
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The path has no git metadata
    #[error("Not a git repository: {0}")]
    NotARepository(String),

    /// Git refused to open the repository, even after remediation
    #[error("Cannot access git repository: {0}")]
    RepositoryAccessDenied(String),

    /// Staging or committing failed
    #[error("Commit failed: {0}")]
    CommitFailed(String),

    /// The remote host could not be reached
    #[error("Network unreachable: {0}")]
    NetworkUnreachable(String),

    /// The remote refused the credential
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The remote repository does not exist (or is invisible to the token)
    #[error("Repository not found: {0}")]
    RepositoryNotFound(String),

    /// Any other push failure that is not a fast-forward rejection
    #[error("Push failed: {0}")]
    PushTransport(String),

    /// The push was rejected and the force-push retry failed too
    #[error("Push rejected and force push failed: {0}")]
    ForcePushFailed(String),

    /// The caller's deadline expired before the workflow finished
    #[error("Publish deadline of {0}s exceeded")]
    DeadlineExceeded(u64),

    /// Anything not classified above, including panics
    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

/// Stable, serializable name of a [`PublishError`] variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    ConfigurationError,
    NotARepository,
    RepositoryAccessDenied,
    CommitFailed,
    NetworkUnreachable,
    AuthenticationFailed,
    RepositoryNotFound,
    PushTransportError,
    ForcePushFailed,
    DeadlineExceeded,
    UnexpectedError,
}

impl ErrorKind {
    /// Client-class errors are fixed by changing the request, not by retrying
    pub fn is_client_error(&self) -> bool {
        matches!(self, ErrorKind::ConfigurationError | ErrorKind::NotARepository)
    }
}

impl PublishError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PublishError::Configuration(_) => ErrorKind::ConfigurationError,
            PublishError::NotARepository(_) => ErrorKind::NotARepository,
            PublishError::RepositoryAccessDenied(_) => ErrorKind::RepositoryAccessDenied,
            PublishError::CommitFailed(_) => ErrorKind::CommitFailed,
            PublishError::NetworkUnreachable(_) => ErrorKind::NetworkUnreachable,
            PublishError::AuthenticationFailed(_) => ErrorKind::AuthenticationFailed,
            PublishError::RepositoryNotFound(_) => ErrorKind::RepositoryNotFound,
            PublishError::PushTransport(_) => ErrorKind::PushTransportError,
            PublishError::ForcePushFailed(_) => ErrorKind::ForcePushFailed,
            PublishError::DeadlineExceeded(_) => ErrorKind::DeadlineExceeded,
            PublishError::Unexpected(_) => ErrorKind::UnexpectedError,
        }
    }

    /// HTTP-equivalent status for the failure class
    pub fn status_code(&self) -> u16 {
        match self.kind() {
            kind if kind.is_client_error() => 400,
            ErrorKind::DeadlineExceeded => 504,
            _ => 500,
        }
    }

    /// What the operator should do about it
    pub fn remediation(&self) -> Option<&'static str> {
        match self {
            PublishError::Configuration(_) => {
                Some("Set GITHUB_TOKEN and GITHUB_REPO_URL in the environment or .env file.")
            }
            PublishError::NotARepository(_) => {
                Some("Point REPO_DIR at a working tree that contains a .git folder.")
            }
            PublishError::NetworkUnreachable(_) => Some("Check the network connection."),
            PublishError::AuthenticationFailed(_) => Some("Check GITHUB_TOKEN in the .env file."),
            PublishError::RepositoryNotFound(_) => Some("Check GITHUB_REPO_URL in the .env file."),
            _ => None,
        }
    }
}

impl From<anyhow::Error> for PublishError {
    fn from(err: anyhow::Error) -> Self {
        PublishError::Unexpected(err.to_string())
    }
}
