//! Public API for the core module.
//!
//! This module provides the stable public API for shared infrastructure:
//! - Publish defaults and environment variable names
//! - Result formatting limits and timeouts
//! - Per-repository publish serialization
//!
//! Internal implementation details are not exposed through this API.

// Defaults
pub use super::config::{DEFAULT_BRANCH, DEFAULT_COMMIT_MESSAGE, DEFAULT_REMOTE};

// Environment
pub use super::config::{ENV_BRANCH, ENV_REMOTE, ENV_REPO_DIR, ENV_REPO_URL, ENV_TOKEN};

// Limits and timeouts
pub use super::config::{CHANGES_DISPLAY_LIMIT, GIT_OPERATION_TIMEOUT_SECS, SHORT_COMMIT_LENGTH};

// User-facing messages
pub use super::config::{NO_CHANGES_MESSAGE, PUBLISHING_MESSAGE};

// Locking
pub use super::locks::PublishLocks;

// Internal helpers for the publish workflow
pub(crate) use super::config::{REDACTED, TOKEN_USERNAME};
