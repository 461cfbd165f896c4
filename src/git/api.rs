//! Public API for git operations.
//!
//! Thin async wrappers over the system `git` binary, used by the publish
//! workflow and by integration tests:
//! - Working tree checks and change listing
//! - Staging, committing and pushing
//! - Remote URL and safe-directory configuration
//!
//! ## Example: Reading a remote URL
//!
//! ```rust,no_run
//! use repos_publish::git::get_remote_url;
//! use std::path::Path;
//!
//! async fn show(path: &Path) {
//!     if let Ok(Some(url)) = get_remote_url(path, "origin").await {
//!         println!("origin -> {}", url);
//!     }
//! }
//! ```

// Command execution
pub use super::operations::run_git;

// Working tree
pub use super::operations::{check_work_tree, get_current_branch, get_porcelain_status};

// Commit and push
pub use super::operations::{commit_changes, get_head_commit, push_branch, stage_all};

// Configuration
pub use super::config::{
    add_safe_directory, get_remote_url, is_ownership_error, safe_directory_command,
    set_remote_url,
};
