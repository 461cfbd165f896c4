//! Common test utilities and helpers
#![allow(dead_code, unused_imports)]

pub mod fixtures;
pub mod git;

pub use self::fixtures::{TestRepo, TestRepoBuilder, TEST_TOKEN};
pub use self::git::{is_git_available, setup_git_repo};

use std::sync::OnceLock;
use std::sync::{Mutex, MutexGuard};

static TEST_MUTEX: OnceLock<Mutex<()>> = OnceLock::new();

/// Acquires a global lock for tests that modify process-wide state (like env vars)
pub fn lock_test() -> MutexGuard<'static, ()> {
    TEST_MUTEX
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Builds a repository with a bare remote, or None when git is unusable here
pub fn repo_with_remote(name: &str) -> Option<TestRepo> {
    if !is_git_available() {
        eprintln!("Git not available, skipping test");
        return None;
    }

    match TestRepoBuilder::new(name).with_bare_remote().build() {
        Ok(repo) => Some(repo),
        Err(e) => {
            eprintln!("Failed to create test repo: {}, skipping", e);
            None
        }
    }
}
