//! Per-repository publish serialization
//!
//! Two publishes against the same working tree must never interleave: git
//! gives no guarantees for concurrent `add`/`commit`/`push` on one index. The
//! workflow itself takes no lock, so callers that may run publishes
//! concurrently (a web handler, a job runner) hold one of these guards for the
//! whole invocation.

use dashmap::DashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// One async mutex per canonical repository path
#[derive(Debug, Default)]
pub struct PublishLocks {
    locks: DashMap<PathBuf, Arc<Mutex<()>>>,
}

impl PublishLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits until no other publish holds `path`, then returns the guard.
    ///
    /// Paths are canonicalized so `./site` and `/srv/site` share a lock; a path
    /// that cannot be canonicalized (it may not exist yet) is used as given.
    pub async fn acquire(&self, path: &Path) -> OwnedMutexGuard<()> {
        let key = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        let lock = self
            .locks
            .entry(key)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        lock.lock_owned().await
    }

    /// Number of repositories that have been locked at least once
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}
