//! Remote and trust configuration
//!
//! Reads and writes the two pieces of git configuration the publish workflow
//! touches: the remote's `url` key in the repository config, and the global
//! `safe.directory` list.

use anyhow::Result;
use std::path::Path;

use super::operations::{get_git_config, run_git, run_git_blocking, set_git_config};

fn remote_url_key(remote: &str) -> String {
    format!("remote.{remote}.url")
}

/// Gets the URL stored for `remote` in the repository config
/// Returns None if the remote has no `url` key
pub async fn get_remote_url(path: &Path, remote: &str) -> Result<Option<String>> {
    get_git_config(path, &remote_url_key(remote)).await
}

/// Overwrites the URL stored for `remote` in the repository config
/// Returns (success, stderr)
pub async fn set_remote_url(path: &Path, remote: &str, url: &str) -> Result<(bool, String)> {
    set_git_config(path, &remote_url_key(remote), url).await
}

/// Blocking variant of [`set_remote_url`], for cleanup paths that cannot await
/// Returns (success, stderr)
pub(crate) fn set_remote_url_blocking(path: &Path, remote: &str, url: &str) -> Result<(bool, String)> {
    run_git_blocking(path, &["config", &remote_url_key(remote), url])
}

/// The command an operator runs to mark `path` as trusted
pub fn safe_directory_command(path: &Path) -> String {
    format!(
        "git config --global --add safe.directory \"{}\"",
        path.display()
    )
}

/// Registers `path` as a safe directory in the global git configuration
/// Returns (success, stderr)
pub async fn add_safe_directory(path: &Path) -> Result<(bool, String)> {
    // Global config is reachable from anywhere; run outside the untrusted tree
    let temp_dir = std::env::temp_dir();
    let path_str = path.to_string_lossy();

    match run_git(
        &temp_dir,
        &["config", "--global", "--add", "safe.directory", &path_str],
    )
    .await
    {
        Ok((success, _, stderr)) => Ok((success, stderr)),
        Err(e) => Err(e),
    }
}

/// Detects if git refused to open a repository because of its owner
pub fn is_ownership_error(stderr: &str) -> bool {
    let stderr_lower = stderr.to_lowercase();
    stderr_lower.contains("dubious ownership")
        || stderr_lower.contains("safe.directory")
        || stderr_lower.contains("unsafe repository")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn init_repo_with_remote(path: &Path, url: &str) {
        std::process::Command::new("git")
            .args(["init", "-q"])
            .current_dir(path)
            .output()
            .expect("Failed to run git init");
        std::process::Command::new("git")
            .args(["remote", "add", "origin", url])
            .current_dir(path)
            .output()
            .expect("Failed to add remote");
    }

    #[tokio::test]
    async fn test_get_and_set_remote_url() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        init_repo_with_remote(temp_dir.path(), "git@github.com:acme/shop.git");

        let url = get_remote_url(temp_dir.path(), "origin").await.expect("git should spawn");
        assert_eq!(url.as_deref(), Some("git@github.com:acme/shop.git"));

        let (ok, _) = set_remote_url(temp_dir.path(), "origin", "https://github.com/acme/shop.git")
            .await
            .expect("git should spawn");
        assert!(ok);

        let url = get_remote_url(temp_dir.path(), "origin").await.expect("git should spawn");
        assert_eq!(url.as_deref(), Some("https://github.com/acme/shop.git"));
    }

    #[tokio::test]
    async fn test_blocking_set_matches_async_read() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        init_repo_with_remote(temp_dir.path(), "https://github.com/acme/shop.git");

        let (ok, _) = set_remote_url_blocking(temp_dir.path(), "origin", "/srv/mirror.git")
            .expect("git should spawn");
        assert!(ok);

        let url = get_remote_url(temp_dir.path(), "origin").await.expect("git should spawn");
        assert_eq!(url.as_deref(), Some("/srv/mirror.git"));
    }

    #[tokio::test]
    async fn test_unknown_remote_has_no_url() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        init_repo_with_remote(temp_dir.path(), "https://github.com/acme/shop.git");

        let url = get_remote_url(temp_dir.path(), "upstream").await.expect("git should spawn");
        assert_eq!(url, None);
    }

    #[test]
    fn test_safe_directory_command_quotes_path() {
        let command = safe_directory_command(Path::new("/srv/my shop"));
        assert_eq!(command, "git config --global --add safe.directory \"/srv/my shop\"");
    }

    #[test]
    fn test_ownership_error_detection() {
        assert!(is_ownership_error(
            "fatal: detected dubious ownership in repository at '/srv/shop'"
        ));
        assert!(is_ownership_error(
            "To add an exception for this directory, call:\n\tgit config --global --add safe.directory /srv/shop"
        ));
        assert!(!is_ownership_error("fatal: not a git repository"));
    }
}
