//! Git testing utilities

use anyhow::Result;
use std::path::Path;
use std::process::Command;

/// Runs git in `path` and returns trimmed stdout, failing on a non-zero exit
pub fn git(path: &Path, args: &[&str]) -> Result<String> {
    let output = Command::new("git").args(args).current_dir(path).output()?;

    if !output.status.success() {
        anyhow::bail!(
            "git {} failed: {}",
            args.join(" "),
            String::from_utf8_lossy(&output.stderr)
        );
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// Sets up a git repository with user config, HEAD on `branch`
/// Returns Ok(()) on success, or skips test if git is not available
pub fn setup_git_repo(path: &Path, branch: &str) -> Result<()> {
    let init_result = Command::new("git")
        .args(["init", "-q"])
        .current_dir(path)
        .output()?;

    if !init_result.status.success() {
        anyhow::bail!("Git not available - skipping test");
    }

    git(path, &["symbolic-ref", "HEAD", &format!("refs/heads/{branch}")])?;
    configure_identity(path)?;

    Ok(())
}

/// User identity and no signing, so commits work on any machine
pub fn configure_identity(path: &Path) -> Result<()> {
    git(path, &["config", "user.name", "Test User"])?;
    git(path, &["config", "user.email", "test@example.com"])?;
    git(path, &["config", "commit.gpgsign", "false"])?;
    Ok(())
}

/// Initializes a bare repository to push to
pub fn setup_bare_remote(path: &Path, branch: &str) -> Result<()> {
    git(path, &["init", "-q", "--bare"])?;
    git(path, &["symbolic-ref", "HEAD", &format!("refs/heads/{branch}")])?;
    Ok(())
}

/// Creates a test commit in the repository
pub fn create_test_commit(path: &Path, file_name: &str, content: &str, message: &str) -> Result<()> {
    std::fs::write(path.join(file_name), content)?;
    git(path, &["add", file_name])?;
    git(path, &["commit", "-q", "-m", message])?;
    Ok(())
}

/// Adds a git remote to a repository
pub fn add_git_remote(path: &Path, remote_name: &str, url: &str) -> Result<()> {
    git(path, &["remote", "add", remote_name, url])?;
    Ok(())
}

/// Configured URL of `remote`, None if the remote does not exist
pub fn remote_url(path: &Path, remote: &str) -> Option<String> {
    git(path, &["config", "--get", &format!("remote.{remote}.url")]).ok()
}

/// Full commit id `rev` resolves to
pub fn rev_parse(path: &Path, rev: &str) -> Result<String> {
    git(path, &["rev-parse", rev])
}

/// Paths touched by the HEAD commit
pub fn head_commit_files(path: &Path) -> Result<Vec<String>> {
    let output = git(path, &["show", "--name-only", "--format=", "HEAD"])?;
    Ok(output
        .lines()
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

/// Subject line of the HEAD commit
pub fn head_subject(path: &Path) -> Result<String> {
    git(path, &["log", "-1", "--format=%s"])
}

/// Checks if git is available in the system
pub fn is_git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false)
}
