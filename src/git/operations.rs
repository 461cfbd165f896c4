//! Basic git operations and command execution

use anyhow::Result;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

use crate::core::GIT_OPERATION_TIMEOUT_SECS;

// Git command arguments
const GIT_IS_WORK_TREE_ARGS: &[&str] = &["rev-parse", "--is-inside-work-tree"];
const GIT_SYMBOLIC_REF_ARGS: &[&str] = &["symbolic-ref", "--short", "-q", "HEAD"];
const GIT_STATUS_PORCELAIN_ARGS: &[&str] = &[
    "status",
    "--porcelain=v1",
    "-z",
    "--untracked-files=all",
];
const GIT_ADD_ALL_ARGS: &[&str] = &["add", "--all"];
const GIT_COMMIT_ARGS: &[&str] = &["commit", "--quiet", "-m"];
const GIT_REV_PARSE_HEAD_ARGS: &[&str] = &["rev-parse", "HEAD"];
const GIT_CONFIG_GET_ARGS: &[&str] = &["config", "--get"];

/// Runs a git command in the specified directory with a timeout
/// Returns (success, stdout, stderr)
pub async fn run_git(path: &Path, args: &[&str]) -> Result<(bool, String, String)> {
    let (success, stdout, stderr) = run_git_raw(path, args).await?;
    Ok((success, stdout.trim().to_string(), stderr.trim().to_string()))
}

/// Like [`run_git`] but leaves stdout untouched
///
/// Porcelain status lines may start with a space and config values are
/// written back byte-for-byte, so neither can go through trimming.
///
/// The child is killed if the returned future is dropped, so a caller-side
/// deadline never leaves a push running in the background. Interactive
/// credential prompts are disabled: a missing credential must fail, not hang.
pub(crate) async fn run_git_raw(path: &Path, args: &[&str]) -> Result<(bool, String, String)> {
    let timeout_duration = Duration::from_secs(GIT_OPERATION_TIMEOUT_SECS);

    // Subcommand only: argument values are never logged
    debug!(subcommand = args.first().copied().unwrap_or(""), "running git");

    let result = tokio::time::timeout(
        timeout_duration,
        Command::new("git")
            .args(args)
            .current_dir(path)
            .env("GIT_TERMINAL_PROMPT", "0")
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output(),
    )
    .await;

    match result {
        Ok(Ok(output)) => Ok((
            output.status.success(),
            String::from_utf8_lossy(&output.stdout).into_owned(),
            String::from_utf8_lossy(&output.stderr).into_owned(),
        )),
        Ok(Err(e)) => Err(e.into()),
        Err(_) => Err(anyhow::anyhow!(
            "Git operation timed out after {} seconds",
            GIT_OPERATION_TIMEOUT_SECS
        )),
    }
}

/// Blocking variant of [`run_git`] for contexts that cannot await (`Drop`)
/// Returns (success, stderr)
pub(crate) fn run_git_blocking(path: &Path, args: &[&str]) -> Result<(bool, String)> {
    let output = std::process::Command::new("git")
        .args(args)
        .current_dir(path)
        .env("GIT_TERMINAL_PROMPT", "0")
        .stdin(Stdio::null())
        .output()?;

    Ok((
        output.status.success(),
        String::from_utf8_lossy(&output.stderr).trim().to_string(),
    ))
}

/// Reads a git config value from the specified repository
/// Returns the config value if it exists, None if not found
///
/// The value is returned untrimmed apart from git's trailing newline so it can
/// be written back byte-for-byte.
pub(crate) async fn get_git_config(path: &Path, key: &str) -> Result<Option<String>> {
    let mut args = Vec::from(GIT_CONFIG_GET_ARGS);
    args.push(key);

    match run_git_raw(path, &args).await {
        Ok((true, value, _)) => {
            let value = value.strip_suffix('\n').unwrap_or(&value);
            Ok(Some(value.to_string()))
        }
        Ok((false, _, _)) => Ok(None), // Key not found
        Err(e) => Err(e),
    }
}

/// Sets a git config value in the specified repository (local scope)
/// Returns (success, stderr)
pub(crate) async fn set_git_config(path: &Path, key: &str, value: &str) -> Result<(bool, String)> {
    let args = vec!["config", key, value];

    match run_git(path, &args).await {
        Ok((success, _, stderr)) => Ok((success, stderr)),
        Err(e) => Err(e),
    }
}

/// Checks that git can open the path as a working tree
/// Returns (success, stderr)
pub async fn check_work_tree(path: &Path) -> Result<(bool, String)> {
    match run_git(path, GIT_IS_WORK_TREE_ARGS).await {
        Ok((success, stdout, stderr)) => Ok((success && stdout == "true", stderr)),
        Err(e) => Err(e),
    }
}

/// Gets the branch HEAD points at
/// Returns None when HEAD is detached
pub async fn get_current_branch(path: &Path) -> Option<String> {
    match run_git(path, GIT_SYMBOLIC_REF_ARGS).await {
        Ok((true, branch, _)) if !branch.is_empty() => Some(branch),
        _ => None,
    }
}

/// Gets the raw NUL-separated porcelain status of the working tree
/// Returns (success, stdout, stderr)
pub async fn get_porcelain_status(path: &Path) -> Result<(bool, String, String)> {
    let (success, stdout, stderr) = run_git_raw(path, GIT_STATUS_PORCELAIN_ARGS).await?;
    Ok((success, stdout, stderr.trim().to_string()))
}

/// Stages every change in the working tree, including deletions
/// Returns (success, stdout, stderr)
pub async fn stage_all(path: &Path) -> Result<(bool, String, String)> {
    run_git(path, GIT_ADD_ALL_ARGS).await
}

/// Commits staged changes with the given message
/// Returns (success, stdout, stderr)
pub async fn commit_changes(path: &Path, message: &str) -> Result<(bool, String, String)> {
    let mut args = Vec::from(GIT_COMMIT_ARGS);
    args.push(message);
    run_git(path, &args).await
}

/// Gets the full identifier of the commit HEAD points at
pub async fn get_head_commit(path: &Path) -> Result<Option<String>> {
    match run_git(path, GIT_REV_PARSE_HEAD_ARGS).await {
        Ok((true, id, _)) if !id.is_empty() => Ok(Some(id)),
        Ok(_) => Ok(None),
        Err(e) => Err(e),
    }
}

/// Pushes `branch` to the same-named branch on `remote`
/// Returns (success, stdout, stderr); stdout carries the porcelain ref status
pub async fn push_branch(
    path: &Path,
    remote: &str,
    branch: &str,
    force: bool,
) -> Result<(bool, String, String)> {
    let refspec = format!("{branch}:{branch}");
    let mut args = vec!["push", "--porcelain"];
    if force {
        args.push("--force");
    }
    args.push(remote);
    args.push(&refspec);
    run_git(path, &args).await
}
