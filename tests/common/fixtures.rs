//! Test fixtures and builders

use anyhow::Result;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use repos_publish::publish::PublishConfig;

use super::git::{
    add_git_remote, configure_identity, create_test_commit, git, remote_url, rev_parse,
    setup_bare_remote, setup_git_repo,
};

pub const TEST_TOKEN: &str = "ghp_test_token_0123456789";

/// A working tree, optionally with a local bare remote, cleaned up on drop
pub struct TestRepo {
    pub temp_dir: TempDir,
    pub remote_dir: Option<TempDir>,
    pub name: String,
    pub branch: String,
}

impl TestRepo {
    /// Get the path to the repository
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Path of the bare remote
    pub fn remote_path(&self) -> &Path {
        self.remote_dir
            .as_ref()
            .expect("repository was built without a bare remote")
            .path()
    }

    /// Create (or overwrite) a file, creating parent directories as needed
    pub fn create_file(&self, name: &str, content: &str) -> Result<PathBuf> {
        let file_path = self.path().join(name);
        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&file_path, content)?;
        Ok(file_path)
    }

    pub fn head(&self) -> Result<String> {
        rev_parse(self.path(), "HEAD")
    }

    /// Tip of the publish branch on the bare remote
    pub fn remote_head(&self) -> Result<String> {
        rev_parse(self.remote_path(), &format!("refs/heads/{}", self.branch))
    }

    pub fn origin_url(&self) -> Option<String> {
        remote_url(self.path(), "origin")
    }

    /// Whether `git status` reports nothing to commit
    pub fn is_clean(&self) -> Result<bool> {
        Ok(git(self.path(), &["status", "--porcelain"])?.is_empty())
    }

    /// Pushes a commit to the remote from a second clone, so the local branch falls behind
    pub fn diverge_remote(&self, file_name: &str) -> Result<String> {
        let other = TempDir::new()?;
        let remote = self.remote_path().to_string_lossy().to_string();
        let clone_path = other.path().join("clone");
        let clone_str = clone_path.to_string_lossy().to_string();

        git(other.path(), &["clone", "-q", "--branch", &self.branch, &remote, &clone_str])?;
        configure_identity(&clone_path)?;
        create_test_commit(&clone_path, file_name, "edited elsewhere", "Remote-only commit")?;
        git(&clone_path, &["push", "-q", "origin", &self.branch])?;

        rev_parse(&clone_path, "HEAD")
    }

    /// Publish inputs pointing at this repository and its bare remote
    pub fn config(&self) -> PublishConfig {
        PublishConfig {
            repo_dir: Some(self.path().to_path_buf()),
            token: Some(TEST_TOKEN.to_string()),
            repo_url: Some(self.remote_path().to_string_lossy().to_string()),
            branch: Some(self.branch.clone()),
            remote: None,
            message: None,
        }
    }
}

/// Builder for creating test repositories
pub struct TestRepoBuilder {
    name: String,
    branch: String,
    with_bare_remote: bool,
    with_remote_url: Option<String>,
}

impl TestRepoBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            branch: "dev".to_string(),
            with_bare_remote: false,
            with_remote_url: None,
        }
    }

    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = branch.into();
        self
    }

    /// `origin` points at a fresh local bare repository holding the initial commit
    pub fn with_bare_remote(mut self) -> Self {
        self.with_bare_remote = true;
        self
    }

    /// `origin` points at `url`; nothing is pushed
    pub fn with_remote_url(mut self, url: impl Into<String>) -> Self {
        self.with_remote_url = Some(url.into());
        self
    }

    pub fn build(self) -> Result<TestRepo> {
        let temp_dir = TempDir::new()?;
        setup_git_repo(temp_dir.path(), &self.branch)?;

        // Create initial commit
        create_test_commit(temp_dir.path(), "README.md", "# Test Repo\n", "Initial commit")?;

        let remote_dir = if self.with_bare_remote {
            let remote_dir = TempDir::new()?;
            setup_bare_remote(remote_dir.path(), &self.branch)?;
            add_git_remote(
                temp_dir.path(),
                "origin",
                &remote_dir.path().to_string_lossy(),
            )?;
            git(temp_dir.path(), &["push", "-q", "origin", &self.branch])?;
            Some(remote_dir)
        } else {
            if let Some(url) = &self.with_remote_url {
                add_git_remote(temp_dir.path(), "origin", url)?;
            }
            None
        };

        Ok(TestRepo {
            temp_dir,
            remote_dir,
            name: self.name,
            branch: self.branch,
        })
    }
}
