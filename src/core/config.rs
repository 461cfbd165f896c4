//! Configuration constants and settings

// Publish defaults
//
// These mirror the values the admin panel's publish endpoint has always used:
// a single working branch, the conventional remote name and a fixed message
// for commits made without one.
pub const DEFAULT_BRANCH: &str = "dev";
pub const DEFAULT_REMOTE: &str = "origin";
pub const DEFAULT_COMMIT_MESSAGE: &str = "Auto commit from publish workflow";

// Environment variables read by `PublishConfig::from_env`
pub const ENV_REPO_DIR: &str = "REPO_DIR";
pub const ENV_TOKEN: &str = "GITHUB_TOKEN";
pub const ENV_REPO_URL: &str = "GITHUB_REPO_URL";
pub const ENV_BRANCH: &str = "PUBLISH_BRANCH";
pub const ENV_REMOTE: &str = "REMOTE_NAME";

// Timeout constants
pub const GIT_OPERATION_TIMEOUT_SECS: u64 = 180; // 3 minutes per git command

// Result formatting
pub const CHANGES_DISPLAY_LIMIT: usize = 10;
pub const SHORT_COMMIT_LENGTH: usize = 8;

// Credential handling
pub const TOKEN_USERNAME: &str = "x-access-token";
pub const REDACTED: &str = "***";

// User-facing messages
pub const NO_CHANGES_MESSAGE: &str = "no changes to publish";
pub const PUBLISHING_MESSAGE: &str = "publishing...";
