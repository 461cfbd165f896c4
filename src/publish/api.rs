//! Public API for the publish workflow.
//!
//! - Inputs: [`PublishConfig`] (raw) and [`PublishRequest`] (validated)
//! - Entry points: [`publish`], [`publish_with_deadline`], [`Publisher`]
//! - Output: [`PublishResult`] and its [`PublishStatus`]
//! - Stages, for callers composing their own flow
//!
//! ## Example
//!
//! ```rust,no_run
//! use repos_publish::publish::{publish, PublishConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let result = publish(PublishConfig::from_env()).await;
//!     println!("{} {}", result.status().symbol(), result.message);
//! }
//! ```

// Inputs
pub use super::credentials::{AccessToken, PushUrl};
pub use super::request::{PublishConfig, PublishRequest};

// Entry points
pub use super::workflow::{publish, publish_request, publish_with_deadline, Publisher};

// Output
pub use super::result::{PublishResult, PublishStatus};

// Stages
pub use super::changes::{detect_changes, ChangeSet};
pub use super::commit::{commit_all, CommitId};
pub use super::locator::{locate, Repository};
pub use super::push::{
    credentialed_push, push_with_retry, GitPusher, PushOutcome, PushReport, PushStage, Pusher,
    RemoteUrlGuard, TransportErrorKind,
};
