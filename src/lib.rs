//! # repos-publish
//!
//! `repos-publish` commits every pending change of a working tree and pushes it
//! to a fixed branch of its remote. It powers the `repos-publish` CLI and can be
//! embedded in services that publish content edited through an admin UI.
//!
//! ## Core Features
//!
//! - **One-shot publishing**: detect, stage, commit and push in a single call.
//! - **Rejection recovery**: a non-fast-forward push is retried once with force.
//! - **Credential hygiene**: the access token lives in the remote URL only while
//!   the push runs, and never appears in results or logs.
//! - **Structured results**: every outcome, including panics and deadlines, is a
//!   serializable [`publish::PublishResult`].
//!
//! ## Example
//!
//! ```rust,no_run
//! use repos_publish::publish::{publish, PublishConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut config = PublishConfig::from_env();
//!     config.message = Some("Update product catalogue".to_string());
//!
//!     let result = publish(config).await;
//!     println!("{}: {}", result.status().text(), result.message);
//! }
//! ```

pub mod core;
pub mod error;
pub mod git;
pub mod publish;
