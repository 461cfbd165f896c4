// Internal modules - not part of public API
pub(crate) mod changes;
pub(crate) mod commit;
pub(crate) mod credentials;
pub(crate) mod locator;
pub(crate) mod push;
pub(crate) mod request;
pub(crate) mod result;
pub(crate) mod workflow;

// Public API - curated exports only
pub mod api;

// Re-export key items at module level for convenience
pub use api::*;
