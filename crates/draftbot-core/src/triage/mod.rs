//! The triage pipeline: classify, redact, ground, compose, log.

pub mod classify;
pub mod context;
pub mod log;
pub mod prompt;
pub mod redact;

pub use classify::is_candidate;
pub use context::BrandContext;
pub use log::{InteractionLog, InteractionRecord, LogStats};
pub use prompt::compose;
pub use redact::redact;
