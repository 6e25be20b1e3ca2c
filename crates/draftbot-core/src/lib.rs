//! draftbot-core: the message-triage pipeline.
//!
//! Watches a chat channel, classifies inbound messages as support
//! questions, redacts obvious identifiers, drafts a grounded reply via the
//! model gateway and routes the draft to a review channel (or auto-posts
//! it). The chat transport and the generative backend are external
//! collaborators; this crate owns everything in between.

pub mod channel;
pub mod config;
pub mod orchestrator;
pub mod paths;
pub mod triage;
