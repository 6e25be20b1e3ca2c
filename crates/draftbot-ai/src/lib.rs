//! draftbot-ai: gateway to the generative-language backend.
//!
//! Wraps the Gemini REST API behind a provider-agnostic trait, handles
//! model discovery with a preference-ordered fallback, and normalizes the
//! backend's response shapes to plain text.

mod error;
pub mod llm;

pub use error::{AiError, Result};
pub use llm::{
    select_model, GeminiClient, GenerativeClient, MockLlmClient, MockStep, ModelGateway,
    PREFERRED_MODELS,
};
