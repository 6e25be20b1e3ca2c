//! LLM module - generative client abstraction and model selection

mod client;
mod gateway;
mod gemini;
mod mock_client;

pub use client::GenerativeClient;
pub use gateway::{select_model, ModelGateway, PREFERRED_MODELS};
pub use gemini::GeminiClient;
pub use mock_client::{MockLlmClient, MockStep};
