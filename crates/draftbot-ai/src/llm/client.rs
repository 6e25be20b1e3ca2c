//! Generative client trait

use async_trait::async_trait;

use crate::error::Result;

/// Backend-agnostic generative-language client.
///
/// Implementations must normalize whatever the backend returns to a plain
/// string; callers never see provider-specific response shapes.
#[async_trait]
pub trait GenerativeClient: Send + Sync {
    /// Provider name for logs and error messages
    fn provider(&self) -> &str;

    /// List model identifiers accessible with the current credential
    async fn list_models(&self) -> Result<Vec<String>>;

    /// Generate a reply for the prompt using the given model
    async fn generate(&self, model: &str, prompt: &str) -> Result<String>;
}
