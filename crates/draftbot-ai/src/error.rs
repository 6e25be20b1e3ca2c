//! Error types for the model gateway

use thiserror::Error;

/// Model gateway error types
#[derive(Error, Debug)]
pub enum AiError {
    #[error("API key is not configured")]
    MissingApiKey,

    #[error("{provider} API error {status}: {message}")]
    Api {
        provider: String,
        status: u16,
        message: String,
    },

    #[error("unrecognized response shape: {0}")]
    UnrecognizedResponse(String),

    #[error("generation timed out after {0}s")]
    Timeout(u64),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for gateway operations
pub type Result<T> = std::result::Result<T, AiError>;
