//! Gemini generative-language provider

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::{AiError, Result};
use crate::llm::client::GenerativeClient;

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
const DISABLE_SYSTEM_PROXY_ENV: &str = "DRAFTBOT_DISABLE_SYSTEM_PROXY";

/// System proxy settings are ignored in tests and when
/// `DRAFTBOT_DISABLE_SYSTEM_PROXY` is set.
fn build_http_client() -> Client {
    if std::env::var_os(DISABLE_SYSTEM_PROXY_ENV).is_some() || cfg!(test) {
        Client::builder()
            .no_proxy()
            .build()
            .unwrap_or_else(|_| Client::new())
    } else {
        Client::new()
    }
}

/// Gemini REST client
pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl GeminiClient {
    /// Create a new Gemini client
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: build_http_client(),
            api_key: api_key.into(),
            base_url: GEMINI_API_BASE.to_string(),
        }
    }

    /// Set custom base URL (for tests and API-compatible proxies)
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    fn check_api_key(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(AiError::MissingApiKey);
        }
        Ok(())
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<RequestContent<'a>>,
}

#[derive(Serialize)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct ListModelsResponse {
    #[serde(default)]
    models: Vec<ModelEntry>,
}

#[derive(Deserialize)]
struct ModelEntry {
    name: String,
}

/// Known response shapes, tried in order by serde.
///
/// The backend has returned both a structured candidate list and a bare
/// text-field object across API revisions; anything else is an explicit
/// unrecognized-response error, never a stringified fallback.
#[derive(Deserialize)]
#[serde(untagged)]
enum GenerateResponse {
    Candidates { candidates: Vec<Candidate> },
    Text { text: String },
    Other(Value),
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

/// Map any known response shape to plain reply text.
fn normalize_response(response: GenerateResponse) -> Result<String> {
    match response {
        GenerateResponse::Candidates { candidates } => {
            let text: String = candidates
                .first()
                .and_then(|c| c.content.as_ref())
                .map(|content| {
                    content
                        .parts
                        .iter()
                        .filter_map(|p| p.text.as_deref())
                        .collect()
                })
                .unwrap_or_default();
            let text = text.trim().to_string();
            if text.is_empty() {
                return Err(AiError::UnrecognizedResponse(
                    "candidate list without text content".to_string(),
                ));
            }
            Ok(text)
        }
        GenerateResponse::Text { text } => {
            let text = text.trim().to_string();
            if text.is_empty() {
                return Err(AiError::UnrecognizedResponse(
                    "empty text field".to_string(),
                ));
            }
            Ok(text)
        }
        GenerateResponse::Other(value) => Err(AiError::UnrecognizedResponse(truncate(
            &value.to_string(),
            256,
        ))),
    }
}

async fn response_to_error(response: Response, provider: &str) -> AiError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();

    // Truncate error body to prevent leaking large or sensitive responses.
    const MAX_ERROR_BODY: usize = 512;
    AiError::Api {
        provider: provider.to_string(),
        status,
        message: truncate(&body, MAX_ERROR_BODY),
    }
}

fn truncate(text: &str, max_bytes: usize) -> String {
    if text.len() <= max_bytes {
        return text.to_string();
    }
    let mut end = max_bytes;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}... [truncated]", &text[..end])
}

#[async_trait]
impl GenerativeClient for GeminiClient {
    fn provider(&self) -> &str {
        "gemini"
    }

    async fn list_models(&self) -> Result<Vec<String>> {
        self.check_api_key()?;

        let response = self
            .client
            .get(format!("{}/models", self.base_url))
            .header("x-goog-api-key", &self.api_key)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(response_to_error(response, "Gemini").await);
        }

        let data: ListModelsResponse = response.json().await?;
        let names: Vec<String> = data.models.into_iter().map(|m| m.name).collect();
        debug!(count = names.len(), "Listed Gemini models");
        Ok(names)
    }

    async fn generate(&self, model: &str, prompt: &str) -> Result<String> {
        self.check_api_key()?;

        let body = GenerateRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: prompt }],
            }],
        };

        let response = self
            .client
            .post(format!(
                "{}/models/{}:generateContent",
                self.base_url, model
            ))
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(response_to_error(response, "Gemini").await);
        }

        let parsed: GenerateResponse = response.json().await?;
        normalize_response(parsed)
    }
}
