//! Deterministic mock generative client for pipeline tests.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::time::{sleep, Duration};

use crate::error::{AiError, Result};
use crate::llm::client::GenerativeClient;

/// Deterministic step for scripted mock completions.
#[derive(Debug, Clone)]
enum MockStepKind {
    /// Return a plain reply.
    Text(String),
    /// Return a generation error.
    Error(String),
}

/// Scripted completion step with optional delay.
#[derive(Debug, Clone)]
pub struct MockStep {
    delay_ms: u64,
    kind: MockStepKind,
}

impl MockStep {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            delay_ms: 0,
            kind: MockStepKind::Text(content.into()),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            delay_ms: 0,
            kind: MockStepKind::Error(message.into()),
        }
    }

    pub fn with_delay(mut self, delay_ms: u64) -> Self {
        self.delay_ms = delay_ms;
        self
    }
}

/// A scripted mock client. With an empty script every call returns a
/// canned reply, so simple tests need no setup.
#[derive(Clone, Default)]
pub struct MockLlmClient {
    model: String,
    models: Vec<String>,
    list_error: Option<String>,
    script: Arc<Mutex<VecDeque<MockStep>>>,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl MockLlmClient {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Self::default()
        }
    }

    pub fn from_steps(model: impl Into<String>, steps: Vec<MockStep>) -> Self {
        let client = Self::new(model);
        {
            let script = client.script.clone();
            // No awaits have run yet, so the lock is uncontended.
            let mut guard = script.try_lock().expect("fresh mock script lock");
            guard.extend(steps);
        }
        client
    }

    /// Set the model list returned by discovery.
    pub fn with_models(mut self, models: Vec<String>) -> Self {
        self.models = models;
        self
    }

    /// Make discovery fail with the given message.
    pub fn with_list_error(mut self, message: impl Into<String>) -> Self {
        self.list_error = Some(message.into());
        self
    }

    /// Prompts seen by `generate`, in call order.
    pub async fn prompts(&self) -> Vec<String> {
        self.prompts.lock().await.clone()
    }
}

#[async_trait]
impl GenerativeClient for MockLlmClient {
    fn provider(&self) -> &str {
        "mock"
    }

    async fn list_models(&self) -> Result<Vec<String>> {
        if let Some(message) = &self.list_error {
            return Err(AiError::Api {
                provider: "mock".to_string(),
                status: 500,
                message: message.clone(),
            });
        }
        Ok(self.models.clone())
    }

    async fn generate(&self, _model: &str, prompt: &str) -> Result<String> {
        self.prompts.lock().await.push(prompt.to_string());

        let step = self.script.lock().await.pop_front();
        let Some(step) = step else {
            return Ok(format!("mock reply from {}", self.model));
        };

        if step.delay_ms > 0 {
            sleep(Duration::from_millis(step.delay_ms)).await;
        }

        match step.kind {
            MockStepKind::Text(content) => Ok(content),
            MockStepKind::Error(message) => Err(AiError::Api {
                provider: "mock".to_string(),
                status: 500,
                message,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scripted_steps_in_order() {
        let client = MockLlmClient::from_steps(
            "mock",
            vec![MockStep::text("first"), MockStep::error("second fails")],
        );
        assert_eq!(client.generate("m", "p1").await.unwrap(), "first");
        assert!(client.generate("m", "p2").await.is_err());
        assert_eq!(client.prompts().await, vec!["p1", "p2"]);
    }

    #[tokio::test]
    async fn test_empty_script_returns_canned_reply() {
        let client = MockLlmClient::new("mock");
        let reply = client.generate("m", "p").await.unwrap();
        assert!(reply.contains("mock reply"));
    }
}
