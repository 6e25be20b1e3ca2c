//! Model selection and the generation gateway

use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use tracing::{info, warn};

use crate::error::{AiError, Result};
use crate::llm::client::GenerativeClient;

/// Preferred model order; the first available one wins.
pub const PREFERRED_MODELS: [&str; 4] = [
    "gemini-2.5-flash",
    "gemini-2.5-pro",
    "gemini-1.5-flash",
    "gemini-1.5",
];

const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Pick the first preference that is a substring of any available model
/// name. No match falls back to the first preference; the call may still
/// fail later but selection itself never does.
pub fn select_model(available: &[String], preferences: &[String]) -> String {
    for pref in preferences {
        if available.iter().any(|name| name.contains(pref.as_str())) {
            return pref.clone();
        }
    }
    preferences
        .first()
        .cloned()
        .unwrap_or_else(|| PREFERRED_MODELS[0].to_string())
}

/// Gateway owning the generative client, the selected-model snapshot and
/// the generation deadline.
///
/// The selected model is a read-mostly shared value: `refresh_selection`
/// swaps in a whole new `Arc`, readers clone the current one.
pub struct ModelGateway {
    client: Arc<dyn GenerativeClient>,
    preferences: Vec<String>,
    selected: RwLock<Arc<str>>,
    timeout: Duration,
}

impl ModelGateway {
    /// Create a gateway with the default preference list.
    pub fn new(client: Arc<dyn GenerativeClient>) -> Self {
        Self::with_preferences(
            client,
            PREFERRED_MODELS.iter().map(|m| m.to_string()).collect(),
        )
    }

    /// Create a gateway with an explicit preference list.
    pub fn with_preferences(client: Arc<dyn GenerativeClient>, preferences: Vec<String>) -> Self {
        let initial: Arc<str> = preferences
            .first()
            .map(|m| m.as_str())
            .unwrap_or(PREFERRED_MODELS[0])
            .into();
        Self {
            client,
            preferences,
            selected: RwLock::new(initial),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Set the generation deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Current selected model.
    pub fn selected_model(&self) -> Arc<str> {
        self.selected.read().clone()
    }

    /// Query the backend for accessible models and select one.
    ///
    /// Discovery failures degrade to the first preference and never
    /// propagate; selection must not block startup.
    pub async fn refresh_selection(&self) -> Arc<str> {
        let selected = match self.client.list_models().await {
            Ok(available) => {
                let model = select_model(&available, &self.preferences);
                info!(model = %model, "Selected generative model");
                model
            }
            Err(e) => {
                let fallback = select_model(&[], &self.preferences);
                warn!(error = %e, fallback = %fallback, "Model discovery failed, using fallback");
                fallback
            }
        };
        let snapshot: Arc<str> = selected.into();
        *self.selected.write() = snapshot.clone();
        snapshot
    }

    /// Generate a reply for the prompt with the selected model.
    ///
    /// The backend call runs under an explicit deadline; a hung call
    /// surfaces as `AiError::Timeout` instead of stalling the caller.
    pub async fn generate(&self, prompt: &str) -> Result<String> {
        let model = self.selected_model();
        match tokio::time::timeout(self.timeout, self.client.generate(&model, prompt)).await {
            Ok(result) => result,
            Err(_) => Err(AiError::Timeout(self.timeout.as_secs())),
        }
    }
}
