//! Bot configuration.
//!
//! Loaded once at startup from a TOML file (default `~/.draftbot/draftbot.toml`)
//! with environment-variable overrides; no hot-reload except the brand
//! context via the `!refresh` command.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use crate::paths;

pub const DEFAULT_BRAND_NAME: &str = "Acme DeFi";
pub const DEFAULT_BRAND_TONE: &str = "concise, helpful, friendly, slightly witty";
pub const DEFAULT_CONTEXT_PATH: &str = "data/brand_info.txt";
pub const DEFAULT_LOG_PATH: &str = "data/interactions.jsonl";
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Bot configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BotConfig {
    #[serde(default)]
    pub discord: DiscordSection,
    #[serde(default)]
    pub gemini: GeminiSection,
    #[serde(default)]
    pub triage: TriageSection,
    #[serde(default)]
    pub brand: BrandSection,
}

/// Chat-transport credentials
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiscordSection {
    /// Bot token (required)
    pub bot_token: Option<String>,
    /// The bot's own user id, used to ignore its own messages
    pub bot_user_id: Option<String>,
}

/// Generative-backend settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeminiSection {
    /// API key (required)
    pub api_key: Option<String>,
    /// Generation deadline in seconds
    pub timeout_secs: Option<u64>,
}

/// Triage routing settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TriageSection {
    /// Channel id to watch; unset watches all channels
    pub watch_channel: Option<String>,
    /// Channel id receiving moderation directives; unset logs them locally
    pub review_channel: Option<String>,
    /// Post the raw draft straight to the origin channel
    #[serde(default)]
    pub auto_post: bool,
    /// Interaction log path
    pub log_path: Option<PathBuf>,
}

/// Brand persona settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BrandSection {
    pub name: Option<String>,
    pub tone: Option<String>,
    /// Grounding context file path
    pub context_path: Option<PathBuf>,
}

impl BotConfig {
    /// Load configuration from the default path
    pub fn load() -> Self {
        Self::load_from_path(paths::config_path().ok())
    }

    /// Load configuration from a specific path; a missing or unparseable
    /// file yields the defaults (required values are checked later by
    /// `validate`).
    pub fn load_from_path(path: Option<PathBuf>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };

        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(&path) {
            Ok(content) => toml::from_str(&content).unwrap_or_default(),
            Err(_) => Self::default(),
        }
    }

    /// Let environment variables override file values.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(token) = std::env::var("DISCORD_TOKEN") {
            self.discord.bot_token = Some(token);
        }
        if let Ok(id) = std::env::var("DISCORD_BOT_USER_ID") {
            self.discord.bot_user_id = Some(id);
        }
        if let Ok(key) = std::env::var("GEMINI_API_KEY") {
            self.gemini.api_key = Some(key);
        }
        if let Ok(channel) = std::env::var("WATCH_CHANNEL_ID") {
            self.triage.watch_channel = Some(channel);
        }
        if let Ok(channel) = std::env::var("REVIEW_CHANNEL_ID") {
            self.triage.review_channel = Some(channel);
        }
        if let Ok(flag) = std::env::var("AUTO_POST") {
            self.triage.auto_post = flag.trim().eq_ignore_ascii_case("true");
        }
        if let Ok(name) = std::env::var("BRAND_NAME") {
            self.brand.name = Some(name);
        }
        if let Ok(tone) = std::env::var("BRAND_TONE") {
            self.brand.tone = Some(tone);
        }
    }

    /// Check required credentials. Missing credentials are fatal at
    /// startup, before any connection is attempted.
    pub fn validate(&self) -> Result<()> {
        if self.bot_token().is_none() {
            bail!("Discord bot token is not configured (set DISCORD_TOKEN or [discord].bot_token)");
        }
        if self.api_key().is_none() {
            bail!("Gemini API key is not configured (set GEMINI_API_KEY or [gemini].api_key)");
        }
        Ok(())
    }

    pub fn bot_token(&self) -> Option<&str> {
        non_empty(self.discord.bot_token.as_deref())
    }

    pub fn api_key(&self) -> Option<&str> {
        non_empty(self.gemini.api_key.as_deref())
    }

    pub fn brand_name(&self) -> &str {
        non_empty(self.brand.name.as_deref()).unwrap_or(DEFAULT_BRAND_NAME)
    }

    pub fn brand_tone(&self) -> &str {
        non_empty(self.brand.tone.as_deref()).unwrap_or(DEFAULT_BRAND_TONE)
    }

    pub fn context_path(&self) -> PathBuf {
        self.brand
            .context_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONTEXT_PATH))
    }

    pub fn log_path(&self) -> PathBuf {
        self.triage
            .log_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_PATH))
    }

    pub fn generation_timeout(&self) -> Duration {
        Duration::from_secs(self.gemini.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
