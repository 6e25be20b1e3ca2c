//! Channel-agnostic message types.

use serde::{Deserialize, Serialize};

/// Channel type identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelType {
    Discord,
}

impl ChannelType {
    /// Display name for logs
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Discord => "Discord",
        }
    }
}

impl std::fmt::Display for ChannelType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Inbound message from a channel
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboundMessage {
    /// Unique message ID
    pub id: String,
    /// Channel this message came from
    pub channel_type: ChannelType,
    /// Sender identifier (user ID in the channel)
    pub sender_id: String,
    /// Sender display name (if available)
    pub sender_name: Option<String>,
    /// Conversation identifier (channel id on Discord)
    pub conversation_id: String,
    /// Message content
    pub content: String,
    /// Timestamp (milliseconds since epoch)
    pub timestamp: i64,
    /// Permanent link to the message (if the transport provides one)
    pub permalink: Option<String>,
}

impl InboundMessage {
    /// Create a new inbound message
    pub fn new(
        id: impl Into<String>,
        channel_type: ChannelType,
        sender_id: impl Into<String>,
        conversation_id: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            channel_type,
            sender_id: sender_id.into(),
            sender_name: None,
            conversation_id: conversation_id.into(),
            content: content.into(),
            timestamp: chrono::Utc::now().timestamp_millis(),
            permalink: None,
        }
    }

    /// Set sender name
    pub fn with_sender_name(mut self, name: impl Into<String>) -> Self {
        self.sender_name = Some(name.into());
        self
    }

    /// Set permalink
    pub fn with_permalink(mut self, permalink: impl Into<String>) -> Self {
        self.permalink = Some(permalink.into());
        self
    }

    /// Sender display name, falling back to the raw sender id.
    pub fn sender_label(&self) -> &str {
        self.sender_name.as_deref().unwrap_or(&self.sender_id)
    }
}

/// Outbound message to a channel
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutboundMessage {
    /// Conversation identifier
    pub conversation_id: String,
    /// Message content (plain text or markdown)
    pub content: String,
}

impl OutboundMessage {
    /// Create a new outbound message
    pub fn new(conversation_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            conversation_id: conversation_id.into(),
            content: content.into(),
        }
    }
}
