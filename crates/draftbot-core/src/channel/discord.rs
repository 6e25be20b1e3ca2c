//! Discord channel implementation.
//!
//! Uses the Discord Gateway WebSocket for receiving messages and REST API
//! for sending.

use anyhow::{Context, Result};
use async_trait::async_trait;
use futures::stream::StreamExt;
use reqwest::Client;
use serde_json::{json, Value};
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use super::traits::Channel;
use super::types::{ChannelType, InboundMessage, OutboundMessage};

const DISCORD_API_BASE: &str = "https://discord.com/api/v10";
const DISCORD_MAX_MESSAGE_LEN: usize = 2000;

/// Intents: GUILDS (1) | GUILD_MESSAGES (512) | DIRECT_MESSAGES (4096) | MESSAGE_CONTENT (32768)
const GATEWAY_INTENTS: u64 = 1 | 512 | 4096 | 32768;

/// Discord channel configuration.
#[derive(Debug, Clone)]
pub struct DiscordConfig {
    pub bot_token: String,
}

/// Discord channel that receives via Gateway WebSocket and sends via REST API.
pub struct DiscordChannel {
    config: DiscordConfig,
    client: Client,
    polling: Arc<AtomicBool>,
}

impl DiscordChannel {
    pub fn new(config: DiscordConfig) -> Self {
        Self {
            config,
            client: Client::new(),
            polling: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn with_token(token: &str) -> Self {
        Self::new(DiscordConfig {
            bot_token: token.to_string(),
        })
    }

    /// Send a message to a Discord channel via REST API.
    async fn send_message(&self, channel_id: &str, text: &str) -> Result<()> {
        for chunk in chunk_plain(text, DISCORD_MAX_MESSAGE_LEN) {
            let resp = self
                .client
                .post(format!(
                    "{}/channels/{}/messages",
                    DISCORD_API_BASE, channel_id
                ))
                .header("Authorization", format!("Bot {}", self.config.bot_token))
                .json(&json!({ "content": chunk }))
                .send()
                .await?;

            if !resp.status().is_success() {
                let status = resp.status();
                let body = resp.text().await.unwrap_or_default();
                anyhow::bail!("Discord send failed ({}): {}", status, body);
            }
        }
        Ok(())
    }

    /// Start the Gateway WebSocket connection and return a message stream.
    fn start_gateway(
        &self,
    ) -> Option<Pin<Box<dyn tokio_stream::Stream<Item = InboundMessage> + Send>>> {
        let token = self.config.bot_token.clone();
        let client = self.client.clone();
        let polling = self.polling.clone();

        if polling.swap(true, Ordering::SeqCst) {
            warn!("Discord gateway already running");
            return None;
        }

        let (tx, rx) = mpsc::channel::<InboundMessage>(256);

        tokio::spawn(async move {
            let _guard = scopeguard::guard((), |_| {
                polling.store(false, Ordering::SeqCst);
            });

            // Get gateway URL
            let gateway_url = match Self::fetch_gateway_url(&client, &token).await {
                Ok(url) => url,
                Err(e) => {
                    error!("Failed to get Discord gateway URL: {}", e);
                    return;
                }
            };

            info!("Connecting to Discord Gateway: {}", gateway_url);

            let ws_stream = match tokio_tungstenite::connect_async(&gateway_url).await {
                Ok((stream, _)) => stream,
                Err(e) => {
                    error!("Failed to connect to Discord Gateway: {}", e);
                    return;
                }
            };

            let (mut ws_write, mut ws_read) = ws_stream.split();

            // Read Hello (opcode 10) to get heartbeat interval
            let heartbeat_interval = match ws_read.next().await {
                Some(Ok(msg)) => {
                    let text = msg.to_text().unwrap_or("{}");
                    let payload: Value = serde_json::from_str(text).unwrap_or_default();
                    if payload["op"].as_u64() == Some(10) {
                        payload["d"]["heartbeat_interval"].as_u64().unwrap_or(41250)
                    } else {
                        warn!("Expected Hello (op 10), got: {}", text);
                        41250
                    }
                }
                _ => {
                    error!("No Hello from Discord Gateway");
                    return;
                }
            };

            debug!("Discord heartbeat interval: {}ms", heartbeat_interval);

            // Send Identify (opcode 2)
            let identify = json!({
                "op": 2,
                "d": {
                    "token": token,
                    "intents": GATEWAY_INTENTS,
                    "properties": {
                        "os": "linux",
                        "browser": "draftbot",
                        "device": "draftbot"
                    }
                }
            });

            use futures::SinkExt;
            use tokio_tungstenite::tungstenite::Message as WsMessage;

            if let Err(e) = ws_write
                .send(WsMessage::Text(identify.to_string().into()))
                .await
            {
                error!("Failed to send Identify: {}", e);
                return;
            }

            // Spawn heartbeat task
            let heartbeat_write = Arc::new(tokio::sync::Mutex::new(ws_write));
            let hb_write = heartbeat_write.clone();
            let hb_polling = polling.clone();
            tokio::spawn(async move {
                let mut interval =
                    tokio::time::interval(std::time::Duration::from_millis(heartbeat_interval));
                loop {
                    interval.tick().await;
                    if !hb_polling.load(Ordering::SeqCst) {
                        break;
                    }
                    let heartbeat = json!({"op": 1, "d": null});
                    let mut writer = hb_write.lock().await;
                    if let Err(e) = writer
                        .send(WsMessage::Text(heartbeat.to_string().into()))
                        .await
                    {
                        warn!("Discord heartbeat failed: {}", e);
                        break;
                    }
                }
            });

            // Read messages
            while let Some(msg_result) = ws_read.next().await {
                if !polling.load(Ordering::SeqCst) {
                    break;
                }

                let msg = match msg_result {
                    Ok(m) => m,
                    Err(e) => {
                        warn!("Discord WebSocket error: {}", e);
                        break;
                    }
                };

                let text = match msg.to_text() {
                    Ok(t) => t,
                    Err(_) => continue,
                };

                let payload: Value = match serde_json::from_str(text) {
                    Ok(v) => v,
                    Err(_) => continue,
                };

                // Only handle MESSAGE_CREATE (type "t")
                if payload["t"].as_str() != Some("MESSAGE_CREATE") {
                    continue;
                }

                let Some(inbound) = parse_message_create(&payload["d"]) else {
                    continue;
                };

                if tx.send(inbound).await.is_err() {
                    debug!("Discord message channel closed");
                    break;
                }
            }

            info!("Discord gateway connection ended");
        });

        Some(Box::pin(tokio_stream::wrappers::ReceiverStream::new(rx)))
    }

    async fn fetch_gateway_url(client: &Client, token: &str) -> Result<String> {
        let resp = client
            .get(format!("{}/gateway/bot", DISCORD_API_BASE))
            .header("Authorization", format!("Bot {}", token))
            .send()
            .await
            .context("Failed to get Discord gateway URL")?;

        let body: Value = resp.json().await?;
        let url = body["url"]
            .as_str()
            .context("Missing 'url' in gateway response")?;
        Ok(format!("{}/?v=10&encoding=json", url))
    }
}

/// Parse a MESSAGE_CREATE payload into an inbound message.
///
/// Messages authored by bots (including this one) are dropped here, before
/// the pipeline ever sees them.
fn parse_message_create(data: &Value) -> Option<InboundMessage> {
    if data["author"]["bot"].as_bool() == Some(true) {
        return None;
    }

    let message_id = data["id"].as_str()?;

    let content = data["content"].as_str().unwrap_or("");
    if content.is_empty() {
        return None;
    }

    let channel_id = data["channel_id"].as_str().unwrap_or("");
    let author_id = data["author"]["id"].as_str().unwrap_or("");
    let author_name = data["author"]["username"].as_str().map(|s| s.to_string());

    let mut inbound = InboundMessage::new(
        format!("dc_{}", message_id),
        ChannelType::Discord,
        author_id,
        channel_id,
        content,
    );
    inbound.sender_name = author_name;
    // MESSAGE_CREATE carries an ISO-8601 timestamp; keep the receive time
    // set by the constructor when it is absent or malformed.
    if let Some(ts) = data["timestamp"]
        .as_str()
        .and_then(|s| chrono::DateTime::parse_from_rfc3339(s).ok())
    {
        inbound.timestamp = ts.timestamp_millis();
    }
    // Guild messages get a jump link; DMs carry no guild id.
    if let Some(guild_id) = data["guild_id"].as_str() {
        inbound.permalink = Some(format!(
            "https://discord.com/channels/{}/{}/{}",
            guild_id, channel_id, message_id
        ));
    }
    Some(inbound)
}

/// Split text into chunks that fit Discord's message length limit,
/// preferring line breaks and never splitting inside a code point.
fn chunk_plain(text: &str, max_len: usize) -> Vec<String> {
    if text.chars().count() <= max_len {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut current = String::new();
    for line in text.split_inclusive('\n') {
        if current.chars().count() + line.chars().count() > max_len && !current.is_empty() {
            chunks.push(std::mem::take(&mut current));
        }
        if line.chars().count() > max_len {
            // A single oversized line is split at the char limit.
            let mut buf = String::new();
            for ch in line.chars() {
                if buf.chars().count() == max_len {
                    chunks.push(std::mem::take(&mut buf));
                }
                buf.push(ch);
            }
            current = buf;
        } else {
            current.push_str(line);
        }
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

#[async_trait]
impl Channel for DiscordChannel {
    fn channel_type(&self) -> ChannelType {
        ChannelType::Discord
    }

    fn is_configured(&self) -> bool {
        !self.config.bot_token.is_empty()
    }

    async fn send(&self, message: OutboundMessage) -> Result<()> {
        self.send_message(&message.conversation_id, &message.content)
            .await
    }

    fn start_receiving(
        &self,
    ) -> Option<Pin<Box<dyn tokio_stream::Stream<Item = InboundMessage> + Send>>> {
        self.start_gateway()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_discord_channel_is_configured() {
        let channel = DiscordChannel::with_token("test-token");
        assert!(channel.is_configured());

        let empty = DiscordChannel::with_token("");
        assert!(!empty.is_configured());
    }

    #[test]
    fn test_parse_message_create() {
        let data = json!({
            "id": "111",
            "channel_id": "222",
            "guild_id": "333",
            "content": "How do the fees work?",
            "timestamp": "2026-08-23T12:00:00+00:00",
            "author": {"id": "444", "username": "alice", "bot": false}
        });
        let msg = parse_message_create(&data).unwrap();
        assert_eq!(msg.id, "dc_111");
        assert_eq!(msg.conversation_id, "222");
        assert_eq!(msg.sender_label(), "alice");
        assert_eq!(msg.timestamp, 1_787_486_400_000);
        assert_eq!(
            msg.permalink.as_deref(),
            Some("https://discord.com/channels/333/222/111")
        );
    }

    #[test]
    fn test_parse_without_timestamp_uses_receive_time() {
        let before = chrono::Utc::now().timestamp_millis();
        let data = json!({
            "id": "111",
            "channel_id": "222",
            "content": "help please",
            "author": {"id": "444", "username": "alice"}
        });
        let msg = parse_message_create(&data).unwrap();
        assert!(msg.timestamp >= before);
    }

    #[test]
    fn test_parse_skips_bot_authors() {
        let data = json!({
            "id": "111",
            "channel_id": "222",
            "content": "beep",
            "author": {"id": "444", "username": "draftbot", "bot": true}
        });
        assert!(parse_message_create(&data).is_none());
    }

    #[test]
    fn test_parse_skips_empty_content() {
        let data = json!({
            "id": "111",
            "channel_id": "222",
            "author": {"id": "444", "username": "alice"}
        });
        assert!(parse_message_create(&data).is_none());
    }

    #[test]
    fn test_dm_has_no_permalink() {
        let data = json!({
            "id": "111",
            "channel_id": "222",
            "content": "help please",
            "author": {"id": "444", "username": "alice"}
        });
        let msg = parse_message_create(&data).unwrap();
        assert!(msg.permalink.is_none());
    }

    #[test]
    fn test_chunk_short_text() {
        let chunks = chunk_plain("hello", 2000);
        assert_eq!(chunks, vec!["hello"]);
    }

    #[test]
    fn test_chunk_splits_on_lines() {
        let text = format!("{}\n{}", "a".repeat(1500), "b".repeat(1500));
        let chunks = chunk_plain(&text, 2000);
        assert_eq!(chunks.len(), 2);
        assert!(chunks[0].starts_with('a'));
        assert!(chunks[1].starts_with('b'));
    }

    #[test]
    fn test_chunk_oversized_line() {
        let text = "x".repeat(4500);
        let chunks = chunk_plain(&text, 2000);
        assert_eq!(chunks.len(), 3);
        assert!(chunks.iter().all(|c| c.chars().count() <= 2000));
    }

    #[test]
    fn test_gateway_intents() {
        // GUILDS=1, GUILD_MESSAGES=512, DIRECT_MESSAGES=4096, MESSAGE_CONTENT=32768
        assert_eq!(GATEWAY_INTENTS, 1 | 512 | 4096 | 32768);
    }

    #[test]
    fn test_gateway_prevents_double_start() {
        let ch = DiscordChannel::with_token("t");
        ch.polling.store(true, Ordering::SeqCst);
        assert!(ch.start_gateway().is_none());
    }
}
