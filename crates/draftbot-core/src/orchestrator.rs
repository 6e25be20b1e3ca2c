//! Per-event orchestration.
//!
//! Wires classifier, redactor, context, composer, gateway, logger and
//! routing together. Two entry points per inbound event: moderator
//! commands on the review channel, and the candidate-message path.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use tokio::time::sleep;
use tokio_stream::StreamExt;
use tracing::{debug, error, info, warn};

use draftbot_ai::ModelGateway;

use crate::channel::{Channel, InboundMessage};
use crate::config::BotConfig;
use crate::triage::{
    compose, is_candidate, redact, BrandContext, InteractionLog, InteractionRecord,
};

const STATS_COMMAND: &str = "!stats";
const REFRESH_COMMAND: &str = "!refresh";

#[cfg(test)]
const STREAM_RECONNECT_DELAY: Duration = Duration::from_millis(20);
#[cfg(not(test))]
const STREAM_RECONNECT_DELAY: Duration = Duration::from_secs(2);

/// The triage orchestrator: one instance serves every inbound event.
///
/// Each event works on its own local data; the only shared values are the
/// brand-context and selected-model snapshots, both swapped whole.
pub struct Orchestrator {
    config: BotConfig,
    context: BrandContext,
    gateway: Arc<ModelGateway>,
    log: InteractionLog,
    channel: Arc<dyn Channel>,
}

impl Orchestrator {
    pub fn new(
        config: BotConfig,
        context: BrandContext,
        gateway: Arc<ModelGateway>,
        log: InteractionLog,
        channel: Arc<dyn Channel>,
    ) -> Self {
        Self {
            config,
            context,
            gateway,
            log,
            channel,
        }
    }

    /// The chat transport this orchestrator serves.
    pub fn channel(&self) -> &Arc<dyn Channel> {
        &self.channel
    }

    /// Startup sequence: pick a model (best-effort) and log readiness.
    /// The brand context is already loaded by `BrandContext::load`.
    pub async fn startup(&self) {
        let model = self.gateway.refresh_selection().await;
        info!(model = %model, channel = %self.channel.name(), "Ready to serve");
    }

    /// Handle one inbound event. Errors returned here are logged by the
    /// dispatch loop and never prevent processing of the next event.
    pub async fn handle_message(&self, message: InboundMessage) -> Result<()> {
        // The transport already drops bot-authored events; this guard
        // covers transports that do not.
        if let Some(bot_id) = &self.config.discord.bot_user_id {
            if &message.sender_id == bot_id {
                return Ok(());
            }
        }

        let trimmed = message.content.trim();

        // Moderator commands, only on the review channel.
        if let Some(review) = &self.config.triage.review_channel {
            if &message.conversation_id == review {
                match trimmed.to_lowercase().as_str() {
                    STATS_COMMAND => return self.cmd_stats(&message).await,
                    REFRESH_COMMAND => return self.cmd_refresh(&message).await,
                    _ => {}
                }
            }
        }

        if let Some(watch) = &self.config.triage.watch_channel {
            if &message.conversation_id != watch {
                return Ok(());
            }
        }

        if !is_candidate(trimmed) {
            debug!(id = %message.id, "Message is not a candidate, skipping");
            return Ok(());
        }

        self.draft_and_route(&message, trimmed).await
    }

    /// Report record count and mean model latency from the interaction log.
    async fn cmd_stats(&self, message: &InboundMessage) -> Result<()> {
        let stats = self.log.stats().context("scanning interaction log")?;
        let text = format!(
            "Interactions logged: {}\nAverage AI latency: {:.2}s (based on timestamps)",
            stats.total, stats.avg_latency_secs
        );
        self.channel.send_text(&message.conversation_id, &text).await
    }

    /// Reload the brand context and acknowledge.
    async fn cmd_refresh(&self, message: &InboundMessage) -> Result<()> {
        self.context.refresh();
        info!("Brand context reloaded");
        self.channel
            .send_text(&message.conversation_id, "Brand info reloaded.")
            .await
    }

    /// The candidate path: redact, ground, generate, persist, route.
    async fn draft_and_route(&self, message: &InboundMessage, text: &str) -> Result<()> {
        let redacted = redact(text);
        info!(from = %message.sender_label(), content = %redacted, "New candidate question");

        let context = self.context.snapshot();
        let prompt = compose(
            &redacted,
            self.config.brand_name(),
            self.config.brand_tone(),
            &context,
        );

        let sent_at = Utc::now();
        // Generation failures become user-visible reply text; this path
        // always produces something postable.
        let reply = match self.gateway.generate(&prompt).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(error = %e, "Generation failed");
                format!("Error generating reply: {e}")
            }
        };
        let received_at = Utc::now();

        let record = InteractionRecord {
            timestamp: chrono::DateTime::from_timestamp_millis(message.timestamp)
                .unwrap_or_else(Utc::now)
                .to_rfc3339(),
            sent_at: sent_at.to_rfc3339(),
            received_at: received_at.to_rfc3339(),
            user: message.sender_label().to_string(),
            content: redacted,
            reply: reply.clone(),
            channel: message.conversation_id.clone(),
            model: self.gateway.selected_model().to_string(),
        };
        self.log
            .append(&record)
            .context("persisting interaction record")?;

        let directive = render_directive(&record, message.permalink.as_deref());

        if let Some(review) = &self.config.triage.review_channel {
            if let Err(e) = self.channel.send_text(review, &directive).await {
                error!(error = format!("{e:#}"), "Failed to deliver directive to review channel");
                // The record is already persisted; tell the origin channel
                // instead of dropping the interaction silently.
                if let Err(e) = self
                    .channel
                    .send_text(
                        &message.conversation_id,
                        "Error delivering suggestion to review channel; see logs.",
                    )
                    .await
                {
                    error!(error = format!("{e:#}"), "Fallback notice failed too");
                }
            }
        } else {
            info!(directive = %directive, "No review channel configured");
        }

        // Auto-post fires independently of the review delivery.
        if self.config.triage.auto_post {
            if let Err(e) = self.channel.send_text(&message.conversation_id, &reply).await {
                error!(error = format!("{e:#}"), "Failed to auto-post reply");
            }
        }

        Ok(())
    }
}

/// Render the moderation directive from a persisted record.
fn render_directive(record: &InteractionRecord, permalink: Option<&str>) -> String {
    format!(
        "**Suggested Reply (model: {})**\n> {}\n\n👤 From: {}\n💬 Message: {}\n📎 Link: {}",
        record.model,
        record.reply,
        record.user,
        record.content,
        permalink.unwrap_or("n/a")
    )
}

/// Drive the transport's inbound stream, handling each message on its own
/// task so one slow generation never stalls the stream loop.
pub async fn run_dispatch_loop(orchestrator: Arc<Orchestrator>) {
    let channel = orchestrator.channel().clone();
    info!(channel = %channel.name(), "Listening for messages");

    loop {
        let Some(mut stream) = channel.start_receiving() else {
            warn!(
                "Failed to start message stream, retrying in {:?}",
                STREAM_RECONNECT_DELAY
            );
            sleep(STREAM_RECONNECT_DELAY).await;
            continue;
        };

        while let Some(message) = stream.next().await {
            debug!(id = %message.id, conversation = %message.conversation_id, "Dispatching message");
            let orchestrator = orchestrator.clone();
            tokio::spawn(async move {
                let id = message.id.clone();
                if let Err(e) = orchestrator.handle_message(message).await {
                    error!(id = %id, error = format!("{e:#}"), "Error handling message");
                }
            });
        }

        warn!(
            "Message stream ended, restarting in {:?}",
            STREAM_RECONNECT_DELAY
        );
        sleep(STREAM_RECONNECT_DELAY).await;
    }
}
