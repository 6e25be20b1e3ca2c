//! Channel trait definition.

use anyhow::Result;
use async_trait::async_trait;
use futures::Stream;
use std::pin::Pin;

use super::types::{ChannelType, InboundMessage, OutboundMessage};

/// Minimal chat-transport contract.
///
/// The pipeline only needs to receive inbound messages as a stream and
/// send text to a conversation; everything transport-specific stays behind
/// this trait.
#[async_trait]
pub trait Channel: Send + Sync {
    /// Get channel type
    fn channel_type(&self) -> ChannelType;

    /// Get channel display name
    fn name(&self) -> &str {
        self.channel_type().display_name()
    }

    /// Check if channel is properly configured
    fn is_configured(&self) -> bool;

    /// Send a message to the channel
    async fn send(&self, message: OutboundMessage) -> Result<()>;

    /// Send a simple text message
    async fn send_text(&self, conversation_id: &str, text: &str) -> Result<()> {
        self.send(OutboundMessage::new(conversation_id, text)).await
    }

    /// Start receiving messages (returns None if the transport cannot
    /// start, e.g. a second concurrent start)
    fn start_receiving(&self) -> Option<Pin<Box<dyn Stream<Item = InboundMessage> + Send>>>;
}

/// Test/mock channel for unit testing
#[cfg(test)]
pub mod mock {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::mpsc;
    use tokio_stream::wrappers::UnboundedReceiverStream;

    /// A mock channel that records outbound messages and lets tests inject
    /// inbound ones.
    pub struct MockChannel {
        sent: tokio::sync::Mutex<Vec<OutboundMessage>>,
        fail_sends: AtomicUsize,
        inject_tx: mpsc::UnboundedSender<InboundMessage>,
        inject_rx: std::sync::Mutex<Option<mpsc::UnboundedReceiver<InboundMessage>>>,
    }

    impl MockChannel {
        pub fn new() -> Self {
            let (tx, rx) = mpsc::unbounded_channel();
            Self {
                sent: tokio::sync::Mutex::new(Vec::new()),
                fail_sends: AtomicUsize::new(0),
                inject_tx: tx,
                inject_rx: std::sync::Mutex::new(Some(rx)),
            }
        }

        /// Get all sent messages
        pub async fn sent_messages(&self) -> Vec<OutboundMessage> {
            self.sent.lock().await.clone()
        }

        /// Make the next `n` sends fail; they are not recorded.
        pub fn fail_next_sends(&self, n: usize) {
            self.fail_sends.store(n, Ordering::SeqCst);
        }

        /// Sender half for injecting inbound messages
        pub fn injector(&self) -> mpsc::UnboundedSender<InboundMessage> {
            self.inject_tx.clone()
        }
    }

    #[async_trait]
    impl Channel for MockChannel {
        fn channel_type(&self) -> ChannelType {
            ChannelType::Discord
        }

        fn is_configured(&self) -> bool {
            true
        }

        async fn send(&self, message: OutboundMessage) -> Result<()> {
            let failing = self
                .fail_sends
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok();
            if failing {
                anyhow::bail!("simulated send failure to {}", message.conversation_id);
            }
            self.sent.lock().await.push(message);
            Ok(())
        }

        fn start_receiving(
            &self,
        ) -> Option<Pin<Box<dyn Stream<Item = InboundMessage> + Send>>> {
            let rx = self.inject_rx.lock().expect("mock rx lock").take()?;
            Some(Box::pin(UnboundedReceiverStream::new(rx)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock::MockChannel;
    use super::*;

    #[tokio::test]
    async fn test_mock_channel_send() {
        let channel = MockChannel::new();

        let msg = OutboundMessage::new("chan-123", "Hello");
        channel.send(msg).await.unwrap();

        let sent = channel.sent_messages().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].content, "Hello");
    }

    #[tokio::test]
    async fn test_mock_channel_injected_failures() {
        let channel = MockChannel::new();
        channel.fail_next_sends(1);

        assert!(channel.send_text("chan-1", "dropped").await.is_err());
        channel.send_text("chan-1", "delivered").await.unwrap();

        let sent = channel.sent_messages().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].content, "delivered");
    }

    #[tokio::test]
    async fn test_send_text_convenience() {
        let channel = MockChannel::new();

        channel.send_text("chan-456", "Quick message").await.unwrap();

        let sent = channel.sent_messages().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].conversation_id, "chan-456");
    }
}
