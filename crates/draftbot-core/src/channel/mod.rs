//! Channel layer: the minimal chat-transport contract the pipeline
//! consumes, plus the Discord implementation.

mod discord;
mod traits;
mod types;

pub use discord::{DiscordChannel, DiscordConfig};
pub use traits::Channel;
pub use types::{ChannelType, InboundMessage, OutboundMessage};

#[cfg(test)]
pub(crate) use traits::mock::MockChannel;
