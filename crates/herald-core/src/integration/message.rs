//! The inbound message event.

use std::sync::Arc;

use crate::Event;
use crate::integration::transport::{Guild, MessageChannel, User};

/// A text message received from the transport.
///
/// This is the event the command bridge listens for. Transports construct
/// one per inbound message and hand it to the dispatcher.
#[derive(Clone, Event)]
#[event(name = "message_received")]
pub struct MessageReceived {
    /// Raw message text.
    pub content: String,
    /// The guild the message was posted in; `None` for direct messages.
    pub guild: Option<Arc<dyn Guild>>,
    /// The author.
    pub author: Arc<dyn User>,
    /// The channel the message was posted in.
    pub channel: Arc<dyn MessageChannel>,
}

impl MessageReceived {
    /// Creates a message event.
    pub fn new(
        content: impl Into<String>,
        guild: Option<Arc<dyn Guild>>,
        author: Arc<dyn User>,
        channel: Arc<dyn MessageChannel>,
    ) -> Self {
        Self {
            content: content.into(),
            guild,
            author,
            channel,
        }
    }

    /// Returns `true` if the message was sent outside any guild.
    pub fn is_direct(&self) -> bool {
        self.guild.is_none()
    }
}

impl std::fmt::Debug for MessageReceived {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageReceived")
            .field("content", &self.content)
            .field("guild", &self.guild.as_ref().map(|guild| guild.id()))
            .field("author", &self.author.id())
            .field("channel", &self.channel.id())
            .finish()
    }
}
