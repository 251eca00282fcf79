//! In-process message transport backed by a tokio broadcast channel.

use std::future::Future;

use tokio::sync::broadcast;

use gardenhub_domain::error::GardenError;

use crate::messages::IntegrationMessage;
use crate::ports::MessageTransport;

/// In-process transport using a tokio [`broadcast`] channel.
///
/// Publishing succeeds even when there are no active subscribers
/// (the message is simply dropped).
pub struct InProcessTransport {
    sender: broadcast::Sender<IntegrationMessage>,
}

impl InProcessTransport {
    /// Create a new transport with the given channel capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe to messages published *after* this call.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<IntegrationMessage> {
        self.sender.subscribe()
    }
}

impl MessageTransport for InProcessTransport {
    fn publish(
        &self,
        message: IntegrationMessage,
    ) -> impl Future<Output = Result<(), GardenError>> + Send {
        tracing::trace!(kind = message.payload.name(), "in-process publish");
        // send only fails when nobody is listening
        let _ = self.sender.send(message);
        async { Ok(()) }
    }
}
