//! Message transport port: hand integration messages to a broker.

use std::future::Future;

use gardenhub_domain::error::GardenError;

use crate::messages::IntegrationMessage;

/// Accepts one message at a time for asynchronous delivery.
///
/// Completion means the message was handed off; the delivery guarantee
/// beyond that (at-least-once is assumed) belongs to the implementation.
pub trait MessageTransport {
    /// Publish a single message.
    fn publish(
        &self,
        message: IntegrationMessage,
    ) -> impl Future<Output = Result<(), GardenError>> + Send;
}

impl<T: MessageTransport + Send + Sync> MessageTransport for std::sync::Arc<T> {
    fn publish(
        &self,
        message: IntegrationMessage,
    ) -> impl Future<Output = Result<(), GardenError>> + Send {
        (**self).publish(message)
    }
}
