//! [`MessageTransport`] implementation over MQTT.

use std::future::Future;
use std::time::Duration;

use rumqttc::{AsyncClient, Event, EventLoop, Packet, QoS};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use gardenhub_app::messages::{IntegrationMessage, MessagePayload};
use gardenhub_app::ports::MessageTransport;
use gardenhub_domain::error::GardenError;

use crate::config::MqttConfig;
use crate::error::MqttError;

const RECONNECT_DELAY: Duration = Duration::from_secs(1);

/// Publishes integration messages as JSON with QoS 1 (at least once).
///
/// Publishing only queues the message for the event loop; it succeeds while
/// the broker is unreachable as long as the request channel has room.
#[derive(Clone)]
pub struct MqttTransport {
    client: AsyncClient,
    base_topic: String,
}

impl MqttTransport {
    /// Create the client and spawn the task driving its event loop.
    ///
    /// The task reconnects after connection errors and stops once
    /// `shutdown` is cancelled.
    #[must_use]
    pub fn connect(config: &MqttConfig, shutdown: CancellationToken) -> (Self, JoinHandle<()>) {
        let (client, event_loop) = AsyncClient::new(config.options(), config.channel_capacity);
        tracing::info!(
            host = %config.broker_host,
            port = config.broker_port,
            client_id = %config.client_id,
            "starting MQTT transport"
        );
        let handle = tokio::spawn(drive(event_loop, shutdown));
        let transport = Self {
            client,
            base_topic: config.base_topic.trim_end_matches('/').to_string(),
        };
        (transport, handle)
    }

    /// Topic a payload is routed to.
    #[must_use]
    pub fn topic_for(&self, payload: &MessagePayload) -> String {
        format!("{}/management/{}", self.base_topic, payload.topic())
    }

    /// Ask the broker to close the session; the driver task ends afterwards.
    ///
    /// # Errors
    ///
    /// Returns [`MqttError::Client`] when the event loop is already gone.
    pub async fn disconnect(&self) -> Result<(), MqttError> {
        self.client.disconnect().await.map_err(MqttError::Client)
    }
}

impl MessageTransport for MqttTransport {
    fn publish(
        &self,
        message: IntegrationMessage,
    ) -> impl Future<Output = Result<(), GardenError>> + Send {
        let topic = self.topic_for(&message.payload);
        let client = self.client.clone();
        async move {
            let payload = serde_json::to_vec(&message).map_err(MqttError::PayloadEncode)?;
            client
                .publish(&topic, QoS::AtLeastOnce, false, payload)
                .await
                .map_err(MqttError::Client)?;
            tracing::debug!(%topic, kind = message.payload.name(), "queued MQTT publish");
            Ok(())
        }
    }
}

async fn drive(mut event_loop: EventLoop, shutdown: CancellationToken) {
    loop {
        tokio::select! {
            () = shutdown.cancelled() => {
                tracing::info!("MQTT transport stopped");
                return;
            }
            event = event_loop.poll() => match event {
                Ok(Event::Incoming(Packet::ConnAck(_))) => {
                    tracing::info!("connected to MQTT broker");
                }
                Ok(Event::Incoming(Packet::Disconnect)) => {
                    tracing::info!("MQTT broker closed the session");
                }
                Ok(event) => tracing::trace!(?event, "MQTT event"),
                Err(err) => {
                    tracing::warn!(error = %err, "MQTT connection error, retrying");
                    tokio::select! {
                        () = shutdown.cancelled() => return,
                        () = tokio::time::sleep(RECONNECT_DELAY) => {}
                    }
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use gardenhub_app::context::RequestContext;
    use gardenhub_domain::id::{GardenId, UserId};

    use super::*;

    fn unreachable_broker() -> MqttConfig {
        MqttConfig {
            broker_host: "127.0.0.1".to_string(),
            broker_port: 1,
            base_topic: "omg/".to_string(),
            ..MqttConfig::default()
        }
    }

    fn deleted() -> IntegrationMessage {
        IntegrationMessage::new(
            gardenhub_domain::time::now(),
            &RequestContext::new(),
            MessagePayload::GardenDeleted {
                garden_id: GardenId::new(),
                owner_id: UserId::new(),
            },
        )
    }

    #[tokio::test]
    async fn should_route_under_management_topic() {
        let shutdown = CancellationToken::new();
        let (transport, handle) = MqttTransport::connect(&unreachable_broker(), shutdown.clone());

        assert_eq!(
            transport.topic_for(&deleted().payload),
            "omg/management/garden-deleted"
        );

        shutdown.cancel();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn should_queue_publish_while_broker_is_unreachable() {
        let shutdown = CancellationToken::new();
        let (transport, handle) = MqttTransport::connect(&unreachable_broker(), shutdown.clone());

        transport.publish(deleted()).await.unwrap();

        shutdown.cancel();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn should_fail_with_transport_error_once_event_loop_is_gone() {
        let shutdown = CancellationToken::new();
        let (transport, handle) = MqttTransport::connect(&unreachable_broker(), shutdown.clone());
        shutdown.cancel();
        handle.await.unwrap();

        let err = transport.publish(deleted()).await.unwrap_err();

        assert!(matches!(err, GardenError::Transport(_)));
    }
}
