//! MQTT adapter error types.

use gardenhub_domain::error::GardenError;

/// Errors specific to the MQTT adapter.
#[derive(Debug, thiserror::Error)]
pub enum MqttError {
    /// The rumqttc client refused the request, usually because the event
    /// loop has stopped.
    #[error("MQTT client error")]
    Client(#[source] rumqttc::ClientError),

    /// Failed to encode an outgoing message as JSON.
    #[error("failed to encode MQTT payload")]
    PayloadEncode(#[source] serde_json::Error),
}

impl From<MqttError> for GardenError {
    fn from(err: MqttError) -> Self {
        Self::Transport(Box::new(err))
    }
}
