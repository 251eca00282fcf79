//! Runtime choice between the transports the daemon can publish through.

use std::future::Future;

use gardenhub_adapter_mqtt::MqttTransport;
use gardenhub_app::messages::IntegrationMessage;
use gardenhub_app::ports::MessageTransport;
use gardenhub_app::transport::InProcessTransport;
use gardenhub_domain::error::GardenError;

/// The transport picked by `messaging.transport`.
pub enum SelectedTransport {
    InProcess(InProcessTransport),
    Mqtt(MqttTransport),
}

impl MessageTransport for SelectedTransport {
    fn publish(
        &self,
        message: IntegrationMessage,
    ) -> impl Future<Output = Result<(), GardenError>> + Send {
        async move {
            match self {
                Self::InProcess(transport) => transport.publish(message).await,
                Self::Mqtt(transport) => transport.publish(message).await,
            }
        }
    }
}
