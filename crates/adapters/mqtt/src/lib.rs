//! # gardenhub-adapter-mqtt
//!
//! MQTT adapter: delivers integration messages to an MQTT broker.
//!
//! ## Responsibilities
//! - Connect to an MQTT broker and keep the connection alive in a background task
//! - Implement the `MessageTransport` port from `gardenhub-app`
//! - Route each message to `{base_topic}/management/{kind}` as JSON, QoS 1
//!
//! ## Dependency rule
//! Same as other adapters: depends on `gardenhub-app` and `gardenhub-domain`.

pub mod config;
pub mod error;
pub mod transport;

pub use config::MqttConfig;
pub use error::MqttError;
pub use transport::MqttTransport;
