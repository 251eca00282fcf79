//! Configuration loading: TOML file with environment variable overrides.
//!
//! Looks for `gardenhub.toml` in the working directory. Every field has a
//! sensible default so the file is optional. Environment variables take
//! precedence over file values.

use std::str::FromStr;

use serde::Deserialize;

use gardenhub_adapter_mqtt::MqttConfig;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Database settings.
    pub database: DatabaseConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Where integration messages go.
    pub messaging: MessagingConfig,
}

/// HTTP listener configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to (e.g. `0.0.0.0`).
    pub host: String,
    /// TCP port.
    pub port: u16,
}

/// `SQLite` database configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// `SQLite` connection URL or file path.
    pub url: String,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

/// Transport selected for integration messages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportKind {
    /// Broadcast inside the process; nothing leaves it.
    #[default]
    InProcess,
    /// Publish to an MQTT broker.
    Mqtt,
}

impl FromStr for TransportKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "in_process" | "in-process" => Ok(Self::InProcess),
            "mqtt" => Ok(Self::Mqtt),
            other => Err(ConfigError::Validation(format!(
                "unknown transport `{other}`, expected `in_process` or `mqtt`"
            ))),
        }
    }
}

/// Integration messaging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct MessagingConfig {
    pub transport: TransportKind,
    /// Buffer of the in-process broadcast channel.
    pub channel_capacity: usize,
    /// Broker settings, used when `transport = "mqtt"`.
    pub mqtt: MqttConfig,
}

impl Config {
    /// Load configuration from `gardenhub.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// resulting configuration is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("gardenhub.toml")?;
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_overrides(
        &mut self,
        var: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(val) = var("GARDENHUB_HOST") {
            self.server.host = val;
        }
        if let Some(port) = var("GARDENHUB_PORT").and_then(|val| val.parse().ok()) {
            self.server.port = port;
        }
        if let Some(val) = var("GARDENHUB_BIND")
            && let Some((host, port)) = val.rsplit_once(':')
        {
            self.server.host = host.to_string();
            if let Ok(port) = port.parse() {
                self.server.port = port;
            }
        }
        if let Some(val) = var("GARDENHUB_DATABASE_URL") {
            self.database.url = val;
        }
        if let Some(val) = var("GARDENHUB_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = var("RUST_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = var("GARDENHUB_TRANSPORT") {
            self.messaging.transport = val.parse()?;
        }
        if let Some(val) = var("GARDENHUB_MQTT_HOST") {
            self.messaging.mqtt.broker_host = val;
        }
        if let Some(port) = var("GARDENHUB_MQTT_PORT").and_then(|val| val.parse().ok()) {
            self.messaging.mqtt.broker_port = port;
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation("port must be non-zero".to_string()));
        }
        if self.messaging.channel_capacity == 0 {
            return Err(ConfigError::Validation(
                "messaging channel capacity must be non-zero".to_string(),
            ));
        }
        if self.messaging.transport == TransportKind::Mqtt {
            if self.messaging.mqtt.broker_port == 0 {
                return Err(ConfigError::Validation(
                    "MQTT broker port must be non-zero".to_string(),
                ));
            }
            if self.messaging.mqtt.channel_capacity == 0 {
                return Err(ConfigError::Validation(
                    "MQTT channel capacity must be non-zero".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// Return the `host:port` bind address.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Return the database URL in `sqlx`-compatible format.
    #[must_use]
    pub fn database_url(&self) -> &str {
        &self.database.url
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite:gardenhub.db?mode=rwc".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "gardenhubd=info,gardenhub=info,tower_http=debug".to_string(),
        }
    }
}

impl Default for MessagingConfig {
    fn default() -> Self {
        Self {
            transport: TransportKind::default(),
            channel_capacity: 256,
            mqtt: MqttConfig::default(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn overridden(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        let mut config = Config::default();
        config.apply_overrides(|key| vars.get(key).cloned())?;
        Ok(config)
    }

    #[test]
    fn should_produce_sensible_defaults() {
        let config = Config::default();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.database.url, "sqlite:gardenhub.db?mode=rwc");
        assert_eq!(config.messaging.transport, TransportKind::InProcess);
        assert_eq!(config.messaging.channel_capacity, 256);
    }

    #[test]
    fn should_parse_minimal_toml() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn should_parse_full_toml() {
        let toml = "
            [server]
            host = '127.0.0.1'
            port = 9090

            [database]
            url = 'sqlite:test.db'

            [logging]
            filter = 'debug'

            [messaging]
            transport = 'mqtt'
            channel_capacity = 16

            [messaging.mqtt]
            broker_host = 'broker.local'
            broker_port = 8883
            base_topic = 'omg'
        ";
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.database.url, "sqlite:test.db");
        assert_eq!(config.logging.filter, "debug");
        assert_eq!(config.messaging.transport, TransportKind::Mqtt);
        assert_eq!(config.messaging.channel_capacity, 16);
        assert_eq!(config.messaging.mqtt.broker_host, "broker.local");
        assert_eq!(config.messaging.mqtt.broker_port, 8883);
        assert_eq!(config.messaging.mqtt.base_topic, "omg");
        assert_eq!(config.messaging.mqtt.client_id, "gardenhub");
    }

    #[test]
    fn should_return_default_when_file_not_found() {
        let config = Config::from_file("nonexistent.toml").unwrap();
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn should_reject_zero_port() {
        let mut config = Config::default();
        config.server.port = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn should_reject_zero_mqtt_port_only_when_mqtt_selected() {
        let mut config = Config::default();
        config.messaging.mqtt.broker_port = 0;
        assert!(config.validate().is_ok());

        config.messaging.transport = TransportKind::Mqtt;
        assert!(config.validate().is_err());
    }

    #[test]
    fn should_format_bind_addr() {
        let mut config = Config::default();
        config.server.host = "127.0.0.1".to_string();
        config.server.port = 9090;
        assert_eq!(config.bind_addr(), "127.0.0.1:9090");
    }

    #[test]
    fn should_split_bind_override_into_host_and_port() {
        let config = overridden(&[("GARDENHUB_BIND", "127.0.0.1:7000")]).unwrap();
        assert_eq!(config.bind_addr(), "127.0.0.1:7000");
    }

    #[test]
    fn should_prefer_rust_log_over_gardenhub_log() {
        let config = overridden(&[("GARDENHUB_LOG", "warn"), ("RUST_LOG", "trace")]).unwrap();
        assert_eq!(config.logging.filter, "trace");
    }

    #[test]
    fn should_select_mqtt_transport_from_env() {
        let config = overridden(&[
            ("GARDENHUB_TRANSPORT", "MQTT"),
            ("GARDENHUB_MQTT_HOST", "10.0.0.5"),
            ("GARDENHUB_MQTT_PORT", "1884"),
        ])
        .unwrap();
        assert_eq!(config.messaging.transport, TransportKind::Mqtt);
        assert_eq!(config.messaging.mqtt.broker_host, "10.0.0.5");
        assert_eq!(config.messaging.mqtt.broker_port, 1884);
    }

    #[test]
    fn should_reject_unknown_transport_from_env() {
        let result = overridden(&[("GARDENHUB_TRANSPORT", "kafka")]);
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn should_ignore_unparsable_port_override() {
        let config = overridden(&[("GARDENHUB_PORT", "eighty")]).unwrap();
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn should_report_parse_error_for_invalid_toml() {
        let result: Result<Config, _> = toml::from_str("invalid {{{");
        assert!(result.is_err());
    }
}
