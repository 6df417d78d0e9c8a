//! MQTT source configuration

use serde::Deserialize;
use std::time::Duration;

use crate::error::{ConfigError, Result};

/// MQTT broker connection and subscription
///
/// # Example
///
/// ```toml
/// [mqtt]
/// broker = "tcp://localhost:1883"
/// client_id = "beacon-ingester"
/// topic = "beacon/#"
/// qos = 1
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MqttConfig {
    /// Broker address, `tcp://host:port` or `host:port`
    /// Default: tcp://localhost:1883
    pub broker: String,

    /// Client identifier presented to the broker
    /// Default: beacon-ingester
    pub client_id: String,

    /// Subscription filter
    /// Default: beacon/#
    pub topic: String,

    /// Subscription QoS (0, 1 or 2)
    /// Default: 1
    pub qos: u8,

    /// Optional credentials
    pub username: Option<String>,
    pub password: Option<String>,

    /// MQTT keep-alive
    /// Default: 30s
    #[serde(with = "humantime_serde")]
    pub keep_alive: Duration,

    /// How long to wait for the broker's CONNACK at startup
    /// Default: 10s
    #[serde(with = "humantime_serde")]
    pub connect_timeout: Duration,

    /// Capacity of the client's outgoing request channel
    /// Default: 64
    pub channel_capacity: usize,
}

impl Default for MqttConfig {
    fn default() -> Self {
        Self {
            broker: "tcp://localhost:1883".into(),
            client_id: "beacon-ingester".into(),
            topic: "beacon/#".into(),
            qos: 1,
            username: None,
            password: None,
            keep_alive: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            channel_capacity: 64,
        }
    }
}

impl MqttConfig {
    /// Split the broker address into host and port
    ///
    /// Accepts an optional `tcp://` or `mqtt://` scheme. Port defaults to 1883.
    pub fn host_port(&self) -> Result<(String, u16)> {
        let addr = self
            .broker
            .strip_prefix("tcp://")
            .or_else(|| self.broker.strip_prefix("mqtt://"))
            .unwrap_or(&self.broker)
            .trim_end_matches('/');

        if addr.contains("://") {
            return Err(ConfigError::invalid_value(
                "mqtt",
                "broker",
                format!("unsupported scheme in '{}'", self.broker),
            ));
        }

        let (host, port) = match addr.rsplit_once(':') {
            Some((host, port)) => {
                let port = port.parse::<u16>().map_err(|_| {
                    ConfigError::invalid_value(
                        "mqtt",
                        "broker",
                        format!("invalid port in '{}'", self.broker),
                    )
                })?;
                (host, port)
            }
            None => (addr, 1883),
        };

        if host.is_empty() {
            return Err(ConfigError::invalid_value(
                "mqtt",
                "broker",
                format!("missing host in '{}'", self.broker),
            ));
        }

        Ok((host.to_string(), port))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_broker(broker: &str) -> MqttConfig {
        MqttConfig {
            broker: broker.into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_default_config() {
        let config = MqttConfig::default();
        assert_eq!(config.client_id, "beacon-ingester");
        assert_eq!(config.qos, 1);
        assert_eq!(config.host_port().unwrap(), ("localhost".to_string(), 1883));
    }

    #[test]
    fn test_host_port_variants() {
        assert_eq!(
            with_broker("tcp://broker:1884").host_port().unwrap(),
            ("broker".to_string(), 1884)
        );
        assert_eq!(
            with_broker("mqtt://broker").host_port().unwrap(),
            ("broker".to_string(), 1883)
        );
        assert_eq!(
            with_broker("10.0.0.5:2000").host_port().unwrap(),
            ("10.0.0.5".to_string(), 2000)
        );
    }

    #[test]
    fn test_host_port_rejects_garbage() {
        assert!(with_broker("tcp://broker:notaport").host_port().is_err());
        assert!(with_broker("ws://broker:80").host_port().is_err());
        assert!(with_broker("tcp://:1883").host_port().is_err());
    }
}
