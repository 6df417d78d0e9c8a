//! Environment variable overrides
//!
//! Container deployments configure connection endpoints through the
//! environment; these values win over the TOML file.

use crate::Config;
use crate::error::{ConfigError, Result};

pub(crate) fn apply<F>(config: &mut Config, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

    if let Some(v) = get("MQTT_BROKER") {
        config.mqtt.broker = v;
    }
    if let Some(v) = get("CLICKHOUSE_URL") {
        config.clickhouse.url = v;
    }
    if let Some(v) = get("CLICKHOUSE_DATABASE") {
        config.clickhouse.database = v;
    }
    if let Some(v) = get("CLICKHOUSE_USER") {
        config.clickhouse.username = v;
    }
    if let Some(v) = get("CLICKHOUSE_PASSWORD") {
        config.clickhouse.password = Some(v);
    }
    if let Some(v) = get("REDIS_URL") {
        config.cache.url = v;
    }
    if let Some(v) = get("OSRM_URL") {
        config.routing.osrm_url = v;
    }
    if let Some(v) = get("METRICS_PORT") {
        config.ops.port = v
            .parse()
            .map_err(|_| ConfigError::invalid_env("METRICS_PORT", format!("'{v}' is not a port")))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::{Config, ConfigError};
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config
            .apply_env_with(lookup(&[
                ("MQTT_BROKER", "tcp://mosquitto:1883"),
                ("CLICKHOUSE_URL", "http://clickhouse:8123"),
                ("CLICKHOUSE_PASSWORD", "pw"),
                ("REDIS_URL", "redis://valkey:6379/1"),
                ("OSRM_URL", "http://osrm:5000"),
                ("METRICS_PORT", "9200"),
            ]))
            .unwrap();

        assert_eq!(config.mqtt.broker, "tcp://mosquitto:1883");
        assert_eq!(config.clickhouse.url, "http://clickhouse:8123");
        assert_eq!(config.clickhouse.password.as_deref(), Some("pw"));
        assert_eq!(config.cache.url, "redis://valkey:6379/1");
        assert_eq!(config.routing.osrm_url, "http://osrm:5000");
        assert_eq!(config.ops.port, 9200);
    }

    #[test]
    fn test_empty_env_values_are_ignored() {
        let mut config = Config::default();
        config
            .apply_env_with(lookup(&[("CLICKHOUSE_DATABASE", "")]))
            .unwrap();
        assert_eq!(config.clickhouse.database, "beacon");
    }

    #[test]
    fn test_invalid_port_env() {
        let mut config = Config::default();
        let result = config.apply_env_with(lookup(&[("METRICS_PORT", "ninety")]));
        assert!(matches!(result, Err(ConfigError::InvalidEnv { .. })));
    }

    #[test]
    fn test_env_result_is_validated() {
        let mut config = Config::default();
        let result = config.apply_env_with(lookup(&[("MQTT_BROKER", "ws://broker")]));
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }
}
