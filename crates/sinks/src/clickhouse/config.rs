//! ClickHouse client construction

use beacon_config::ClickHouseConfig;
use clickhouse::Client;

/// Build a client from configuration
pub fn build_client(config: &ClickHouseConfig) -> Client {
    let mut client = Client::default()
        .with_url(&config.url)
        .with_database(&config.database)
        .with_user(&config.username)
        .with_option(
            "max_execution_time",
            config.max_execution_time.to_string(),
        );

    if let Some(ref password) = config.password {
        client = client.with_password(password);
    }

    client
}
