//! Beacon - traffic incident ingestion
//!
//! # Usage
//!
//! ```bash
//! # Run the service (default)
//! beacon
//! beacon --config configs/config.toml
//!
//! # Process the feed without ClickHouse or Redis
//! beacon serve --dry-run
//! ```

mod cmd;

use anyhow::Result;
use beacon_config::{Config, LogConfig, LogFormat, LogOutput};
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Beacon - traffic incident ingestion
#[derive(Parser, Debug)]
#[command(name = "beacon")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Path to configuration file (error if specified but not found)
    #[arg(short, long, global = true, env = "BEACON_CONFIG")]
    config: Option<std::path::PathBuf>,

    /// Log level (trace, debug, info, warn, error). Overrides config file.
    #[arg(short, long, global = true)]
    log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the ingestion service
    Serve(cmd::serve::ServeArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let args = match cli.command {
        Some(Command::Serve(args)) => args,
        // No subcommand = run the service
        None => cmd::serve::ServeArgs::default(),
    };

    let log = load_log_config(cli.config.as_deref());
    let level = cli
        .log_level
        .unwrap_or_else(|| log.level.as_str().to_string());
    init_logging(&level, &log)?;

    cmd::serve::run(cli.config, args).await
}

/// Logging settings from the config file, defaults if it cannot be read yet
fn load_log_config(config_path: Option<&std::path::Path>) -> LogConfig {
    if let Some(path) = config_path
        && path.exists()
        && let Ok(config) = Config::from_file(path)
    {
        return config.log;
    }
    LogConfig::default()
}

/// Initialize the tracing subscriber for logging
fn init_logging(level: &str, log: &LogConfig) -> Result<()> {
    let filter = EnvFilter::try_new(log.filter_directive(level))
        .or_else(|_| EnvFilter::try_new(log.filter_directive("info")))
        .map_err(|e| anyhow::anyhow!("invalid log level: {}", e))?;

    let registry = tracing_subscriber::registry().with(filter);
    match (log.format, log.output) {
        (LogFormat::Console, LogOutput::Stdout) => registry
            .with(fmt::layer().with_target(true).with_thread_ids(false))
            .init(),
        (LogFormat::Console, LogOutput::Stderr) => registry
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_writer(std::io::stderr),
            )
            .init(),
        (LogFormat::Json, LogOutput::Stdout) => registry
            .with(fmt::layer().json().with_current_span(false))
            .init(),
        (LogFormat::Json, LogOutput::Stderr) => registry
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(false)
                    .with_writer(std::io::stderr),
            )
            .init(),
    }

    Ok(())
}
