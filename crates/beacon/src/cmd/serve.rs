//! Serve command - run the ingestion service
//!
//! Startup is fail-fast: ClickHouse, Redis and the MQTT broker must all be
//! reachable. Shutdown runs in dependency order, each step bounded by
//! `[global] shutdown_timeout`:
//!
//! ```text
//! MQTT source ─► worker pool ─► location cache ─► incident writer ─► reporter / ops
//! (unsubscribe)  (drain queue)   (final state)     (final flush)
//! ```

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use beacon_cache::{ActiveCounter, CacheMetrics, KvStore, LocationCache, MemoryKvStore, RedisStore};
use beacon_config::Config;
use beacon_metrics::{MetricsProvider, MetricsReporter};
use beacon_pipeline::{MessageProcessor, PoolMetrics, WorkerPool};
use beacon_routing::{OsrmRouteService, RouteMetrics, RouteProvider, StraightLineProvider};
use beacon_sinks::clickhouse::ClickHouseStore;
use beacon_sinks::memory::MemoryStore;
use beacon_sinks::{IncidentStore, IncidentWriter, WriterConfig, WriterMetrics};
use beacon_sources::{MqttSource, SourceMetrics};
use beacon_transform::RecordTransformer;
use clap::Args;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::cmd::ops::{self, OpsState};

/// Serve command arguments
#[derive(Args, Debug, Default)]
pub struct ServeArgs {
    /// Keep incidents and locations in memory instead of ClickHouse and Redis
    #[arg(long)]
    pub dry_run: bool,
}

/// Run the serve command
pub async fn run(config_path: Option<PathBuf>, args: ServeArgs) -> Result<()> {
    info!(
        version = env!("CARGO_PKG_VERSION"),
        config = %config_path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(default)".to_string()),
        dry_run = args.dry_run,
        "beacon starting"
    );

    let config = load_config(config_path)?;

    if let Err(e) = run_service(config, args.dry_run).await {
        error!(error = %e, "service error");
        return Err(e);
    }

    info!("beacon shutdown complete");
    Ok(())
}

/// Load the config file (explicit path, then default locations, then
/// defaults) and apply environment overrides
fn load_config(path: Option<PathBuf>) -> Result<Config> {
    let mut config = match path {
        Some(path) => {
            if !path.exists() {
                anyhow::bail!("config file not found: {}", path.display());
            }
            Config::from_file(&path).context("failed to load configuration")?
        }
        None => {
            let default_paths = [
                PathBuf::from("configs/config.toml"),
                PathBuf::from("config.toml"),
            ];
            match default_paths.iter().find(|p| p.exists()) {
                Some(path) => {
                    info!(config = %path.display(), "using config file");
                    Config::from_file(path).context("failed to load configuration")?
                }
                None => {
                    info!("no config file found, using defaults");
                    Config::default()
                }
            }
        }
    };

    config
        .apply_env()
        .context("invalid environment override")?;
    Ok(config)
}

async fn run_service(config: Config, dry_run: bool) -> Result<()> {
    // Fatal dependencies first
    let store = connect_store(&config, dry_run).await?;
    let kv = connect_cache(&config, dry_run).await?;

    let source_metrics = Arc::new(SourceMetrics::new());
    let source = MqttSource::connect(&config.mqtt, Arc::clone(&source_metrics))
        .await
        .with_context(|| format!("failed to connect to mqtt broker {}", config.mqtt.broker))?;

    let cache_metrics = Arc::new(CacheMetrics::new());
    let cache = Arc::new(LocationCache::new(
        kv,
        &config.cache,
        Arc::clone(&cache_metrics),
    ));

    let route_metrics = Arc::new(RouteMetrics::new());
    let routes: Arc<dyn RouteProvider> = if config.routing.enabled {
        Arc::new(
            OsrmRouteService::new(&config.routing, Arc::clone(&route_metrics))
                .context("invalid routing configuration")?,
        )
    } else {
        info!("route resolution disabled, segments use straight lines");
        Arc::new(StraightLineProvider)
    };

    let writer = Arc::new(IncidentWriter::new(
        store,
        WriterConfig::from(&config.clickhouse),
        Arc::new(WriterMetrics::new()),
    ));

    let processor = Arc::new(MessageProcessor::new(
        RecordTransformer::new(routes),
        Arc::clone(&cache),
        Arc::clone(&writer),
    ));
    let pool_metrics = Arc::new(PoolMetrics::new());
    let (pool, submitter) = WorkerPool::start(
        config.workers.count,
        config.workers.queue_size,
        processor,
        Arc::clone(&pool_metrics),
    );

    // Reporter and ops endpoints outlive the pipeline so final counts are seen
    let cancel = CancellationToken::new();
    let providers: Vec<Arc<dyn MetricsProvider>> = vec![
        Arc::new(source.metrics_handle("mqtt")),
        Arc::new(pool.metrics_handle("workers")),
        Arc::new(route_metrics.handle("osrm")),
        Arc::new(cache_metrics.handle("cache")),
        Arc::new(writer.metrics_handle("clickhouse")),
    ];
    let reporter = MetricsReporter::builder()
        .config(config.metrics.clone())
        .providers(providers.clone())
        .build();
    let metrics_task = tokio::spawn(reporter.run(cancel.clone()));

    let ops_task = if config.ops.enabled {
        let active: Arc<dyn ActiveCounter> = Arc::clone(&cache) as Arc<dyn ActiveCounter>;
        let state = Arc::new(OpsState::new(providers, active));
        Some(ops::spawn(&config.ops, state, cancel.clone()).await?)
    } else {
        None
    };

    let source_cancel = CancellationToken::new();
    let source_task = tokio::spawn(source.run(submitter, source_cancel.clone()));

    info!(
        workers = pool.worker_count(),
        queue_size = config.workers.queue_size,
        batch_size = config.clickhouse.batch_size,
        topic = %config.mqtt.topic,
        ops_enabled = config.ops.enabled,
        "beacon running"
    );

    wait_for_shutdown().await;
    info!("shutdown signal received, stopping...");

    let timeout = config.global.shutdown_timeout;

    source_cancel.cancel();
    bounded("mqtt source", timeout, async {
        if let Err(e) = source_task.await {
            warn!(error = %e, "source task panicked during shutdown");
        }
    })
    .await;

    // The source dropped its submitter, so the queue is closed
    bounded("worker pool", timeout, pool.join()).await;

    bounded("location cache", timeout, async {
        if let Err(e) = cache.close().await {
            warn!(error = %e, "failed to close location cache");
        }
    })
    .await;

    bounded("incident writer", timeout, async {
        if let Err(e) = writer.close().await {
            warn!(error = %e, "failed to close incident writer");
        }
    })
    .await;

    cancel.cancel();
    bounded("metrics reporter", timeout, async {
        let _ = metrics_task.await;
    })
    .await;
    if let Some(task) = ops_task {
        bounded("ops server", timeout, async {
            let _ = task.await;
        })
        .await;
    }

    Ok(())
}

async fn connect_store(config: &Config, dry_run: bool) -> Result<Arc<dyn IncidentStore>> {
    if dry_run {
        info!("dry run: incidents kept in memory");
        return Ok(Arc::new(MemoryStore::new()));
    }

    let store = ClickHouseStore::new(&config.clickhouse);
    store
        .ping()
        .await
        .with_context(|| format!("clickhouse unreachable at {}", config.clickhouse.url))?;
    info!(
        url = %config.clickhouse.url,
        database = %config.clickhouse.database,
        table = %store.table(),
        "connected to clickhouse"
    );
    Ok(Arc::new(store))
}

async fn connect_cache(config: &Config, dry_run: bool) -> Result<Arc<dyn KvStore>> {
    if dry_run {
        info!("dry run: locations kept in memory");
        return Ok(Arc::new(MemoryKvStore::new()));
    }

    let redis = RedisStore::connect(&config.cache.url)
        .await
        .context("redis unreachable")?;
    redis.ping().await.context("redis ping failed")?;
    Ok(Arc::new(redis))
}

/// Await a shutdown step, giving up after `timeout`
async fn bounded(step: &str, timeout: std::time::Duration, fut: impl Future<Output = ()>) {
    info!(step, "shutting down");
    if tokio::time::timeout(timeout, fut).await.is_err() {
        warn!(step, ?timeout, "shutdown step did not finish within timeout, continuing");
    }
}

/// Wait for SIGINT or SIGTERM
async fn wait_for_shutdown() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
