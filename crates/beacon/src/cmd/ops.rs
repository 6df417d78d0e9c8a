//! Operations HTTP endpoints
//!
//! Health, component metrics and the active incident count for dashboards.

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use axum::http::StatusCode;
use axum::{Json, Router, extract::State, routing::get};
use beacon_cache::ActiveCounter;
use beacon_config::OpsConfig;
use beacon_metrics::{ComponentSnapshot, MetricsProvider};
use serde::Serialize;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Shared state behind the ops routes
pub struct OpsState {
    start_time: Instant,
    providers: Vec<Arc<dyn MetricsProvider>>,
    active: Arc<dyn ActiveCounter>,
}

impl OpsState {
    pub fn new(providers: Vec<Arc<dyn MetricsProvider>>, active: Arc<dyn ActiveCounter>) -> Self {
        Self {
            start_time: Instant::now(),
            providers,
            active,
        }
    }

    fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    uptime_secs: u64,
}

#[derive(Debug, Serialize)]
struct MetricsResponse {
    uptime_secs: u64,
    components: Vec<ComponentSnapshot>,
}

#[derive(Debug, Serialize)]
struct ActiveCountResponse {
    count: usize,
}

type ErrorResponse = (StatusCode, Json<serde_json::Value>);

/// Operations routes (health, metrics, active count)
pub fn routes(state: Arc<OpsState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .route("/incidents/active/count", get(active_count_handler))
        .with_state(state)
}

/// Bind the ops listener and serve until `cancel` fires
///
/// # Errors
///
/// Returns error if the address cannot be bound.
pub async fn spawn(
    config: &OpsConfig,
    state: Arc<OpsState>,
    cancel: CancellationToken,
) -> Result<JoinHandle<()>> {
    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind ops server to {address}"))?;
    info!(address = %address, "ops server listening");

    let app = routes(state);
    Ok(tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(cancel.cancelled_owned())
            .await
        {
            warn!(error = %e, "ops server stopped with error");
        }
    }))
}

/// GET /health
async fn health_handler(State(state): State<Arc<OpsState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        uptime_secs: state.uptime_secs(),
    })
}

/// GET /metrics
async fn metrics_handler(State(state): State<Arc<OpsState>>) -> Json<MetricsResponse> {
    Json(MetricsResponse {
        uptime_secs: state.uptime_secs(),
        components: state.providers.iter().map(|p| p.snapshot()).collect(),
    })
}

/// GET /incidents/active/count
///
/// Returns 503 if the cache cannot be read.
async fn active_count_handler(
    State(state): State<Arc<OpsState>>,
) -> Result<Json<ActiveCountResponse>, ErrorResponse> {
    match state.active.active_count().await {
        Ok(count) => Ok(Json(ActiveCountResponse { count })),
        Err(e) => {
            warn!(error = %e, "failed to count active incidents");
            Err((
                StatusCode::SERVICE_UNAVAILABLE,
                Json(serde_json::json!({
                    "error": "CACHE_UNAVAILABLE",
                    "message": e.to_string(),
                })),
            ))
        }
    }
}

#[cfg(test)]
#[path = "ops_test.rs"]
mod ops_test;
