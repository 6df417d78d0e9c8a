use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use beacon_protocol::Incident;
use chrono::{DateTime, TimeZone, Utc};
use tokio::sync::{Notify, Semaphore};

use super::*;
use crate::InsertOutcome;
use crate::memory::MemoryStore;

/// Store that holds `insert_batch` open until released
struct GatedStore {
    inner: Arc<MemoryStore>,
    entered: Notify,
    release: Semaphore,
}

impl GatedStore {
    fn new(inner: Arc<MemoryStore>) -> Self {
        Self {
            inner,
            entered: Notify::new(),
            release: Semaphore::new(0),
        }
    }
}

#[async_trait]
impl IncidentStore for GatedStore {
    async fn insert_batch(&self, rows: &[IncidentRow]) -> Result<InsertOutcome> {
        self.entered.notify_one();
        self.release.acquire().await.unwrap().forget();
        self.inner.insert_batch(rows).await
    }

    async fn set_end_timestamp(&self, id: &str, end: DateTime<Utc>) -> Result<()> {
        self.inner.set_end_timestamp(id, end).await
    }

    async fn ping(&self) -> Result<()> {
        self.inner.ping().await
    }

    async fn close(&self) -> Result<()> {
        self.inner.close().await
    }
}

fn incident(id: &str) -> Incident {
    Incident::new(id, Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap())
}

fn writer(store: &Arc<MemoryStore>, batch_size: usize, flush_interval: Duration) -> IncidentWriter {
    IncidentWriter::new(
        Arc::clone(store) as Arc<dyn IncidentStore>,
        WriterConfig {
            batch_size,
            flush_interval,
        },
        Arc::new(WriterMetrics::new()),
    )
}

#[tokio::test]
async fn test_flush_on_batch_size() {
    let store = Arc::new(MemoryStore::new());
    let writer = writer(&store, 3, Duration::from_secs(3600));

    writer.insert(&incident("a")).await;
    writer.insert(&incident("b")).await;
    assert_eq!(writer.pending(), 2);
    assert!(store.rows().is_empty());

    writer.insert(&incident("c")).await;
    assert_eq!(writer.pending(), 0);
    assert_eq!(store.batch_count(), 1);

    let ids: Vec<_> = store.rows().into_iter().map(|r| r.id).collect();
    assert_eq!(ids, vec!["a", "b", "c"]);

    writer.close().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_flush_on_interval() {
    let store = Arc::new(MemoryStore::new());
    let writer = writer(&store, 100, Duration::from_secs(5));

    writer.insert(&incident("a")).await;
    assert_eq!(writer.pending(), 1);

    tokio::time::sleep(Duration::from_secs(6)).await;

    assert_eq!(writer.pending(), 0);
    assert_eq!(store.rows_for("a").len(), 1);

    writer.close().await.unwrap();
}

#[tokio::test]
async fn test_flush_empty_is_noop() {
    let store = Arc::new(MemoryStore::new());
    let writer = writer(&store, 10, Duration::from_secs(3600));

    writer.flush().await;
    writer.flush().await;

    assert_eq!(store.batch_count(), 0);
    writer.close().await.unwrap();
}

#[tokio::test]
async fn test_close_drains_buffer() {
    let store = Arc::new(MemoryStore::new());
    let writer = writer(&store, 100, Duration::from_secs(3600));

    for id in ["a", "b", "c", "d"] {
        writer.insert(&incident(id)).await;
    }
    writer.close().await.unwrap();

    assert_eq!(store.rows().len(), 4);
    assert!(store.is_closed());
}

#[tokio::test]
async fn test_send_failure_drops_batch() {
    let store = Arc::new(MemoryStore::new());
    let metrics = Arc::new(WriterMetrics::new());
    let writer = IncidentWriter::new(
        Arc::clone(&store) as Arc<dyn IncidentStore>,
        WriterConfig {
            batch_size: 2,
            flush_interval: Duration::from_secs(3600),
        },
        Arc::clone(&metrics),
    );

    store.fail_next_sends(1);
    writer.insert(&incident("a")).await;
    writer.insert(&incident("b")).await;

    // Dropped, not retried
    assert_eq!(writer.pending(), 0);
    assert!(store.rows().is_empty());
    assert_eq!(metrics.send_errors.get(), 1);
    assert_eq!(metrics.rows_dropped.get(), 2);

    writer.insert(&incident("c")).await;
    writer.insert(&incident("d")).await;
    assert_eq!(store.rows().len(), 2);
    assert_eq!(metrics.rows_inserted.get(), 2);

    writer.close().await.unwrap();
}

#[tokio::test]
async fn test_rejected_rows_counted() {
    let store = Arc::new(MemoryStore::new());
    let metrics = Arc::new(WriterMetrics::new());
    let writer = IncidentWriter::new(
        Arc::clone(&store) as Arc<dyn IncidentStore>,
        WriterConfig {
            batch_size: 3,
            flush_interval: Duration::from_secs(3600),
        },
        Arc::clone(&metrics),
    );

    store.reject_id("bad");
    writer.insert(&incident("a")).await;
    writer.insert(&incident("bad")).await;
    writer.insert(&incident("c")).await;

    assert_eq!(metrics.rows_inserted.get(), 2);
    assert_eq!(metrics.row_errors.get(), 1);
    assert_eq!(metrics.send_errors.get(), 0);
    assert!(store.rows_for("bad").is_empty());

    writer.close().await.unwrap();
}

#[tokio::test]
async fn test_end_timestamp_keeps_earliest() {
    let store = Arc::new(MemoryStore::new());
    let writer = writer(&store, 1, Duration::from_secs(3600));

    writer.insert(&incident("x")).await;
    assert_eq!(store.rows_for("x")[0].end_timestamp, crate::END_TIMESTAMP_UNSET);

    let first = Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap();
    let later = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
    let earlier = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();

    writer.set_end_timestamp("x", first).await.unwrap();
    assert_eq!(store.rows_for("x")[0].end_timestamp, first.timestamp_millis());

    writer.set_end_timestamp("x", later).await.unwrap();
    assert_eq!(store.rows_for("x")[0].end_timestamp, first.timestamp_millis());

    writer.set_end_timestamp("x", earlier).await.unwrap();
    assert_eq!(store.rows_for("x")[0].end_timestamp, earlier.timestamp_millis());

    // Unknown id is not an error
    writer.set_end_timestamp("missing", first).await.unwrap();

    writer.close().await.unwrap();
}

#[tokio::test]
async fn test_end_timestamp_applies_to_buffered_rows() {
    let store = Arc::new(MemoryStore::new());
    let writer = writer(&store, 100, Duration::from_secs(3600));

    writer.insert(&incident("x")).await;
    let at = Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap();
    writer.set_end_timestamp("x", at).await.unwrap();

    writer.flush().await;
    assert_eq!(store.rows_for("x")[0].end_timestamp, at.timestamp_millis());

    writer.close().await.unwrap();
}

#[tokio::test]
async fn test_end_timestamp_applies_to_batch_being_sent() {
    let memory = Arc::new(MemoryStore::new());
    let gated = Arc::new(GatedStore::new(Arc::clone(&memory)));
    let writer = Arc::new(IncidentWriter::new(
        Arc::clone(&gated) as Arc<dyn IncidentStore>,
        WriterConfig {
            batch_size: 1,
            flush_interval: Duration::from_secs(3600),
        },
        Arc::new(WriterMetrics::new()),
    ));

    let inserting = tokio::spawn({
        let writer = Arc::clone(&writer);
        async move { writer.insert(&incident("X1")).await }
    });
    gated.entered.notified().await;

    // Neither buffered nor stored yet
    assert_eq!(writer.pending(), 0);
    assert!(memory.rows_for("X1").is_empty());

    let at = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
    writer.set_end_timestamp("X1", at).await.unwrap();

    gated.release.add_permits(1);
    inserting.await.unwrap();

    let rows = memory.rows_for("X1");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].end_timestamp, at.timestamp_millis());

    writer.close().await.unwrap();
}

#[tokio::test]
async fn test_end_timestamp_error_counted() {
    let store = Arc::new(MemoryStore::new());
    let metrics = Arc::new(WriterMetrics::new());
    let writer = IncidentWriter::new(
        Arc::clone(&store) as Arc<dyn IncidentStore>,
        WriterConfig::default(),
        Arc::clone(&metrics),
    );

    writer.close().await.unwrap();
    let at = Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap();
    assert!(writer.set_end_timestamp("x", at).await.is_err());
    assert_eq!(metrics.end_update_errors.get(), 1);
}

#[tokio::test]
async fn test_metrics_handle_snapshot() {
    let store = Arc::new(MemoryStore::new());
    let writer = writer(&store, 2, Duration::from_secs(3600));

    writer.insert(&incident("a")).await;
    writer.insert(&incident("b")).await;

    let handle = writer.metrics_handle("clickhouse");
    let snapshot = beacon_metrics::MetricsProvider::snapshot(&handle);
    assert_eq!(snapshot.counter_value("rows_inserted"), 2);
    assert_eq!(snapshot.component_type, "incident_writer");

    writer.close().await.unwrap();
}

#[test]
fn test_writer_config_from_clickhouse() {
    let config = beacon_config::ClickHouseConfig {
        batch_size: 0,
        flush_interval: Duration::from_secs(2),
        ..Default::default()
    };
    let writer_config = WriterConfig::from(&config);
    assert_eq!(writer_config.batch_size, 1);
    assert_eq!(writer_config.flush_interval, Duration::from_secs(2));
}
