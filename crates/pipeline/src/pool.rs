//! Bounded queue and fixed worker pool

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use beacon_protocol::Bytes;
use crossfire::{MAsyncRx, MAsyncTx, TrySendError};
use futures_util::FutureExt;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::{MessageHandler, PoolMetrics, PoolMetricsHandle};

/// One inbound transport message
#[derive(Debug, Clone)]
pub struct Message {
    pub topic: String,
    pub payload: Bytes,
}

/// Producer side of the ingestion queue
///
/// Clone one per producer. The queue closes once every clone is dropped.
#[derive(Clone)]
pub struct Submitter {
    tx: MAsyncTx<Message>,
    metrics: Arc<PoolMetrics>,
}

impl Submitter {
    /// Enqueue a message without waiting
    ///
    /// Returns `false` when the message was dropped because the queue is full
    /// or already closed.
    pub fn submit(&self, topic: impl Into<String>, payload: Bytes) -> bool {
        self.metrics.received.inc();
        // Counted before the send so a fast worker never sees depth below zero
        self.metrics.queue_depth.inc();

        let message = Message {
            topic: topic.into(),
            payload,
        };
        match self.tx.try_send(message) {
            Ok(()) => {
                self.metrics.enqueued.inc();
                true
            }
            Err(TrySendError::Full(message)) => {
                self.metrics.queue_depth.dec();
                self.metrics.dropped.inc();
                debug!(topic = %message.topic, "ingestion queue full, message dropped");
                false
            }
            Err(TrySendError::Disconnected(message)) => {
                self.metrics.queue_depth.dec();
                self.metrics.dropped.inc();
                debug!(topic = %message.topic, "ingestion queue closed, message dropped");
                false
            }
        }
    }
}

/// Fixed set of workers draining the ingestion queue
pub struct WorkerPool {
    workers: Vec<JoinHandle<()>>,
    metrics: Arc<PoolMetrics>,
}

impl WorkerPool {
    /// Create the queue and spawn `count` workers on it
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(
        count: usize,
        queue_size: usize,
        handler: Arc<dyn MessageHandler>,
        metrics: Arc<PoolMetrics>,
    ) -> (Self, Submitter) {
        let count = count.max(1);
        let (tx, rx) = crossfire::mpmc::bounded_async::<Message>(queue_size.max(1));

        let workers = (0..count)
            .map(|id| {
                tokio::spawn(run_worker(
                    id,
                    rx.clone(),
                    Arc::clone(&handler),
                    Arc::clone(&metrics),
                ))
            })
            .collect();

        info!(workers = count, queue_size, "worker pool started");

        let submitter = Submitter {
            tx,
            metrics: Arc::clone(&metrics),
        };
        (Self { workers, metrics }, submitter)
    }

    /// Messages waiting in the queue
    pub fn queue_len(&self) -> usize {
        self.metrics.queue_depth.get().max(0) as usize
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    pub fn metrics_handle(&self, id: impl Into<String>) -> PoolMetricsHandle {
        self.metrics.handle(id)
    }

    /// Wait for every worker to finish
    ///
    /// Workers finish once all submitters are dropped and the queue is empty.
    pub async fn join(self) {
        for (id, worker) in self.workers.into_iter().enumerate() {
            if let Err(e) = worker.await {
                warn!(worker = id, error = %e, "worker task failed");
            }
        }
        info!(
            processed = self.metrics.processed.get(),
            errors = self.metrics.errors.get(),
            dropped = self.metrics.dropped.get(),
            "worker pool stopped"
        );
    }
}

async fn run_worker(
    id: usize,
    rx: MAsyncRx<Message>,
    handler: Arc<dyn MessageHandler>,
    metrics: Arc<PoolMetrics>,
) {
    debug!(worker = id, "worker started");

    while let Ok(message) = rx.recv().await {
        metrics.queue_depth.dec();
        let start = Instant::now();

        // A panicking message is counted as an error; the worker keeps going
        let outcome = AssertUnwindSafe(handler.handle(&message.topic, &message.payload))
            .catch_unwind()
            .await;

        match outcome {
            Ok(Ok(kind)) => metrics.record_processed(kind, start.elapsed()),
            Ok(Err(e)) => {
                metrics.record_error(start.elapsed());
                warn!(worker = id, topic = %message.topic, error = %e, "failed to process message");
            }
            Err(_) => {
                metrics.record_error(start.elapsed());
                error!(worker = id, topic = %message.topic, "message handler panicked");
            }
        }
    }

    debug!(worker = id, "worker stopped");
}

#[cfg(test)]
#[path = "pool_test.rs"]
mod pool_test;
