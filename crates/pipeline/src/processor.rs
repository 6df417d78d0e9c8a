//! Per-message processing
//!
//! Classifies the topic, then either closes out an incident (deletion) or
//! decodes, transforms and stores it (situation).

use std::sync::Arc;

use async_trait::async_trait;
use beacon_cache::{KvStore, LocationCache};
use beacon_protocol::{DeletionEvent, Event, MessageKind, ProtocolError, TopicInfo, classify};
use beacon_sinks::IncidentWriter;
use beacon_transform::{RecordTransformer, Transformed};
use tracing::{debug, warn};

use crate::Result;

/// Handles one message pulled from the queue
#[async_trait]
pub trait MessageHandler: Send + Sync {
    /// Returns the kind of message handled
    async fn handle(&self, topic: &str, payload: &[u8]) -> Result<MessageKind>;
}

/// Routes messages to the cache and the durable writer
///
/// The cache and the writer are updated independently; a cache failure is
/// logged and does not keep the incident out of the durable history.
pub struct MessageProcessor<K> {
    transformer: RecordTransformer,
    cache: Arc<LocationCache<K>>,
    writer: Arc<IncidentWriter>,
}

impl<K: KvStore> MessageProcessor<K> {
    pub fn new(
        transformer: RecordTransformer,
        cache: Arc<LocationCache<K>>,
        writer: Arc<IncidentWriter>,
    ) -> Self {
        Self {
            transformer,
            cache,
            writer,
        }
    }

    /// Process one message
    ///
    /// # Errors
    ///
    /// Returns error for undecodable payloads and for a failed end-timestamp
    /// update. Nothing is retried.
    pub async fn process(&self, topic: &str, payload: &[u8]) -> Result<MessageKind> {
        let info = classify(topic);
        match info.kind() {
            MessageKind::Deletion => self.process_deletion(payload).await?,
            MessageKind::Situation => self.process_situation(&info, payload).await?,
        }
        Ok(info.kind())
    }

    async fn process_situation(&self, info: &TopicInfo<'_>, payload: &[u8]) -> Result<()> {
        let raw_json = std::str::from_utf8(payload).map_err(|_| ProtocolError::InvalidUtf8)?;
        let event = Event::from_slice(payload)?;

        let Transformed { incident, location } =
            self.transformer.transform(&event, info, raw_json).await;

        if let Some(location) = &location
            && let Err(e) = self.cache.store(location, incident.end_timestamp).await
        {
            warn!(id = %incident.id, error = %e, "failed to cache location");
        }

        self.writer.insert(&incident).await;
        debug!(id = %incident.id, event_type = info.event_type, "situation processed");
        Ok(())
    }

    async fn process_deletion(&self, payload: &[u8]) -> Result<()> {
        let deletion = DeletionEvent::from_slice(payload)?;

        if let Err(e) = self.cache.remove(&deletion.id).await {
            warn!(id = %deletion.id, error = %e, "failed to remove cached location");
        }

        self.writer
            .set_end_timestamp(&deletion.id, deletion.deleted_at)
            .await?;

        debug!(id = %deletion.id, deleted_at = %deletion.deleted_at, "incident closed");
        Ok(())
    }
}

#[async_trait]
impl<K: KvStore> MessageHandler for MessageProcessor<K> {
    async fn handle(&self, topic: &str, payload: &[u8]) -> Result<MessageKind> {
        self.process(topic, payload).await
    }
}

#[cfg(test)]
#[path = "processor_test.rs"]
mod processor_test;
