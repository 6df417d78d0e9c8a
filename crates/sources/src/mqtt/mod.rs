//! MQTT source
//!
//! Connects with a clean session, subscribes to the feed topic and forwards
//! every PUBLISH to the ingestion queue. The rumqttc event loop reconnects on
//! its own; the subscription is renewed on every CONNACK after the first.
//!
//! Forwarding never waits on the workers: a full queue drops the message.

use std::sync::Arc;
use std::time::Duration;

use beacon_config::MqttConfig;
use beacon_pipeline::Submitter;
use rumqttc::{
    AsyncClient, ConnectionError, Event, EventLoop, MqttOptions, Outgoing, Packet, QoS,
    SubscribeReasonCode,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::{Result, SourceError, SourceMetrics, SourceMetricsHandle};

/// Pause between reconnect attempts
const RECONNECT_DELAY: Duration = Duration::from_secs(2);

/// Upper bound for flushing UNSUBSCRIBE/DISCONNECT on shutdown
const DISCONNECT_TIMEOUT: Duration = Duration::from_secs(2);

/// Connected MQTT subscriber
pub struct MqttSource {
    client: AsyncClient,
    eventloop: EventLoop,
    broker: String,
    topic: String,
    qos: QoS,
    metrics: Arc<SourceMetrics>,
}

impl MqttSource {
    /// Connect to the broker and queue the subscription
    ///
    /// # Errors
    ///
    /// Returns error if the broker address is invalid, the broker refuses the
    /// connection, or no CONNACK arrives within `connect_timeout`.
    pub async fn connect(config: &MqttConfig, metrics: Arc<SourceMetrics>) -> Result<Self> {
        let options = build_options(config)?;
        let (client, mut eventloop) = AsyncClient::new(options, config.channel_capacity.max(1));

        match tokio::time::timeout(config.connect_timeout, wait_for_connack(&mut eventloop)).await
        {
            Err(_) => {
                return Err(SourceError::ConnectTimeout {
                    broker: config.broker.clone(),
                    timeout: config.connect_timeout,
                });
            }
            Ok(Err(ConnectionError::ConnectionRefused(code))) => {
                return Err(SourceError::Refused {
                    broker: config.broker.clone(),
                    code: format!("{code:?}"),
                });
            }
            Ok(Err(e)) => return Err(e.into()),
            Ok(Ok(())) => {}
        }

        let qos = to_qos(config.qos);
        client.subscribe(&config.topic, qos).await?;
        metrics.connected.set(1);

        info!(
            broker = %config.broker,
            client_id = %config.client_id,
            topic = %config.topic,
            qos = config.qos,
            "connected to mqtt broker"
        );

        Ok(Self {
            client,
            eventloop,
            broker: config.broker.clone(),
            topic: config.topic.clone(),
            qos,
            metrics,
        })
    }

    pub fn metrics_handle(&self, id: impl Into<String>) -> SourceMetricsHandle {
        self.metrics.handle(id)
    }

    /// Forward messages until cancelled
    ///
    /// On cancellation the source unsubscribes, disconnects and drops
    /// `submitter`, which closes the queue once no other submitter is alive.
    pub async fn run(self, submitter: Submitter, cancel: CancellationToken) {
        let Self {
            client,
            mut eventloop,
            broker,
            topic,
            qos,
            metrics,
        } = self;

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                event = eventloop.poll() => match event {
                    Ok(Event::Incoming(Packet::Publish(publish))) => {
                        metrics.message_received(publish.payload.len());
                        if !submitter.submit(publish.topic, publish.payload) {
                            metrics.messages_dropped.inc();
                        }
                    }
                    Ok(Event::Incoming(Packet::ConnAck(_))) => {
                        metrics.reconnects.inc();
                        metrics.connected.set(1);
                        info!(broker = %broker, "reconnected to mqtt broker");
                        // Clean session: the broker forgot the subscription
                        if let Err(e) = client.try_subscribe(&topic, qos) {
                            warn!(topic = %topic, error = %e, "failed to renew subscription");
                        }
                    }
                    Ok(Event::Incoming(Packet::SubAck(ack))) => {
                        if ack
                            .return_codes
                            .iter()
                            .any(|code| matches!(code, SubscribeReasonCode::Failure))
                        {
                            error!(topic = %topic, "broker rejected subscription");
                        } else {
                            debug!(topic = %topic, "subscription acknowledged");
                        }
                    }
                    Ok(_) => {}
                    Err(e) => {
                        metrics.connection_errors.inc();
                        metrics.connected.set(0);
                        warn!(broker = %broker, error = %e, "mqtt connection lost, retrying");
                        tokio::select! {
                            _ = cancel.cancelled() => break,
                            _ = tokio::time::sleep(RECONNECT_DELAY) => {}
                        }
                    }
                },
            }
        }

        if metrics.connected.get() > 0 {
            disconnect(&client, &mut eventloop, &topic).await;
        }
        metrics.connected.set(0);
        drop(submitter);

        info!(
            broker = %broker,
            messages = metrics.messages_received.get(),
            dropped = metrics.messages_dropped.get(),
            "mqtt source stopped"
        );
    }
}

/// Map a configured QoS level; validation keeps it within 0..=2
pub(crate) fn to_qos(level: u8) -> QoS {
    match level {
        0 => QoS::AtMostOnce,
        2 => QoS::ExactlyOnce,
        _ => QoS::AtLeastOnce,
    }
}

pub(crate) fn build_options(config: &MqttConfig) -> Result<MqttOptions> {
    let (host, port) = config.host_port()?;

    let mut options = MqttOptions::new(&config.client_id, host, port);
    options.set_keep_alive(config.keep_alive);
    options.set_clean_session(true);
    if let Some(username) = &config.username {
        options.set_credentials(username, config.password.clone().unwrap_or_default());
    }
    Ok(options)
}

async fn wait_for_connack(eventloop: &mut EventLoop) -> std::result::Result<(), ConnectionError> {
    loop {
        if let Event::Incoming(Packet::ConnAck(_)) = eventloop.poll().await? {
            return Ok(());
        }
    }
}

/// Queue UNSUBSCRIBE and DISCONNECT, then drive the event loop until they
/// are written
async fn disconnect(client: &AsyncClient, eventloop: &mut EventLoop, topic: &str) {
    if let Err(e) = client.try_unsubscribe(topic) {
        debug!(error = %e, "failed to queue unsubscribe");
    }
    if let Err(e) = client.try_disconnect() {
        debug!(error = %e, "failed to queue disconnect");
        return;
    }

    let flush = async {
        loop {
            match eventloop.poll().await {
                Ok(Event::Outgoing(Outgoing::Disconnect)) | Err(_) => break,
                Ok(_) => {}
            }
        }
    };
    if tokio::time::timeout(DISCONNECT_TIMEOUT, flush).await.is_err() {
        debug!("timed out flushing mqtt disconnect");
    }
}

#[cfg(test)]
#[path = "mqtt_test.rs"]
mod mqtt_test;
