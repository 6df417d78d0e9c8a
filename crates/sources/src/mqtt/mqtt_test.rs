use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use beacon_config::MqttConfig;
use beacon_pipeline::{MessageHandler, PoolMetrics, WorkerPool};
use beacon_protocol::MessageKind;
use rumqttc::QoS;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::*;

const FEED_TOPIC: &str = "beacon/v1/es/madrid/situations/accident";

fn config(port: u16) -> MqttConfig {
    MqttConfig {
        broker: format!("tcp://127.0.0.1:{port}"),
        client_id: "beacon-test".into(),
        connect_timeout: Duration::from_millis(500),
        ..Default::default()
    }
}

/// Read one MQTT control packet: (first header byte, body)
async fn read_packet(stream: &mut TcpStream) -> Option<(u8, Vec<u8>)> {
    let header = stream.read_u8().await.ok()?;
    let mut len = 0usize;
    let mut shift = 0;
    loop {
        let byte = stream.read_u8().await.ok()?;
        len |= usize::from(byte & 0x7f) << shift;
        if byte & 0x80 == 0 {
            break;
        }
        shift += 7;
    }
    let mut body = vec![0; len];
    stream.read_exact(&mut body).await.ok()?;
    Some((header, body))
}

fn publish_packet(topic: &str, payload: &[u8]) -> Vec<u8> {
    let remaining = 2 + topic.len() + payload.len();
    assert!(remaining < 128);
    let mut packet = vec![0x30, remaining as u8];
    packet.extend_from_slice(&(topic.len() as u16).to_be_bytes());
    packet.extend_from_slice(topic.as_bytes());
    packet.extend_from_slice(payload);
    packet
}

/// Accepts one client, acknowledges it, publishes one message, then reports
/// every packet type it receives until the client goes away
async fn stub_broker() -> (u16, mpsc::UnboundedReceiver<u8>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let (seen_tx, seen_rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();

        let (connect, _) = read_packet(&mut stream).await.unwrap();
        seen_tx.send(connect >> 4).unwrap();
        stream.write_all(&[0x20, 0x02, 0x00, 0x00]).await.unwrap();

        let (subscribe, body) = read_packet(&mut stream).await.unwrap();
        seen_tx.send(subscribe >> 4).unwrap();
        stream
            .write_all(&[0x90, 0x03, body[0], body[1], 0x01])
            .await
            .unwrap();

        stream
            .write_all(&publish_packet(FEED_TOPIC, b"{\"id\":\"X1\"}"))
            .await
            .unwrap();

        while let Some((header, _)) = read_packet(&mut stream).await {
            let _ = seen_tx.send(header >> 4);
        }
    });

    (port, seen_rx)
}

struct Forwarded(mpsc::UnboundedSender<(String, Vec<u8>)>);

#[async_trait]
impl MessageHandler for Forwarded {
    async fn handle(&self, topic: &str, payload: &[u8]) -> beacon_pipeline::Result<MessageKind> {
        let _ = self.0.send((topic.to_string(), payload.to_vec()));
        Ok(MessageKind::Situation)
    }
}

#[test]
fn test_qos_mapping() {
    assert_eq!(to_qos(0), QoS::AtMostOnce);
    assert_eq!(to_qos(1), QoS::AtLeastOnce);
    assert_eq!(to_qos(2), QoS::ExactlyOnce);
}

#[test]
fn test_build_options() {
    let mut config = config(1884);
    config.keep_alive = Duration::from_secs(15);
    config.username = Some("reader".into());
    config.password = Some("secret".into());

    let options = build_options(&config).unwrap();
    assert_eq!(options.broker_address(), ("127.0.0.1".to_string(), 1884));
    assert_eq!(options.client_id(), "beacon-test");
    assert_eq!(options.keep_alive(), Duration::from_secs(15));
    assert!(options.clean_session());
}

#[test]
fn test_build_options_rejects_scheme() {
    let config = MqttConfig {
        broker: "ws://broker:80".into(),
        ..Default::default()
    };
    assert!(matches!(build_options(&config), Err(SourceError::Config(_))));
}

#[tokio::test]
async fn test_connect_refused_is_fatal() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let result = MqttSource::connect(&config(port), Arc::new(SourceMetrics::new())).await;
    assert!(matches!(result, Err(SourceError::Connection(_))));
}

#[tokio::test]
async fn test_connect_times_out_without_connack() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    // Accept and stay silent
    tokio::spawn(async move {
        let (_stream, _) = listener.accept().await.unwrap();
        tokio::time::sleep(Duration::from_secs(10)).await;
    });

    let mut config = config(port);
    config.connect_timeout = Duration::from_millis(200);

    let result = MqttSource::connect(&config, Arc::new(SourceMetrics::new())).await;
    assert!(matches!(result, Err(SourceError::ConnectTimeout { .. })));
}

#[tokio::test]
async fn test_forwards_publish_and_disconnects() {
    let (port, mut seen) = stub_broker().await;
    let metrics = Arc::new(SourceMetrics::new());
    let source = MqttSource::connect(&config(port), Arc::clone(&metrics))
        .await
        .unwrap();

    let (forward_tx, mut forwarded) = mpsc::unbounded_channel();
    let (pool, submitter) = WorkerPool::start(
        1,
        8,
        Arc::new(Forwarded(forward_tx)),
        Arc::new(PoolMetrics::new()),
    );

    let cancel = CancellationToken::new();
    let task = tokio::spawn(source.run(submitter, cancel.clone()));

    let (topic, payload) = tokio::time::timeout(Duration::from_secs(5), forwarded.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(topic, FEED_TOPIC);
    assert_eq!(payload, b"{\"id\":\"X1\"}");
    assert_eq!(metrics.messages_received.get(), 1);

    cancel.cancel();
    task.await.unwrap();

    // The source held the only submitter, so the pool drains and stops
    tokio::time::timeout(Duration::from_secs(5), pool.join())
        .await
        .unwrap();
    assert_eq!(metrics.connected.get(), 0);

    let mut packet_types = Vec::new();
    while let Ok(Some(kind)) =
        tokio::time::timeout(Duration::from_millis(500), seen.recv()).await
    {
        packet_types.push(kind);
    }
    // CONNECT, SUBSCRIBE, UNSUBSCRIBE, DISCONNECT
    assert_eq!(packet_types[..2], [1, 8]);
    assert!(packet_types.contains(&10));
    assert!(packet_types.contains(&14));
}
