// In-process publishers: broadcast feed for stream subscribers, and fan-out
use crate::application::alert_publisher::{AlertPublisher, PublishError};
use async_trait::async_trait;
use bytes::Bytes;
use std::sync::Arc;
use tokio::sync::broadcast;

/// Publishes alerts to every live `/alerts/stream` subscriber. Having no
/// subscribers is not a failure.
#[derive(Debug, Clone)]
pub struct BroadcastPublisher {
    tx: broadcast::Sender<Bytes>,
}

impl BroadcastPublisher {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Bytes> {
        self.tx.subscribe()
    }
}

#[async_trait]
impl AlertPublisher for BroadcastPublisher {
    async fn publish(&self, topic: &str, payload: &[u8]) -> Result<(), PublishError> {
        let receivers = self
            .tx
            .send(Bytes::copy_from_slice(payload))
            .unwrap_or(0);
        tracing::debug!(topic, receivers, "Alert broadcast to stream subscribers");
        Ok(())
    }
}

/// Publishes to every inner publisher; fails if any of them fails.
pub struct FanoutPublisher {
    publishers: Vec<Arc<dyn AlertPublisher>>,
}

impl FanoutPublisher {
    pub fn new(publishers: Vec<Arc<dyn AlertPublisher>>) -> Self {
        Self { publishers }
    }
}

#[async_trait]
impl AlertPublisher for FanoutPublisher {
    async fn publish(&self, topic: &str, payload: &[u8]) -> Result<(), PublishError> {
        let results =
            futures::future::join_all(self.publishers.iter().map(|p| p.publish(topic, payload))).await;
        results.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Closed;

    #[async_trait]
    impl AlertPublisher for Closed {
        async fn publish(&self, _topic: &str, _payload: &[u8]) -> Result<(), PublishError> {
            Err(PublishError::ChannelClosed)
        }
    }

    #[tokio::test]
    async fn test_broadcast_without_subscribers_succeeds() {
        let publisher = BroadcastPublisher::new(4);
        assert!(publisher.publish("t", b"{}").await.is_ok());
    }

    #[tokio::test]
    async fn test_broadcast_reaches_subscriber() {
        let publisher = BroadcastPublisher::new(4);
        let mut rx = publisher.subscribe();

        publisher.publish("t", b"{\"level\":\"RECOVERY\"}").await.unwrap();
        assert_eq!(rx.recv().await.unwrap(), Bytes::from_static(b"{\"level\":\"RECOVERY\"}"));
    }

    #[tokio::test]
    async fn test_fanout_delivers_to_all_and_reports_failure() {
        let feed = BroadcastPublisher::new(4);
        let mut rx = feed.subscribe();
        let fanout = FanoutPublisher::new(vec![Arc::new(feed.clone()), Arc::new(Closed)]);

        let result = fanout.publish("t", b"{}").await;
        assert!(matches!(result, Err(PublishError::ChannelClosed)));
        // The healthy publisher still got the alert
        assert_eq!(rx.recv().await.unwrap(), Bytes::from_static(b"{}"));
    }
}
