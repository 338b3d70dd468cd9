// Alert dispatcher - Serializes alerts and hands them to the publisher
use crate::application::alert_publisher::{AlertPublisher, PublishError};
use crate::domain::alert::{Alert, AlertLevel};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishOutcome {
    Sent,
    Failed,
}

/// Producer side of the alert queue. Never waits: if the dispatcher is
/// behind, the alert is dropped.
#[derive(Debug, Clone)]
pub struct AlertSender {
    tx: mpsc::Sender<Alert>,
}

impl AlertSender {
    pub fn send(&self, alert: Alert) -> bool {
        match self.tx.try_send(alert) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(alert)) => {
                tracing::warn!(level = %alert.level, "Alert queue full, dropping: {}", alert.message);
                false
            }
            Err(mpsc::error::TrySendError::Closed(alert)) => {
                tracing::error!(level = %alert.level, "Alert dispatcher stopped, dropping: {}", alert.message);
                false
            }
        }
    }
}

pub fn alert_queue(capacity: usize) -> (AlertSender, mpsc::Receiver<Alert>) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (AlertSender { tx }, rx)
}

#[derive(Clone)]
pub struct AlertDispatcher {
    publisher: Arc<dyn AlertPublisher>,
    topic: String,
}

impl AlertDispatcher {
    pub fn new(publisher: Arc<dyn AlertPublisher>, topic: String) -> Self {
        Self { publisher, topic }
    }

    /// Publish one alert. Failures are logged and the alert is dropped.
    pub async fn publish(&self, alert: &Alert) -> PublishOutcome {
        let result = match serde_json::to_vec(alert) {
            Ok(payload) => self.publisher.publish(&self.topic, &payload).await,
            Err(e) => Err(PublishError::from(e)),
        };

        match result {
            Ok(()) => {
                match alert.level {
                    AlertLevel::Critical => {
                        tracing::error!(topic = %self.topic, "ALERT PUBLISHED: {} - {}", alert.level, alert.message)
                    }
                    AlertLevel::Warning => {
                        tracing::warn!(topic = %self.topic, "ALERT PUBLISHED: {} - {}", alert.level, alert.message)
                    }
                    AlertLevel::Recovery => {
                        tracing::info!(topic = %self.topic, "ALERT PUBLISHED: {} - {}", alert.level, alert.message)
                    }
                }
                PublishOutcome::Sent
            }
            Err(e) => {
                tracing::error!(
                    topic = %self.topic,
                    level = %alert.level,
                    "Failed to publish alert: {}",
                    e
                );
                PublishOutcome::Failed
            }
        }
    }

    /// Drain the queue until every sender is gone.
    pub fn spawn(self, mut rx: mpsc::Receiver<Alert>) -> JoinHandle<()> {
        tokio::spawn(async move {
            while let Some(alert) = rx.recv().await {
                self.publish(&alert).await;
            }
            tracing::debug!(topic = %self.topic, "Alert dispatcher stopped");
        })
    }
}
