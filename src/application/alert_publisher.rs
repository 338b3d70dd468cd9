// Publisher trait for outbound alerts
use async_trait::async_trait;

#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("failed to serialize alert: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("endpoint rejected alert with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("alert channel closed")]
    ChannelClosed,
}

/// Transport that delivers an already-serialized alert to `topic`.
#[async_trait]
pub trait AlertPublisher: Send + Sync {
    async fn publish(&self, topic: &str, payload: &[u8]) -> Result<(), PublishError>;
}
