// HTTP webhook publisher
use crate::application::alert_publisher::{AlertPublisher, PublishError};
use anyhow::Context;
use async_trait::async_trait;
use std::time::Duration;

pub const TOPIC_HEADER: &str = "X-Alert-Topic";

#[derive(Debug, Clone)]
pub struct WebhookPublisher {
    client: reqwest::Client,
    url: String,
}

impl WebhookPublisher {
    pub fn new(url: String, timeout: Duration) -> anyhow::Result<Self> {
        reqwest::Url::parse(&url).with_context(|| format!("Invalid webhook URL: {}", url))?;

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self { client, url })
    }
}

#[async_trait]
impl AlertPublisher for WebhookPublisher {
    async fn publish(&self, topic: &str, payload: &[u8]) -> Result<(), PublishError> {
        let response = self
            .client
            .post(&self.url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .header(TOPIC_HEADER, topic)
            .body(payload.to_vec())
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(PublishError::Rejected { status, body });
        }

        tracing::debug!(url = %self.url, topic, "Webhook accepted alert");
        Ok(())
    }
}
