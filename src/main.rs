// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use anyhow::Context;
use std::{sync::Arc, time::Duration};
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

use crate::application::alert_dispatcher::{alert_queue, AlertDispatcher};
use crate::application::alert_publisher::AlertPublisher;
use crate::application::monitor_service::spawn_monitor;
use crate::infrastructure::broadcast_publisher::{BroadcastPublisher, FanoutPublisher};
use crate::infrastructure::config::load_settings;
use crate::infrastructure::webhook_publisher::WebhookPublisher;
use crate::presentation::app_state::AppState;
use crate::presentation::router::build_router;

const ALERT_FEED_CAPACITY: usize = 128;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,coldchain_alerts=debug")),
        )
        .init();

    // Load configuration
    let settings = load_settings()?;
    let topic = settings.alert_topic();

    // Outbound publishers: the local stream feed always, a webhook when configured
    let alert_feed = BroadcastPublisher::new(ALERT_FEED_CAPACITY);
    let publisher: Arc<dyn AlertPublisher> = match &settings.publisher.webhook_url {
        Some(url) => {
            let webhook = WebhookPublisher::new(
                url.clone(),
                Duration::from_secs(settings.publisher.timeout_secs),
            )?;
            tracing::info!(%url, "Publishing alerts to webhook");
            Arc::new(FanoutPublisher::new(vec![
                Arc::new(alert_feed.clone()),
                Arc::new(webhook),
            ]))
        }
        None => Arc::new(alert_feed.clone()),
    };

    // Alert pipeline (application layer)
    let (alerts, alert_rx) = alert_queue(settings.publisher.queue_capacity);
    let dispatcher = AlertDispatcher::new(publisher, topic.clone()).spawn(alert_rx);
    let (monitor, tasks) = spawn_monitor(settings.monitor_config(), alerts);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let state = Arc::new(AppState {
        monitor,
        alert_feed,
        shutdown: shutdown_rx,
    });
    let router = build_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&settings.server.bind)
        .await
        .with_context(|| format!("Failed to bind {}", settings.server.bind))?;
    tracing::info!(
        unit = %settings.unit.id,
        %topic,
        "Starting cold-chain alert service on {}",
        settings.server.bind
    );

    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            // Ends open alert streams so in-flight connections can close
            let _ = shutdown_tx.send(true);
        })
        .await?;

    // Router (and with it every MonitorHandle) is gone; let the workers drain
    tasks.telemetry.await?;
    tasks.commands.await?;
    dispatcher.await?;
    tracing::info!("Alert service stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown requested");
}
