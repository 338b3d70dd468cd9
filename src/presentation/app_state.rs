// Application state for HTTP handlers
use crate::application::monitor_service::MonitorHandle;
use crate::infrastructure::broadcast_publisher::BroadcastPublisher;
use tokio::sync::watch;

#[derive(Clone)]
pub struct AppState {
    pub monitor: MonitorHandle,
    pub alert_feed: BroadcastPublisher,
    /// Flips to true when the server begins shutting down.
    pub shutdown: watch::Receiver<bool>,
}
