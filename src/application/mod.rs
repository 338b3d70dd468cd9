// Application layer - Event routing, alert dispatch and the publisher seam
pub mod alert_dispatcher;
pub mod alert_publisher;
pub mod monitor_service;
