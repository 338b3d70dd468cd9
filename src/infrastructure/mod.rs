// Infrastructure layer - External dependencies and adapters
pub mod alert_stream;
pub mod broadcast_publisher;
pub mod config;
pub mod event_codec;
pub mod webhook_publisher;
