// Presentation layer - HTTP ingestion and alert feed
pub mod app_state;
pub mod handlers;
pub mod router;
