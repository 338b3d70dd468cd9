// Domain layer - Alert state machines and the events they consume
pub mod alert;
pub mod error;
pub mod reboot_storm;
pub mod rolling_window;
pub mod telemetry;
pub mod temperature_alert;
