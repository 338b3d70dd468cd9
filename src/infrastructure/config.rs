use crate::application::monitor_service::MonitorConfig;
use crate::domain::reboot_storm::StormPolicy;
use crate::domain::telemetry::{Location, DEFAULT_LAT, DEFAULT_LON};
use crate::domain::temperature_alert::{
    TemperatureThresholds, CRITICAL_THRESHOLD, RECOVERY_THRESHOLD, WARNING_THRESHOLD,
};
use anyhow::{ensure, Context};
use serde::Deserialize;
use std::time::Duration;

const DEFAULT_CONFIG_PATH: &str = "config/coldchain";
const ENV_PREFIX: &str = "COLDCHAIN";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Settings {
    #[serde(default)]
    pub unit: UnitSettings,
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub thresholds: ThresholdSettings,
    #[serde(default)]
    pub storm: StormSettings,
    #[serde(default)]
    pub location: LocationSettings,
    #[serde(default)]
    pub publisher: PublisherSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct UnitSettings {
    #[serde(default = "default_unit_id")]
    pub id: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    #[serde(default = "default_bind")]
    pub bind: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ThresholdSettings {
    #[serde(default = "default_warning")]
    pub warning: f64,
    #[serde(default = "default_critical")]
    pub critical: f64,
    #[serde(default = "default_recovery")]
    pub recovery: f64,
    #[serde(default = "default_window_size")]
    pub window_size: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StormSettings {
    #[serde(default = "default_storm_window_secs")]
    pub window_secs: u64,
    #[serde(default = "default_failure_threshold")]
    pub failure_threshold: u32,
    #[serde(default = "default_tick_secs")]
    pub tick_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LocationSettings {
    #[serde(default = "default_lat")]
    pub default_lat: f64,
    #[serde(default = "default_lon")]
    pub default_lon: f64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PublisherSettings {
    /// Defaults to `coldchain/<unit id>/alert`.
    pub topic: Option<String>,
    pub webhook_url: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

fn default_unit_id() -> String {
    "truck_001".to_string()
}
fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}
fn default_warning() -> f64 {
    WARNING_THRESHOLD
}
fn default_critical() -> f64 {
    CRITICAL_THRESHOLD
}
fn default_recovery() -> f64 {
    RECOVERY_THRESHOLD
}
fn default_window_size() -> usize {
    10
}
fn default_storm_window_secs() -> u64 {
    60
}
fn default_failure_threshold() -> u32 {
    2
}
fn default_tick_secs() -> u64 {
    1
}
fn default_lat() -> f64 {
    DEFAULT_LAT
}
fn default_lon() -> f64 {
    DEFAULT_LON
}
fn default_timeout_secs() -> u64 {
    5
}
fn default_queue_capacity() -> usize {
    64
}

impl Default for UnitSettings {
    fn default() -> Self {
        Self { id: default_unit_id() }
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self { bind: default_bind() }
    }
}

impl Default for ThresholdSettings {
    fn default() -> Self {
        Self {
            warning: default_warning(),
            critical: default_critical(),
            recovery: default_recovery(),
            window_size: default_window_size(),
        }
    }
}

impl Default for StormSettings {
    fn default() -> Self {
        Self {
            window_secs: default_storm_window_secs(),
            failure_threshold: default_failure_threshold(),
            tick_secs: default_tick_secs(),
        }
    }
}

impl Default for LocationSettings {
    fn default() -> Self {
        Self {
            default_lat: default_lat(),
            default_lon: default_lon(),
        }
    }
}

impl Default for PublisherSettings {
    fn default() -> Self {
        Self {
            topic: None,
            webhook_url: None,
            timeout_secs: default_timeout_secs(),
            queue_capacity: default_queue_capacity(),
        }
    }
}

impl Settings {
    pub fn validate(&self) -> anyhow::Result<()> {
        let t = &self.thresholds;
        ensure!(
            t.recovery < t.warning,
            "thresholds.recovery ({}) must be below thresholds.warning ({})",
            t.recovery,
            t.warning
        );
        ensure!(t.window_size > 0, "thresholds.window_size must be at least 1");

        let s = &self.storm;
        ensure!(s.window_secs > 0, "storm.window_secs must be at least 1");
        ensure!(s.tick_secs > 0, "storm.tick_secs must be at least 1");
        ensure!(
            s.tick_secs <= s.window_secs,
            "storm.tick_secs ({}) must not exceed storm.window_secs ({})",
            s.tick_secs,
            s.window_secs
        );

        ensure!(!self.unit.id.is_empty(), "unit.id must not be empty");
        Ok(())
    }

    pub fn alert_topic(&self) -> String {
        self.publisher
            .topic
            .clone()
            .unwrap_or_else(|| format!("coldchain/{}/alert", self.unit.id))
    }

    pub fn monitor_config(&self) -> MonitorConfig {
        MonitorConfig {
            unit_id: self.unit.id.clone(),
            window_size: self.thresholds.window_size,
            thresholds: TemperatureThresholds {
                warning: self.thresholds.warning,
                critical: self.thresholds.critical,
                recovery: self.thresholds.recovery,
            },
            storm: StormPolicy {
                window_secs: self.storm.window_secs,
                failure_threshold: self.storm.failure_threshold,
            },
            tick_interval: Duration::from_secs(self.storm.tick_secs),
            default_location: Location::new(self.location.default_lat, self.location.default_lon),
            ..MonitorConfig::default()
        }
    }
}

/// Load settings from `config/coldchain.toml` (or `$COLDCHAIN_CONFIG`), then
/// apply `COLDCHAIN__SECTION__KEY` environment overrides.
pub fn load_settings() -> anyhow::Result<Settings> {
    let path = std::env::var("COLDCHAIN_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

    let settings = config::Config::builder()
        .add_source(config::File::with_name(&path).required(false))
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .with_context(|| format!("Failed to read configuration from {}", path))?;

    let settings: Settings = settings
        .try_deserialize()
        .context("Invalid configuration")?;
    settings.validate()?;
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_toml(toml: &str) -> Settings {
        config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let settings = from_toml("");
        settings.validate().unwrap();

        let monitor = settings.monitor_config();
        assert_eq!(monitor.unit_id, "truck_001");
        assert_eq!(monitor.window_size, 10);
        assert_eq!(monitor.thresholds, TemperatureThresholds::default());
        assert_eq!(monitor.storm, StormPolicy::default());
        assert_eq!(monitor.tick_interval, Duration::from_secs(1));
        assert_eq!(settings.alert_topic(), "coldchain/truck_001/alert");
        assert_eq!(settings.server.bind, "0.0.0.0:8080");
    }

    #[test]
    fn test_partial_override() {
        let settings = from_toml(
            r#"
            [unit]
            id = "reefer_7"

            [thresholds]
            warning = 5.0

            [storm]
            failure_threshold = 4

            [publisher]
            webhook_url = "http://alerts.local/hook"
            "#,
        );
        settings.validate().unwrap();

        assert_eq!(settings.thresholds.warning, 5.0);
        assert_eq!(settings.thresholds.critical, 5.5);
        assert_eq!(settings.storm.failure_threshold, 4);
        assert_eq!(settings.storm.window_secs, 60);
        assert_eq!(settings.alert_topic(), "coldchain/reefer_7/alert");
        assert_eq!(settings.publisher.webhook_url.as_deref(), Some("http://alerts.local/hook"));
    }

    #[test]
    fn test_validation_rejects_inverted_hysteresis() {
        let settings = from_toml("[thresholds]\nrecovery = 4.5\n");
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_slow_tick() {
        let settings = from_toml("[storm]\nwindow_secs = 10\ntick_secs = 30\n");
        let err = settings.validate().unwrap_err();
        assert!(err.to_string().contains("tick_secs"));
    }

    #[test]
    fn test_validation_rejects_empty_window() {
        let settings = from_toml("[thresholds]\nwindow_size = 0\n");
        assert!(settings.validate().is_err());
    }
}
