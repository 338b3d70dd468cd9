// Alert domain model
use super::telemetry::Location;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const FREEZER_FAILURE_CODE: &str = "CRITICAL_FREEZER_FAILURE";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AlertLevel {
    Warning,
    Critical,
    Recovery,
}

impl fmt::Display for AlertLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AlertLevel::Warning => "WARNING",
            AlertLevel::Critical => "CRITICAL",
            AlertLevel::Recovery => "RECOVERY",
        };
        f.write_str(s)
    }
}

/// An alert record as published downstream. Which optional fields are set
/// depends on the rule that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub level: AlertLevel,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_temp: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rolling_avg: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub truck_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub timestamp: i64,
}

impl Alert {
    /// Sustained failure: the rolling average crossed the critical threshold.
    pub fn cooling_failure(rolling_avg: f64, current_temp: f64, location: Location, timestamp: i64) -> Self {
        Self {
            level: AlertLevel::Critical,
            message: format!("A/C Failure Detected! Rolling Avg is {:.2}°C", rolling_avg),
            current_temp: Some(current_temp),
            rolling_avg: None,
            location: Some(location),
            truck_id: None,
            error: None,
            timestamp,
        }
    }

    /// Instantaneous spike above the warning threshold.
    pub fn high_temperature(current_temp: f64, rolling_avg: f64, location: Location, timestamp: i64) -> Self {
        Self {
            level: AlertLevel::Warning,
            message: format!("High Temperature Detected! Current Temp is {:.2}°C", current_temp),
            current_temp: None,
            rolling_avg: Some(format!("{:.2}°C", rolling_avg)),
            location: Some(location),
            truck_id: None,
            error: None,
            timestamp,
        }
    }

    pub fn recovered(current_temp: f64, rolling_avg: f64, timestamp: i64) -> Self {
        Self {
            level: AlertLevel::Recovery,
            message: format!("System Recovered. Temps are normal. Avg: {:.2}°C", rolling_avg),
            current_temp: Some(current_temp),
            rolling_avg: None,
            location: None,
            truck_id: None,
            error: None,
            timestamp,
        }
    }

    /// Too many corrective reboots inside one storm window.
    pub fn defective_unit(unit_id: &str, reboot_count: u32, window_secs: u64, timestamp: i64) -> Self {
        Self {
            level: AlertLevel::Critical,
            message: format!(
                "Freezer unit is defective. Operator attempted {} reboots within {}s. Immediate replacement required.",
                reboot_count, window_secs
            ),
            current_temp: None,
            rolling_avg: None,
            location: None,
            truck_id: Some(unit_id.to_string()),
            error: Some(FREEZER_FAILURE_CODE.to_string()),
            timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_warning_payload_shape() {
        let alert = Alert::high_temperature(6.0, 2.4, Location::new(1.5, 2.5), 100);
        let value = serde_json::to_value(&alert).unwrap();

        assert_eq!(
            value,
            json!({
                "level": "WARNING",
                "message": "High Temperature Detected! Current Temp is 6.00°C",
                "rolling_avg": "2.40°C",
                "location": {"lat": 1.5, "lon": 2.5},
                "timestamp": 100
            })
        );
    }

    #[test]
    fn test_recovery_payload_has_no_location() {
        let alert = Alert::recovered(3.0, 3.2, 7);
        let value = serde_json::to_value(&alert).unwrap();

        assert_eq!(value["level"], "RECOVERY");
        assert_eq!(value["current_temp"], 3.0);
        assert!(value.get("location").is_none());
        assert!(value.get("rolling_avg").is_none());
    }

    #[test]
    fn test_defective_unit_payload() {
        let alert = Alert::defective_unit("truck_001", 3, 60, 42);
        let value = serde_json::to_value(&alert).unwrap();

        assert_eq!(value["level"], "CRITICAL");
        assert_eq!(value["truck_id"], "truck_001");
        assert_eq!(value["error"], "CRITICAL_FREEZER_FAILURE");
        assert!(value["message"].as_str().unwrap().contains("3 reboots"));
    }
}
