// Wire representation of inbound events and conversion into domain events
use crate::domain::error::{MonitorError, Result};
use crate::domain::telemetry::{CommandEvent, Location, LocationSample, TelemetryReading};
use serde::Deserialize;

/// `{temp, door_open, timestamp}`; only `temp` is required to act on it.
#[derive(Debug, Deserialize)]
pub struct TelemetryMessage {
    pub temp: Option<f64>,
    /// Absent or null means closed.
    pub door_open: Option<bool>,
    pub timestamp: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct LocationMessage {
    pub location: Option<Location>,
    pub timestamp: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct CommandMessage {
    pub command: Option<String>,
    pub timestamp: Option<i64>,
}

/// Result of decoding a command: unknown commands are not an error, just
/// nothing this service acts on.
#[derive(Debug, PartialEq)]
pub enum DecodedCommand {
    Reboot(CommandEvent),
    Ignored(String),
}

fn malformed(kind: &'static str, reason: &str) -> MonitorError {
    MonitorError::MalformedEvent {
        kind,
        reason: reason.to_string(),
    }
}

impl TelemetryMessage {
    /// `received_at` stamps messages that carry no timestamp of their own.
    pub fn into_reading(self, received_at: i64) -> Result<TelemetryReading> {
        let temp = self.temp.ok_or_else(|| malformed("telemetry", "missing temp"))?;
        if !temp.is_finite() {
            return Err(malformed("telemetry", "temp is not a finite number"));
        }
        Ok(TelemetryReading::new(
            temp,
            self.door_open.unwrap_or(false),
            self.timestamp.unwrap_or(received_at),
        ))
    }
}

impl LocationMessage {
    pub fn into_sample(self, received_at: i64) -> Result<LocationSample> {
        let location = self
            .location
            .ok_or_else(|| malformed("location", "missing location"))?;
        Ok(LocationSample::new(location, self.timestamp.unwrap_or(received_at)))
    }
}

impl CommandMessage {
    pub fn into_command(self, received_at: i64) -> Result<DecodedCommand> {
        let command = self
            .command
            .ok_or_else(|| malformed("command", "missing command"))?;
        let timestamp = self.timestamp.unwrap_or(received_at);

        match command.as_str() {
            "reboot" => Ok(DecodedCommand::Reboot(CommandEvent::reboot(timestamp))),
            _ => Ok(DecodedCommand::Ignored(command)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn telemetry(json: &str) -> TelemetryMessage {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_telemetry_full_message() {
        let reading = telemetry(r#"{"temp": 3.21, "door_open": true, "timestamp": 1700000000}"#)
            .into_reading(0)
            .unwrap();
        assert_eq!(reading, TelemetryReading::new(3.21, true, 1_700_000_000));
    }

    #[test]
    fn test_telemetry_defaults() {
        let reading = telemetry(r#"{"temp": 2.0}"#).into_reading(99).unwrap();
        assert!(!reading.door_open);
        assert_eq!(reading.timestamp, 99);
    }

    #[test]
    fn test_telemetry_null_door_is_closed() {
        let reading = telemetry(r#"{"temp": 2.0, "door_open": null, "timestamp": 4}"#)
            .into_reading(0)
            .unwrap();
        assert_eq!(reading, TelemetryReading::new(2.0, false, 4));
    }

    #[test]
    fn test_telemetry_without_temp_is_malformed() {
        let err = telemetry(r#"{"door_open": false, "timestamp": 1}"#)
            .into_reading(0)
            .unwrap_err();
        assert_eq!(
            err,
            MonitorError::MalformedEvent {
                kind: "telemetry",
                reason: "missing temp".to_string()
            }
        );
    }

    #[test]
    fn test_location_message() {
        let msg: LocationMessage =
            serde_json::from_str(r#"{"location": {"lat": 12.97, "lon": 77.59}, "timestamp": 5}"#).unwrap();
        let sample = msg.into_sample(0).unwrap();
        assert_eq!(sample.location, Location::new(12.97, 77.59));
        assert_eq!(sample.timestamp, 5);

        let msg: LocationMessage = serde_json::from_str(r#"{"timestamp": 5}"#).unwrap();
        assert!(msg.into_sample(0).is_err());
    }

    #[test]
    fn test_command_messages() {
        let msg: CommandMessage = serde_json::from_str(r#"{"command": "reboot", "timestamp": 7}"#).unwrap();
        assert_eq!(msg.into_command(0).unwrap(), DecodedCommand::Reboot(CommandEvent::reboot(7)));

        let msg: CommandMessage = serde_json::from_str(r#"{"command": "defrost"}"#).unwrap();
        assert_eq!(
            msg.into_command(0).unwrap(),
            DecodedCommand::Ignored("defrost".to_string())
        );

        let msg: CommandMessage = serde_json::from_str(r#"{}"#).unwrap();
        assert!(msg.into_command(0).is_err());
    }
}
