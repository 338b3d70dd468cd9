// Telemetry domain models
use serde::{Deserialize, Serialize};

/// Coordinate used until the first location sample arrives.
pub const DEFAULT_LAT: f64 = 12.9716;
pub const DEFAULT_LON: f64 = 77.5946;

/// One periodic sample from the refrigerated unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TelemetryReading {
    pub temperature: f64,
    pub door_open: bool,
    pub timestamp: i64,
}

impl TelemetryReading {
    pub fn new(temperature: f64, door_open: bool, timestamp: i64) -> Self {
        Self {
            temperature,
            door_open,
            timestamp,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub lat: f64,
    pub lon: f64,
}

impl Location {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

impl Default for Location {
    fn default() -> Self {
        Self::new(DEFAULT_LAT, DEFAULT_LON)
    }
}

/// Last known position of the unit. Only used to enrich alert payloads.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LocationSample {
    pub location: Location,
    pub timestamp: i64,
}

impl LocationSample {
    pub fn new(location: Location, timestamp: i64) -> Self {
        Self {
            location,
            timestamp,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    Reboot,
}

/// An operator command addressed to the unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandEvent {
    pub kind: CommandKind,
    pub timestamp: i64,
}

impl CommandEvent {
    pub fn reboot(timestamp: i64) -> Self {
        Self {
            kind: CommandKind::Reboot,
            timestamp,
        }
    }
}
