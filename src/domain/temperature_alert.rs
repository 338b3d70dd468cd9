// Temperature alert state machine - Edge-triggered hysteresis over cargo temperature
use super::alert::Alert;
use super::rolling_window::RollingWindow;
use super::telemetry::{LocationSample, TelemetryReading};

pub const WARNING_THRESHOLD: f64 = 4.0; // °C, instantaneous
pub const CRITICAL_THRESHOLD: f64 = 5.5; // °C, rolling average
pub const RECOVERY_THRESHOLD: f64 = 3.5; // °C, both instantaneous and average

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TemperatureThresholds {
    pub warning: f64,
    pub critical: f64,
    pub recovery: f64,
}

impl Default for TemperatureThresholds {
    fn default() -> Self {
        Self {
            warning: WARNING_THRESHOLD,
            critical: CRITICAL_THRESHOLD,
            recovery: RECOVERY_THRESHOLD,
        }
    }
}

// Critical implies warning, so a single enum covers both flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum AlertState {
    #[default]
    Normal,
    Warning,
    Critical,
}

/// What the machine did with one reading.
#[derive(Debug, Clone, PartialEq)]
pub enum Evaluation {
    /// The window is still filling; nothing was evaluated.
    Collecting { have: usize, need: usize },
    /// Door open. `cleared` is true when an active alert was cancelled.
    Suppressed { cleared: bool },
    Raised(Alert),
    /// No transition.
    Steady { rolling_avg: f64 },
}

/// An alert is produced when a state is entered, never while it persists.
/// An open door cancels any active alert without announcing a recovery.
#[derive(Debug, Clone, Default)]
pub struct TemperatureAlertMachine {
    thresholds: TemperatureThresholds,
    state: AlertState,
}

impl TemperatureAlertMachine {
    pub fn new(thresholds: TemperatureThresholds) -> Self {
        Self {
            thresholds,
            state: AlertState::Normal,
        }
    }

    pub fn warning_active(&self) -> bool {
        matches!(self.state, AlertState::Warning | AlertState::Critical)
    }

    pub fn critical_active(&self) -> bool {
        self.state == AlertState::Critical
    }

    /// Evaluate `reading`, which the caller has already pushed into `window`.
    pub fn evaluate(
        &mut self,
        reading: &TelemetryReading,
        window: &RollingWindow,
        location: &LocationSample,
    ) -> Evaluation {
        let rolling_avg = match window.average() {
            Ok(avg) => avg,
            Err(_) => {
                return Evaluation::Collecting {
                    have: window.len(),
                    need: window.capacity(),
                };
            }
        };

        if reading.door_open {
            let cleared = self.state != AlertState::Normal;
            self.state = AlertState::Normal;
            return Evaluation::Suppressed { cleared };
        }

        let temp = reading.temperature;
        let t = self.thresholds;

        if rolling_avg > t.critical && !self.critical_active() {
            self.state = AlertState::Critical;
            return Evaluation::Raised(Alert::cooling_failure(
                rolling_avg,
                temp,
                location.location,
                reading.timestamp,
            ));
        }

        if temp > t.warning && !self.warning_active() {
            self.state = AlertState::Warning;
            return Evaluation::Raised(Alert::high_temperature(
                temp,
                rolling_avg,
                location.location,
                reading.timestamp,
            ));
        }

        if temp < t.recovery && rolling_avg < t.recovery && self.warning_active() {
            self.state = AlertState::Normal;
            return Evaluation::Raised(Alert::recovered(temp, rolling_avg, reading.timestamp));
        }

        Evaluation::Steady { rolling_avg }
    }
}
