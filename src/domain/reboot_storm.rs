// Reboot storm detection - Repeated reboots within one window mean a defective unit
use super::alert::Alert;
use super::telemetry::{CommandEvent, CommandKind};

pub const WINDOW_DURATION_SECS: u64 = 60;
pub const FAILURE_THRESHOLD: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StormPolicy {
    pub window_secs: u64,
    /// An alert fires once the count strictly exceeds this value.
    pub failure_threshold: u32,
}

impl Default for StormPolicy {
    fn default() -> Self {
        Self {
            window_secs: WINDOW_DURATION_SECS,
            failure_threshold: FAILURE_THRESHOLD,
        }
    }
}

/// Summary of a window that just closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowRollover {
    pub previous_count: u32,
    pub alert_was_sent: bool,
    pub window_start: i64,
}

#[derive(Debug, Clone)]
pub struct RebootStormMonitor {
    unit_id: String,
    policy: StormPolicy,
    window_start: i64,
    failure_count: u32,
    alert_sent_this_window: bool,
}

impl RebootStormMonitor {
    pub fn new(unit_id: impl Into<String>, policy: StormPolicy, now: i64) -> Self {
        Self {
            unit_id: unit_id.into(),
            policy,
            window_start: now,
            failure_count: 0,
            alert_sent_this_window: false,
        }
    }

    pub fn failure_count(&self) -> u32 {
        self.failure_count
    }

    pub fn alert_sent_this_window(&self) -> bool {
        self.alert_sent_this_window
    }

    pub fn window_start(&self) -> i64 {
        self.window_start
    }

    /// Count a reboot. Returns the defective-unit alert the first time the
    /// count exceeds the threshold within the current window.
    pub fn record_reboot(&mut self, command: &CommandEvent) -> Option<Alert> {
        debug_assert_eq!(command.kind, CommandKind::Reboot);
        self.failure_count = self.failure_count.saturating_add(1);

        if self.failure_count > self.policy.failure_threshold && !self.alert_sent_this_window {
            self.alert_sent_this_window = true;
            return Some(Alert::defective_unit(
                &self.unit_id,
                self.failure_count,
                self.policy.window_secs,
                command.timestamp,
            ));
        }

        None
    }

    /// Close the window if it is older than the configured duration. Must be
    /// called at least once per window duration for the reset to be timely.
    pub fn tick(&mut self, now: i64) -> Option<WindowRollover> {
        let elapsed = now.saturating_sub(self.window_start);
        if elapsed <= self.policy.window_secs as i64 {
            return None;
        }

        let rollover = WindowRollover {
            previous_count: self.failure_count,
            alert_was_sent: self.alert_sent_this_window,
            window_start: self.window_start,
        };

        self.window_start = now;
        self.failure_count = 0;
        self.alert_sent_this_window = false;

        Some(rollover)
    }
}
