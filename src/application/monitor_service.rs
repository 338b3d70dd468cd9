// Monitor service - One single-writer task per event stream
use crate::application::alert_dispatcher::AlertSender;
use crate::domain::alert::{Alert, AlertLevel};
use crate::domain::reboot_storm::{RebootStormMonitor, StormPolicy};
use crate::domain::rolling_window::{RollingWindow, DEFAULT_CAPACITY};
use crate::domain::telemetry::{CommandEvent, Location, LocationSample, TelemetryReading};
use crate::domain::temperature_alert::{Evaluation, TemperatureAlertMachine, TemperatureThresholds};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

const EVENT_QUEUE_CAPACITY: usize = 256;

#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub unit_id: String,
    pub window_size: usize,
    pub thresholds: TemperatureThresholds,
    pub storm: StormPolicy,
    /// How often the storm window is checked for rollover.
    pub tick_interval: Duration,
    pub default_location: Location,
    /// Wall-clock seconds used to open and close storm windows.
    pub clock: fn() -> i64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            unit_id: "truck_001".to_string(),
            window_size: DEFAULT_CAPACITY,
            thresholds: TemperatureThresholds::default(),
            storm: StormPolicy::default(),
            tick_interval: Duration::from_secs(1),
            default_location: Location::default(),
            clock: now_secs,
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("monitor is not running")]
pub struct MonitorStopped;

/// Entry point for decoded events. Cheap to clone.
#[derive(Clone)]
pub struct MonitorHandle {
    telemetry_tx: mpsc::Sender<TelemetryReading>,
    command_tx: mpsc::Sender<CommandEvent>,
    location_tx: Arc<watch::Sender<LocationSample>>,
}

impl MonitorHandle {
    pub async fn submit_telemetry(&self, reading: TelemetryReading) -> Result<(), MonitorStopped> {
        self.telemetry_tx.send(reading).await.map_err(|_| MonitorStopped)
    }

    pub async fn submit_command(&self, command: CommandEvent) -> Result<(), MonitorStopped> {
        self.command_tx.send(command).await.map_err(|_| MonitorStopped)
    }

    /// Most recent sample wins; readers may briefly see the previous one.
    pub fn update_location(&self, sample: LocationSample) -> Result<(), MonitorStopped> {
        tracing::info!(
            lat = sample.location.lat,
            lon = sample.location.lon,
            timestamp = sample.timestamp,
            "Location updated"
        );
        self.location_tx.send(sample).map_err(|_| MonitorStopped)
    }
}

pub struct MonitorTasks {
    pub telemetry: JoinHandle<()>,
    pub commands: JoinHandle<()>,
}

/// Spawn the telemetry and command workers. Both stop once every
/// `MonitorHandle` clone has been dropped.
pub fn spawn_monitor(config: MonitorConfig, alerts: AlertSender) -> (MonitorHandle, MonitorTasks) {
    let (telemetry_tx, telemetry_rx) = mpsc::channel(EVENT_QUEUE_CAPACITY);
    let (command_tx, command_rx) = mpsc::channel(EVENT_QUEUE_CAPACITY);
    let (location_tx, location_rx) =
        watch::channel(LocationSample::new(config.default_location, 0));

    let telemetry = TelemetryWorker {
        window: RollingWindow::with_capacity(config.window_size),
        machine: TemperatureAlertMachine::new(config.thresholds),
        thresholds: config.thresholds,
        location_rx,
        alerts: alerts.clone(),
    };

    let commands = CommandWorker {
        monitor: RebootStormMonitor::new(config.unit_id.clone(), config.storm, (config.clock)()),
        tick_interval: config.tick_interval,
        clock: config.clock,
        alerts,
    };

    let tasks = MonitorTasks {
        telemetry: tokio::spawn(telemetry.run(telemetry_rx)),
        commands: tokio::spawn(commands.run(command_rx)),
    };

    let handle = MonitorHandle {
        telemetry_tx,
        command_tx,
        location_tx: Arc::new(location_tx),
    };

    (handle, tasks)
}

fn now_secs() -> i64 {
    chrono::Utc::now().timestamp()
}

fn log_raised(alert: &Alert) {
    match alert.level {
        AlertLevel::Recovery => tracing::info!("RECOVERY: {}", alert.message),
        level => tracing::warn!(%level, "Alert raised: {}", alert.message),
    }
}

struct TelemetryWorker {
    window: RollingWindow,
    machine: TemperatureAlertMachine,
    thresholds: TemperatureThresholds,
    location_rx: watch::Receiver<LocationSample>,
    alerts: AlertSender,
}

impl TelemetryWorker {
    async fn run(mut self, mut rx: mpsc::Receiver<TelemetryReading>) {
        while let Some(reading) = rx.recv().await {
            self.handle(reading);
        }
        tracing::debug!("Telemetry worker stopped");
    }

    fn handle(&mut self, reading: TelemetryReading) {
        tracing::debug!(
            temp = reading.temperature,
            door_open = reading.door_open,
            timestamp = reading.timestamp,
            "Telemetry received"
        );

        self.window.push(reading.temperature);
        let location = *self.location_rx.borrow();

        match self.machine.evaluate(&reading, &self.window, &location) {
            Evaluation::Collecting { have, need } => {
                tracing::debug!("Collecting initial data ({}/{} readings)", have, need);
            }
            Evaluation::Suppressed { cleared } => {
                if reading.temperature > self.thresholds.warning {
                    tracing::info!(
                        "Temp is {:.2}°C, but door is open. Suppressing alert.",
                        reading.temperature
                    );
                }
                if cleared {
                    tracing::info!("Door opened, resetting alert state");
                }
            }
            Evaluation::Raised(alert) => {
                log_raised(&alert);
                self.alerts.send(alert);
            }
            Evaluation::Steady { rolling_avg } => {
                if !self.machine.warning_active() {
                    tracing::debug!("System normal. Avg: {:.2}°C", rolling_avg);
                }
            }
        }
    }
}

struct CommandWorker {
    monitor: RebootStormMonitor,
    tick_interval: Duration,
    clock: fn() -> i64,
    alerts: AlertSender,
}

impl CommandWorker {
    async fn run(mut self, mut rx: mpsc::Receiver<CommandEvent>) {
        let mut ticker = tokio::time::interval(self.tick_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                command = rx.recv() => match command {
                    Some(command) => self.handle(command),
                    None => break,
                },
                _ = ticker.tick() => self.tick((self.clock)()),
            }
        }
        tracing::debug!("Command worker stopped");
    }

    fn handle(&mut self, command: CommandEvent) {
        let alert = self.monitor.record_reboot(&command);
        tracing::info!(
            count = self.monitor.failure_count(),
            window_start = self.monitor.window_start(),
            alert_sent = self.monitor.alert_sent_this_window(),
            timestamp = command.timestamp,
            "Reboot command received"
        );

        if let Some(alert) = alert {
            log_raised(&alert);
            self.alerts.send(alert);
        }
    }

    fn tick(&mut self, now: i64) {
        if let Some(rollover) = self.monitor.tick(now) {
            if rollover.previous_count == 0 {
                tracing::debug!(window_start = rollover.window_start, "Storm window reset, no reboots");
            } else {
                tracing::info!(
                    window_start = rollover.window_start,
                    previous_count = rollover.previous_count,
                    alert_was_sent = rollover.alert_was_sent,
                    "Storm window reset"
                );
            }
        }
    }
}
