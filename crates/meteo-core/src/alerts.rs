//! Outdoor temperature alerts with a global cooldown
//!
//! [`evaluate`] is a pure function: it decides whether a new outdoor
//! temperature warrants an alert given the time of the last one. Hot and cold
//! alerts share one cooldown, so at most one alert is emitted per
//! `min_alert_interval` regardless of its level.
//!
//! Emitted alerts are handed to an [`AlertSink`] injected at construction.

use core::time::Duration;
use std::sync::{Arc, Mutex, PoisonError};

use log::warn;

use crate::config::Thresholds;

/// Severity of an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertLevel {
    /// Outdoor temperature at or above the heat warning.
    Hot,
    /// Outdoor temperature at or below the freeze warning.
    Cold,
}

impl AlertLevel {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Hot => "ALERTA CALOR EXTREMO",
            Self::Cold => "ALERTA HELADA",
        }
    }
}

/// A temperature alert.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Alert {
    pub level: AlertLevel,
    pub temperature: f32,
    pub at: Duration,
}

/// Time of the most recent alert.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AlertState {
    pub last_alert_time: Option<Duration>,
}

impl AlertState {
    /// Whether the cooldown allows a new alert at `now`.
    pub fn cooldown_elapsed(&self, now: Duration, min_interval: Duration) -> bool {
        match self.last_alert_time {
            None => true,
            Some(last) => now.saturating_sub(last) >= min_interval,
        }
    }

    pub fn record(&mut self, now: Duration) {
        self.last_alert_time = Some(now);
    }
}

/// Decide whether `temperature` raises an alert at `now`.
pub fn evaluate(
    temperature: f32,
    state: &AlertState,
    now: Duration,
    thresholds: &Thresholds,
) -> Option<Alert> {
    if !state.cooldown_elapsed(now, thresholds.min_alert_interval) {
        return None;
    }

    let level = if temperature >= thresholds.heat_warning {
        AlertLevel::Hot
    } else if temperature <= thresholds.freeze_warning {
        AlertLevel::Cold
    } else {
        return None;
    };

    Some(Alert {
        level,
        temperature,
        at: now,
    })
}

/// Receiver of emitted alerts.
pub trait AlertSink: Send + Sync {
    fn emit(&self, alert: &Alert);
}

impl<S: AlertSink + ?Sized> AlertSink for Arc<S> {
    fn emit(&self, alert: &Alert) {
        (**self).emit(alert)
    }
}

/// Writes alerts to the log at warn level.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogAlertSink;

impl AlertSink for LogAlertSink {
    fn emit(&self, alert: &Alert) {
        warn!("{}: {:.1}°C", alert.level.label(), alert.temperature);
    }
}

/// Keeps every alert in memory; used by tests and the simulated station.
#[derive(Debug, Clone, Default)]
pub struct RecordingAlertSink {
    alerts: Arc<Mutex<Vec<Alert>>>,
}

impl RecordingAlertSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alerts(&self) -> Vec<Alert> {
        self.alerts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl AlertSink for RecordingAlertSink {
    fn emit(&self, alert: &Alert) {
        self.alerts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(*alert);
    }
}
