//! Shared station state
//!
//! [`DataStore`] is the single record shared by the main loop and the bus
//! worker. All access goes through one mutex: writers use the scoped update
//! methods, readers take a [`StationData`] snapshot and work on the copy with
//! the lock released. A panic while the lock is held poisons it; the data is
//! still consistent at field granularity, so the poison is cleared rather
//! than propagated.

use core::time::Duration;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::warn;

use crate::alerts::{Alert, AlertState, evaluate};
use crate::config::Thresholds;
use crate::history::TemperatureHistory;
use crate::sensors::Reading;
use crate::stats::Statistics;
use crate::trend::Trend;

/// Offset of the feels-like estimate below the outdoor temperature.
///
/// Placeholder until the outdoor node publishes wind speed.
pub const FEELS_LIKE_OFFSET: f32 = 2.0;

/// Latest data from the outdoor node. Every field updates independently.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RemoteReading {
    pub temperature: Option<f32>,
    pub humidity: Option<f32>,
    pub pressure: Option<f32>,
    pub feels_like: Option<f32>,
    pub online: bool,
    /// Clock time of the last message of any kind.
    pub last_update: Option<Duration>,
    /// Direction relative to the previous outdoor temperature.
    pub trend: Trend,
    /// The last temperature jumped by at least `temp_change_alarm`.
    pub sudden_change: bool,
}

impl RemoteReading {
    /// Age of the newest data at `now`, if anything was ever received.
    pub fn age(&self, now: Duration) -> Option<Duration> {
        self.last_update.map(|at| now.saturating_sub(at))
    }
}

/// One field of a remote message.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RemoteField {
    Temperature(f32),
    Humidity(f32),
    Pressure(f32),
    Online(bool),
}

/// Message counters of the bus worker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngressCounters {
    pub received: u64,
    pub dropped: u64,
}

/// Everything the station knows.
#[derive(Debug, Clone, Default)]
pub struct StationData {
    pub local: Option<Reading>,
    pub remote: RemoteReading,
    pub history: TemperatureHistory,
    /// `None` until the first recomputation over a non-empty history.
    pub stats: Option<Statistics>,
    pub alerts: AlertState,
    pub counters: IngressCounters,
}

impl StationData {
    /// Replace the local reading, deriving its trend from the previous one.
    pub fn apply_local(&mut self, mut reading: Reading) {
        let previous = self.local.map(|r| r.temperature);
        reading.trend = Trend::between(previous, reading.temperature);
        self.local = Some(reading);
    }

    /// Set one remote field and refresh `last_update`.
    ///
    /// A temperature also marks the link online. Use
    /// [`apply_outdoor_temperature`](Self::apply_outdoor_temperature) for the
    /// full temperature handling.
    pub fn apply_remote_field(&mut self, field: RemoteField, now: Duration) {
        let remote = &mut self.remote;
        match field {
            RemoteField::Temperature(t) => {
                remote.temperature = Some(t);
                remote.online = true;
            }
            RemoteField::Humidity(h) => remote.humidity = Some(h),
            RemoteField::Pressure(p) => remote.pressure = Some(p),
            RemoteField::Online(online) => remote.online = online,
        }
        remote.last_update = Some(now);
    }

    /// Everything an outdoor temperature message changes, in one step.
    ///
    /// Returns the alert to deliver, already recorded in the alert state.
    pub fn apply_outdoor_temperature(
        &mut self,
        temperature: f32,
        now: Duration,
        thresholds: &Thresholds,
    ) -> Option<Alert> {
        let previous = self.remote.temperature;

        self.apply_remote_field(RemoteField::Temperature(temperature), now);
        self.history.push(temperature);

        let remote = &mut self.remote;
        remote.feels_like = Some(temperature - FEELS_LIKE_OFFSET);
        remote.trend = Trend::between(previous, temperature);
        remote.sudden_change =
            previous.is_some_and(|p| (temperature - p).abs() >= thresholds.temp_change_alarm);

        let alert = evaluate(temperature, &self.alerts, now, thresholds);
        if let Some(alert) = &alert {
            self.alerts.record(alert.at);
        }
        alert
    }

    /// Recompute the statistics; an empty history keeps the previous values.
    pub fn recompute_stats(&mut self) -> Option<Statistics> {
        if let Some(stats) = Statistics::from_history(&self.history) {
            self.stats = Some(stats);
        }
        self.stats
    }

    /// Mark the link offline when nothing arrived for longer than `window`.
    ///
    /// Returns `true` when the link was online and is now cleared.
    pub fn clear_stale_remote(&mut self, now: Duration, window: Duration) -> bool {
        let stale = self.remote.online && self.remote.age(now).is_none_or(|age| age > window);
        if stale {
            self.remote.online = false;
        }
        stale
    }
}

/// Cloneable handle to the shared [`StationData`].
#[derive(Debug, Clone, Default)]
pub struct DataStore {
    inner: Arc<Mutex<StationData>>,
}

impl DataStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, StationData> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Copy of the current state.
    pub fn snapshot(&self) -> StationData {
        self.lock().clone()
    }

    /// Run a compound update under a single lock acquisition.
    pub fn update<R>(&self, f: impl FnOnce(&mut StationData) -> R) -> R {
        f(&mut self.lock())
    }

    pub fn update_local(&self, reading: Reading) {
        self.update(|data| data.apply_local(reading));
    }

    pub fn update_remote_field(&self, field: RemoteField, now: Duration) {
        self.update(|data| data.apply_remote_field(field, now));
    }

    pub fn push_history(&self, temperature: f32) {
        self.update(|data| data.history.push(temperature));
    }

    pub fn recompute_stats(&self) -> Option<Statistics> {
        self.update(StationData::recompute_stats)
    }

    pub fn record_alert(&self, now: Duration) {
        self.update(|data| data.alerts.record(now));
    }

    /// Clear the online flag of stale remote data. Logs the transition.
    pub fn maybe_clear_remote_online(&self, now: Duration, window: Duration) -> bool {
        let cleared = self.update(|data| data.clear_stale_remote(now, window));
        if cleared {
            warn!(
                "No outdoor data for more than {}s, marking node offline",
                window.as_secs()
            );
        }
        cleared
    }

    /// Mark the link offline after a bus disconnect.
    pub fn mark_remote_offline(&self) {
        let was_online = self.update(|data| core::mem::replace(&mut data.remote.online, false));
        if was_online {
            warn!("Outdoor node offline (bus disconnected)");
        }
    }
}
