//! Outdoor telemetry ingestion
//!
//! The bus worker hands every received message to [`Ingress::on_message`].
//! Topic paths are resolved to a [`TopicKind`] once at construction, so
//! dispatching a message is a table lookup. Malformed payloads are dropped and
//! counted; nothing in here is fatal.

use core::ops::RangeInclusive;
use core::str;
use std::sync::Arc;

use log::{debug, info, warn};
use thiserror::Error;

use crate::alerts::AlertSink;
use crate::clock::Clock;
use crate::config::{Thresholds, TopicPaths};
use crate::store::{DataStore, IngressCounters, RemoteField};

/// Kind of data carried by an outdoor topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TopicKind {
    ExteriorTemp,
    ExteriorHum,
    ExteriorPres,
    ExteriorStatus,
}

/// Outdoor temperatures the node can physically report (°C).
pub const TEMPERATURE_RANGE: RangeInclusive<f32> = -80.0..=80.0;

/// Relative humidity (%).
pub const HUMIDITY_RANGE: RangeInclusive<f32> = 0.0..=100.0;

/// Barometric pressure (hPa).
pub const PRESSURE_RANGE: RangeInclusive<f32> = 300.0..=1200.0;

impl TopicKind {
    pub const ALL: [TopicKind; 4] = [
        Self::ExteriorTemp,
        Self::ExteriorHum,
        Self::ExteriorPres,
        Self::ExteriorStatus,
    ];
}

/// Topic path to kind lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TopicTable {
    entries: [(&'static str, TopicKind); 4],
}

impl TopicTable {
    pub fn new(paths: &TopicPaths) -> Self {
        Self {
            entries: [
                (paths.exterior_temp, TopicKind::ExteriorTemp),
                (paths.exterior_hum, TopicKind::ExteriorHum),
                (paths.exterior_pres, TopicKind::ExteriorPres),
                (paths.exterior_status, TopicKind::ExteriorStatus),
            ],
        }
    }

    pub fn resolve(&self, topic: &str) -> Option<TopicKind> {
        self.entries
            .iter()
            .find(|(path, _)| *path == topic)
            .map(|(_, kind)| *kind)
    }

    /// Every path to subscribe to.
    pub fn paths(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|(path, _)| *path)
    }
}

/// Why a payload could not be used.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PayloadError {
    #[error("payload is not valid UTF-8")]
    NotUtf8,
    #[error("payload {0:?} is not a number")]
    NotANumber(String),
    #[error("payload {0:?} is not a finite number")]
    NonFinite(String),
    #[error("reading {0:?} is outside the plausible range")]
    OutOfRange(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IngressError {
    #[error("unknown topic {0}")]
    UnknownTopic(String),
    #[error("dropped {kind:?} message: {source}")]
    Payload {
        kind: TopicKind,
        #[source]
        source: PayloadError,
    },
}

fn payload_text(payload: &[u8]) -> Result<&str, PayloadError> {
    str::from_utf8(payload)
        .map(str::trim)
        .map_err(|_| PayloadError::NotUtf8)
}

/// Parse a decimal reading such as `"21.5"` or `" -3 \n"`.
pub fn parse_number(payload: &[u8]) -> Result<f32, PayloadError> {
    let text = payload_text(payload)?;
    let value: f32 = text
        .parse()
        .map_err(|_| PayloadError::NotANumber(text.to_owned()))?;
    if !value.is_finite() {
        return Err(PayloadError::NonFinite(text.to_owned()));
    }
    Ok(value)
}

/// Parse a decimal reading and check it lies within `range`.
pub fn parse_reading(payload: &[u8], range: &RangeInclusive<f32>) -> Result<f32, PayloadError> {
    let value = parse_number(payload)?;
    if !range.contains(&value) {
        return Err(PayloadError::OutOfRange(payload_text(payload)?.to_owned()));
    }
    Ok(value)
}

/// `online` in any case means online; anything else means offline.
pub fn parse_status(payload: &[u8]) -> Result<bool, PayloadError> {
    Ok(payload_text(payload)?.eq_ignore_ascii_case("online"))
}

/// Applies bus messages to the data store.
#[derive(Clone)]
pub struct Ingress {
    store: DataStore,
    table: TopicTable,
    thresholds: Thresholds,
    clock: Arc<dyn Clock>,
    alerts: Arc<dyn AlertSink>,
}

impl Ingress {
    pub fn new(
        store: DataStore,
        topics: &TopicPaths,
        thresholds: Thresholds,
        clock: Arc<dyn Clock>,
        alerts: Arc<dyn AlertSink>,
    ) -> Self {
        Self {
            store,
            table: TopicTable::new(topics),
            thresholds,
            clock,
            alerts,
        }
    }

    pub fn topics(&self) -> &TopicTable {
        &self.table
    }

    /// Apply one message. Errors are already logged and counted.
    pub fn on_message(&self, topic: &str, payload: &[u8]) -> Result<TopicKind, IngressError> {
        let Some(kind) = self.table.resolve(topic) else {
            debug!("Ignoring message on unknown topic {}", topic);
            return Err(IngressError::UnknownTopic(topic.to_owned()));
        };

        let now = self.clock.now();
        let result = match kind {
            TopicKind::ExteriorTemp => {
                parse_reading(payload, &TEMPERATURE_RANGE).map(|t| self.apply_temperature(t))
            }
            TopicKind::ExteriorHum => parse_reading(payload, &HUMIDITY_RANGE)
                .map(|h| self.apply_field(RemoteField::Humidity(h))),
            TopicKind::ExteriorPres => parse_reading(payload, &PRESSURE_RANGE)
                .map(|p| self.apply_field(RemoteField::Pressure(p))),
            TopicKind::ExteriorStatus => parse_status(payload).map(|online| self.apply_status(online)),
        };

        match result {
            Ok(()) => {
                debug!("Applied {:?} message at {:?}", kind, now);
                Ok(kind)
            }
            Err(source) => {
                debug!("Dropping {:?} message: {}", kind, source);
                self.store.update(|data| {
                    data.counters.received += 1;
                    data.counters.dropped += 1;
                });
                Err(IngressError::Payload { kind, source })
            }
        }
    }

    fn apply_temperature(&self, temperature: f32) {
        let now = self.clock.now();
        let alert = self.store.update(|data| {
            data.counters.received += 1;
            data.apply_outdoor_temperature(temperature, now, &self.thresholds)
        });

        // Delivered with the lock released.
        if let Some(alert) = alert {
            self.alerts.emit(&alert);
        }
    }

    fn apply_field(&self, field: RemoteField) {
        let now = self.clock.now();
        self.store.update(|data| {
            data.counters.received += 1;
            data.apply_remote_field(field, now);
        });
    }

    fn apply_status(&self, online: bool) {
        let now = self.clock.now();
        let was_online = self.store.update(|data| {
            data.counters.received += 1;
            let was_online = data.remote.online;
            data.apply_remote_field(RemoteField::Online(online), now);
            was_online
        });

        match (was_online, online) {
            (false, true) => info!("Outdoor node reports online"),
            (true, false) => warn!("Outdoor node reports offline"),
            _ => {}
        }
    }

    /// The broker accepted the connection.
    pub fn on_connected(&self) {
        info!("Connected to broker, subscribing to outdoor topics");
    }

    /// The broker refused the connection; the link counts as offline.
    pub fn on_connection_refused(&self, reason: &str) {
        warn!("Broker refused connection: {}", reason);
        self.store.mark_remote_offline();
    }

    /// The connection to the broker was lost.
    pub fn on_disconnect(&self) {
        self.store.mark_remote_offline();
    }

    pub fn counters(&self) -> IngressCounters {
        self.store.snapshot().counters
    }
}
