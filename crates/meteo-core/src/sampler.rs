//! Local sensor sampling

use core::time::Duration;

use log::{debug, error, info};

use crate::sensors::{EnvironmentSample, Reading, SensorError};
use crate::store::DataStore;

/// Applies local sensor results to the data store.
///
/// A failed read leaves the previous reading in place; the next cadence
/// simply tries again. A missing sensor is reported once.
#[derive(Debug, Default)]
pub struct LocalSampler {
    reported_missing: bool,
    samples: u64,
}

impl LocalSampler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outcome of one sensor read taken at `now`.
    ///
    /// Returns `true` when the store was updated.
    pub fn record(
        &mut self,
        result: Result<EnvironmentSample, SensorError>,
        now: Duration,
        store: &DataStore,
    ) -> bool {
        match result {
            Ok(sample) => {
                if self.samples == 0 {
                    info!(
                        "First local reading: {:.1}°C {:.1} hPa {:.1} m",
                        sample.temperature_celsius, sample.pressure_hpa, sample.altitude_m
                    );
                } else {
                    debug!(
                        "Local reading: {:.1}°C {:.1} hPa",
                        sample.temperature_celsius, sample.pressure_hpa
                    );
                }
                self.samples += 1;
                store.update_local(Reading::new(sample, now));
                true
            }
            Err(SensorError::NotPresent) => {
                if self.reported_missing {
                    debug!("Skipping local sample, no sensor");
                } else {
                    error!("No local sensor available, interior readings disabled");
                    self.reported_missing = true;
                }
                false
            }
            Err(e) => {
                error!("Local sensor read failed: {}", e);
                false
            }
        }
    }

    pub fn samples(&self) -> u64 {
        self.samples
    }
}
