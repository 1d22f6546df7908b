//! Local environmental sensor abstraction and readings

mod bmp280;

pub use bmp280::{BMP280_DEFAULT_ADDRESS, Bmp280};

use core::time::Duration;

use thiserror::Error;

use crate::trend::Trend;

/// One measurement produced by the local sensor driver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvironmentSample {
    pub temperature_celsius: f32,
    pub pressure_hpa: f32,
    pub altitude_m: f32,
}

impl EnvironmentSample {
    /// Round every value to one decimal, as shown on the dashboard.
    pub fn rounded(self) -> Self {
        Self {
            temperature_celsius: round_tenth(self.temperature_celsius),
            pressure_hpa: round_tenth(self.pressure_hpa),
            altitude_m: round_tenth(self.altitude_m),
        }
    }
}

fn round_tenth(value: f32) -> f32 {
    (value * 10.0).round() / 10.0
}

/// The latest local reading stored in the data store.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    pub temperature: f32,
    pub pressure: f32,
    pub altitude: f32,
    /// Clock time of acquisition.
    pub timestamp: Duration,
    pub online: bool,
    /// Direction relative to the previous local temperature.
    pub trend: Trend,
}

impl Reading {
    pub fn new(sample: EnvironmentSample, timestamp: Duration) -> Self {
        Self {
            temperature: sample.temperature_celsius,
            pressure: sample.pressure_hpa,
            altitude: sample.altitude_m,
            timestamp,
            online: true,
            trend: Trend::Stable,
        }
    }
}

/// Trait for the local environmental sensor.
pub trait EnvironmentSensor {
    /// Perform one blocking measurement.
    fn read(&mut self) -> Result<EnvironmentSample, SensorError>;
}

impl<S: EnvironmentSensor + ?Sized> EnvironmentSensor for Box<S> {
    fn read(&mut self) -> Result<EnvironmentSample, SensorError> {
        (**self).read()
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SensorError {
    #[error("{sensor} failed to initialize: {details}")]
    InitializationFailed {
        sensor: &'static str,
        details: &'static str,
    },
    #[error("{sensor} read failed during {operation}: {details}")]
    ReadFailed {
        sensor: &'static str,
        operation: &'static str,
        details: &'static str,
    },
    #[error("{sensor} returned an implausible value: {details}")]
    InvalidData {
        sensor: &'static str,
        details: &'static str,
    },
    #[error("no local sensor is available")]
    NotPresent,
}
