//! Status LED state machine
//!
//! The strip has two pixels:
//!
//! - **LED 0** reports the health of the outdoor link, from green (fresh data)
//!   through yellow and orange (ageing data) to red (offline).
//! - **LED 1** shows the climate class of the outdoor temperature, or a dim
//!   neutral gray when there is nothing to show.
//!
//! Colors here are full intensity; the driver applies the strip brightness.

mod ws2812;

pub use ws2812::{RESET_BYTES, SPI_FREQUENCY_HZ, Ws2812Spi, encode_byte};

use core::time::Duration;

use embedded_graphics::pixelcolor::Rgb888;
use thiserror::Error;

use crate::climate::ClimateClass;
use crate::config::{LED_COUNT, Thresholds};
use crate::store::RemoteReading;

/// LED 1 color when there is no usable outdoor reading.
pub const NEUTRAL_GRAY: Rgb888 = Rgb888::new(50, 50, 50);

/// Health of the outdoor data link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthStatus {
    /// Online and updated within the stale window.
    Fresh,
    /// Online but older than the stale window.
    Stale,
    /// Online but older than the very-stale window.
    VeryStale,
    Offline,
}

impl HealthStatus {
    /// Classify the link from its online flag and the age of its last update.
    pub fn assess(online: bool, age: Option<Duration>, thresholds: &Thresholds) -> Self {
        match (online, age) {
            (true, Some(age)) if age < thresholds.remote_stale_window => Self::Fresh,
            (true, Some(age)) if age < thresholds.remote_very_stale_window => Self::Stale,
            (true, Some(_)) => Self::VeryStale,
            _ => Self::Offline,
        }
    }

    pub const fn color(self) -> Rgb888 {
        match self {
            Self::Fresh => Rgb888::new(0, 255, 0),
            Self::Stale => Rgb888::new(255, 255, 0),
            Self::VeryStale => Rgb888::new(255, 165, 0),
            Self::Offline => Rgb888::new(255, 0, 0),
        }
    }
}

/// Colors for every pixel of the strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedFrame {
    pub pixels: [Rgb888; LED_COUNT],
}

impl LedFrame {
    pub const OFF: LedFrame = LedFrame {
        pixels: [Rgb888::new(0, 0, 0); LED_COUNT],
    };

    /// Compose the frame for the current outdoor reading at `now`.
    pub fn compose(remote: &RemoteReading, now: Duration, thresholds: &Thresholds) -> Self {
        let age = remote.last_update.map(|at| now.saturating_sub(at));
        let health = HealthStatus::assess(remote.online, age, thresholds);

        let climate = match remote.temperature {
            Some(t) if remote.online => ClimateClass::classify(Some(t)).led_color(now),
            _ => NEUTRAL_GRAY,
        };

        Self {
            pixels: [health.color(), climate],
        }
    }

    /// Every pixel set to the same color.
    pub const fn solid(color: Rgb888) -> Self {
        Self {
            pixels: [color; LED_COUNT],
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedError {
    #[error("LED strip failed to initialize: {details}")]
    InitializationFailed { details: &'static str },
    #[error("LED strip write failed: {details}")]
    WriteFailed { details: &'static str },
}

/// Output stage of the status LEDs. One call latches one complete frame.
pub trait StatusLeds {
    fn show(&mut self, frame: &LedFrame) -> Result<(), LedError>;
}

impl<L: StatusLeds + ?Sized> StatusLeds for Box<L> {
    fn show(&mut self, frame: &LedFrame) -> Result<(), LedError> {
        (**self).show(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StationConfig;

    const THRESHOLDS: Thresholds = StationConfig::DEFAULT.thresholds;

    fn remote(temperature: Option<f32>, online: bool, last_update: Option<u64>) -> RemoteReading {
        RemoteReading {
            temperature,
            online,
            last_update: last_update.map(Duration::from_secs),
            ..RemoteReading::default()
        }
    }

    #[test]
    fn test_health_follows_age_of_data() {
        let at = |age: u64| HealthStatus::assess(true, Some(Duration::from_secs(age)), &THRESHOLDS);

        assert_eq!(at(0), HealthStatus::Fresh);
        assert_eq!(at(299), HealthStatus::Fresh);
        assert_eq!(at(300), HealthStatus::Stale);
        assert_eq!(at(400), HealthStatus::Stale);
        assert_eq!(at(600), HealthStatus::VeryStale);
        assert_eq!(at(700).color(), Rgb888::new(255, 165, 0));
    }

    #[test]
    fn test_offline_is_red_regardless_of_age() {
        let status = HealthStatus::assess(false, Some(Duration::from_secs(1)), &THRESHOLDS);
        assert_eq!(status, HealthStatus::Offline);
        assert_eq!(status.color(), Rgb888::new(255, 0, 0));
        assert_eq!(HealthStatus::assess(true, None, &THRESHOLDS), HealthStatus::Offline);
    }

    #[test]
    fn test_frame_for_fresh_optimal_reading() {
        let frame = LedFrame::compose(
            &remote(Some(24.0), true, Some(100)),
            Duration::from_secs(110),
            &THRESHOLDS,
        );
        assert_eq!(frame.pixels, [Rgb888::new(0, 255, 0), Rgb888::new(0, 255, 0)]);
    }

    #[test]
    fn test_climate_pixel_is_gray_without_data() {
        let now = Duration::from_secs(10);

        let never = LedFrame::compose(&RemoteReading::default(), now, &THRESHOLDS);
        assert_eq!(never.pixels, [Rgb888::new(255, 0, 0), NEUTRAL_GRAY]);

        let offline = LedFrame::compose(&remote(Some(20.0), false, Some(5)), now, &THRESHOLDS);
        assert_eq!(offline.pixels[1], NEUTRAL_GRAY);
    }
}
