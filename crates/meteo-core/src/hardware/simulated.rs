//! Stand-ins for the station hardware and the outdoor node
//!
//! Used when the station runs in test mode on a machine without the sensor,
//! panel or LEDs. Outputs are logged instead of driven.

use core::time::Duration;

use log::{debug, info};

use super::{DisplayError, Hardware};
use crate::config::TopicPaths;
use crate::framebuffer::FrameBuffer;
use crate::ingress::Ingress;
use crate::leds::{LedError, LedFrame};
use crate::sensors::{EnvironmentSample, SensorError};
use crate::system::SystemInfo;

/// Outdoor temperatures cycled by [`SimulatedTelemetry`], one per step.
pub const TEST_PATTERN: [f32; 9] = [-8.0, -2.0, 5.0, 15.0, 20.0, 24.0, 28.0, 32.0, 37.0];

/// The synthetic button is held during every second divisible by this.
const BUTTON_PERIOD_SECS: u64 = 30;

const SIMULATED_SAMPLE: EnvironmentSample = EnvironmentSample {
    temperature_celsius: 22.5,
    pressure_hpa: 1015.2,
    altitude_m: 150.0,
};

/// Fixed readings, a periodic button and logged outputs.
#[derive(Debug, Default)]
pub struct SimulatedHardware {
    last_leds: Option<LedFrame>,
    frames_presented: u64,
}

impl SimulatedHardware {
    pub fn new() -> Self {
        info!("Using simulated hardware");
        Self::default()
    }

    /// The last frame written to the LEDs.
    pub fn last_leds(&self) -> Option<LedFrame> {
        self.last_leds
    }

    pub fn frames_presented(&self) -> u64 {
        self.frames_presented
    }
}

impl Hardware for SimulatedHardware {
    fn read_sensor(&mut self) -> Result<EnvironmentSample, SensorError> {
        Ok(SIMULATED_SAMPLE)
    }

    fn button_pressed(&mut self, now: Duration) -> bool {
        now.as_secs() % BUTTON_PERIOD_SECS == 0
    }

    fn show_leds(&mut self, frame: &LedFrame) -> Result<(), LedError> {
        if self.last_leds != Some(*frame) {
            let [health, climate] = frame.pixels;
            info!("LEDs: health {:?}, climate {:?}", health, climate);
        }
        self.last_leds = Some(*frame);
        Ok(())
    }

    fn present(&mut self, frame: &mut FrameBuffer) -> Result<(), DisplayError> {
        if let Some(area) = frame.dirty_area() {
            debug!("Display update: {:?}", area);
        }
        frame.discard_damage();
        self.frames_presented += 1;
        Ok(())
    }

    fn system_info(&mut self) -> SystemInfo {
        SystemInfo {
            cpu_percent: 45.0,
            ram_percent: 67.0,
            cpu_temperature: Some(55.0),
            uptime: Duration::from_secs(2 * 86_400 + 14 * 3_600 + 32 * 60),
        }
    }
}

/// Fake outdoor node publishing through the normal ingress path.
pub struct SimulatedTelemetry {
    ingress: Ingress,
    topics: TopicPaths,
    step: usize,
}

impl SimulatedTelemetry {
    /// Interval between two simulated publications.
    pub const INTERVAL: Duration = Duration::from_secs(10);

    pub fn new(ingress: Ingress, topics: TopicPaths) -> Self {
        Self {
            ingress,
            topics,
            step: 0,
        }
    }

    /// Publish the next temperature of [`TEST_PATTERN`] and return it.
    ///
    /// The first step also announces the node as online.
    pub fn publish_next(&mut self) -> f32 {
        if self.step == 0 {
            let _ = self.ingress.on_message(self.topics.exterior_status, b"online");
        }

        let temperature = TEST_PATTERN[self.step % TEST_PATTERN.len()];
        self.step += 1;

        let payload = format!("{:.1}", temperature);
        let _ = self
            .ingress
            .on_message(self.topics.exterior_temp, payload.as_bytes());
        debug!("Simulated outdoor temperature {}", payload);
        temperature
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alerts::RecordingAlertSink;
    use crate::clock::ManualClock;
    use crate::config::StationConfig;
    use crate::store::DataStore;
    use std::sync::Arc;

    #[test]
    fn test_button_held_on_multiples_of_thirty_seconds() {
        let mut hw = SimulatedHardware::new();
        assert!(hw.button_pressed(Duration::from_millis(30_400)));
        assert!(!hw.button_pressed(Duration::from_secs(31)));
        assert!(hw.button_pressed(Duration::from_secs(60)));
    }

    #[test]
    fn test_fixed_readings() {
        let mut hw = SimulatedHardware::new();
        let sample = hw.read_sensor().unwrap();
        assert_eq!(sample.temperature_celsius, 22.5);
        assert_eq!(hw.system_info().cpu_percent, 45.0);
    }

    #[test]
    fn test_present_clears_damage() {
        let mut hw = SimulatedHardware::new();
        let mut frame = FrameBuffer::new(16, 16);
        hw.present(&mut frame).unwrap();
        assert_eq!(frame.dirty_area(), None);
        assert_eq!(hw.frames_presented(), 1);
    }

    #[test]
    fn test_telemetry_cycles_through_pattern() {
        let config = StationConfig::DEFAULT;
        let store = DataStore::new();
        let ingress = Ingress::new(
            store.clone(),
            &config.topics,
            config.thresholds,
            Arc::new(ManualClock::new()),
            Arc::new(RecordingAlertSink::new()),
        );
        let mut telemetry = SimulatedTelemetry::new(ingress, config.topics);

        let sent: Vec<f32> = (0..10).map(|_| telemetry.publish_next()).collect();
        assert_eq!(sent[..9], TEST_PATTERN);
        assert_eq!(sent[9], -8.0);

        let data = store.snapshot();
        assert!(data.remote.online);
        assert_eq!(data.remote.temperature, Some(-8.0));
        assert_eq!(data.history.len(), 10);
    }
}
