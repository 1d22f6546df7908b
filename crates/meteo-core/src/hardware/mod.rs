//! Hardware seam of the station
//!
//! The runtime only talks to a [`Hardware`] implementation, chosen once at
//! startup: [`Peripherals`] wraps real `embedded-hal` devices, and
//! [`SimulatedHardware`] stands in for all of them when no Pi is attached.
//!
//! A peripheral that failed to initialize is simply absent from
//! [`Peripherals`]; its outputs become no-ops and its inputs report nothing.

mod simulated;

pub use simulated::{SimulatedHardware, SimulatedTelemetry, TEST_PATTERN};

use core::time::Duration;

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::DrawTarget;
use log::error;
use thiserror::Error;

use crate::button::ButtonInput;
use crate::framebuffer::FrameBuffer;
use crate::leds::{LedError, LedFrame, StatusLeds};
use crate::sensors::{EnvironmentSample, EnvironmentSensor, SensorError};
use crate::system::SystemInfo;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DisplayError {
    #[error("display failed to initialize: {details}")]
    InitializationFailed { details: &'static str },
    #[error("display flush failed: {details}")]
    FlushFailed { details: &'static str },
}

/// Everything the runtime needs from the board.
pub trait Hardware {
    /// One blocking read of the local sensor.
    fn read_sensor(&mut self) -> Result<EnvironmentSample, SensorError>;

    /// Level of the page button at `now`.
    fn button_pressed(&mut self, now: Duration) -> bool;

    /// Latch a frame on the status LEDs.
    fn show_leds(&mut self, frame: &LedFrame) -> Result<(), LedError>;

    /// Send the changed part of `frame` to the panel.
    fn present(&mut self, frame: &mut FrameBuffer) -> Result<(), DisplayError>;

    fn system_info(&mut self) -> SystemInfo;

    /// Leave the outputs in a neutral state before exit.
    fn shutdown(&mut self) {}
}

/// Source of host load and health figures.
pub trait SystemMonitor {
    fn sample(&mut self) -> SystemInfo;
}

/// Real devices, each optional.
pub struct Peripherals<S, L, B, D, M> {
    pub sensor: Option<S>,
    pub leds: Option<L>,
    pub button: Option<B>,
    pub display: Option<D>,
    pub monitor: M,
}

impl<S, L, B, D, M> Hardware for Peripherals<S, L, B, D, M>
where
    S: EnvironmentSensor,
    L: StatusLeds,
    B: ButtonInput,
    D: DrawTarget<Color = Rgb565>,
    D::Error: core::fmt::Debug,
    M: SystemMonitor,
{
    fn read_sensor(&mut self) -> Result<EnvironmentSample, SensorError> {
        match &mut self.sensor {
            Some(sensor) => sensor.read(),
            None => Err(SensorError::NotPresent),
        }
    }

    fn button_pressed(&mut self, _now: Duration) -> bool {
        self.button.as_mut().is_some_and(|b| b.is_pressed())
    }

    fn show_leds(&mut self, frame: &LedFrame) -> Result<(), LedError> {
        match &mut self.leds {
            Some(leds) => leds.show(frame),
            None => Ok(()),
        }
    }

    fn present(&mut self, frame: &mut FrameBuffer) -> Result<(), DisplayError> {
        let Some(display) = &mut self.display else {
            return Ok(());
        };
        frame.flush(display).map_err(|e| {
            error!("Display flush failed: {:?}", e);
            DisplayError::FlushFailed {
                details: "SPI transfer to the panel failed",
            }
        })
    }

    fn system_info(&mut self) -> SystemInfo {
        self.monitor.sample()
    }

    fn shutdown(&mut self) {
        if let Some(leds) = &mut self.leds
            && let Err(e) = leds.show(&LedFrame::OFF)
        {
            error!("Failed to switch LEDs off: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_graphics::mock_display::MockDisplay;

    struct NoSensor;

    impl EnvironmentSensor for NoSensor {
        fn read(&mut self) -> Result<EnvironmentSample, SensorError> {
            Err(SensorError::NotPresent)
        }
    }

    #[derive(Default)]
    struct CountingLeds {
        frames: Vec<LedFrame>,
    }

    impl StatusLeds for CountingLeds {
        fn show(&mut self, frame: &LedFrame) -> Result<(), LedError> {
            self.frames.push(*frame);
            Ok(())
        }
    }

    struct Held;

    impl ButtonInput for Held {
        fn is_pressed(&mut self) -> bool {
            true
        }
    }

    struct FixedMonitor;

    impl SystemMonitor for FixedMonitor {
        fn sample(&mut self) -> SystemInfo {
            SystemInfo {
                cpu_percent: 10.0,
                ..SystemInfo::default()
            }
        }
    }

    type TestPeripherals = Peripherals<NoSensor, CountingLeds, Held, MockDisplay<Rgb565>, FixedMonitor>;

    fn absent() -> TestPeripherals {
        Peripherals {
            sensor: None,
            leds: None,
            button: None,
            display: None,
            monitor: FixedMonitor,
        }
    }

    #[test]
    fn test_missing_peripherals_are_no_ops() {
        let mut hw = absent();

        assert_eq!(hw.read_sensor(), Err(SensorError::NotPresent));
        assert!(!hw.button_pressed(Duration::ZERO));
        assert_eq!(hw.show_leds(&LedFrame::OFF), Ok(()));
        assert_eq!(hw.present(&mut FrameBuffer::new(4, 4)), Ok(()));
        assert_eq!(hw.system_info().cpu_percent, 10.0);
    }

    #[test]
    fn test_present_peripherals_are_used() {
        let mut hw = absent();
        hw.leds = Some(CountingLeds::default());
        hw.button = Some(Held);
        hw.display = Some(MockDisplay::new());

        assert!(hw.button_pressed(Duration::ZERO));
        hw.show_leds(&LedFrame::solid(embedded_graphics::pixelcolor::Rgb888::new(1, 2, 3)))
            .unwrap();
        hw.present(&mut FrameBuffer::new(4, 4)).unwrap();
        hw.shutdown();

        let leds = hw.leds.unwrap();
        assert_eq!(leds.frames.len(), 2);
        assert_eq!(leds.frames[1], LedFrame::OFF);
    }
}
