//! Temperature trend indicators shown next to readings.

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::WebColors;

/// Changes smaller than this between two consecutive readings count as stable (°C).
pub const READING_TREND_DEADBAND: f32 = 0.1;

/// Changes smaller than this between the two halves of the recent history count as stable (°C).
pub const HISTORY_TREND_DEADBAND: f32 = 0.3;

/// Direction of a temperature change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Trend {
    Up,
    Down,
    #[default]
    Stable,
}

impl Trend {
    /// Classify the change between two values using a dead band.
    pub fn from_delta(delta: f32, deadband: f32) -> Self {
        if !delta.is_finite() || delta.abs() < deadband {
            Self::Stable
        } else if delta > 0.0 {
            Self::Up
        } else {
            Self::Down
        }
    }

    /// Trend between two consecutive readings.
    pub fn between(previous: Option<f32>, current: f32) -> Self {
        match previous {
            Some(previous) => Self::from_delta(current - previous, READING_TREND_DEADBAND),
            None => Self::Stable,
        }
    }

    /// Short marker drawn after a value.
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Up => "+",
            Self::Down => "-",
            Self::Stable => "=",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Up => "SUBIENDO",
            Self::Down => "BAJANDO",
            Self::Stable => "ESTABLE",
        }
    }

    pub const fn color(self) -> Rgb565 {
        match self {
            Self::Up => Rgb565::CSS_ORANGE,
            Self::Down => Rgb565::CSS_DEEP_SKY_BLUE,
            Self::Stable => Rgb565::CSS_LIGHT_GRAY,
        }
    }
}
