//! Status levels for readings shown with a color cue: the outdoor pressure
//! tendency on the main page and the host load figures on the stats page.

use embedded_graphics::pixelcolor::Rgb565;

use crate::ui::ColorPalette;

/// Pressure above this is high (hPa).
pub const HIGH_PRESSURE_HPA: f32 = 1020.0;

/// Pressure below this is low (hPa).
pub const LOW_PRESSURE_HPA: f32 = 1000.0;

/// How worrying a figure is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Good,
    Caution,
    Critical,
}

impl Severity {
    pub fn color(self, palette: &ColorPalette) -> Rgb565 {
        match self {
            Self::Good => palette.success,
            Self::Caution => palette.warning,
            Self::Critical => palette.danger,
        }
    }

    /// CPU or RAM usage: caution above 60 %, critical above 80 %.
    pub fn of_load(percent: f32) -> Self {
        Self::above(percent, 60.0, 80.0)
    }

    /// SoC temperature: caution above 60 °C, critical above 70 °C.
    pub fn of_cpu_temperature(celsius: f32) -> Self {
        Self::above(celsius, 60.0, 70.0)
    }

    fn above(value: f32, caution: f32, critical: f32) -> Self {
        if value > critical {
            Self::Critical
        } else if value > caution {
            Self::Caution
        } else {
            Self::Good
        }
    }
}

/// Barometric tendency of the outdoor pressure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PressureLevel {
    High,
    Normal,
    Low,
}

impl PressureLevel {
    pub fn classify(hpa: f32) -> Self {
        if hpa > HIGH_PRESSURE_HPA {
            Self::High
        } else if hpa < LOW_PRESSURE_HPA {
            Self::Low
        } else {
            Self::Normal
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::High => "ALTA",
            Self::Normal => "NORMAL",
            Self::Low => "BAJA",
        }
    }

    /// High pressure is settled weather, low pressure is unsettled.
    pub const fn severity(self) -> Severity {
        match self {
            Self::High => Severity::Good,
            Self::Normal => Severity::Caution,
            Self::Low => Severity::Critical,
        }
    }
}
