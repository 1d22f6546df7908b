//! Climate classification of the outdoor temperature
//!
//! The classification is total: every finite temperature falls in exactly one
//! band (bands are closed on the left, open on the right) and anything else is
//! [`ClimateClass::NoData`].

use core::time::Duration;

use embedded_graphics::pixelcolor::{Rgb565, Rgb888};
use embedded_graphics::prelude::RgbColor;

/// Intensity of blinking classes during their dim phase.
const BLINK_DIM_FACTOR: f32 = 0.4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClimateClass {
    /// 35 °C and above
    Extreme,
    /// 30 to 35 °C
    Hot,
    /// 26 to 30 °C
    Warm,
    /// 23 to 26 °C
    Optimal,
    /// 18 to 23 °C
    Cool,
    /// 10 to 18 °C
    Cold,
    /// 0 to 10 °C
    VeryCold,
    /// -5 to 0 °C
    Frost,
    /// Below -5 °C
    ExtremeFrost,
    /// No usable temperature
    NoData,
}

impl ClimateClass {
    /// Every class, hottest first.
    pub const ALL: [ClimateClass; 10] = [
        Self::Extreme,
        Self::Hot,
        Self::Warm,
        Self::Optimal,
        Self::Cool,
        Self::Cold,
        Self::VeryCold,
        Self::Frost,
        Self::ExtremeFrost,
        Self::NoData,
    ];

    pub fn classify(temperature: Option<f32>) -> Self {
        match temperature {
            Some(t) if t.is_finite() => Self::from_celsius(t),
            _ => Self::NoData,
        }
    }

    fn from_celsius(t: f32) -> Self {
        if t >= 35.0 {
            Self::Extreme
        } else if t >= 30.0 {
            Self::Hot
        } else if t >= 26.0 {
            Self::Warm
        } else if t >= 23.0 {
            Self::Optimal
        } else if t >= 18.0 {
            Self::Cool
        } else if t >= 10.0 {
            Self::Cold
        } else if t >= 0.0 {
            Self::VeryCold
        } else if t >= -5.0 {
            Self::Frost
        } else {
            Self::ExtremeFrost
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Extreme => "EXTREMO",
            Self::Hot => "CALUROSO",
            Self::Warm => "CÁLIDO",
            Self::Optimal => "ÓPTIMO",
            Self::Cool => "FRESCO",
            Self::Cold => "FRÍO",
            Self::VeryCold => "MUY FRÍO",
            Self::Frost => "HELADA",
            Self::ExtremeFrost => "H.EXTREMA",
            Self::NoData => "SIN DATOS",
        }
    }

    /// Full-intensity LED color of the class.
    pub const fn color(self) -> Rgb888 {
        match self {
            Self::Extreme => Rgb888::new(255, 0, 0),
            Self::Hot => Rgb888::new(255, 165, 0),
            Self::Warm => Rgb888::new(255, 255, 0),
            Self::Optimal => Rgb888::new(0, 255, 0),
            Self::Cool => Rgb888::new(100, 255, 100),
            Self::Cold => Rgb888::new(0, 255, 255),
            Self::VeryCold => Rgb888::new(0, 100, 255),
            Self::Frost => Rgb888::new(0, 0, 255),
            Self::ExtremeFrost => Rgb888::new(128, 0, 255),
            Self::NoData => Rgb888::new(128, 128, 128),
        }
    }

    /// Color used for the class label on the display.
    pub fn display_color(self) -> Rgb565 {
        Rgb565::from(self.color())
    }

    pub const fn blinks(self) -> bool {
        matches!(self, Self::Extreme | Self::Frost | Self::ExtremeFrost)
    }

    /// LED color at `now`, alternating bright and dim every half second for
    /// blinking classes.
    pub fn led_color(self, now: Duration) -> Rgb888 {
        let color = self.color();
        if !self.blinks() || blink_phase_bright(now) {
            return color;
        }
        scale(color, BLINK_DIM_FACTOR)
    }
}

/// `floor(now * 2)` is even during the bright phase.
fn blink_phase_bright(now: Duration) -> bool {
    (now.as_millis() / 500) % 2 == 0
}

/// Scale every channel of `color` by `factor`.
pub fn scale(color: Rgb888, factor: f32) -> Rgb888 {
    let channel = |c: u8| (f32::from(c) * factor).round().clamp(0.0, 255.0) as u8;
    Rgb888::new(channel(color.r()), channel(color.g()), channel(color.b()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_band_edges_are_left_closed() {
        let cases = [
            (35.0, ClimateClass::Extreme),
            (34.99, ClimateClass::Hot),
            (30.0, ClimateClass::Hot),
            (26.0, ClimateClass::Warm),
            (23.0, ClimateClass::Optimal),
            (18.0, ClimateClass::Cool),
            (10.0, ClimateClass::Cold),
            (0.0, ClimateClass::VeryCold),
            (-0.01, ClimateClass::Frost),
            (-5.0, ClimateClass::Frost),
            (-5.01, ClimateClass::ExtremeFrost),
        ];
        for (t, expected) in cases {
            assert_eq!(ClimateClass::classify(Some(t)), expected, "t = {t}");
        }
    }

    #[test]
    fn test_missing_or_invalid_is_no_data() {
        assert_eq!(ClimateClass::classify(None), ClimateClass::NoData);
        assert_eq!(ClimateClass::classify(Some(f32::NAN)), ClimateClass::NoData);
        assert_eq!(
            ClimateClass::classify(Some(f32::NEG_INFINITY)),
            ClimateClass::NoData
        );
    }

    #[test]
    fn test_extreme_heat_blinks() {
        let class = ClimateClass::classify(Some(37.0));
        assert_eq!(class.label(), "EXTREMO");

        assert_eq!(class.led_color(Duration::from_millis(0)), Rgb888::new(255, 0, 0));
        assert_eq!(class.led_color(Duration::from_millis(700)), Rgb888::new(102, 0, 0));
        assert_eq!(class.led_color(Duration::from_millis(1200)), Rgb888::new(255, 0, 0));
    }

    #[test]
    fn test_steady_classes_do_not_blink() {
        let class = ClimateClass::Optimal;
        assert_eq!(class.led_color(Duration::from_millis(700)), class.color());
    }

    #[test]
    fn test_labels_are_distinct() {
        for (i, a) in ClimateClass::ALL.iter().enumerate() {
            for b in &ClimateClass::ALL[i + 1..] {
                assert_ne!(a.label(), b.label());
            }
        }
    }
}
