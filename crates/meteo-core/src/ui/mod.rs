//! Drawing building blocks shared by the dashboard pages

pub mod palette;
pub mod text;

pub use palette::ColorPalette;
pub use text::{Label, TextSize};

/// Identifier of a dashboard page; the button cycles through them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PageId {
    #[default]
    Main,
    Stats,
}

impl PageId {
    /// The page shown after the next button press.
    pub const fn toggled(self) -> Self {
        match self {
            Self::Main => Self::Stats,
            Self::Stats => Self::Main,
        }
    }
}

/// Placeholder for values that are not known yet.
pub const NO_VALUE: &str = "--";

/// Format an optional value with one decimal and a unit, or the placeholder.
pub fn format_value(value: Option<f32>, unit: &str) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{:.1}{}", v, unit),
        _ => NO_VALUE.to_owned(),
    }
}
