//! Dashboard color palette
//!
//! Colors come from [`UiColors`] in the station configuration, stored there
//! as raw RGB565 words and converted once here.

use embedded_graphics::pixelcolor::Rgb565;

use crate::config::{StationConfig, UiColors};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorPalette {
    /// Titles and the header bar
    pub primary: Rgb565,
    /// Section headings
    pub secondary: Rgb565,
    /// Separators and bar outlines
    pub accent: Rgb565,
    pub success: Rgb565,
    pub warning: Rgb565,
    pub danger: Rgb565,
    pub background: Rgb565,
    pub text: Rgb565,
    pub text_secondary: Rgb565,
}

impl ColorPalette {
    pub fn from_config(colors: &UiColors) -> Self {
        Self {
            primary: UiColors::rgb565(colors.primary),
            secondary: UiColors::rgb565(colors.secondary),
            accent: UiColors::rgb565(colors.accent),
            success: UiColors::rgb565(colors.success),
            warning: UiColors::rgb565(colors.warning),
            danger: UiColors::rgb565(colors.danger),
            background: UiColors::rgb565(colors.background),
            text: UiColors::rgb565(colors.text),
            text_secondary: UiColors::rgb565(colors.text_secondary),
        }
    }

    /// Badge color for the outdoor link state.
    pub fn link(&self, online: bool) -> Rgb565 {
        if online { self.success } else { self.danger }
    }
}

impl Default for ColorPalette {
    fn default() -> Self {
        Self::from_config(&StationConfig::DEFAULT.colors)
    }
}
