//! Positioned text labels
//!
//! Pages describe their content as a list of [`Label`]s. Keeping the text
//! separate from the drawing lets tests check what a page shows without
//! decoding pixels.

use embedded_graphics::Drawable as EgDrawable;
use embedded_graphics::mono_font::{MonoFont, MonoTextStyle, iso_8859_1};
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::text::{Alignment, Baseline, Text, TextStyleBuilder};

/// Font presets. The ISO 8859-1 fonts cover the accented labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextSize {
    /// 6x10
    Small,
    /// 7x13
    Medium,
    /// 9x18 bold
    Large,
    /// 10x20
    Huge,
}

impl TextSize {
    pub fn font(&self) -> &'static MonoFont<'static> {
        match self {
            TextSize::Small => &iso_8859_1::FONT_6X10,
            TextSize::Medium => &iso_8859_1::FONT_7X13,
            TextSize::Large => &iso_8859_1::FONT_9X18_BOLD,
            TextSize::Huge => &iso_8859_1::FONT_10X20,
        }
    }

    pub fn line_height(&self) -> i32 {
        self.font().character_size.height as i32
    }
}

/// One line of text at a fixed position, anchored at its top.
#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub text: String,
    pub position: Point,
    pub size: TextSize,
    pub color: Rgb565,
    pub alignment: Alignment,
}

impl Label {
    pub fn new(text: impl Into<String>, position: Point, size: TextSize, color: Rgb565) -> Self {
        Self {
            text: text.into(),
            position,
            size,
            color,
            alignment: Alignment::Left,
        }
    }

    pub fn with_alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }

    pub fn draw<D: DrawTarget<Color = Rgb565>>(&self, display: &mut D) -> Result<(), D::Error> {
        let character_style = MonoTextStyle::new(self.size.font(), self.color);
        let text_style = TextStyleBuilder::new()
            .alignment(self.alignment)
            .baseline(Baseline::Top)
            .build();

        Text::with_text_style(&self.text, self.position, character_style, text_style)
            .draw(display)?;
        Ok(())
    }
}
