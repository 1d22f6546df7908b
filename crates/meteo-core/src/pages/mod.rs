//! Dashboard pages
//!
//! Two pages share the 320x240 landscape panel: [`MainPage`] with the live
//! readings and [`StatsPage`] with the daily statistics and host health.
//! Each page turns a [`PageContext`] into a list of labels and then draws
//! them; the [`PageManager`] keeps track of which one is visible.

pub mod main_page;
pub mod page;
pub mod page_manager;
pub mod stats_page;

pub use main_page::MainPage;
pub use page::{Page, PageWrapper};
pub use page_manager::PageManager;
pub use stats_page::StatsPage;

use core::time::Duration;

use chrono::NaiveDateTime;
use embedded_graphics::Drawable as EgDrawable;
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{Line, PrimitiveStyle, Rectangle};
use embedded_graphics::text::Alignment;

use crate::store::StationData;
use crate::system::SystemInfo;
use crate::ui::{ColorPalette, Label, TextSize};

/// Height of the title bar at the top of every page.
pub const HEADER_HEIGHT_PX: i32 = 28;

/// Horizontal margin of the page content.
pub const MARGIN_PX: i32 = 8;

/// Everything a page needs to lay itself out.
#[derive(Debug, Clone, Copy)]
pub struct PageContext<'a> {
    pub data: &'a StationData,
    pub system: &'a SystemInfo,
    /// Monotonic time, used for blinking.
    pub now: Duration,
    pub local_time: NaiveDateTime,
    pub palette: &'a ColorPalette,
}

/// Title on the left, local time and date on the right.
fn header_labels(title: &str, ctx: &PageContext<'_>, bounds: &Rectangle) -> [Label; 2] {
    let right = bounds.top_left.x + bounds.size.width as i32 - MARGIN_PX;
    [
        Label::new(
            title,
            Point::new(MARGIN_PX, 5),
            TextSize::Large,
            ctx.palette.primary,
        ),
        Label::new(
            ctx.local_time.format("%H:%M  %d/%m/%Y").to_string(),
            Point::new(right, 8),
            TextSize::Medium,
            ctx.palette.text_secondary,
        )
        .with_alignment(Alignment::Right),
    ]
}

/// Background and the separator under the header.
fn draw_chrome<D: DrawTarget<Color = Rgb565>>(
    display: &mut D,
    bounds: &Rectangle,
    palette: &ColorPalette,
) -> Result<(), D::Error> {
    bounds
        .into_styled(PrimitiveStyle::with_fill(palette.background))
        .draw(display)?;

    let right = bounds.top_left.x + bounds.size.width as i32 - 1;
    Line::new(
        Point::new(0, HEADER_HEIGHT_PX),
        Point::new(right, HEADER_HEIGHT_PX),
    )
    .into_styled(PrimitiveStyle::with_stroke(palette.accent, 1))
    .draw(display)?;

    Ok(())
}

/// Replace `current` with `next`, returning whether anything changed.
fn replace_labels(current: &mut Vec<Label>, next: Vec<Label>) -> bool {
    if *current == next {
        return false;
    }
    *current = next;
    true
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use chrono::NaiveDate;

    pub fn local_time() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, 15)
            .and_then(|d| d.and_hms_opt(14, 30, 0))
            .unwrap()
    }

    pub fn texts(labels: &[Label]) -> Vec<&str> {
        labels.iter().map(|l| l.text.as_str()).collect()
    }

    pub fn contains(labels: &[Label], needle: &str) -> bool {
        labels.iter().any(|l| l.text.contains(needle))
    }
}
