//! Page trait and the enum that stores concrete pages
//!
//! [`PageWrapper`] lets the [`PageManager`](super::PageManager) hold both
//! pages in one collection without trait objects; `draw_page` is generic over
//! the draw target, which rules out `dyn Page` anyway.

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;

use super::{MainPage, PageContext, StatsPage};
use crate::ui::{Label, PageId};

/// A dashboard page.
///
/// Per display refresh the manager calls [`update`](Page::update) with fresh
/// data, then [`draw_page`](Page::draw_page) if the page reports itself
/// dirty, then [`mark_clean`](Page::mark_clean).
pub trait Page {
    fn id(&self) -> PageId;

    fn title(&self) -> &str;

    /// Called when the page becomes visible.
    fn on_activate(&mut self) {
        self.mark_dirty();
    }

    /// Lay the page out for new data.
    fn update(&mut self, ctx: &PageContext<'_>);

    /// Text currently on the page, in drawing order.
    fn labels(&self) -> &[Label];

    fn draw_page<D: DrawTarget<Color = Rgb565>>(&mut self, display: &mut D)
    -> Result<(), D::Error>;

    fn bounds(&self) -> Rectangle;

    fn is_dirty(&self) -> bool;

    fn mark_clean(&mut self);

    fn mark_dirty(&mut self);
}

pub enum PageWrapper {
    Main(Box<MainPage>),
    Stats(Box<StatsPage>),
}

impl Page for PageWrapper {
    fn id(&self) -> PageId {
        match self {
            PageWrapper::Main(page) => page.id(),
            PageWrapper::Stats(page) => page.id(),
        }
    }

    fn title(&self) -> &str {
        match self {
            PageWrapper::Main(page) => page.title(),
            PageWrapper::Stats(page) => page.title(),
        }
    }

    fn on_activate(&mut self) {
        match self {
            PageWrapper::Main(page) => page.on_activate(),
            PageWrapper::Stats(page) => page.on_activate(),
        }
    }

    fn update(&mut self, ctx: &PageContext<'_>) {
        match self {
            PageWrapper::Main(page) => page.update(ctx),
            PageWrapper::Stats(page) => page.update(ctx),
        }
    }

    fn labels(&self) -> &[Label] {
        match self {
            PageWrapper::Main(page) => page.labels(),
            PageWrapper::Stats(page) => page.labels(),
        }
    }

    fn draw_page<D: DrawTarget<Color = Rgb565>>(
        &mut self,
        display: &mut D,
    ) -> Result<(), D::Error> {
        match self {
            PageWrapper::Main(page) => page.draw_page(display),
            PageWrapper::Stats(page) => page.draw_page(display),
        }
    }

    fn bounds(&self) -> Rectangle {
        match self {
            PageWrapper::Main(page) => page.bounds(),
            PageWrapper::Stats(page) => page.bounds(),
        }
    }

    fn is_dirty(&self) -> bool {
        match self {
            PageWrapper::Main(page) => page.is_dirty(),
            PageWrapper::Stats(page) => page.is_dirty(),
        }
    }

    fn mark_clean(&mut self) {
        match self {
            PageWrapper::Main(page) => page.mark_clean(),
            PageWrapper::Stats(page) => page.mark_clean(),
        }
    }

    fn mark_dirty(&mut self) {
        match self {
            PageWrapper::Main(page) => page.mark_dirty(),
            PageWrapper::Stats(page) => page.mark_dirty(),
        }
    }
}
