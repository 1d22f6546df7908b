//! Page manager: holds both pages and knows which one is visible.

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use heapless::Vec;
use log::{debug, info};

use super::page::{Page, PageWrapper};
use super::{MainPage, PageContext, StatsPage};
use crate::ui::{Label, PageId};

pub struct PageManager {
    pages: Vec<PageWrapper, 2>,
    current_page: PageId,
}

impl PageManager {
    /// Manager with both dashboard pages, showing the main page.
    pub fn new(display_bounds: Rectangle) -> Self {
        let mut pages = Vec::new();
        pages
            .push(PageWrapper::Main(Box::new(MainPage::new(display_bounds))))
            .ok();
        pages
            .push(PageWrapper::Stats(Box::new(StatsPage::new(display_bounds))))
            .ok();

        Self {
            pages,
            current_page: PageId::Main,
        }
    }

    pub fn current(&self) -> PageId {
        self.current_page
    }

    fn current_page_mut(&mut self) -> Option<&mut PageWrapper> {
        self.pages.iter_mut().find(|p| p.id() == self.current_page)
    }

    fn current_page_ref(&self) -> Option<&PageWrapper> {
        self.pages.iter().find(|p| p.id() == self.current_page)
    }

    /// Show `page_id`. The page redraws completely on the next render.
    pub fn navigate_to(&mut self, page_id: PageId) {
        if page_id == self.current_page {
            return;
        }
        self.current_page = page_id;
        if let Some(page) = self.current_page_mut() {
            info!("Switched to page {}", page.title());
            page.on_activate();
        }
    }

    /// Switch to the other page and return it.
    pub fn toggle(&mut self) -> PageId {
        self.navigate_to(self.current_page.toggled());
        self.current_page
    }

    /// Lay out the visible page for new data.
    pub fn update(&mut self, ctx: &PageContext<'_>) {
        if let Some(page) = self.current_page_mut() {
            page.update(ctx);
        }
    }

    /// Text of the visible page.
    pub fn labels(&self) -> &[Label] {
        match self.current_page_ref() {
            Some(page) => page.labels(),
            None => &[],
        }
    }

    /// Draw the visible page when it changed. Returns whether it drew.
    pub fn draw<D: DrawTarget<Color = Rgb565>>(&mut self, display: &mut D) -> Result<bool, D::Error> {
        let Some(page) = self.current_page_mut() else {
            return Ok(false);
        };
        if !page.is_dirty() {
            return Ok(false);
        }

        debug!("Drawing page {}", page.title());
        page.draw_page(display)?;
        page.mark_clean();
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_on_main_and_toggles() {
        let mut manager = PageManager::new(Rectangle::new(Point::zero(), Size::new(320, 240)));
        assert_eq!(manager.current(), PageId::Main);

        assert_eq!(manager.toggle(), PageId::Stats);
        assert_eq!(manager.toggle(), PageId::Main);
    }
}
