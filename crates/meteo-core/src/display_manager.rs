//! Display manager
//!
//! Owns the page manager and the RAM framebuffer. On each display refresh it
//! lays the visible page out for a fresh snapshot, redraws it into the
//! framebuffer if its content changed, and hands the framebuffer to the
//! hardware, which sends only the changed area to the panel.

use core::convert::Infallible;
use core::time::Duration;

use chrono::NaiveDateTime;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use log::error;

use crate::config::{DisplayConfig, UiColors};
use crate::framebuffer::FrameBuffer;
use crate::hardware::{DisplayError, Hardware};
use crate::pages::{PageContext, PageManager};
use crate::store::StationData;
use crate::system::SystemInfo;
use crate::ui::{ColorPalette, Label, PageId};

pub struct DisplayManager {
    pages: PageManager,
    framebuffer: FrameBuffer,
    palette: ColorPalette,
    reported_error: bool,
}

impl DisplayManager {
    pub fn new(display: &DisplayConfig, colors: &UiColors) -> Self {
        let bounds = Rectangle::new(
            Point::zero(),
            Size::new(u32::from(display.width), u32::from(display.height)),
        );
        Self {
            pages: PageManager::new(bounds),
            framebuffer: FrameBuffer::new(display.width, display.height),
            palette: ColorPalette::from_config(colors),
            reported_error: false,
        }
    }

    pub fn current_page(&self) -> PageId {
        self.pages.current()
    }

    /// Switch to the other page; it is redrawn on the next render.
    pub fn toggle_page(&mut self) -> PageId {
        self.pages.toggle()
    }

    /// Text of the visible page as of the last render.
    pub fn labels(&self) -> &[Label] {
        self.pages.labels()
    }

    pub fn framebuffer(&self) -> &FrameBuffer {
        &self.framebuffer
    }

    /// Draw the visible page for `data` and push the result to the panel.
    ///
    /// Flush errors are logged once per failure streak and returned.
    pub fn render<H: Hardware + ?Sized>(
        &mut self,
        hardware: &mut H,
        data: &StationData,
        system: &SystemInfo,
        now: Duration,
        local_time: NaiveDateTime,
    ) -> Result<(), DisplayError> {
        let ctx = PageContext {
            data,
            system,
            now,
            local_time,
            palette: &self.palette,
        };
        self.pages.update(&ctx);

        // Drawing into RAM cannot fail.
        let Ok::<bool, Infallible>(_) = self.pages.draw(&mut self.framebuffer);

        match hardware.present(&mut self.framebuffer) {
            Ok(()) => {
                self.reported_error = false;
                Ok(())
            }
            Err(e) => {
                if !self.reported_error {
                    error!("Display update failed: {}", e);
                    self.reported_error = true;
                }
                // Resend the whole frame once the panel recovers.
                self.framebuffer.invalidate();
                Err(e)
            }
        }
    }
}
