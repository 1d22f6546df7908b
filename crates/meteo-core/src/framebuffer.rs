//! RAM frame for the TFT
//!
//! Pages draw into a [`FrameBuffer`] instead of the panel. Writes that do not
//! change a pixel are ignored; the rest grow a dirty bounding box, and
//! [`FrameBuffer::flush`] sends only that box to the panel in one transfer.

use core::convert::Infallible;

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use log::debug;

/// Inclusive pixel bounds of the changed area.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Damage {
    left: usize,
    top: usize,
    right: usize,
    bottom: usize,
}

impl Damage {
    fn at(x: usize, y: usize) -> Self {
        Self {
            left: x,
            top: y,
            right: x,
            bottom: y,
        }
    }

    fn include(&mut self, x: usize, y: usize) {
        self.left = self.left.min(x);
        self.top = self.top.min(y);
        self.right = self.right.max(x);
        self.bottom = self.bottom.max(y);
    }

    fn width(&self) -> usize {
        self.right - self.left + 1
    }

    fn height(&self) -> usize {
        self.bottom - self.top + 1
    }

    fn to_rectangle(self) -> Rectangle {
        Rectangle::new(
            Point::new(self.left as i32, self.top as i32),
            Size::new(self.width() as u32, self.height() as u32),
        )
    }
}

/// Off-screen RGB565 frame with change tracking.
pub struct FrameBuffer {
    width: usize,
    height: usize,
    pixels: Vec<Rgb565>,
    damage: Option<Damage>,
}

impl FrameBuffer {
    /// A black frame of the given size. The first flush sends everything.
    pub fn new(width: u16, height: u16) -> Self {
        let (width, height) = (usize::from(width), usize::from(height));
        let mut frame = Self {
            width,
            height,
            pixels: vec![Rgb565::BLACK; width * height],
            damage: None,
        };
        frame.invalidate();
        frame
    }

    /// Mark the whole frame as changed, e.g. after the panel was reset.
    pub fn invalidate(&mut self) {
        if self.width > 0 && self.height > 0 {
            self.damage = Some(Damage {
                left: 0,
                top: 0,
                right: self.width - 1,
                bottom: self.height - 1,
            });
        }
    }

    /// Forget pending changes without sending them anywhere.
    pub fn discard_damage(&mut self) {
        self.damage = None;
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<Rgb565> {
        if x < self.width && y < self.height {
            Some(self.pixels[y * self.width + x])
        } else {
            None
        }
    }

    /// Area that the next flush would send.
    pub fn dirty_area(&self) -> Option<Rectangle> {
        self.damage.map(Damage::to_rectangle)
    }

    #[inline]
    fn put(&mut self, x: usize, y: usize, color: Rgb565) {
        let slot = &mut self.pixels[y * self.width + x];
        if *slot == color {
            return;
        }
        *slot = color;
        match &mut self.damage {
            Some(damage) => damage.include(x, y),
            None => self.damage = Some(Damage::at(x, y)),
        }
    }

    /// Clip a rectangle to the frame, as half-open pixel ranges.
    fn clip(&self, area: &Rectangle) -> (core::ops::Range<usize>, core::ops::Range<usize>) {
        let clamp = |v: i64, max: usize| v.clamp(0, max as i64) as usize;
        let x0 = i64::from(area.top_left.x);
        let y0 = i64::from(area.top_left.y);
        let x1 = x0 + i64::from(area.size.width);
        let y1 = y0 + i64::from(area.size.height);
        (
            clamp(x0, self.width)..clamp(x1, self.width),
            clamp(y0, self.height)..clamp(y1, self.height),
        )
    }

    /// Send the changed area to `display` and reset the change tracking.
    ///
    /// Does nothing when no pixel changed since the last flush.
    pub fn flush<D>(&mut self, display: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb565>,
    {
        let Some(damage) = self.damage.take() else {
            return Ok(());
        };

        debug!(
            "Flushing {}x{} region at ({}, {})",
            damage.width(),
            damage.height(),
            damage.left,
            damage.top
        );

        let stride = self.width;
        let pixels = &self.pixels;
        let rows = (damage.top..=damage.bottom).flat_map(move |y| {
            let start = y * stride + damage.left;
            pixels[start..start + damage.width()].iter().copied()
        });

        display.fill_contiguous(&damage.to_rectangle(), rows)
    }
}

impl OriginDimensions for FrameBuffer {
    fn size(&self) -> Size {
        Size::new(self.width as u32, self.height as u32)
    }
}

impl DrawTarget for FrameBuffer {
    type Color = Rgb565;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            if let (Ok(x), Ok(y)) = (usize::try_from(point.x), usize::try_from(point.y))
                && x < self.width
                && y < self.height
            {
                self.put(x, y, color);
            }
        }
        Ok(())
    }

    fn fill_contiguous<I>(&mut self, area: &Rectangle, colors: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Self::Color>,
    {
        // Colors are laid out over the unclipped area.
        let points = area.points();
        self.draw_iter(points.zip(colors).map(|(p, c)| Pixel(p, c)))
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
        let (xs, ys) = self.clip(area);
        for y in ys {
            for x in xs.clone() {
                self.put(x, y, color);
            }
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.fill_solid(&self.bounding_box(), color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_graphics::mock_display::MockDisplay;

    #[test]
    fn test_new_frame_is_fully_dirty() {
        let frame = FrameBuffer::new(8, 4);
        assert_eq!(
            frame.dirty_area(),
            Some(Rectangle::new(Point::zero(), Size::new(8, 4)))
        );
    }

    #[test]
    fn test_unchanged_pixels_do_not_dirty() {
        let mut frame = FrameBuffer::new(8, 4);
        let mut display = MockDisplay::<Rgb565>::new();
        frame.flush(&mut display).unwrap();

        frame.clear(Rgb565::BLACK).unwrap();
        assert_eq!(frame.dirty_area(), None);
    }

    #[test]
    fn test_dirty_area_bounds_changes() {
        let mut frame = FrameBuffer::new(16, 16);
        let mut display = MockDisplay::<Rgb565>::new();
        frame.flush(&mut display).unwrap();

        Pixel(Point::new(3, 2), Rgb565::RED).draw(&mut frame).unwrap();
        Pixel(Point::new(6, 9), Rgb565::RED).draw(&mut frame).unwrap();
        Pixel(Point::new(-1, 40), Rgb565::RED).draw(&mut frame).unwrap();

        assert_eq!(
            frame.dirty_area(),
            Some(Rectangle::new(Point::new(3, 2), Size::new(4, 8)))
        );
        assert_eq!(frame.pixel(6, 9), Some(Rgb565::RED));
    }

    #[test]
    fn test_flush_sends_only_changed_area() {
        let mut frame = FrameBuffer::new(16, 16);
        let mut display = MockDisplay::<Rgb565>::new();
        frame.flush(&mut display).unwrap();

        frame
            .fill_solid(&Rectangle::new(Point::new(2, 2), Size::new(2, 1)), Rgb565::GREEN)
            .unwrap();

        let mut second = MockDisplay::<Rgb565>::new();
        frame.flush(&mut second).unwrap();
        assert_eq!(
            second.affected_area(),
            Rectangle::new(Point::new(2, 2), Size::new(2, 1))
        );
        assert_eq!(frame.dirty_area(), None);
    }
}
