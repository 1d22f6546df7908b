//! Daily statistics and host health page

use embedded_graphics::Drawable as EgDrawable;
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};

use super::{HEADER_HEIGHT_PX, MARGIN_PX, PageContext, draw_chrome, header_labels, replace_labels};
use crate::climate::ClimateClass;
use crate::config::HISTORY_CAPACITY;
use crate::levels::Severity;
use crate::pages::page::Page;
use crate::stats::Statistics;
use crate::system::format_uptime;
use crate::ui::{ColorPalette, Label, PageId, TextSize, format_value};

const TITLE: &str = "ESTADÍSTICAS";

const STATS_TOP_PX: i32 = HEADER_HEIGHT_PX + 8;

/// Area of the history bar strip.
const STRIP_TOP_PX: i32 = 128;
const STRIP_HEIGHT_PX: i32 = 44;
const BAR_WIDTH_PX: i32 = 12;
const BAR_GAP_PX: i32 = 1;

/// Shortest bar, so the coldest sample stays visible.
const MIN_BAR_PX: i32 = 3;

const SYSTEM_TOP_PX: i32 = 182;

pub struct StatsPage {
    bounds: Rectangle,
    palette: ColorPalette,
    labels: Vec<Label>,
    history: Vec<f32>,
    dirty: bool,
}

impl StatsPage {
    pub fn new(bounds: Rectangle) -> Self {
        Self {
            bounds,
            palette: ColorPalette::default(),
            labels: Vec::new(),
            history: Vec::new(),
            dirty: true,
        }
    }

    fn statistics_labels(&self, ctx: &PageContext<'_>) -> Vec<Label> {
        let palette = ctx.palette;
        let stats: Option<&Statistics> = ctx.data.stats.as_ref();
        let mut labels = vec![Label::new(
            format!("EXTERIOR  {}/{} muestras", ctx.data.history.len(), HISTORY_CAPACITY),
            Point::new(MARGIN_PX, STATS_TOP_PX),
            TextSize::Medium,
            palette.secondary,
        )];

        let rows = [
            ("Máx", stats.map(|s| s.day_max)),
            ("Mín", stats.map(|s| s.day_min)),
            ("Media", stats.map(|s| s.day_avg)),
            ("Variación", stats.map(|s| s.variation)),
        ];
        let mut y = STATS_TOP_PX + 18;
        for (name, value) in rows {
            labels.push(Label::new(
                format!("{} {}", name, format_value(value, "°C")),
                Point::new(MARGIN_PX, y),
                TextSize::Medium,
                palette.text,
            ));
            y += 16;
        }

        let x = self.bounds.top_left.x + self.bounds.size.width as i32 / 2 + MARGIN_PX;
        let trend = ctx.data.history.overall_trend();
        labels.push(Label::new(
            "Tendencia",
            Point::new(x, STATS_TOP_PX + 18),
            TextSize::Medium,
            palette.text_secondary,
        ));
        labels.push(Label::new(
            trend.label(),
            Point::new(x, STATS_TOP_PX + 34),
            TextSize::Large,
            trend.color(),
        ));

        let counters = ctx.data.counters;
        labels.push(Label::new(
            format!("MQTT {} rx {} err", counters.received, counters.dropped),
            Point::new(x, STATS_TOP_PX + 66),
            TextSize::Small,
            palette.text_secondary,
        ));
        labels
    }

    fn system_labels(&self, ctx: &PageContext<'_>) -> Vec<Label> {
        let palette = ctx.palette;
        let system = ctx.system;
        let mut y = SYSTEM_TOP_PX;
        let column = self.bounds.size.width as i32 / 3;

        let mut labels = vec![Label::new(
            "SISTEMA",
            Point::new(MARGIN_PX, y),
            TextSize::Medium,
            palette.secondary,
        )];
        y += 16;

        let temperature_color = match system.cpu_temperature {
            Some(celsius) => Severity::of_cpu_temperature(celsius).color(palette),
            None => palette.text_secondary,
        };
        for (i, (text, color)) in [
            (
                format!("CPU {:.0}%", system.cpu_percent),
                Severity::of_load(system.cpu_percent).color(palette),
            ),
            (
                format!("RAM {:.0}%", system.ram_percent),
                Severity::of_load(system.ram_percent).color(palette),
            ),
            (
                format!("Temp {}", format_value(system.cpu_temperature, "°C")),
                temperature_color,
            ),
        ]
        .into_iter()
        .enumerate()
        {
            labels.push(Label::new(
                text,
                Point::new(MARGIN_PX + column * i as i32, y),
                TextSize::Medium,
                color,
            ));
        }
        y += 18;

        labels.push(Label::new(
            format!("Activo {}", format_uptime(system.uptime)),
            Point::new(MARGIN_PX, y),
            TextSize::Medium,
            palette.text_secondary,
        ));
        labels
    }

    /// Bars for the history strip, oldest on the left.
    fn history_bars(&self) -> impl Iterator<Item = (Rectangle, Rgb565)> + '_ {
        let min = self.history.iter().copied().fold(f32::INFINITY, f32::min);
        let max = self.history.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        let span = (max - min).max(1.0);
        let bottom = STRIP_TOP_PX + STRIP_HEIGHT_PX;

        self.history.iter().enumerate().map(move |(i, &t)| {
            let scaled = ((t - min) / span * (STRIP_HEIGHT_PX - MIN_BAR_PX) as f32) as i32;
            let height = MIN_BAR_PX + scaled;
            let x = MARGIN_PX + i as i32 * (BAR_WIDTH_PX + BAR_GAP_PX);
            (
                Rectangle::new(
                    Point::new(x, bottom - height),
                    Size::new(BAR_WIDTH_PX as u32, height as u32),
                ),
                ClimateClass::classify(Some(t)).display_color(),
            )
        })
    }
}

impl Page for StatsPage {
    fn id(&self) -> PageId {
        PageId::Stats
    }

    fn title(&self) -> &str {
        TITLE
    }

    fn update(&mut self, ctx: &PageContext<'_>) {
        self.palette = *ctx.palette;

        let mut labels = Vec::with_capacity(16);
        labels.extend(header_labels(TITLE, ctx, &self.bounds));
        labels.extend(self.statistics_labels(ctx));
        labels.extend(self.system_labels(ctx));

        let history: Vec<f32> = ctx.data.history.iter().collect();
        if history != self.history {
            self.history = history;
            self.dirty = true;
        }
        if replace_labels(&mut self.labels, labels) {
            self.dirty = true;
        }
    }

    fn labels(&self) -> &[Label] {
        &self.labels
    }

    fn draw_page<D: DrawTarget<Color = Rgb565>>(
        &mut self,
        display: &mut D,
    ) -> Result<(), D::Error> {
        draw_chrome(display, &self.bounds, &self.palette)?;

        let strip_width = HISTORY_CAPACITY as i32 * (BAR_WIDTH_PX + BAR_GAP_PX) + 1;
        Rectangle::new(
            Point::new(MARGIN_PX - 1, STRIP_TOP_PX - 1),
            Size::new(strip_width as u32, STRIP_HEIGHT_PX as u32 + 2),
        )
        .into_styled(PrimitiveStyle::with_stroke(self.palette.accent, 1))
        .draw(display)?;

        for (bar, color) in self.history_bars() {
            bar.into_styled(PrimitiveStyle::with_fill(color))
                .draw(display)?;
        }

        for label in &self.labels {
            label.draw(display)?;
        }
        Ok(())
    }

    fn bounds(&self) -> Rectangle {
        self.bounds
    }

    fn is_dirty(&self) -> bool {
        self.dirty
    }

    fn mark_clean(&mut self) {
        self.dirty = false;
    }

    fn mark_dirty(&mut self) {
        self.dirty = true;
    }
}
