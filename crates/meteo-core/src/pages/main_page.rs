//! Live readings page
//!
//! Layout (320x240):
//! - Header: station title, local time and date
//! - Left column: interior temperature with trend, pressure, altitude
//! - Right column: exterior temperature with trend, humidity, pressure with
//!   its ALTA/NORMAL/BAJA level, feels-like and the link badge
//! - Bottom: climate class of the outdoor temperature in its color

use embedded_graphics::Drawable as EgDrawable;
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{Line, PrimitiveStyle, Rectangle};
use embedded_graphics::text::Alignment;

use super::{
    HEADER_HEIGHT_PX, MARGIN_PX, PageContext, draw_chrome, header_labels, replace_labels,
};
use crate::climate::ClimateClass;
use crate::levels::PressureLevel;
use crate::pages::page::Page;
use crate::sensors::Reading;
use crate::store::RemoteReading;
use crate::ui::{ColorPalette, Label, PageId, TextSize, format_value};

const TITLE: &str = "ESTACIÓN METEO";

/// Top of the reading columns.
const COLUMNS_TOP_PX: i32 = HEADER_HEIGHT_PX + 8;

/// Bottom of the reading columns, where the climate band starts.
const CLIMATE_TOP_PX: i32 = 150;

pub struct MainPage {
    bounds: Rectangle,
    palette: ColorPalette,
    labels: Vec<Label>,
    dirty: bool,
}

impl MainPage {
    pub fn new(bounds: Rectangle) -> Self {
        Self {
            bounds,
            palette: ColorPalette::default(),
            labels: Vec::new(),
            dirty: true,
        }
    }

    fn column_x(&self) -> i32 {
        self.bounds.top_left.x + self.bounds.size.width as i32 / 2 + MARGIN_PX
    }

    fn interior_labels(&self, local: Option<&Reading>, palette: &ColorPalette) -> Vec<Label> {
        let x = MARGIN_PX;
        let mut y = COLUMNS_TOP_PX;
        let mut labels = vec![Label::new(
            "INTERIOR",
            Point::new(x, y),
            TextSize::Medium,
            palette.secondary,
        )];
        y += 18;

        let temperature = match local {
            Some(r) => format!("{} {}", format_value(Some(r.temperature), "°C"), r.trend.symbol()),
            None => format_value(None, ""),
        };
        labels.push(Label::new(temperature, Point::new(x, y), TextSize::Huge, palette.text));
        y += 28;

        labels.push(Label::new(
            format!("Presión {}", format_value(local.map(|r| r.pressure), " hPa")),
            Point::new(x, y),
            TextSize::Small,
            palette.text_secondary,
        ));
        y += 14;
        labels.push(Label::new(
            format!("Altitud {}", format_value(local.map(|r| r.altitude), " m")),
            Point::new(x, y),
            TextSize::Small,
            palette.text_secondary,
        ));
        labels
    }

    fn exterior_labels(&self, remote: &RemoteReading, palette: &ColorPalette) -> Vec<Label> {
        let x = self.column_x();
        let right = self.bounds.top_left.x + self.bounds.size.width as i32 - MARGIN_PX;
        let mut y = COLUMNS_TOP_PX;

        let mut labels = vec![
            Label::new("EXTERIOR", Point::new(x, y), TextSize::Medium, palette.secondary),
            Label::new(
                if remote.online { "ONLINE" } else { "OFFLINE" },
                Point::new(right, y + 2),
                TextSize::Small,
                palette.link(remote.online),
            )
            .with_alignment(Alignment::Right),
        ];
        y += 18;

        let (temperature, color) = match remote.temperature {
            Some(t) => {
                let color = if remote.sudden_change {
                    palette.warning
                } else {
                    palette.text
                };
                (
                    format!("{} {}", format_value(Some(t), "°C"), remote.trend.symbol()),
                    color,
                )
            }
            None => (format_value(None, ""), palette.text),
        };
        labels.push(Label::new(temperature, Point::new(x, y), TextSize::Huge, color));
        y += 28;

        let pressure_level = remote.pressure.map(PressureLevel::classify);
        for (text, level) in [
            (format!("Humedad {}", format_value(remote.humidity, "%")), None),
            (
                format!("Presión {}", format_value(remote.pressure, " hPa")),
                pressure_level,
            ),
            (format!("Sensación {}", format_value(remote.feels_like, "°C")), None),
        ] {
            labels.push(Label::new(
                text,
                Point::new(x, y),
                TextSize::Small,
                palette.text_secondary,
            ));
            if let Some(level) = level {
                labels.push(
                    Label::new(
                        level.label(),
                        Point::new(right, y),
                        TextSize::Small,
                        level.severity().color(palette),
                    )
                    .with_alignment(Alignment::Right),
                );
            }
            y += 14;
        }

        if remote.sudden_change {
            labels.push(Label::new(
                "CAMBIO BRUSCO",
                Point::new(x, y),
                TextSize::Small,
                palette.warning,
            ));
        }
        labels
    }

    fn climate_labels(&self, remote: &RemoteReading, palette: &ColorPalette) -> [Label; 2] {
        let class = ClimateClass::classify(remote.temperature);
        let center = self.bounds.top_left.x + self.bounds.size.width as i32 / 2;
        [
            Label::new(
                "CLIMA EXTERIOR",
                Point::new(center, CLIMATE_TOP_PX + 8),
                TextSize::Medium,
                palette.secondary,
            )
            .with_alignment(Alignment::Center),
            Label::new(
                class.label(),
                Point::new(center, CLIMATE_TOP_PX + 32),
                TextSize::Huge,
                class.display_color(),
            )
            .with_alignment(Alignment::Center),
        ]
    }
}

impl Page for MainPage {
    fn id(&self) -> PageId {
        PageId::Main
    }

    fn title(&self) -> &str {
        TITLE
    }

    fn update(&mut self, ctx: &PageContext<'_>) {
        self.palette = *ctx.palette;

        let mut labels = Vec::with_capacity(16);
        labels.extend(header_labels(TITLE, ctx, &self.bounds));
        labels.extend(self.interior_labels(ctx.data.local.as_ref(), ctx.palette));
        labels.extend(self.exterior_labels(&ctx.data.remote, ctx.palette));
        labels.extend(self.climate_labels(&ctx.data.remote, ctx.palette));

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

        let separator = PrimitiveStyle::with_stroke(self.palette.accent, 1);
        let middle = self.bounds.top_left.x + self.bounds.size.width as i32 / 2;
        Line::new(
            Point::new(middle, COLUMNS_TOP_PX),
            Point::new(middle, CLIMATE_TOP_PX - 6),
        )
        .into_styled(separator)
        .draw(display)?;

        let right = self.bounds.top_left.x + self.bounds.size.width as i32 - 1;
        Line::new(Point::new(0, CLIMATE_TOP_PX), Point::new(right, CLIMATE_TOP_PX))
            .into_styled(separator)
            .draw(display)?;

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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StationConfig;
    use crate::pages::test_support::{contains, local_time};
    use crate::sensors::EnvironmentSample;
    use crate::store::{RemoteField, StationData};
    use crate::system::SystemInfo;
    use core::time::Duration;

    fn bounds() -> Rectangle {
        Rectangle::new(Point::zero(), Size::new(320, 240))
    }

    fn layout(data: &StationData) -> MainPage {
        let palette = ColorPalette::default();
        let system = SystemInfo::default();
        let mut page = MainPage::new(bounds());
        page.update(&PageContext {
            data,
            system: &system,
            now: Duration::from_secs(10),
            local_time: local_time(),
            palette: &palette,
        });
        page
    }

    #[test]
    fn test_empty_station_shows_placeholders() {
        let page = layout(&StationData::default());
        let labels = page.labels();

        assert!(contains(labels, "SIN DATOS"));
        assert!(contains(labels, "OFFLINE"));
        assert!(contains(labels, "Humedad --"));
        assert!(contains(labels, "Presión --"));
        assert!(contains(labels, "14:30  15/01/2025"));
    }

    #[test]
    fn test_readings_appear_on_main_page() {
        let thresholds = StationConfig::DEFAULT.thresholds;
        let mut data = StationData::default();
        data.apply_local(Reading::new(
            EnvironmentSample {
                temperature_celsius: 22.5,
                pressure_hpa: 1015.2,
                altitude_m: 150.0,
            },
            Duration::ZERO,
        ));
        data.apply_outdoor_temperature(24.0, Duration::from_secs(5), &thresholds);

        let page = layout(&data);
        let labels = page.labels();

        assert!(contains(labels, "22.5°C"));
        assert!(contains(labels, "Presión 1015.2 hPa"));
        assert!(contains(labels, "Altitud 150.0 m"));
        assert!(contains(labels, "24.0°C"));
        assert!(contains(labels, "Sensación 22.0°C"));
        assert!(contains(labels, "ONLINE"));
        assert!(contains(labels, "ÓPTIMO"));
        assert!(!contains(labels, "CPU"));
    }

    #[test]
    fn test_sudden_change_is_highlighted() {
        let palette = ColorPalette::default();
        let thresholds = StationConfig::DEFAULT.thresholds;
        let mut data = StationData::default();
        data.apply_outdoor_temperature(10.0, Duration::ZERO, &thresholds);
        data.apply_outdoor_temperature(14.0, Duration::from_secs(60), &thresholds);

        let page = layout(&data);
        let temperature = page
            .labels()
            .iter()
            .find(|l| l.text.starts_with("14.0°C"))
            .unwrap();
        assert_eq!(temperature.color, palette.warning);
        assert!(contains(page.labels(), "CAMBIO BRUSCO"));
    }

    #[test]
    fn test_outdoor_pressure_level_is_shown() {
        let palette = ColorPalette::default();
        let mut data = StationData::default();

        for (hpa, text, color) in [
            (1025.0, "ALTA", palette.success),
            (1010.0, "NORMAL", palette.warning),
            (995.0, "BAJA", palette.danger),
        ] {
            data.apply_remote_field(RemoteField::Pressure(hpa), Duration::ZERO);
            let page = layout(&data);
            let level = page.labels().iter().find(|l| l.text == text).unwrap();
            assert_eq!(level.color, color);
        }
    }

    #[test]
    fn test_no_pressure_level_without_data() {
        let page = layout(&StationData::default());
        for text in ["ALTA", "NORMAL", "BAJA"] {
            assert!(!page.labels().iter().any(|l| l.text == text));
        }
    }

    #[test]
    fn test_dirty_only_when_text_changes() {
        let data = StationData::default();
        let palette = ColorPalette::default();
        let system = SystemInfo::default();
        let ctx = PageContext {
            data: &data,
            system: &system,
            now: Duration::ZERO,
            local_time: local_time(),
            palette: &palette,
        };

        let mut page = MainPage::new(bounds());
        page.update(&ctx);
        assert!(page.is_dirty());
        page.mark_clean();

        page.update(&ctx);
        assert!(!page.is_dirty());
    }
}
