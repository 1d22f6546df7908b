//! Station configuration
//!
//! All settings are compile-time constants grouped the same way the wiring
//! diagram of the station is: GPIO assignments, broker, topics, thresholds,
//! scheduler cadences, display, palette and LED strip. The binary may patch a
//! few fields from build-time overrides before calling
//! [`StationConfig::validate`].

use core::time::Duration;

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::pixelcolor::raw::RawU16;
use thiserror::Error;

/// Display width in pixels after rotation.
pub const DISPLAY_WIDTH_PX: u16 = 320;

/// Display height in pixels after rotation.
pub const DISPLAY_HEIGHT_PX: u16 = 240;

/// Number of pixels on the status LED strip.
pub const LED_COUNT: usize = 2;

/// Number of outdoor temperature samples kept for the daily statistics.
pub const HISTORY_CAPACITY: usize = 24;

/// Reference sea-level pressure used for the altitude estimate.
pub const SEA_LEVEL_PRESSURE_HPA: f32 = 1013.25;

/// Raspberry Pi BCM pin assignments driven as plain GPIO lines.
///
/// Chip select, the LED data line and the I2C pins belong to the kernel
/// drivers behind [`DevicePaths`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GpioPins {
    pub tft_dc: u32,
    pub tft_rst: u32,
    pub button: u32,
}

/// Linux device nodes used by the real hardware backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DevicePaths {
    pub i2c_bus: &'static str,
    pub display_spi: &'static str,
    pub led_spi: &'static str,
    pub gpio_chip: &'static str,
    pub thermal_zone: &'static str,
}

/// Local MQTT broker the outdoor node publishes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BrokerConfig {
    pub host: &'static str,
    pub port: u16,
    pub client_id: &'static str,
    pub keep_alive: Duration,
}

/// Topic paths of the outdoor node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TopicPaths {
    pub exterior_temp: &'static str,
    pub exterior_hum: &'static str,
    pub exterior_pres: &'static str,
    pub exterior_status: &'static str,
}

/// Temperature and freshness thresholds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    /// Outdoor temperature at or below which a cold alert fires (°C).
    pub freeze_warning: f32,
    /// Outdoor temperature at or above which a hot alert fires (°C).
    pub heat_warning: f32,
    /// Jump between consecutive outdoor temperatures that gets highlighted (°C).
    pub temp_change_alarm: f32,
    /// Global cooldown shared by hot and cold alerts.
    pub min_alert_interval: Duration,
    /// Age after which remote data is no longer fresh.
    pub remote_stale_window: Duration,
    /// Age after which remote data is considered very old.
    pub remote_very_stale_window: Duration,
}

/// Periods of the main loop tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cadences {
    pub loop_tick: Duration,
    pub sensor_sample: Duration,
    pub led_update: Duration,
    pub stats_recompute: Duration,
    pub display_update: Duration,
    pub button_debounce: Duration,
}

/// TFT panel settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayConfig {
    pub width: u16,
    pub height: u16,
    /// Quarter turns applied to the native portrait panel.
    pub rotation: u8,
    pub spi_speed_hz: u32,
}

/// Interface colors, raw RGB565.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UiColors {
    pub primary: u16,
    pub secondary: u16,
    pub accent: u16,
    pub success: u16,
    pub warning: u16,
    pub danger: u16,
    pub background: u16,
    pub text: u16,
    pub text_secondary: u16,
}

/// Addressable LED strip settings. The strip only latches a frame when the
/// LED update writes it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LedConfig {
    pub count: usize,
    pub brightness: f32,
}

/// Complete station configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StationConfig {
    pub gpio: GpioPins,
    pub devices: DevicePaths,
    pub broker: BrokerConfig,
    pub topics: TopicPaths,
    pub thresholds: Thresholds,
    pub cadences: Cadences,
    pub display: DisplayConfig,
    pub colors: UiColors,
    pub leds: LedConfig,
    /// Substitute simulated hardware and telemetry for the real devices.
    pub test_mode: bool,
}

impl StationConfig {
    pub const DEFAULT: StationConfig = StationConfig {
        gpio: GpioPins {
            tft_dc: 24,
            tft_rst: 25,
            button: 6,
        },
        devices: DevicePaths {
            i2c_bus: "/dev/i2c-1",
            display_spi: "/dev/spidev0.0",
            led_spi: "/dev/spidev1.0",
            gpio_chip: "/dev/gpiochip0",
            thermal_zone: "/sys/class/thermal/thermal_zone0/temp",
        },
        broker: BrokerConfig {
            host: "192.168.1.184",
            port: 1883,
            client_id: "meteo-station",
            keep_alive: Duration::from_secs(60),
        },
        topics: TopicPaths {
            exterior_temp: "estacion/exterior/temperatura",
            exterior_hum: "estacion/exterior/humedad",
            exterior_pres: "estacion/exterior/presion",
            exterior_status: "estacion/exterior/estado",
        },
        thresholds: Thresholds {
            freeze_warning: 2.0,
            heat_warning: 35.0,
            temp_change_alarm: 3.0,
            min_alert_interval: Duration::from_secs(300),
            remote_stale_window: Duration::from_secs(300),
            remote_very_stale_window: Duration::from_secs(600),
        },
        cadences: Cadences {
            loop_tick: Duration::from_millis(100),
            sensor_sample: Duration::from_secs(30),
            led_update: Duration::from_secs(5),
            stats_recompute: Duration::from_secs(300),
            display_update: Duration::from_secs(2),
            button_debounce: Duration::from_millis(500),
        },
        display: DisplayConfig {
            width: DISPLAY_WIDTH_PX,
            height: DISPLAY_HEIGHT_PX,
            rotation: 1,
            spi_speed_hz: 64_000_000,
        },
        colors: UiColors {
            primary: 0x06B6,
            secondary: 0xFD20,
            accent: 0x8C51,
            success: 0x07E0,
            warning: 0xFFE0,
            danger: 0xF800,
            background: 0x0841,
            text: 0xFFFF,
            text_secondary: 0xC618,
        },
        leds: LedConfig {
            count: LED_COUNT,
            brightness: 0.3,
        },
        test_mode: false,
    };

    /// Check the configuration for values the runtime cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let t = &self.thresholds;

        for (name, value) in [
            ("freeze_warning", t.freeze_warning),
            ("heat_warning", t.heat_warning),
            ("temp_change_alarm", t.temp_change_alarm),
        ] {
            if !value.is_finite() {
                return Err(ConfigError::NonFinite { name });
            }
        }

        if t.freeze_warning >= t.heat_warning {
            return Err(ConfigError::InvalidThreshold {
                name: "freeze_warning",
                details: "must be below heat_warning",
            });
        }

        if t.temp_change_alarm <= 0.0 {
            return Err(ConfigError::InvalidThreshold {
                name: "temp_change_alarm",
                details: "must be positive",
            });
        }

        if t.remote_stale_window >= t.remote_very_stale_window {
            return Err(ConfigError::InvalidThreshold {
                name: "remote_stale_window",
                details: "must be shorter than remote_very_stale_window",
            });
        }

        let c = &self.cadences;
        for (name, value) in [
            ("min_alert_interval", t.min_alert_interval),
            ("remote_stale_window", t.remote_stale_window),
            ("loop_tick", c.loop_tick),
            ("sensor_sample", c.sensor_sample),
            ("led_update", c.led_update),
            ("stats_recompute", c.stats_recompute),
            ("display_update", c.display_update),
        ] {
            if value.is_zero() {
                return Err(ConfigError::ZeroInterval { name });
            }
        }

        if !(self.leds.brightness > 0.0 && self.leds.brightness <= 1.0) {
            return Err(ConfigError::InvalidThreshold {
                name: "brightness",
                details: "must be in (0, 1]",
            });
        }

        let g = &self.gpio;
        if g.tft_dc == g.tft_rst || g.button == g.tft_dc || g.button == g.tft_rst {
            return Err(ConfigError::InvalidThreshold {
                name: "gpio",
                details: "each line can only be requested once",
            });
        }

        if self.leds.count != LED_COUNT {
            return Err(ConfigError::InvalidThreshold {
                name: "led count",
                details: "the status strip has exactly two pixels",
            });
        }

        if self.broker.host.is_empty() {
            return Err(ConfigError::Missing { name: "broker host" });
        }

        Ok(())
    }
}

/// Deployment settings baked in at build time, as raw text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Overrides {
    pub broker_host: Option<&'static str>,
    pub broker_port: Option<&'static str>,
    pub client_id: Option<&'static str>,
    pub test_mode: Option<&'static str>,
}

impl StationConfig {
    /// Apply `overrides` on top of this configuration.
    pub fn with_overrides(mut self, overrides: &Overrides) -> Result<Self, ConfigError> {
        if let Some(host) = overrides.broker_host {
            self.broker.host = host.trim();
        }

        if let Some(port) = overrides.broker_port {
            self.broker.port = port.trim().parse().map_err(|_| ConfigError::Unparseable {
                name: "broker port",
                value: port.to_owned(),
            })?;
        }

        if let Some(client_id) = overrides.client_id {
            self.broker.client_id = client_id.trim();
        }

        if let Some(flag) = overrides.test_mode {
            self.test_mode = parse_flag("test mode", flag)?;
        }

        Ok(self)
    }
}

fn parse_flag(name: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ConfigError::Unparseable {
            name,
            value: value.to_owned(),
        }),
    }
}

impl Default for StationConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl UiColors {
    /// Convert a raw palette entry into an `Rgb565` color.
    pub fn rgb565(raw: u16) -> Rgb565 {
        Rgb565::from(RawU16::new(raw))
    }
}

/// Errors that make the configuration unusable. Always fatal at startup.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("threshold {name} is not a finite number")]
    NonFinite { name: &'static str },
    #[error("invalid {name}: {details}")]
    InvalidThreshold {
        name: &'static str,
        details: &'static str,
    },
    #[error("interval {name} must not be zero")]
    ZeroInterval { name: &'static str },
    #[error("{name} is not configured")]
    Missing { name: &'static str },
    #[error("cannot parse {name} from {value:?}")]
    Unparseable { name: &'static str, value: String },
}
