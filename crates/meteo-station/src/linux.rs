//! Raspberry Pi peripherals over the Linux userspace drivers
//!
//! Every device is brought up on its own. One that fails is logged and left
//! out, and the station keeps running with the rest.

use std::thread;
use std::time::Duration;

use anyhow::{Context as _, Result, anyhow};
use embedded_graphics::pixelcolor::Rgb888;
use linux_embedded_hal::gpio_cdev::{Chip, LineRequestFlags};
use linux_embedded_hal::spidev::{SpiModeFlags, SpidevOptions};
use linux_embedded_hal::{CdevPin, Delay, I2cdev, SpidevBus, SpidevDevice};
use log::{error, info};
use meteo_core::button::ActiveLowButton;
use meteo_core::config::{DisplayConfig, GpioPins, LedConfig, StationConfig};
use meteo_core::hardware::Peripherals;
use meteo_core::leds::{LedFrame, SPI_FREQUENCY_HZ, StatusLeds, Ws2812Spi};
use meteo_core::sensors::{BMP280_DEFAULT_ADDRESS, Bmp280};
use mipidsi::interface::SpiInterface;
use mipidsi::models::ILI9341Rgb565;
use mipidsi::options::{ColorOrder, Orientation, Rotation};
use mipidsi::{Builder as MipidsiBuilder, Display};

use crate::system_info::ProcSystemMonitor;

/// Bytes batched per SPI transfer to the panel.
const PANEL_BUFFER_LEN: usize = 4096;

/// Native portrait size of the ILI9341.
const PANEL_NATIVE_WIDTH: u16 = 240;
const PANEL_NATIVE_HEIGHT: u16 = 320;

const SELF_TEST_COLOR: Rgb888 = Rgb888::new(0, 255, 0);
const SELF_TEST_DURATION: Duration = Duration::from_millis(500);

type Panel = Display<SpiInterface<'static, SpidevDevice, CdevPin>, ILI9341Rgb565, CdevPin>;

pub type LinuxHardware = Peripherals<
    Bmp280<I2cdev>,
    Ws2812Spi<SpidevBus>,
    ActiveLowButton<CdevPin>,
    Panel,
    ProcSystemMonitor,
>;

/// Bring up every peripheral described by `config`.
pub fn open(config: &StationConfig) -> LinuxHardware {
    let devices = &config.devices;

    let sensor = report("BMP280", open_sensor(devices.i2c_bus));
    let leds = report("LED strip", open_leds(devices.led_spi, &config.leds));
    let button = report(
        "button",
        open_button(devices.gpio_chip, config.gpio.button),
    );
    let display = report(
        "display",
        open_display(devices.display_spi, devices.gpio_chip, &config.gpio, &config.display),
    );

    Peripherals {
        sensor,
        leds,
        button,
        display,
        monitor: ProcSystemMonitor::new(devices.thermal_zone),
    }
}

fn report<T>(name: &str, device: Result<T>) -> Option<T> {
    match device {
        Ok(device) => {
            info!("{} ready", name);
            Some(device)
        }
        Err(e) => {
            error!("{} unavailable: {:#}", name, e);
            None
        }
    }
}

fn open_sensor(path: &str) -> Result<Bmp280<I2cdev>> {
    let i2c = I2cdev::new(path).with_context(|| format!("failed to open {}", path))?;
    Bmp280::new(i2c, BMP280_DEFAULT_ADDRESS).context("failed to initialize BMP280")
}

fn open_leds(path: &str, config: &LedConfig) -> Result<Ws2812Spi<SpidevBus>> {
    let mut spi = SpidevBus::open(path).map_err(|e| anyhow!("failed to open {}: {:?}", path, e))?;
    spi.configure(
        &SpidevOptions::new()
            .bits_per_word(8)
            .max_speed_hz(SPI_FREQUENCY_HZ)
            .mode(SpiModeFlags::SPI_MODE_0)
            .build(),
    )
    .context("failed to configure LED SPI")?;

    let mut leds = Ws2812Spi::new(spi, config.brightness);

    // Brief green flash shows the strip is wired up.
    leds.show(&LedFrame::solid(SELF_TEST_COLOR))
        .context("LED self-test failed")?;
    thread::sleep(SELF_TEST_DURATION);
    leds.show(&LedFrame::OFF).context("LED self-test failed")?;

    Ok(leds)
}

fn request_line(chip_path: &str, offset: u32, flags: LineRequestFlags, default: u8) -> Result<CdevPin> {
    let mut chip = Chip::new(chip_path).with_context(|| format!("failed to open {}", chip_path))?;
    let handle = chip
        .get_line(offset)
        .and_then(|line| line.request(flags, default, "meteo-station"))
        .with_context(|| format!("failed to request GPIO{}", offset))?;
    CdevPin::new(handle).with_context(|| format!("failed to wrap GPIO{}", offset))
}

fn open_button(chip_path: &str, pin: u32) -> Result<ActiveLowButton<CdevPin>> {
    // The pull-up is set in the boot config (gpio=6=ip,pu).
    let pin = request_line(chip_path, pin, LineRequestFlags::INPUT, 0)?;
    Ok(ActiveLowButton::new(pin))
}

fn open_display(
    spi_path: &str,
    chip_path: &str,
    gpio: &GpioPins,
    config: &DisplayConfig,
) -> Result<Panel> {
    let mut spi =
        SpidevDevice::open(spi_path).map_err(|e| anyhow!("failed to open {}: {:?}", spi_path, e))?;
    spi.configure(
        &SpidevOptions::new()
            .bits_per_word(8)
            .max_speed_hz(config.spi_speed_hz)
            .mode(SpiModeFlags::SPI_MODE_0)
            .build(),
    )
    .context("failed to configure display SPI")?;

    let dc = request_line(chip_path, gpio.tft_dc, LineRequestFlags::OUTPUT, 0)?;
    let rst = request_line(chip_path, gpio.tft_rst, LineRequestFlags::OUTPUT, 1)?;

    // Lives as long as the panel, which lives as long as the process.
    let buffer: &'static mut [u8] = Box::leak(Box::new([0u8; PANEL_BUFFER_LEN]));
    let di = SpiInterface::new(spi, dc, buffer);

    let rotation = match config.rotation % 4 {
        0 => Rotation::Deg0,
        1 => Rotation::Deg90,
        2 => Rotation::Deg180,
        _ => Rotation::Deg270,
    };

    MipidsiBuilder::new(ILI9341Rgb565, di)
        .reset_pin(rst)
        .display_size(PANEL_NATIVE_WIDTH, PANEL_NATIVE_HEIGHT)
        .orientation(Orientation::new().rotate(rotation))
        .color_order(ColorOrder::Bgr)
        .init(&mut Delay)
        .map_err(|e| anyhow!("panel init failed: {:?}", e))
}
