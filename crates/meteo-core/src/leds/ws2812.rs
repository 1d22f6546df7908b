//! WS2812 ("NeoPixel") strip driven from an SPI bus
//!
//! Every data bit is stretched to three SPI bits at 2.4 MHz, which gives the
//! 0.4 µs / 0.8 µs pulse widths the LEDs expect: `1` becomes `110` and `0`
//! becomes `100`. Colors go out in GRB order, followed by a run of zero bytes
//! that holds the line low long enough to latch the frame.

use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::RgbColor;
use embedded_hal::spi::SpiBus;
use log::{debug, error};

use super::{LedError, LedFrame, StatusLeds};
use crate::climate::scale;

/// SPI clock that makes one encoded bit last 1.25 µs.
pub const SPI_FREQUENCY_HZ: u32 = 2_400_000;

/// Trailing low bytes, about 300 µs at 2.4 MHz.
pub const RESET_BYTES: usize = 90;

/// Expand one color byte into its 24-bit SPI pattern, most significant bit first.
pub const fn encode_byte(byte: u8) -> [u8; 3] {
    let mut bits: u32 = 0;
    let mut i = 8;
    while i > 0 {
        i -= 1;
        let pattern = if byte & (1 << i) != 0 { 0b110 } else { 0b100 };
        bits = (bits << 3) | pattern;
    }
    [(bits >> 16) as u8, (bits >> 8) as u8, bits as u8]
}

pub struct Ws2812Spi<S> {
    spi: S,
    brightness: f32,
    buffer: Vec<u8>,
}

impl<S: SpiBus> Ws2812Spi<S> {
    pub fn new(spi: S, brightness: f32) -> Self {
        Self {
            spi,
            brightness,
            buffer: Vec::new(),
        }
    }

    /// Encode a full frame into the transmit buffer.
    fn encode(&mut self, pixels: &[Rgb888]) {
        self.buffer.clear();
        for pixel in pixels {
            let dimmed = scale(*pixel, self.brightness);
            for channel in [dimmed.g(), dimmed.r(), dimmed.b()] {
                self.buffer.extend_from_slice(&encode_byte(channel));
            }
        }
        self.buffer.resize(self.buffer.len() + RESET_BYTES, 0);
    }
}

impl<S: SpiBus> StatusLeds for Ws2812Spi<S> {
    fn show(&mut self, frame: &LedFrame) -> Result<(), LedError> {
        self.encode(&frame.pixels);
        debug!("Writing {} bytes to LED strip", self.buffer.len());

        self.spi
            .write(&self.buffer)
            .and_then(|_| self.spi.flush())
            .map_err(|e| {
                error!("LED strip SPI write failed: {:?}", e);
                LedError::WriteFailed {
                    details: "SPI transfer error",
                }
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::spi::{ErrorKind, ErrorType};

    #[derive(Default)]
    struct CaptureBus {
        written: Vec<u8>,
    }

    impl ErrorType for CaptureBus {
        type Error = ErrorKind;
    }

    impl SpiBus for CaptureBus {
        fn read(&mut self, _words: &mut [u8]) -> Result<(), Self::Error> {
            Ok(())
        }

        fn write(&mut self, words: &[u8]) -> Result<(), Self::Error> {
            self.written.extend_from_slice(words);
            Ok(())
        }

        fn transfer(&mut self, _read: &mut [u8], write: &[u8]) -> Result<(), Self::Error> {
            self.write(write)
        }

        fn transfer_in_place(&mut self, _words: &mut [u8]) -> Result<(), Self::Error> {
            Ok(())
        }

        fn flush(&mut self) -> Result<(), Self::Error> {
            Ok(())
        }
    }

    #[test]
    fn test_bit_patterns() {
        assert_eq!(encode_byte(0x00), [0x92, 0x49, 0x24]);
        assert_eq!(encode_byte(0xFF), [0xDB, 0x6D, 0xB6]);
    }

    #[test]
    fn test_frame_is_grb_with_brightness_and_reset() {
        let mut strip = Ws2812Spi::new(CaptureBus::default(), 0.3);
        let frame = LedFrame {
            pixels: [Rgb888::new(255, 0, 0), Rgb888::new(0, 0, 0)],
        };
        strip.show(&frame).unwrap();

        let written = strip.spi.written;
        assert_eq!(written.len(), 2 * 9 + RESET_BYTES);

        // First pixel: green 0, red 255 * 0.3 = 77, blue 0.
        assert_eq!(written[0..3], encode_byte(0));
        assert_eq!(written[3..6], encode_byte(77));
        assert_eq!(written[6..9], encode_byte(0));
        assert!(written[18..].iter().all(|&b| b == 0));
    }
}
