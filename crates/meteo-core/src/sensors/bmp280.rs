//! BMP280 / BME280 temperature and pressure sensor over I²C
//!
//! Only the temperature and pressure channels are used. The chip runs in
//! normal mode, so a read just fetches the latest conversion and applies the
//! factory compensation from the datasheet (floating point variant).

use embedded_hal::i2c::I2c;
use log::{error, info};

use super::{EnvironmentSample, EnvironmentSensor, SensorError};
use crate::config::SEA_LEVEL_PRESSURE_HPA;

/// Address with SDO pulled high, the default on most breakout boards.
pub const BMP280_DEFAULT_ADDRESS: u8 = 0x77;

const SENSOR_NAME: &str = "BMP280";

const REG_CHIP_ID: u8 = 0xD0;
const REG_CALIBRATION: u8 = 0x88;
const REG_CTRL_MEAS: u8 = 0xF4;
const REG_CONFIG: u8 = 0xF5;
const REG_DATA: u8 = 0xF7;

const CHIP_ID_BMP280: u8 = 0x58;
const CHIP_ID_BME280: u8 = 0x60;

/// Temperature oversampling x2, pressure oversampling x16, normal mode.
const CTRL_MEAS_NORMAL: u8 = 0b010_101_11;

/// 0.5 ms standby, IIR filter coefficient 4.
const CONFIG_FILTER_X4: u8 = 0b000_010_00;

/// Exponent of the international barometric formula.
const BAROMETRIC_EXPONENT: f32 = 0.1903;

/// Factory trimming parameters read once at startup.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Calibration {
    t1: f64,
    t2: f64,
    t3: f64,
    p: [f64; 9],
}

impl Calibration {
    fn from_bytes(raw: &[u8; 24]) -> Self {
        let unsigned = |i: usize| f64::from(u16::from_le_bytes([raw[i], raw[i + 1]]));
        let signed = |i: usize| f64::from(i16::from_le_bytes([raw[i], raw[i + 1]]));

        let mut p = [0.0; 9];
        p[0] = unsigned(6);
        for (n, value) in p.iter_mut().enumerate().skip(1) {
            *value = signed(6 + n * 2);
        }

        Self {
            t1: unsigned(0),
            t2: signed(2),
            t3: signed(4),
            p,
        }
    }

    /// Returns the temperature in °C and the fine temperature used by the
    /// pressure compensation.
    fn compensate_temperature(&self, adc_t: i32) -> (f64, f64) {
        let adc_t = f64::from(adc_t);
        let var1 = (adc_t / 16384.0 - self.t1 / 1024.0) * self.t2;
        let delta = adc_t / 131072.0 - self.t1 / 8192.0;
        let var2 = delta * delta * self.t3;
        let t_fine = var1 + var2;
        (t_fine / 5120.0, t_fine)
    }

    /// Returns the pressure in Pa, or `None` when the calibration would divide by zero.
    fn compensate_pressure(&self, adc_p: i32, t_fine: f64) -> Option<f64> {
        let p = &self.p;
        let mut var1 = t_fine / 2.0 - 64000.0;
        let mut var2 = var1 * var1 * p[5] / 32768.0;
        var2 += var1 * p[4] * 2.0;
        var2 = var2 / 4.0 + p[3] * 65536.0;
        var1 = (p[2] * var1 * var1 / 524288.0 + p[1] * var1) / 524288.0;
        var1 = (1.0 + var1 / 32768.0) * p[0];
        if var1 == 0.0 {
            return None;
        }

        let mut pressure = 1048576.0 - f64::from(adc_p);
        pressure = (pressure - var2 / 4096.0) * 6250.0 / var1;
        let var1 = p[8] * pressure * pressure / 2147483648.0;
        let var2 = pressure * p[7] / 32768.0;
        Some(pressure + (var1 + var2 + p[6]) / 16.0)
    }
}

/// Blocking BMP280 driver on any `embedded-hal` I²C bus.
pub struct Bmp280<I> {
    i2c: I,
    address: u8,
    calibration: Calibration,
}

impl<I: I2c> Bmp280<I> {
    /// Check the chip id, load its calibration and start continuous conversions.
    pub fn new(mut i2c: I, address: u8) -> Result<Self, SensorError> {
        let mut chip_id = [0u8; 1];
        i2c.write_read(address, &[REG_CHIP_ID], &mut chip_id)
            .map_err(|e| {
                error!("BMP280 not responding at {:#04x}: {:?}", address, e);
                SensorError::InitializationFailed {
                    sensor: SENSOR_NAME,
                    details: "No response on the I2C bus",
                }
            })?;

        if chip_id[0] != CHIP_ID_BMP280 && chip_id[0] != CHIP_ID_BME280 {
            error!("Unexpected chip id {:#04x} at {:#04x}", chip_id[0], address);
            return Err(SensorError::InitializationFailed {
                sensor: SENSOR_NAME,
                details: "Unexpected chip id",
            });
        }

        let mut raw = [0u8; 24];
        i2c.write_read(address, &[REG_CALIBRATION], &mut raw)
            .map_err(|e| {
                error!("BMP280 calibration read failed: {:?}", e);
                SensorError::InitializationFailed {
                    sensor: SENSOR_NAME,
                    details: "Failed to read calibration data",
                }
            })?;

        i2c.write(address, &[REG_CONFIG, CONFIG_FILTER_X4])
            .and_then(|_| i2c.write(address, &[REG_CTRL_MEAS, CTRL_MEAS_NORMAL]))
            .map_err(|e| {
                error!("BMP280 configuration failed: {:?}", e);
                SensorError::InitializationFailed {
                    sensor: SENSOR_NAME,
                    details: "Failed to configure measurement mode",
                }
            })?;

        info!("BMP280 ready (chip id {:#04x})", chip_id[0]);

        Ok(Self {
            i2c,
            address,
            calibration: Calibration::from_bytes(&raw),
        })
    }
}

impl<I: I2c> EnvironmentSensor for Bmp280<I> {
    fn read(&mut self) -> Result<EnvironmentSample, SensorError> {
        let mut data = [0u8; 6];
        self.i2c
            .write_read(self.address, &[REG_DATA], &mut data)
            .map_err(|e| {
                error!("BMP280 data read failed: {:?}", e);
                SensorError::ReadFailed {
                    sensor: SENSOR_NAME,
                    operation: "read pressure/temperature registers",
                    details: "I2C communication error or sensor not responding",
                }
            })?;

        let adc_p = raw_20bit(data[0], data[1], data[2]);
        let adc_t = raw_20bit(data[3], data[4], data[5]);

        let (temperature, t_fine) = self.calibration.compensate_temperature(adc_t);
        let pressure_pa = self
            .calibration
            .compensate_pressure(adc_p, t_fine)
            .ok_or(SensorError::InvalidData {
                sensor: SENSOR_NAME,
                details: "Pressure compensation divided by zero",
            })?;

        let pressure_hpa = (pressure_pa / 100.0) as f32;
        let altitude_m =
            44330.0 * (1.0 - (pressure_hpa / SEA_LEVEL_PRESSURE_HPA).powf(BAROMETRIC_EXPONENT));

        Ok(EnvironmentSample {
            temperature_celsius: temperature as f32,
            pressure_hpa,
            altitude_m,
        }
        .rounded())
    }
}

fn raw_20bit(msb: u8, lsb: u8, xlsb: u8) -> i32 {
    (i32::from(msb) << 12) | (i32::from(lsb) << 4) | (i32::from(xlsb) >> 4)
}
