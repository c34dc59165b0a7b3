//! AHT10 temperature/humidity sensor.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

use super::Error;
use crate::sensors::{HygroDriver, HygroSample};

pub const DEFAULT_ADDR: u8 = 0x38;

const CMD_INIT: [u8; 3] = [0xE1, 0x08, 0x00];
const CMD_TRIGGER: [u8; 3] = [0xAC, 0x33, 0x00];
const CMD_SOFT_RESET: [u8; 1] = [0xBA];

const STATUS_BUSY: u8 = 0x80;
const STATUS_CALIBRATED: u8 = 0x08;

/// Power-on settle time before the first command.
const POWER_ON_MS: u32 = 40;
const INIT_MS: u32 = 10;
const MEASURE_MS: u32 = 80;
const RESET_MS: u32 = 20;

/// Full scale of the 20-bit raw values.
const RAW_SCALE: f32 = (1u32 << 20) as f32;

pub struct Aht10<I, D> {
    i2c: I,
    delay: D,
    addr: u8,
}

impl<I: I2c, D: DelayNs> Aht10<I, D> {
    pub fn new(i2c: I, delay: D) -> Self {
        Self::with_address(i2c, delay, DEFAULT_ADDR)
    }

    pub fn with_address(i2c: I, delay: D, addr: u8) -> Self {
        Self { i2c, delay, addr }
    }

    /// Load the factory calibration and check the calibrated flag.
    pub fn init(&mut self) -> Result<(), Error<I::Error>> {
        self.delay.delay_ms(POWER_ON_MS);
        self.i2c.write(self.addr, &CMD_INIT).map_err(Error::I2c)?;
        self.delay.delay_ms(INIT_MS);

        if self.status()? & STATUS_CALIBRATED == 0 {
            return Err(Error::NotCalibrated);
        }
        Ok(())
    }

    pub fn status(&mut self) -> Result<u8, Error<I::Error>> {
        let mut status = [0u8; 1];
        self.i2c.read(self.addr, &mut status).map_err(Error::I2c)?;
        Ok(status[0])
    }

    pub fn soft_reset(&mut self) -> Result<(), Error<I::Error>> {
        self.i2c
            .write(self.addr, &CMD_SOFT_RESET)
            .map_err(Error::I2c)?;
        self.delay.delay_ms(RESET_MS);
        Ok(())
    }

    /// Trigger a measurement and wait for it to complete.
    pub fn measure(&mut self) -> Result<HygroSample, Error<I::Error>> {
        self.i2c.write(self.addr, &CMD_TRIGGER).map_err(Error::I2c)?;
        self.delay.delay_ms(MEASURE_MS);

        let mut data = [0u8; 6];
        self.i2c.read(self.addr, &mut data).map_err(Error::I2c)?;
        if data[0] & STATUS_BUSY != 0 {
            return Err(Error::Busy);
        }

        // 20-bit humidity, then 20-bit temperature, sharing the nibbles of byte 3.
        let raw_humidity =
            (u32::from(data[1]) << 12) | (u32::from(data[2]) << 4) | (u32::from(data[3]) >> 4);
        let raw_temp =
            (u32::from(data[3] & 0x0F) << 16) | (u32::from(data[4]) << 8) | u32::from(data[5]);

        Ok(HygroSample {
            temperature: raw_temp as f32 * 200.0 / RAW_SCALE - 50.0,
            humidity: raw_humidity as f32 * 100.0 / RAW_SCALE,
        })
    }
}

impl<I: I2c, D: DelayNs> HygroDriver for Aht10<I, D> {
    type Error = Error<I::Error>;

    fn name(&self) -> &'static str {
        "AHT10"
    }

    fn begin(&mut self) -> Result<(), Self::Error> {
        self.init()
    }

    fn soft_reset(&mut self) -> Result<(), Self::Error> {
        Aht10::soft_reset(self)
    }

    fn read(&mut self) -> Result<HygroSample, Self::Error> {
        self.measure()
    }
}
