//! SHT30/SHT31 temperature/humidity sensor.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

use super::Error;
use super::sensirion::decode_words;
use crate::sensors::{HygroDriver, HygroSample};

pub const DEFAULT_ADDR: u8 = 0x44;

/// Single shot, high repeatability, no clock stretching.
const CMD_MEASURE_HIGH: [u8; 2] = [0x24, 0x00];
const CMD_SOFT_RESET: [u8; 2] = [0x30, 0xA2];
const CMD_READ_STATUS: [u8; 2] = [0xF3, 0x2D];

/// Measurement time is up to ~15 ms for high repeatability.
const MEASURE_MS: u32 = 15;
const RESET_MS: u32 = 2;

pub struct Sht3x<I, D> {
    i2c: I,
    delay: D,
    addr: u8,
}

impl<I: I2c, D: DelayNs> Sht3x<I, D> {
    pub fn new(i2c: I, delay: D) -> Self {
        Self::with_address(i2c, delay, DEFAULT_ADDR)
    }

    pub fn with_address(i2c: I, delay: D, addr: u8) -> Self {
        Self { i2c, delay, addr }
    }

    /// Read the 16-bit status register.
    pub fn status(&mut self) -> Result<u16, Error<I::Error>> {
        self.i2c
            .write(self.addr, &CMD_READ_STATUS)
            .map_err(Error::I2c)?;

        let mut data = [0u8; 3];
        self.i2c.read(self.addr, &mut data).map_err(Error::I2c)?;
        let [status] = decode_words::<I::Error, 1>(&data)?;
        Ok(status)
    }

    pub fn soft_reset(&mut self) -> Result<(), Error<I::Error>> {
        self.i2c
            .write(self.addr, &CMD_SOFT_RESET)
            .map_err(Error::I2c)?;
        self.delay.delay_ms(RESET_MS);
        Ok(())
    }

    pub fn measure(&mut self) -> Result<HygroSample, Error<I::Error>> {
        self.i2c
            .write(self.addr, &CMD_MEASURE_HIGH)
            .map_err(Error::I2c)?;
        self.delay.delay_ms(MEASURE_MS);

        let mut data = [0u8; 6];
        self.i2c.read(self.addr, &mut data).map_err(Error::I2c)?;
        let [raw_temp, raw_humidity] = decode_words::<I::Error, 2>(&data)?;

        Ok(HygroSample {
            temperature: -45.0 + 175.0 * (raw_temp as f32) / 65535.0,
            humidity: 100.0 * (raw_humidity as f32) / 65535.0,
        })
    }
}

impl<I: I2c, D: DelayNs> HygroDriver for Sht3x<I, D> {
    type Error = Error<I::Error>;

    fn name(&self) -> &'static str {
        "SHT3x"
    }

    /// Reset to a known state, then prove the chip answers with a valid status word.
    fn begin(&mut self) -> Result<(), Self::Error> {
        Sht3x::soft_reset(self)?;
        self.status().map(|_| ())
    }

    fn soft_reset(&mut self) -> Result<(), Self::Error> {
        Sht3x::soft_reset(self)
    }

    fn read(&mut self) -> Result<HygroSample, Self::Error> {
        self.measure()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::mock::{NoopDelay, ScriptedI2c};
    use crate::drivers::sensirion::encode_word;

    fn frame(words: &[u16]) -> Vec<u8> {
        words.iter().flat_map(|w| encode_word(*w)).collect()
    }

    #[test]
    fn test_begin_resets_then_reads_status() {
        let i2c = ScriptedI2c::new().respond(&frame(&[0x8010]));
        let mut sensor = Sht3x::new(i2c, NoopDelay::default());
        assert!(sensor.begin().is_ok());
        assert_eq!(
            sensor.i2c.written(),
            vec![CMD_SOFT_RESET.to_vec(), CMD_READ_STATUS.to_vec()]
        );
    }

    #[test]
    fn test_measure_converts_raw_words() {
        // 0x6666 → 25.0 °C, 0x8000 → 50.0 %
        let i2c = ScriptedI2c::new().respond(&frame(&[0x6666, 0x8000]));
        let mut sensor = Sht3x::new(i2c, NoopDelay::default());

        let sample = sensor.measure().unwrap();
        assert!((sample.temperature - 25.0).abs() < 0.01);
        assert!((sample.humidity - 50.0).abs() < 0.01);
        assert_eq!(sensor.i2c.written(), vec![CMD_MEASURE_HIGH.to_vec()]);
        assert_eq!(sensor.delay.total_ns, 15_000_000);
    }

    #[test]
    fn test_measure_rejects_corrupt_word() {
        let mut data = frame(&[0x6666, 0x8000]);
        data[5] ^= 0xFF;
        let i2c = ScriptedI2c::new().respond(&data);
        let mut sensor = Sht3x::new(i2c, NoopDelay::default());
        assert_eq!(sensor.measure(), Err(Error::Crc));
    }

    #[test]
    fn test_absent_device() {
        let mut sensor = Sht3x::new(ScriptedI2c::absent(), NoopDelay::default());
        assert!(matches!(sensor.begin(), Err(Error::I2c(_))));
    }
}
