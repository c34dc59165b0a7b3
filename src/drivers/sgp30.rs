//! SGP30 indoor air quality sensor (CO2eq / TVOC).
//!
//! The chip runs its own dynamic baseline compensation. The baseline can be
//! read back and restored across power cycles, and the algorithm accepts an
//! absolute humidity input for compensation.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

use super::Error;
use super::sensirion::{decode_words, encode_word};
use crate::sensors::{AirSample, GasDriver, IaqBaseline};

pub const DEFAULT_ADDR: u8 = 0x58;

/// I²C general call address; the soft reset is broadcast to it.
const GENERAL_CALL_ADDR: u8 = 0x00;
const GENERAL_CALL_RESET: u8 = 0x06;

const CMD_GET_SERIAL_ID: [u8; 2] = [0x36, 0x82];
const CMD_INIT_AIR_QUALITY: [u8; 2] = [0x20, 0x03];
const CMD_MEASURE_AIR_QUALITY: [u8; 2] = [0x20, 0x08];
const CMD_GET_BASELINE: [u8; 2] = [0x20, 0x15];
const CMD_SET_BASELINE: [u8; 2] = [0x20, 0x1E];
const CMD_SET_HUMIDITY: [u8; 2] = [0x20, 0x61];

const SERIAL_MS: u32 = 1;
const COMMAND_MS: u32 = 10;
const MEASURE_MS: u32 = 12;
const RESET_MS: u32 = 1;

pub struct Sgp30<I, D> {
    i2c: I,
    delay: D,
    addr: u8,
}

impl<I: I2c, D: DelayNs> Sgp30<I, D> {
    pub fn new(i2c: I, delay: D) -> Self {
        Self::with_address(i2c, delay, DEFAULT_ADDR)
    }

    pub fn with_address(i2c: I, delay: D, addr: u8) -> Self {
        Self { i2c, delay, addr }
    }

    /// 48-bit serial number.
    pub fn serial(&mut self) -> Result<u64, Error<I::Error>> {
        let [a, b, c] = self.read_words::<3>(&CMD_GET_SERIAL_ID, SERIAL_MS)?;
        Ok((u64::from(a) << 32) | (u64::from(b) << 16) | u64::from(c))
    }

    /// Start the IAQ algorithm. Measurements during the first ~15 s return
    /// fixed values (400 ppm / 0 ppb).
    pub fn init_air_quality(&mut self) -> Result<(), Error<I::Error>> {
        self.send(&CMD_INIT_AIR_QUALITY, &[], COMMAND_MS)
    }

    pub fn measure_air_quality(&mut self) -> Result<AirSample, Error<I::Error>> {
        let [co2, voc] = self.read_words::<2>(&CMD_MEASURE_AIR_QUALITY, MEASURE_MS)?;
        Ok(AirSample { co2, voc })
    }

    pub fn get_baseline(&mut self) -> Result<IaqBaseline, Error<I::Error>> {
        let [co2, voc] = self.read_words::<2>(&CMD_GET_BASELINE, COMMAND_MS)?;
        Ok(IaqBaseline { co2, voc })
    }

    /// Restore a baseline. The chip expects the TVOC word first.
    pub fn set_baseline(&mut self, baseline: IaqBaseline) -> Result<(), Error<I::Error>> {
        self.send(&CMD_SET_BASELINE, &[baseline.voc, baseline.co2], COMMAND_MS)
    }

    /// Absolute humidity as 8.8 fixed point g/m³; `0` disables compensation.
    pub fn set_humidity(&mut self, fixed_point: u16) -> Result<(), Error<I::Error>> {
        self.send(&CMD_SET_HUMIDITY, &[fixed_point], COMMAND_MS)
    }

    /// General call reset. Every chip on the bus that honours the general
    /// call resets too.
    pub fn soft_reset(&mut self) -> Result<(), Error<I::Error>> {
        self.i2c
            .write(GENERAL_CALL_ADDR, &[GENERAL_CALL_RESET])
            .map_err(Error::I2c)?;
        self.delay.delay_ms(RESET_MS);
        Ok(())
    }

    fn send(
        &mut self,
        command: &[u8; 2],
        args: &[u16],
        wait_ms: u32,
    ) -> Result<(), Error<I::Error>> {
        let mut buf = [0u8; 8];
        buf[..2].copy_from_slice(command);
        let mut len = 2;
        for word in args.iter().take(2) {
            buf[len..len + 3].copy_from_slice(&encode_word(*word));
            len += 3;
        }

        self.i2c.write(self.addr, &buf[..len]).map_err(Error::I2c)?;
        self.delay.delay_ms(wait_ms);
        Ok(())
    }

    fn read_words<const N: usize>(
        &mut self,
        command: &[u8; 2],
        wait_ms: u32,
    ) -> Result<[u16; N], Error<I::Error>> {
        self.send(command, &[], wait_ms)?;

        let mut data = [0u8; 9];
        self.i2c
            .read(self.addr, &mut data[..3 * N])
            .map_err(Error::I2c)?;
        decode_words::<I::Error, N>(&data[..3 * N])
    }
}

impl<I: I2c, D: DelayNs> GasDriver for Sgp30<I, D> {
    type Error = Error<I::Error>;

    fn name(&self) -> &'static str {
        "SGP30"
    }

    fn begin(&mut self) -> Result<(), Self::Error> {
        self.serial()?;
        self.init_air_quality()
    }

    /// The reset also stops the IAQ algorithm, so it is restarted here.
    fn soft_reset(&mut self) -> Result<(), Self::Error> {
        Sgp30::soft_reset(self)?;
        self.init_air_quality()
    }

    fn set_absolute_humidity(&mut self, fixed_point: u16) -> Result<(), Self::Error> {
        self.set_humidity(fixed_point)
    }

    fn measure(&mut self) -> Result<AirSample, Self::Error> {
        self.measure_air_quality()
    }

    fn baseline(&mut self) -> Result<IaqBaseline, Self::Error> {
        self.get_baseline()
    }

    fn set_baseline(&mut self, baseline: IaqBaseline) -> Result<(), Self::Error> {
        Sgp30::set_baseline(self, baseline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::mock::{NoopDelay, ScriptedI2c};

    fn frame(words: &[u16]) -> Vec<u8> {
        words.iter().flat_map(|w| encode_word(*w)).collect()
    }

    #[test]
    fn test_begin_reads_serial_and_starts_algorithm() {
        let i2c = ScriptedI2c::new().respond(&frame(&[0x0000, 0x0123, 0xABCD]));
        let mut sensor = Sgp30::new(i2c, NoopDelay::default());

        GasDriver::begin(&mut sensor).unwrap();
        assert_eq!(
            sensor.i2c.written(),
            vec![CMD_GET_SERIAL_ID.to_vec(), CMD_INIT_AIR_QUALITY.to_vec()]
        );
    }

    #[test]
    fn test_serial_assembles_words() {
        let i2c = ScriptedI2c::new().respond(&frame(&[0x0001, 0x0203, 0x0405]));
        let mut sensor = Sgp30::new(i2c, NoopDelay::default());
        assert_eq!(sensor.serial().unwrap(), 0x0001_0203_0405);
    }

    #[test]
    fn test_measure_air_quality() {
        let i2c = ScriptedI2c::new().respond(&frame(&[415, 23]));
        let mut sensor = Sgp30::new(i2c, NoopDelay::default());
        assert_eq!(
            sensor.measure_air_quality().unwrap(),
            AirSample { co2: 415, voc: 23 }
        );
        assert_eq!(sensor.delay.total_ns, 12_000_000);
    }

    #[test]
    fn test_set_baseline_sends_voc_word_first() {
        let mut sensor = Sgp30::new(ScriptedI2c::new(), NoopDelay::default());
        Sgp30::set_baseline(&mut sensor, IaqBaseline { co2: 400, voc: 1200 }).unwrap();

        let mut expected = CMD_SET_BASELINE.to_vec();
        expected.extend_from_slice(&encode_word(1200));
        expected.extend_from_slice(&encode_word(400));
        assert_eq!(sensor.i2c.written(), vec![expected]);
    }

    #[test]
    fn test_get_baseline_order() {
        let i2c = ScriptedI2c::new().respond(&frame(&[0x8A11, 0x8B22]));
        let mut sensor = Sgp30::new(i2c, NoopDelay::default());
        assert_eq!(
            sensor.get_baseline().unwrap(),
            IaqBaseline {
                co2: 0x8A11,
                voc: 0x8B22
            }
        );
    }

    #[test]
    fn test_set_humidity_payload() {
        let mut sensor = Sgp30::new(ScriptedI2c::new(), NoopDelay::default());
        sensor.set_humidity(2952).unwrap();

        let mut expected = CMD_SET_HUMIDITY.to_vec();
        expected.extend_from_slice(&encode_word(2952));
        assert_eq!(sensor.i2c.written(), vec![expected]);
    }

    #[test]
    fn test_soft_reset_uses_general_call_and_reinitialises() {
        let mut sensor = Sgp30::new(ScriptedI2c::new(), NoopDelay::default());
        GasDriver::soft_reset(&mut sensor).unwrap();

        assert_eq!(
            sensor.i2c.writes,
            vec![
                (GENERAL_CALL_ADDR, vec![GENERAL_CALL_RESET]),
                (DEFAULT_ADDR, CMD_INIT_AIR_QUALITY.to_vec()),
            ]
        );
    }

    #[test]
    fn test_corrupt_measurement() {
        let mut data = frame(&[415, 23]);
        data[2] ^= 0x10;
        let i2c = ScriptedI2c::new().respond(&data);
        let mut sensor = Sgp30::new(i2c, NoopDelay::default());
        assert_eq!(sensor.measure_air_quality(), Err(Error::Crc));
    }
}
