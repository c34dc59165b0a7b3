//! Emulated I²C bus carrying an SHT3x and an SGP30.
//!
//! The chips are modelled at the command level: writes select what the next
//! read returns, words go out with their Sensirion CRC, and incoming words are
//! CRC-checked. Readings follow a slow synthetic indoor climate driven by the
//! simulated clock.

use std::cell::Cell;
use std::rc::Rc;

use climate_node::drivers::sensirion::{decode_words, encode_word};
use climate_node::drivers::{sgp30, sht3x};
use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::{ErrorKind, ErrorType, I2c, NoAcknowledgeSource, Operation};
use log::{debug, trace};

const GENERAL_CALL_ADDR: u8 = 0x00;
const GENERAL_CALL_RESET: u8 = 0x06;

/// Measurements after init during which the SGP30 reports fixed values.
const SGP30_WARMUP_MEASUREMENTS: u32 = 15;
/// Baseline the SGP30 starts learning from after init.
const SGP30_FRESH_BASELINE: [u16; 2] = [0x8000, 0x8000];
/// Upper bound of the learned baseline counters.
const SGP30_SETTLED_BASELINE: u16 = 0x9000;

/// Shared simulated time in nanoseconds.
#[derive(Debug, Clone, Default)]
pub struct SimClock(Rc<Cell<u64>>);

impl SimClock {
    /// Millisecond counter as the firmware sees it; wraps like `millis()`.
    pub fn now_ms(&self) -> u32 {
        (self.0.get() / 1_000_000) as u32
    }

    /// Time since start, without the 32-bit wrap.
    pub fn elapsed_ms(&self) -> u64 {
        self.0.get() / 1_000_000
    }

    pub fn advance_ms(&self, ms: u32) {
        self.advance_ns(u64::from(ms) * 1_000_000);
    }

    fn advance_ns(&self, ns: u64) {
        self.0.set(self.0.get() + ns);
    }

    fn now_secs(&self) -> f32 {
        self.0.get() as f32 / 1e9
    }
}

/// Delay that moves simulated time forward instead of sleeping.
#[derive(Debug, Clone)]
pub struct SimDelay {
    clock: SimClock,
}

impl SimDelay {
    pub fn new(clock: &SimClock) -> Self {
        Self {
            clock: clock.clone(),
        }
    }
}

impl DelayNs for SimDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.clock.advance_ns(u64::from(ns));
    }
}

/// Synthetic room: mild daily-ish swings plus occasional VOC bursts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Environment {
    pub temperature: f32,
    pub humidity: f32,
    pub co2: u16,
    pub voc: u16,
}

impl Environment {
    pub fn at(secs: f32) -> Self {
        let voc = (90.0 + 80.0 * (secs / 1_200.0).sin() + 40.0 * (secs / 170.0).cos()).max(0.0);
        Self {
            temperature: 22.0 + 3.0 * (secs / 3_600.0).sin(),
            humidity: 45.0 + 10.0 * (secs / 2_700.0).sin(),
            co2: (420.0 + 2.5 * voc) as u16,
            voc: voc as u16,
        }
    }
}

#[derive(Debug, Default)]
struct Sht3xState {
    pending: Option<Vec<u16>>,
}

#[derive(Debug)]
struct Sgp30State {
    running: bool,
    pending: Option<Vec<u16>>,
    measurements: u32,
    baseline: [u16; 2],
    humidity: u16,
}

impl Default for Sgp30State {
    fn default() -> Self {
        Self {
            running: false,
            pending: None,
            measurements: 0,
            baseline: SGP30_FRESH_BASELINE,
            humidity: 0,
        }
    }
}

/// The bus and every chip on it.
#[derive(Debug)]
pub struct SimBus {
    clock: SimClock,
    sht: Sht3xState,
    sgp: Sgp30State,
}

impl SimBus {
    pub fn new(clock: &SimClock) -> Self {
        Self {
            clock: clock.clone(),
            sht: Sht3xState::default(),
            sgp: Sgp30State::default(),
        }
    }

    /// Baseline the emulated SGP30 currently holds, as `(co2, voc)`.
    pub fn sgp30_baseline(&self) -> (u16, u16) {
        (self.sgp.baseline[0], self.sgp.baseline[1])
    }

    /// Last humidity compensation value written to the SGP30.
    #[cfg(test)]
    pub fn sgp30_humidity(&self) -> u16 {
        self.sgp.humidity
    }

    fn write(&mut self, address: u8, bytes: &[u8]) -> Result<(), ErrorKind> {
        match address {
            sht3x::DEFAULT_ADDR => self.write_sht3x(bytes),
            sgp30::DEFAULT_ADDR => self.write_sgp30(bytes),
            GENERAL_CALL_ADDR if bytes == [GENERAL_CALL_RESET] => {
                debug!("bus: general call reset");
                self.sht = Sht3xState::default();
                self.sgp.running = false;
                self.sgp.pending = None;
                Ok(())
            }
            _ => Err(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address)),
        }
    }

    fn write_sht3x(&mut self, bytes: &[u8]) -> Result<(), ErrorKind> {
        self.sht.pending = match bytes {
            [0x24, 0x00] => {
                let env = Environment::at(self.clock.now_secs());
                let raw_temp = (env.temperature + 45.0) / 175.0 * 65535.0;
                let raw_humidity = env.humidity / 100.0 * 65535.0;
                Some(vec![raw_temp as u16, raw_humidity as u16])
            }
            [0x30, 0xA2] => None,
            [0xF3, 0x2D] => Some(vec![0x0000]),
            _ => return Err(ErrorKind::Other),
        };
        Ok(())
    }

    fn write_sgp30(&mut self, bytes: &[u8]) -> Result<(), ErrorKind> {
        let sgp = &mut self.sgp;
        match bytes {
            [0x36, 0x82] => sgp.pending = Some(vec![0x0000, 0x0142, 0x7A3C]),
            [0x20, 0x03] => {
                sgp.running = true;
                sgp.measurements = 0;
                sgp.baseline = SGP30_FRESH_BASELINE;
            }
            [0x20, 0x08] if sgp.running => {
                sgp.measurements += 1;
                for counter in &mut sgp.baseline {
                    *counter = counter.saturating_add(1).min(SGP30_SETTLED_BASELINE);
                }

                let reading = if sgp.measurements <= SGP30_WARMUP_MEASUREMENTS {
                    vec![400, 0]
                } else {
                    let env = Environment::at(self.clock.now_secs());
                    vec![env.co2, env.voc]
                };
                sgp.pending = Some(reading);
            }
            [0x20, 0x15] if sgp.running => sgp.pending = Some(sgp.baseline.to_vec()),
            [0x20, 0x1E, args @ ..] if sgp.running => {
                let [voc, co2] = decode_words::<(), 2>(args).map_err(|_| ErrorKind::Other)?;
                trace!("bus: SGP30 baseline set to co2={co2:#06x} voc={voc:#06x}");
                sgp.baseline = [co2, voc];
            }
            [0x20, 0x61, args @ ..] => {
                let [humidity] = decode_words::<(), 1>(args).map_err(|_| ErrorKind::Other)?;
                sgp.humidity = humidity;
            }
            _ => return Err(ErrorKind::Other),
        }
        Ok(())
    }

    fn read(&mut self, address: u8, buffer: &mut [u8]) -> Result<(), ErrorKind> {
        let pending = match address {
            sht3x::DEFAULT_ADDR => self.sht.pending.take(),
            sgp30::DEFAULT_ADDR => self.sgp.pending.take(),
            _ => return Err(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address)),
        };
        let words = pending.ok_or(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Data))?;

        let frame: Vec<u8> = words.iter().flat_map(|w| encode_word(*w)).collect();
        if frame.len() != buffer.len() {
            return Err(ErrorKind::Other);
        }
        buffer.copy_from_slice(&frame);
        Ok(())
    }
}

impl ErrorType for SimBus {
    type Error = ErrorKind;
}

impl I2c for SimBus {
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        for operation in operations {
            match operation {
                Operation::Write(bytes) => self.write(address, bytes)?,
                Operation::Read(buffer) => self.read(address, buffer)?,
            }
        }
        Ok(())
    }
}
