//! Temperature/humidity adapter.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;
use log::{debug, error, info, warn};

use super::{HygroDriver, HygroSample, MeasureState, Watchdog};
use crate::config::{HtSensorType, QueryConfig};
use crate::drivers::{self, Aht10, Sht3x};
use crate::timer::{IntervalTimer, RestartPolicy};

/// The temperature/humidity chip fitted to the board, chosen once at boot.
pub enum HygroDevice<I, D> {
    Aht10(Aht10<I, D>),
    Sht30(Sht3x<I, D>),
}

impl<I: I2c, D: DelayNs> HygroDevice<I, D> {
    /// Build the driver for `kind`, or `None` when the sensor is switched off.
    pub fn select(kind: HtSensorType, i2c: I, delay: D) -> Option<Self> {
        match kind {
            HtSensorType::Off => None,
            HtSensorType::Aht10 => Some(Self::Aht10(Aht10::new(i2c, delay))),
            HtSensorType::Sht30 => Some(Self::Sht30(Sht3x::new(i2c, delay))),
        }
    }
}

impl<I: I2c, D: DelayNs> HygroDriver for HygroDevice<I, D> {
    type Error = drivers::Error<I::Error>;

    fn name(&self) -> &'static str {
        match self {
            Self::Aht10(sensor) => sensor.name(),
            Self::Sht30(sensor) => sensor.name(),
        }
    }

    fn begin(&mut self) -> Result<(), Self::Error> {
        match self {
            Self::Aht10(sensor) => sensor.begin(),
            Self::Sht30(sensor) => sensor.begin(),
        }
    }

    fn soft_reset(&mut self) -> Result<(), Self::Error> {
        match self {
            Self::Aht10(sensor) => HygroDriver::soft_reset(sensor),
            Self::Sht30(sensor) => HygroDriver::soft_reset(sensor),
        }
    }

    fn read(&mut self) -> Result<HygroSample, Self::Error> {
        match self {
            Self::Aht10(sensor) => sensor.read(),
            Self::Sht30(sensor) => sensor.read(),
        }
    }
}

/// Schedules measurements and periodic resets of one temperature/humidity chip.
///
/// Readings are raw: revise offsets and clamping belong to the orchestrator.
pub struct ClimateSensor<H> {
    driver: Option<H>,
    present: bool,
    measure_timer: IntervalTimer,
    reset_timer: Option<IntervalTimer>,
    last: Option<HygroSample>,
}

impl<H: HygroDriver> ClimateSensor<H> {
    /// `driver` is `None` when the sensor is disabled in the configuration.
    pub fn new(driver: Option<H>, query: QueryConfig, now_ms: u32) -> Self {
        Self {
            driver,
            present: false,
            measure_timer: IntervalTimer::from_secs(query.loop_seconds, now_ms),
            reset_timer: (query.reset_hours > 0).then(|| {
                IntervalTimer::from_hours(query.reset_hours, now_ms, RestartPolicy::Auto)
            }),
            last: None,
        }
    }

    /// Initialise the chip. Returns whether it responded.
    ///
    /// A sensor that fails here is never retried; [`measure`](Self::measure)
    /// keeps reporting [`MeasureState::Failed`] whenever its interval elapses.
    pub fn begin<W: Watchdog>(&mut self, watchdog: &mut W) -> bool {
        let Some(driver) = self.driver.as_mut() else {
            info!("Climate sensor disabled");
            self.present = false;
            return false;
        };

        watchdog.feed();
        self.present = match driver.begin() {
            Ok(()) => {
                info!("{}: sensor initialized", driver.name());
                true
            }
            Err(e) => {
                error!("{}: not responding: {:?}", driver.name(), e);
                false
            }
        };
        self.present
    }

    /// Run one scheduler tick.
    ///
    /// A due periodic reset replaces the measurement of this tick. The
    /// watchdog is fed right before any blocking bus work.
    pub fn measure<W: Watchdog>(&mut self, now_ms: u32, watchdog: &mut W) -> MeasureState {
        if !self.measure_timer.is_over(now_ms) {
            return MeasureState::Skipped;
        }
        if !self.present {
            return MeasureState::Failed;
        }

        if self.reset_timer.as_mut().is_some_and(|t| t.is_over(now_ms)) {
            self.reset(watchdog);
            return MeasureState::Skipped;
        }

        let Some(driver) = self.driver.as_mut() else {
            return MeasureState::Failed;
        };

        watchdog.feed();
        match driver.read() {
            Ok(sample) => {
                debug!(
                    "{}: {:.2} °C, {:.2} %",
                    driver.name(),
                    sample.temperature,
                    sample.humidity
                );
                self.last = Some(sample);
                MeasureState::Success
            }
            Err(e) => {
                warn!("{}: measurement failed: {:?}", driver.name(), e);
                MeasureState::Failed
            }
        }
    }

    /// Soft-reset the chip. Timers are left alone, so a manual reset does not
    /// move the next periodic one.
    pub fn reset<W: Watchdog>(&mut self, watchdog: &mut W) -> bool {
        let Some(driver) = self.driver.as_mut() else {
            return false;
        };

        watchdog.feed();
        match driver.soft_reset() {
            Ok(()) => {
                info!("{}: reset", driver.name());
                true
            }
            Err(e) => {
                error!("{}: reset failed: {:?}", driver.name(), e);
                false
            }
        }
    }

    /// Last successful temperature, °C.
    pub fn temperature(&self) -> Option<f32> {
        self.last.map(|s| s.temperature)
    }

    /// Last successful relative humidity, %.
    pub fn humidity(&self) -> Option<f32> {
        self.last.map(|s| s.humidity)
    }

    pub fn is_present(&self) -> bool {
        self.present
    }

    /// Milliseconds until the next measurement is due, `None` if this
    /// sensor will never measure.
    pub fn next_due_ms(&self, now_ms: u32) -> Option<u32> {
        if !self.present {
            return None;
        }
        self.measure_timer.remaining(now_ms)
    }
}
