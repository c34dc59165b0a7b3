//! Gas sensor adapter with calibration baseline persistence.
//!
//! The gas chip learns its baseline over hours of operation. At boot a stored
//! baseline is pushed back into the chip so readings are usable immediately.
//! While running, the chip's current baseline is read back and persisted at
//! most once per `store_hours`. The store timer only advances after a
//! successful read-back, so a transient failure is retried on the next
//! successful measurement instead of a full period later.
//!
//! The adapter keeps the whole record it was built from. A store replaces its
//! `baseline` and writes that record back; storage is never read again.

use log::{debug, error, info, warn};

use super::{AirSample, GasDriver, IaqBaseline, MeasureState, Watchdog};
use crate::compensation::compensation_value;
use crate::config::{CalibrationBaseline, ClimateSetting};
use crate::storage::SettingStorage;
use crate::timer::{IntervalTimer, RestartPolicy};

pub struct AirSensor<G, S> {
    driver: Option<G>,
    storage: S,
    present: bool,
    measure_timer: IntervalTimer,
    reset_timer: Option<IntervalTimer>,
    store_timer: Option<IntervalTimer>,
    setting: ClimateSetting,
    last: Option<AirSample>,
}

impl<G: GasDriver, S: SettingStorage> AirSensor<G, S> {
    /// `setting` is the record loaded at boot. Its `air_query` drives the
    /// schedule and its `baseline` the calibration; `storage` receives the
    /// record whenever a fresh baseline is stored.
    pub fn new(driver: Option<G>, storage: S, setting: ClimateSetting, now_ms: u32) -> Self {
        let query = setting.air_query;
        let store_hours = setting.baseline.store_hours;
        Self {
            driver,
            storage,
            present: false,
            measure_timer: IntervalTimer::from_secs(query.loop_seconds, now_ms),
            reset_timer: (query.reset_hours > 0).then(|| {
                IntervalTimer::from_hours(query.reset_hours, now_ms, RestartPolicy::Auto)
            }),
            store_timer: (store_hours > 0).then(|| {
                IntervalTimer::from_hours(store_hours, now_ms, RestartPolicy::Manual)
            }),
            setting,
            last: None,
        }
    }

    /// Initialise the chip and restore the stored baseline if one is loadable.
    pub fn begin<W: Watchdog>(&mut self, watchdog: &mut W) -> bool {
        let Some(driver) = self.driver.as_mut() else {
            info!("Air quality sensor disabled");
            self.present = false;
            return false;
        };

        watchdog.feed();
        if let Err(e) = driver.begin() {
            error!("{}: not responding: {:?}", driver.name(), e);
            self.present = false;
            return false;
        }
        info!("{}: sensor initialized", driver.name());
        self.present = true;

        if self.setting.baseline.is_loadable() {
            self.load_baseline(watchdog);
        } else {
            info!("[baseline] nothing to load, sensor starts learning");
        }
        true
    }

    /// Feed a fresh humidity/temperature pair into the chip's compensation.
    pub fn set_rel_humidity(&mut self, humidity: f32, temperature: f32) -> bool {
        if !self.present {
            return false;
        }
        let Some(driver) = self.driver.as_mut() else {
            return false;
        };

        let value = compensation_value(humidity, temperature);
        match driver.set_absolute_humidity(value) {
            Ok(()) => {
                debug!("{}: humidity compensation {:#06x}", driver.name(), value);
                true
            }
            Err(e) => {
                warn!("{}: setting humidity compensation failed: {:?}", driver.name(), e);
                false
            }
        }
    }

    /// Run one scheduler tick. See [`ClimateSensor::measure`](super::ClimateSensor::measure)
    /// for the gating rules; a successful reading may also store the baseline.
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
        match driver.measure() {
            Ok(sample) => {
                debug!("{}: {} ppm CO2eq, {} ppb TVOC", driver.name(), sample.co2, sample.voc);
                self.last = Some(sample);
                self.store_baseline(now_ms, watchdog);
                MeasureState::Success
            }
            Err(e) => {
                warn!("{}: measurement failed: {:?}", driver.name(), e);
                MeasureState::Failed
            }
        }
    }

    /// Soft-reset the chip. The reset wipes its learned state, so a loadable
    /// baseline is pushed back right away.
    pub fn reset<W: Watchdog>(&mut self, watchdog: &mut W) -> bool {
        let Some(driver) = self.driver.as_mut() else {
            return false;
        };

        watchdog.feed();
        if let Err(e) = driver.soft_reset() {
            error!("{}: reset failed: {:?}", driver.name(), e);
            return false;
        }
        info!("{}: reset", driver.name());

        if self.setting.baseline.is_loadable() {
            self.load_baseline(watchdog);
        }
        true
    }

    /// Last successful CO2-equivalent, ppm.
    pub fn co2(&self) -> Option<u16> {
        self.last.map(|s| s.co2)
    }

    /// Last successful TVOC, ppb.
    pub fn voc(&self) -> Option<u16> {
        self.last.map(|s| s.voc)
    }

    /// In-memory calibration state, updated on every successful read-back.
    pub fn baseline(&self) -> &CalibrationBaseline {
        &self.setting.baseline
    }

    /// The record written on the next store.
    pub fn setting(&self) -> &ClimateSetting {
        &self.setting
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn is_present(&self) -> bool {
        self.present
    }

    pub fn next_due_ms(&self, now_ms: u32) -> Option<u32> {
        if !self.present {
            return None;
        }
        self.measure_timer.remaining(now_ms)
    }

    fn load_baseline<W: Watchdog>(&mut self, watchdog: &mut W) {
        let Some(driver) = self.driver.as_mut() else {
            return;
        };

        let baseline = IaqBaseline {
            co2: self.setting.baseline.co2,
            voc: self.setting.baseline.voc,
        };
        watchdog.feed();
        match driver.set_baseline(baseline) {
            Ok(()) => info!(
                "[baseline] loaded co2={:#06x} voc={:#06x}",
                baseline.co2, baseline.voc
            ),
            Err(e) => warn!("{}: [baseline] load failed: {:?}", driver.name(), e),
        }
    }

    fn store_baseline<W: Watchdog>(&mut self, now_ms: u32, watchdog: &mut W) {
        let Some(timer) = self.store_timer.as_mut() else {
            return;
        };
        if !timer.is_over(now_ms) {
            return;
        }
        let Some(driver) = self.driver.as_mut() else {
            return;
        };

        watchdog.feed();
        let chip = match driver.baseline() {
            Ok(chip) => chip,
            Err(e) => {
                warn!("{}: [baseline] read-back failed: {:?}", driver.name(), e);
                return;
            }
        };
        timer.start(now_ms);

        let baseline = &mut self.setting.baseline;
        baseline.load = true;
        baseline.co2 = chip.co2;
        baseline.voc = chip.voc;

        match self.storage.save(&self.setting) {
            Ok(()) => info!(
                "[baseline] stored co2={:#06x} voc={:#06x}",
                chip.co2, chip.voc
            ),
            Err(e) => error!("[baseline] store failed, kept in memory only: {}", e),
        }
    }
}
