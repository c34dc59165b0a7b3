//! Measurement orchestrator.

use log::{info, warn};

use super::report::{AirReading, ClimateReading, ClimateReport, ReportSink};
use crate::config::{ClimateSetting, ReviseConfig};
use crate::metrics::AirQuality;
use crate::sensors::{AirSensor, ClimateSensor, GasDriver, HygroDriver, MeasureState, Watchdog};
use crate::storage::SettingStorage;

/// Publishable range of temperature (°C) and relative humidity (%).
const CLIMATE_RANGE: (f32, f32) = (0.0, 100.0);
/// Publishable CO2-equivalent range, ppm.
const CO2_RANGE: (f32, f32) = (0.0, 100_000.0);
/// Publishable TVOC range, ppb.
const VOC_RANGE: (f32, f32) = (0.0, 1_000.0);

/// Ties both sensor adapters to one scheduler tick.
///
/// The temperature/humidity sensor always runs first so its fresh reading can
/// compensate the gas measurement of the same tick.
pub struct ClimateMonitor<H, G, S> {
    setting: ClimateSetting,
    climate: ClimateSensor<H>,
    air: AirSensor<G, S>,
}

impl<H, G, S> ClimateMonitor<H, G, S>
where
    H: HygroDriver,
    G: GasDriver,
    S: SettingStorage,
{
    /// Load the persisted record once and build both adapters from it.
    ///
    /// `build` picks the physical drivers for the configured sensor types and
    /// returns `None` for a sensor that is switched off.
    pub fn new<F>(mut storage: S, now_ms: u32, build: F) -> Self
    where
        F: FnOnce(&ClimateSetting) -> (Option<H>, Option<G>),
    {
        let setting = storage.load();
        let (hygro, gas) = build(&setting);

        Self {
            climate: ClimateSensor::new(hygro, setting.climate_query, now_ms),
            air: AirSensor::new(gas, storage, setting, now_ms),
            setting,
        }
    }

    /// Initialise both sensors. Returns whether at least one responded.
    pub fn begin<W: Watchdog>(&mut self, watchdog: &mut W) -> bool {
        let climate = self.climate.begin(watchdog);
        let air = self.air.begin(watchdog);
        info!(
            "Sensors started: climate={} air={}",
            if climate { "ok" } else { "off" },
            if air { "ok" } else { "off" }
        );

        if !climate && !air {
            warn!("No sensor responded, nothing will be measured");
        }
        climate || air
    }

    /// Run one scheduler tick and publish the outcome if any sensor was due.
    pub fn tick<W, R>(&mut self, now_ms: u32, watchdog: &mut W, sink: &mut R) -> ClimateReport
    where
        W: Watchdog,
        R: ReportSink,
    {
        let revise = self.setting.revise;

        let climate_state = self.climate.measure(now_ms, watchdog);
        let climate = match (climate_state, self.climate.temperature(), self.climate.humidity()) {
            (MeasureState::Success, Some(temperature), Some(humidity)) => {
                let temperature = temperature + revise.temperature;
                let humidity = humidity + revise.humidity;
                // Compensation wants the physical value, not the publishable one.
                self.air.set_rel_humidity(humidity, temperature);
                Some(ClimateReading {
                    temperature: clamp(temperature, CLIMATE_RANGE),
                    humidity: clamp(humidity, CLIMATE_RANGE),
                })
            }
            _ => None,
        };

        let air_state = self.air.measure(now_ms, watchdog);
        let air = match (air_state, self.air.co2(), self.air.voc()) {
            (MeasureState::Success, Some(co2), Some(voc)) => Some(revise_air(co2, voc, &revise)),
            _ => None,
        };

        let report = ClimateReport {
            climate_state,
            air_state,
            climate,
            air,
        };
        if !report.is_idle() {
            sink.publish(&report);
        }
        report
    }

    /// Milliseconds the caller may sleep before the next tick has work to do.
    ///
    /// `None` when no present sensor has a measurement scheduled.
    pub fn sleep_budget_ms(&self, now_ms: u32) -> Option<u32> {
        match (self.climate.next_due_ms(now_ms), self.air.next_due_ms(now_ms)) {
            (Some(climate), Some(air)) => Some(climate.min(air)),
            (climate, air) => climate.or(air),
        }
    }

    /// The record loaded at construction. Baseline updates made since then
    /// live in [`AirSensor::setting`], which is what gets persisted.
    pub fn setting(&self) -> &ClimateSetting {
        &self.setting
    }

    pub fn climate(&self) -> &ClimateSensor<H> {
        &self.climate
    }

    pub fn air(&self) -> &AirSensor<G, S> {
        &self.air
    }
}

fn clamp(value: f32, (min, max): (f32, f32)) -> f32 {
    value.clamp(min, max)
}

fn revise_air(co2: u16, voc: u16, revise: &ReviseConfig) -> AirReading {
    let voc = clamp(f32::from(voc) + revise.voc, VOC_RANGE);
    AirReading {
        co2: clamp(f32::from(co2) + revise.co2, CO2_RANGE),
        voc,
        quality: AirQuality::from_voc(voc),
    }
}
