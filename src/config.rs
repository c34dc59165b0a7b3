//! Persisted device configuration.
//!
//! [`ClimateSetting`] is the whole record owned by the storage collaborator.
//! The measurement core only reads it, except for the [`CalibrationBaseline`]
//! which the gas sensor adapter writes back.

use serde::{Deserialize, Serialize};

/// Which temperature/humidity chip is fitted.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HtSensorType {
    Off,
    #[default]
    Aht10,
    Sht30,
}

/// Which gas chip is fitted.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AqSensorType {
    Off,
    #[default]
    Sgp30,
}

/// Per-sensor schedule.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryConfig {
    /// Seconds between measurements, `0` disables periodic measurement.
    pub loop_seconds: u16,
    /// Hours between hard resets, `0` disables periodic reset.
    pub reset_hours: u8,
}

impl QueryConfig {
    pub const fn new(loop_seconds: u16, reset_hours: u8) -> Self {
        Self {
            loop_seconds,
            reset_hours,
        }
    }

    /// Temperature/humidity default: every 10 s, reset once a day.
    pub const fn climate_default() -> Self {
        Self::new(10, 24)
    }

    /// Gas sensor default: every second (the on-chip baseline algorithm
    /// expects 1 Hz sampling), never reset.
    pub const fn air_default() -> Self {
        Self::new(1, 0)
    }
}

/// Additive per-installation corrections applied before publishing.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default)]
pub struct ReviseConfig {
    pub humidity: f32,
    pub temperature: f32,
    pub co2: f32,
    pub voc: f32,
}

/// Persisted gas sensor calibration state.
///
/// `co2` and `voc` are raw sensor-native counters and carry no unit. They are
/// only meaningful once `load` is set or a baseline was read back this boot.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CalibrationBaseline {
    /// Push the stored baseline into the sensor at boot.
    pub load: bool,
    /// Minimum hours between baseline writes, `0` disables storing.
    pub store_hours: u8,
    pub co2: u16,
    pub voc: u16,
}

impl CalibrationBaseline {
    /// Whether `begin` should write this baseline into the sensor.
    pub const fn is_loadable(&self) -> bool {
        self.load && self.co2 > 0 && self.voc > 0
    }
}

/// Top-level persisted record.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct ClimateSetting {
    pub ht_sensor: HtSensorType,
    pub aq_sensor: AqSensorType,
    pub climate_query: QueryConfig,
    pub air_query: QueryConfig,
    pub revise: ReviseConfig,
    pub baseline: CalibrationBaseline,
}

impl Default for ClimateSetting {
    fn default() -> Self {
        Self {
            ht_sensor: HtSensorType::default(),
            aq_sensor: AqSensorType::default(),
            climate_query: QueryConfig::climate_default(),
            air_query: QueryConfig::air_default(),
            revise: ReviseConfig::default(),
            baseline: CalibrationBaseline::default(),
        }
    }
}
