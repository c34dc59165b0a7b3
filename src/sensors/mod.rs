//! Sensor adapters and the driver capabilities they rely on.
//!
//! An adapter wraps one physical driver with its own schedule: a measurement
//! interval, an optional periodic hard reset and, for the gas sensor, a
//! debounced baseline store. Each [`measure`](climate::ClimateSensor::measure)
//! call decides on its own whether to touch the hardware this tick.

pub mod air;
pub mod climate;

pub use air::AirSensor;
pub use climate::{ClimateSensor, HygroDevice};

use core::fmt::Debug;

/// Outcome of one measurement attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeasureState {
    /// Interval not elapsed yet, or a reset was performed instead.
    Skipped,
    /// The hardware returned a valid reading.
    Success,
    /// The hardware was asked and rejected or timed out.
    Failed,
}

impl MeasureState {
    /// Only a fresh reading marks the sensor as active.
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Success)
    }

    /// Whether this tick reached the hardware (or would have, for an absent device).
    pub const fn attempted(self) -> bool {
        !matches!(self, Self::Skipped)
    }
}

/// One temperature/humidity reading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HygroSample {
    /// Degrees Celsius
    pub temperature: f32,
    /// Relative humidity, percent
    pub humidity: f32,
}

/// One indoor air quality reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AirSample {
    /// CO2-equivalent, ppm
    pub co2: u16,
    /// Total VOC, ppb
    pub voc: u16,
}

/// Gas sensor calibration baseline as reported by the chip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IaqBaseline {
    pub co2: u16,
    pub voc: u16,
}

/// Capabilities of a temperature/humidity chip.
pub trait HygroDriver {
    type Error: Debug;

    /// Short chip name for log lines.
    fn name(&self) -> &'static str;

    /// Probe and initialise the chip.
    fn begin(&mut self) -> Result<(), Self::Error>;

    fn soft_reset(&mut self) -> Result<(), Self::Error>;

    /// Blocking single-shot measurement.
    fn read(&mut self) -> Result<HygroSample, Self::Error>;
}

/// Capabilities of a gas chip with an on-chip baseline algorithm.
pub trait GasDriver {
    type Error: Debug;

    fn name(&self) -> &'static str;

    fn begin(&mut self) -> Result<(), Self::Error>;

    fn soft_reset(&mut self) -> Result<(), Self::Error>;

    /// Absolute humidity compensation as 8.8 fixed-point g/m³.
    fn set_absolute_humidity(&mut self, fixed_point: u16) -> Result<(), Self::Error>;

    fn measure(&mut self) -> Result<AirSample, Self::Error>;

    fn baseline(&mut self) -> Result<IaqBaseline, Self::Error>;

    fn set_baseline(&mut self, baseline: IaqBaseline) -> Result<(), Self::Error>;
}

/// Liveness signal asserted right before each blocking hardware read.
pub trait Watchdog {
    fn feed(&mut self);
}

/// For platforms without a watchdog.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoWatchdog;

impl Watchdog for NoWatchdog {
    fn feed(&mut self) {}
}
