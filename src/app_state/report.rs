//! What the orchestrator hands to the characteristic publisher each tick.

use crate::metrics::AirQuality;
use crate::sensors::MeasureState;

/// Revised and clamped temperature/humidity, ready to publish.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClimateReading {
    /// °C, clamped to 0..=100
    pub temperature: f32,
    /// %, clamped to 0..=100
    pub humidity: f32,
}

/// Revised and clamped gas readings, ready to publish.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AirReading {
    /// ppm, clamped to 0..=100000
    pub co2: f32,
    /// ppb, clamped to 0..=1000
    pub voc: f32,
    pub quality: AirQuality,
}

/// Result of one orchestrator tick.
///
/// A reading is only present when its sensor returned
/// [`MeasureState::Success`] on this tick, so a publisher never sees stale
/// values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClimateReport {
    pub climate_state: MeasureState,
    pub air_state: MeasureState,
    pub climate: Option<ClimateReading>,
    pub air: Option<AirReading>,
}

impl ClimateReport {
    pub const fn idle() -> Self {
        Self {
            climate_state: MeasureState::Skipped,
            air_state: MeasureState::Skipped,
            climate: None,
            air: None,
        }
    }

    pub const fn climate_active(&self) -> bool {
        self.climate_state.is_active()
    }

    pub const fn air_active(&self) -> bool {
        self.air_state.is_active()
    }

    /// Neither sensor reached its hardware this tick.
    pub const fn is_idle(&self) -> bool {
        !self.climate_state.attempted() && !self.air_state.attempted()
    }

    /// Published band; `Unknown` while the gas sensor is inactive.
    pub fn air_quality(&self) -> AirQuality {
        self.air.map(|a| a.quality).unwrap_or_default()
    }
}

/// Characteristic-publishing collaborator.
///
/// Change detection and notification suppression are up to the implementation.
pub trait ReportSink {
    fn publish(&mut self, report: &ClimateReport);
}

impl<T: ReportSink + ?Sized> ReportSink for &mut T {
    fn publish(&mut self, report: &ClimateReport) {
        (**self).publish(report)
    }
}

/// Sink for callers that only use the returned report.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl ReportSink for NullSink {
    fn publish(&mut self, _report: &ClimateReport) {}
}
