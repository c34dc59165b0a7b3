//! Measurement orchestration and its outward-facing report.

mod monitor;
mod report;

pub use monitor::ClimateMonitor;
pub use report::{AirReading, ClimateReading, ClimateReport, NullSink, ReportSink};
