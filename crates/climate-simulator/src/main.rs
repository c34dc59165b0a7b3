//! Host simulator for the climate-node measurement core.
//!
//! Runs `ClimateMonitor` against an emulated SHT3x + SGP30 bus on an
//! accelerated clock. Between ticks the clock jumps ahead by the monitor's
//! sleep budget, so hours of operation pass in a moment. The setting record,
//! including the learned gas baseline, persists in a file across runs.
//!
//! ```text
//! climate-simulator [setting-file] [hours]
//! ```
//!
//! Set `RUST_LOG=debug` to see every measurement.

mod bus;
mod file_storage;

use std::cell::RefCell;

use climate_node::app_state::{ClimateMonitor, ClimateReport, ReportSink};
use climate_node::config::{AqSensorType, ClimateSetting, HtSensorType};
use climate_node::drivers::Sgp30;
use climate_node::metrics::AirQuality;
use climate_node::sensors::{HygroDevice, Watchdog};
use climate_node::storage::SettingStorage;
use climate_node::timer::MS_PER_HOUR;
use embedded_hal_bus::i2c::RefCellDevice;
use log::{error, info, trace};

use bus::{SimBus, SimClock, SimDelay};
use file_storage::FileStorage;

const DEFAULT_SETTING_FILE: &str = "climate-setting.bin";

/// Simulated run length when none is given.
const DEFAULT_HOURS: u32 = 3;

/// Clock step when no sensor has anything scheduled.
const IDLE_STEP_MS: u32 = 1_000;

/// Logs a report only when something a client would see has changed.
#[derive(Default)]
struct LogSink {
    last: Option<Published>,
    published: u32,
}

/// The values a bridge client can observe, rounded to their display precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Published {
    deci_celsius: Option<i32>,
    deci_percent: Option<i32>,
    co2: Option<u32>,
    voc: Option<u32>,
    quality: AirQuality,
    climate_active: bool,
    air_active: bool,
}

impl From<&ClimateReport> for Published {
    fn from(report: &ClimateReport) -> Self {
        Self {
            deci_celsius: report.climate.map(|c| (c.temperature * 10.0).round() as i32),
            deci_percent: report.climate.map(|c| (c.humidity * 10.0).round() as i32),
            co2: report.air.map(|a| a.co2.round() as u32),
            voc: report.air.map(|a| a.voc.round() as u32),
            quality: report.air_quality(),
            climate_active: report.climate_active(),
            air_active: report.air_active(),
        }
    }
}

impl ReportSink for LogSink {
    fn publish(&mut self, report: &ClimateReport) {
        let current = Published::from(report);
        if self.last == Some(current) {
            return;
        }
        self.last = Some(current);
        self.published += 1;

        let climate = report
            .climate
            .map(|c| format!("{:.1} °C {:.1} %", c.temperature, c.humidity))
            .unwrap_or_else(|| format!("inactive ({:?})", report.climate_state));
        let air = report
            .air
            .map(|a| format!("{:.0} ppm {:.0} ppb {}", a.co2, a.voc, a.quality.label()))
            .unwrap_or_else(|| format!("inactive ({:?})", report.air_state));
        info!("climate: {climate} | air: {air}");
    }
}

/// Counts feeds; a real board would kick its hardware watchdog here.
#[derive(Default)]
struct SimWatchdog {
    feeds: u32,
}

impl Watchdog for SimWatchdog {
    fn feed(&mut self) {
        self.feeds += 1;
        trace!("watchdog fed");
    }
}

/// First-run record matching the emulated bus, with hourly baseline storing.
fn seed_setting() -> ClimateSetting {
    let mut setting = ClimateSetting {
        ht_sensor: HtSensorType::Sht30,
        aq_sensor: AqSensorType::Sgp30,
        ..ClimateSetting::default()
    };
    setting.baseline.store_hours = 1;
    setting
}

fn main() {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let path = args.next().unwrap_or_else(|| DEFAULT_SETTING_FILE.to_string());
    let hours = args
        .next()
        .and_then(|h| h.parse::<u32>().ok())
        .unwrap_or(DEFAULT_HOURS);
    info!("Starting climate-node simulator: {hours} h, setting file {path}");

    let mut storage = FileStorage::new(&path);
    if !storage.exists() {
        info!("No setting file yet, writing first-run defaults");
        if let Err(e) = storage.save(&seed_setting()) {
            error!("Failed to seed setting file: {e}");
        }
    }

    let clock = SimClock::default();
    let bus = RefCell::new(SimBus::new(&clock));

    let mut monitor = ClimateMonitor::new(storage, clock.now_ms(), |setting| {
        let hygro = HygroDevice::select(
            setting.ht_sensor,
            RefCellDevice::new(&bus),
            SimDelay::new(&clock),
        );
        let gas = match setting.aq_sensor {
            AqSensorType::Off => None,
            AqSensorType::Sgp30 => Some(Sgp30::new(
                RefCellDevice::new(&bus),
                SimDelay::new(&clock),
            )),
        };
        (hygro, gas)
    });

    let mut watchdog = SimWatchdog::default();
    if !monitor.begin(&mut watchdog) {
        error!("No sensor available, nothing to simulate");
        return;
    }

    let mut sink = LogSink::default();
    let end_ms = u64::from(hours) * u64::from(MS_PER_HOUR);
    let mut ticks = 0u64;

    while clock.elapsed_ms() < end_ms {
        monitor.tick(clock.now_ms(), &mut watchdog, &mut sink);
        ticks += 1;

        let step = monitor
            .sleep_budget_ms(clock.now_ms())
            .unwrap_or(IDLE_STEP_MS)
            .max(1);
        clock.advance_ms(step);
    }

    let baseline = monitor.air().baseline();
    let (chip_co2, chip_voc) = bus.borrow().sgp30_baseline();
    info!(
        "Done after {ticks} ticks: {} reports published, {} watchdog feeds",
        sink.published, watchdog.feeds
    );
    info!(
        "Baseline in memory: load={} co2={:#06x} voc={:#06x} (chip holds {:#06x}/{:#06x})",
        baseline.load, baseline.co2, baseline.voc, chip_co2, chip_voc
    );
    info!("Setting file: {}", monitor.air().storage().path().display());
}
