//! Measurement core of an environmental sensor node.
//!
//! Polls a temperature/humidity chip and a gas chip on independent schedules,
//! compensates the gas reading with the measured absolute humidity, and keeps
//! the gas chip's calibration baseline across power cycles without rewriting
//! persistent storage on every measurement.
//!
//! The crate is hardware independent: drivers are written against
//! `embedded-hal` 1.0 and time is a caller-supplied millisecond counter.

#![cfg_attr(not(test), no_std)]

pub mod app_state;
pub mod compensation;
pub mod config;
pub mod drivers;
pub mod metrics;
pub mod sensors;
pub mod storage;
pub mod timer;
