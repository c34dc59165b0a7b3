//! Storage collaborator for the persisted [`ClimateSetting`] record.
//!
//! Implementations load and save the *whole* record. Loading never fails: a
//! missing or malformed record degrades to [`ClimateSetting::default`].

pub mod codec;
pub mod memory;

pub use codec::{MAX_RECORD_SIZE, decode, encode};
pub use memory::MemoryStorage;

use crate::config::ClimateSetting;
use thiserror_no_std::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageError {
    #[error("Failed to encode setting record")]
    Encode,
    #[error("Setting record does not fit in {0} bytes")]
    Capacity(usize),
    #[error("Storage I/O failed: {0}")]
    Io(&'static str),
}

/// Atomic load/save of the configuration record.
pub trait SettingStorage {
    /// Read the stored record, or the defaults if none can be read.
    fn load(&mut self) -> ClimateSetting;

    /// Replace the stored record.
    fn save(&mut self, setting: &ClimateSetting) -> Result<(), StorageError>;
}

impl<T: SettingStorage + ?Sized> SettingStorage for &mut T {
    fn load(&mut self) -> ClimateSetting {
        (**self).load()
    }

    fn save(&mut self, setting: &ClimateSetting) -> Result<(), StorageError> {
        (**self).save(setting)
    }
}
