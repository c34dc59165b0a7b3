//! RAM-backed storage, useful where no filesystem is mounted and in tests.

use heapless::Vec;
use log::debug;

use super::{MAX_RECORD_SIZE, SettingStorage, StorageError, decode, encode};
use crate::config::ClimateSetting;

/// Holds the encoded record in a fixed-capacity buffer.
///
/// The record goes through the same codec as persistent backends, so a
/// record that survives here survives a flash round trip too.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    bytes: Vec<u8, MAX_RECORD_SIZE>,
    saves: u32,
}

impl MemoryStorage {
    /// Empty storage; `load` returns defaults until the first `save`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage pre-populated with `setting`.
    pub fn with_setting(setting: &ClimateSetting) -> Result<Self, StorageError> {
        let mut storage = Self::new();
        storage.write(setting)?;
        Ok(storage)
    }

    /// Storage holding arbitrary bytes, e.g. a corrupted record.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, StorageError> {
        let mut storage = Self::new();
        storage
            .bytes
            .extend_from_slice(bytes)
            .map_err(|_| StorageError::Capacity(MAX_RECORD_SIZE))?;
        Ok(storage)
    }

    /// Raw encoded record.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Number of successful `save` calls.
    pub fn save_count(&self) -> u32 {
        self.saves
    }

    fn write(&mut self, setting: &ClimateSetting) -> Result<(), StorageError> {
        let mut buf = [0u8; MAX_RECORD_SIZE];
        let used = encode(setting, &mut buf)?;

        self.bytes.clear();
        self.bytes
            .extend_from_slice(used)
            .map_err(|_| StorageError::Capacity(MAX_RECORD_SIZE))
    }
}

impl SettingStorage for MemoryStorage {
    fn load(&mut self) -> ClimateSetting {
        if self.bytes.is_empty() {
            debug!("No stored climate setting, using defaults");
            return ClimateSetting::default();
        }
        decode(&self.bytes)
    }

    fn save(&mut self, setting: &ClimateSetting) -> Result<(), StorageError> {
        self.write(setting)?;
        self.saves += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AqSensorType, CalibrationBaseline};

    #[test]
    fn test_empty_storage_loads_defaults() {
        let mut storage = MemoryStorage::new();
        assert_eq!(storage.load(), ClimateSetting::default());
        assert_eq!(storage.save_count(), 0);
    }

    #[test]
    fn test_save_replaces_whole_record() {
        let mut storage = MemoryStorage::new();
        let first = ClimateSetting {
            aq_sensor: AqSensorType::Off,
            ..ClimateSetting::default()
        };
        storage.save(&first).unwrap();

        let second = ClimateSetting {
            baseline: CalibrationBaseline {
                load: true,
                store_hours: 1,
                co2: 400,
                voc: 1200,
            },
            ..ClimateSetting::default()
        };
        storage.save(&second).unwrap();

        assert_eq!(storage.load(), second);
        assert_eq!(storage.save_count(), 2);
    }

    #[test]
    fn test_corrupt_record_loads_defaults() {
        let mut storage = MemoryStorage::from_bytes(&[0xFF, 0xFF, 0xFF]).unwrap();
        assert_eq!(storage.load(), ClimateSetting::default());
    }

    #[test]
    fn test_oversized_bytes_rejected() {
        let bytes = [0u8; MAX_RECORD_SIZE + 1];
        assert_eq!(
            MemoryStorage::from_bytes(&bytes).unwrap_err(),
            StorageError::Capacity(MAX_RECORD_SIZE)
        );
    }

    #[test]
    fn test_storage_through_mutable_reference() {
        fn persist<S: SettingStorage>(mut storage: S) {
            let setting = storage.load();
            storage.save(&setting).unwrap();
        }

        let mut storage = MemoryStorage::new();
        persist(&mut storage);
        assert_eq!(storage.save_count(), 1);
    }
}
