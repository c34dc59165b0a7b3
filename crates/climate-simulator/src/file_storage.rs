//! File-backed setting storage.
//!
//! The record is written to a sibling temp file and renamed over the target,
//! so a crash mid-save leaves either the old or the new record, never a torn one.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use climate_node::config::ClimateSetting;
use climate_node::storage::{MAX_RECORD_SIZE, SettingStorage, StorageError, decode, encode};
use log::{debug, error, warn};

pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    fn temp_path(&self) -> PathBuf {
        self.path.with_extension("tmp")
    }
}

impl SettingStorage for FileStorage {
    fn load(&mut self) -> ClimateSetting {
        match fs::read(&self.path) {
            Ok(bytes) => decode(&bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No setting file at {}, using defaults", self.path.display());
                ClimateSetting::default()
            }
            Err(e) => {
                warn!(
                    "Failed to read {}: {}, using defaults",
                    self.path.display(),
                    e
                );
                ClimateSetting::default()
            }
        }
    }

    fn save(&mut self, setting: &ClimateSetting) -> Result<(), StorageError> {
        let mut buf = [0u8; MAX_RECORD_SIZE];
        let bytes = encode(setting, &mut buf)?;

        let temp = self.temp_path();
        fs::write(&temp, bytes).map_err(|e| {
            error!("Failed to write {}: {}", temp.display(), e);
            StorageError::Io("write failed")
        })?;
        fs::rename(&temp, &self.path).map_err(|e| {
            error!("Failed to replace {}: {}", self.path.display(), e);
            StorageError::Io("rename failed")
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use climate_node::config::{CalibrationBaseline, HtSensorType};

    #[test]
    fn test_missing_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = FileStorage::new(dir.path().join("setting.bin"));
        assert!(!storage.exists());
        assert_eq!(storage.load(), ClimateSetting::default());
    }

    #[test]
    fn test_save_replaces_record() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = FileStorage::new(dir.path().join("setting.bin"));

        let mut setting = ClimateSetting {
            ht_sensor: HtSensorType::Sht30,
            ..ClimateSetting::default()
        };
        storage.save(&setting).unwrap();

        setting.baseline = CalibrationBaseline {
            load: true,
            store_hours: 1,
            co2: 0x8A00,
            voc: 0x8B00,
        };
        storage.save(&setting).unwrap();

        assert_eq!(FileStorage::new(storage.path()).load(), setting);
        assert!(!storage.temp_path().exists());
    }

    #[test]
    fn test_garbage_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("setting.bin");
        fs::write(&path, [0xFF; 3]).unwrap();

        assert_eq!(FileStorage::new(&path).load(), ClimateSetting::default());
    }

    #[test]
    fn test_unwritable_directory_reports_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = FileStorage::new(dir.path().join("missing").join("setting.bin"));
        assert_eq!(
            storage.save(&ClimateSetting::default()),
            Err(StorageError::Io("write failed"))
        );
    }
}
