//! Binary encoding of the setting record (postcard).

use log::{error, warn};

use super::StorageError;
use crate::config::ClimateSetting;

/// Upper bound for an encoded [`ClimateSetting`].
///
/// The record is ~35 bytes with postcard varints; the headroom leaves room
/// for new fields without changing buffer sizes.
pub const MAX_RECORD_SIZE: usize = 64;

/// Serialize `setting` into `buf`, returning the used prefix.
pub fn encode<'a>(
    setting: &ClimateSetting,
    buf: &'a mut [u8],
) -> Result<&'a mut [u8], StorageError> {
    postcard::to_slice(setting, buf).map_err(|e| {
        error!("Failed to encode climate setting: {:?}", e);
        StorageError::Encode
    })
}

/// Deserialize a stored record, falling back to defaults when it is malformed.
pub fn decode(bytes: &[u8]) -> ClimateSetting {
    match postcard::from_bytes::<ClimateSetting>(bytes) {
        Ok(setting) => setting,
        Err(e) => {
            warn!(
                "Malformed climate setting ({} bytes): {:?}, using defaults",
                bytes.len(),
                e
            );
            ClimateSetting::default()
        }
    }
}
