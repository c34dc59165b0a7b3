//! Word framing shared by Sensirion chips (SHT3x, SGP30).
//!
//! Data travels as big-endian 16-bit words, each followed by a CRC-8 byte.

use super::Error;

/// CRC-8 with polynomial 0x31, init 0xFF (Sensirion standard).
pub fn crc8(bytes: &[u8]) -> u8 {
    let mut crc = 0xFFu8;
    for byte in bytes {
        crc ^= *byte;
        for _ in 0..8 {
            if (crc & 0x80) != 0 {
                crc = (crc << 1) ^ 0x31;
            } else {
                crc <<= 1;
            }
        }
    }
    crc
}

/// A word followed by its CRC, ready to append to a command.
pub fn encode_word(word: u16) -> [u8; 3] {
    let [hi, lo] = word.to_be_bytes();
    [hi, lo, crc8(&[hi, lo])]
}

/// Split `data` into `N` CRC-checked words.
///
/// `data` must hold at least `3 * N` bytes.
pub fn decode_words<E, const N: usize>(data: &[u8]) -> Result<[u16; N], Error<E>> {
    let mut words = [0u16; N];
    if data.len() < 3 * N {
        return Err(Error::Crc);
    }

    for (word, chunk) in words.iter_mut().zip(data.chunks_exact(3)) {
        if crc8(&chunk[..2]) != chunk[2] {
            return Err(Error::Crc);
        }
        *word = u16::from_be_bytes([chunk[0], chunk[1]]);
    }
    Ok(words)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crc_datasheet_vector() {
        assert_eq!(crc8(&[0xBE, 0xEF]), 0x92);
    }

    #[test]
    fn test_encode_word_appends_crc() {
        assert_eq!(encode_word(0xBEEF), [0xBE, 0xEF, 0x92]);
    }

    #[test]
    fn test_decode_words() {
        let mut data = [0u8; 6];
        data[..3].copy_from_slice(&encode_word(0x1234));
        data[3..].copy_from_slice(&encode_word(0xABCD));

        let words: [u16; 2] = decode_words::<(), 2>(&data).unwrap();
        assert_eq!(words, [0x1234, 0xABCD]);
    }

    #[test]
    fn test_decode_rejects_bad_crc() {
        let mut data = encode_word(0x1234);
        data[2] ^= 0x01;
        assert_eq!(decode_words::<(), 1>(&data), Err(Error::Crc));
    }

    #[test]
    fn test_decode_rejects_short_input() {
        assert_eq!(decode_words::<(), 2>(&[0x00, 0x00, 0x81]), Err(Error::Crc));
    }
}
