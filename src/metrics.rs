//! Air quality assessment for gas sensor readings
//!
//! Maps a VOC reading onto the five ordinal bands exposed by the smart-home
//! bridge. The band is a pure step function of VOC.

/// Air quality band.
///
/// The numeric values are the ordinals published to the bridge; `Unknown` is
/// reported until the gas sensor has produced its first reading.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum AirQuality {
    #[default]
    Unknown = 0,
    /// VOC below 49 ppb
    Excellent = 1,
    /// VOC 49 to 98 ppb
    Good = 2,
    /// VOC 99 to 398 ppb
    Fair = 3,
    /// VOC 399 to 598 ppb
    Inferior = 4,
    /// VOC 599 ppb and above
    Poor = 5,
}

/// Lower VOC bound (ppb) of each band above `Excellent`.
const GOOD_FROM: f32 = 49.0;
const FAIR_FROM: f32 = 99.0;
const INFERIOR_FROM: f32 = 399.0;
const POOR_FROM: f32 = 599.0;

impl AirQuality {
    /// Assess the band for a VOC reading in ppb.
    pub fn from_voc(voc: f32) -> Self {
        if voc < GOOD_FROM {
            Self::Excellent
        } else if voc < FAIR_FROM {
            Self::Good
        } else if voc < INFERIOR_FROM {
            Self::Fair
        } else if voc < POOR_FROM {
            Self::Inferior
        } else {
            Self::Poor
        }
    }

    /// Ordinal value as published.
    pub const fn value(self) -> u8 {
        self as u8
    }

    /// Get the display label for this band
    pub const fn label(self) -> &'static str {
        match self {
            Self::Unknown => "Unknown",
            Self::Excellent => "Excellent",
            Self::Good => "Good",
            Self::Fair => "Fair",
            Self::Inferior => "Inferior",
            Self::Poor => "Poor",
        }
    }
}
