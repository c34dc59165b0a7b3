//! Humidity compensation input for the gas sensor.
//!
//! The gas sensor's on-chip algorithm expects absolute humidity in g/m³ as an
//! unsigned 8.8 fixed-point value. Both conversions are pure.

use libm::{powf, roundf};

/// Absolute humidity in g/m³ for a relative humidity (%) and temperature (°C).
///
/// Saturation vapour pressure uses the Magnus form
/// `6.11 * 10^(7.5 T / (237.7 + T))` mbar, then the ideal gas law with the
/// specific gas constant of water vapour (461.5 J/(kg·K)).
pub fn absolute_humidity(relative_humidity: f32, temperature_celsius: f32) -> f32 {
    let saturation =
        6.11 * powf(10.0, 7.5 * temperature_celsius / (237.7 + temperature_celsius));
    let vapor_pressure = relative_humidity * saturation / 100.0;

    1000.0 * vapor_pressure * 100.0 / ((temperature_celsius + 273.0) * 461.5)
}

/// Encode g/m³ as 8.8 fixed point, rounded to nearest and truncated to 16 bits.
pub fn to_fixed_point(absolute_humidity: f32) -> u16 {
    let scaled = roundf(absolute_humidity * 256.0);
    (scaled as u32 & 0xFFFF) as u16
}

/// Both steps in one call, as written to the sensor.
pub fn compensation_value(relative_humidity: f32, temperature_celsius: f32) -> u16 {
    to_fixed_point(absolute_humidity(relative_humidity, temperature_celsius))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_point() {
        let ah = absolute_humidity(50.0, 25.0);
        assert!((ah - 11.53).abs() < 0.1, "got {ah}");
    }

    #[test]
    fn test_fixed_point_encoding() {
        assert_eq!(to_fixed_point(11.53), 2952);
        assert_eq!(to_fixed_point(0.0), 0);
        assert_eq!(to_fixed_point(1.0), 256);
        // 0.5/256 rounds up
        assert_eq!(to_fixed_point(1.0 + 0.5 / 256.0), 257);
    }

    #[test]
    fn test_fixed_point_truncates_to_16_bits() {
        // 256 g/m³ is 0x1_0000 in 8.8, which wraps to zero in 16 bits
        assert_eq!(to_fixed_point(256.0), 0);
        assert_eq!(to_fixed_point(257.0), 256);
    }

    #[test]
    fn test_dry_air_has_no_water() {
        assert_eq!(absolute_humidity(0.0, 30.0), 0.0);
        assert_eq!(compensation_value(0.0, 30.0), 0);
    }

    #[test]
    fn test_monotonic_in_humidity_and_temperature() {
        let mut last = 0.0;
        for rh in (0..=100).step_by(10) {
            let ah = absolute_humidity(rh as f32, 22.0);
            assert!(ah >= last);
            last = ah;
        }

        assert!(absolute_humidity(50.0, 30.0) > absolute_humidity(50.0, 20.0));
    }

    #[test]
    fn test_deterministic() {
        assert_eq!(
            compensation_value(43.7, 21.3),
            compensation_value(43.7, 21.3)
        );
    }
}
