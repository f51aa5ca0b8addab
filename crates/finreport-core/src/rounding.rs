//! Decimal-place rounding for reported figures.

/// Rounds `value` to `places` decimal places, half away from zero.
///
/// Ties are resolved on the scaled binary value, not on the shortest decimal
/// form, and go away from zero rather than to even. An input whose decimal
/// text ends exactly on a 5 (e.g. `2.675`) may therefore round differently
/// from banker's rounding of that text.
#[must_use]
pub fn round_to(value: f64, places: i32) -> f64 {
    let scale = 10f64.powi(places);
    let rounded = (value * scale).round() / scale;
    // Normalize -0.0 so it serializes as 0.0
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

/// Expresses a fraction as a percentage rounded to two decimals.
#[must_use]
pub fn pct2(fraction: f64) -> f64 {
    round_to(fraction * 100.0, 2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(1.23456, 2), 1.23);
        assert_eq!(round_to(1.235_000_1, 2), 1.24);
        assert_eq!(round_to(-0.0004, 3), 0.0);
        assert_eq!(round_to(0.12345, 3), 0.123);
    }

    #[test]
    fn test_pct2() {
        assert_eq!(pct2(0.21000000000000002), 21.0);
        assert_eq!(pct2(-0.015_56), -1.56);
    }
}
