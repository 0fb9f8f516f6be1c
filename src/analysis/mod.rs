/// Analysis layer: everything computed from the prepared [`Table`].
///
/// ```text
///   Table (immutable, shared as Arc<Table>)
///     │
///     ├── regression  fit OLS per request → rounded prediction
///     ├── stats       per-column mean / std / quartiles
///     ├── charts      histogram, KDE, ECDF, box, pie, stacked bar, scatter
///     └── network     level ↔ ISO graph and its layouts
/// ```
///
/// [`Table`]: crate::data::model::Table

pub mod charts;
pub mod network;
pub mod regression;
pub mod stats;

/// Digits after the point that hold the exact expansion of any `f64` below 2^53.
const EXACT_DIGITS: usize = 1100;

/// Round half away from zero to `places` decimals.
///
/// Operates on the exact binary value, not on a scaled product: `0.045` is
/// stored as `0.04499…` and rounds to `0.04`, while the exact tie `0.125`
/// rounds to `0.13`.
pub fn round_to(value: f64, places: usize) -> f64 {
    // Beyond 2^53 every f64 is already an integer.
    if !value.is_finite() || value.abs() >= 9_007_199_254_740_992.0 {
        return value;
    }
    let exact = format!("{:.*}", EXACT_DIGITS, value.abs());
    let Some((whole, fraction)) = exact.split_once('.') else {
        return value;
    };
    let kept = format!("{whole}{}", &fraction[..places]);
    let Ok(mut scaled) = kept.parse::<u128>() else {
        return value;
    };
    if fraction.as_bytes()[places] >= b'5' {
        scaled += 1;
    }
    let magnitude = format!("{scaled}e-{places}").parse::<f64>().unwrap_or(value.abs());
    if value.is_sign_negative() {
        -magnitude
    } else {
        magnitude
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_half_away_from_zero() {
        assert_eq!(round_to(0.123456, 4), 0.1235);
        assert_eq!(round_to(-0.123456, 4), -0.1235);
        assert_eq!(round_to(2.5, 0), 3.0);
        assert_eq!(round_to(-2.5, 0), -3.0);
    }

    #[test]
    fn binary_representation_decides_ties() {
        assert_eq!(format!("{:.2}", round_to(1.005, 2)), "1.00");
        assert_eq!(format!("{:.2}", round_to(1.015625, 2)), "1.02");
    }

    #[test]
    fn near_ties_round_by_their_stored_value() {
        // Each literal is stored just below its decimal spelling.
        assert_eq!(round_to(0.015, 2), 0.01);
        assert_eq!(round_to(0.045, 2), 0.04);
        assert_eq!(round_to(0.105, 2), 0.1);
        assert_eq!(round_to(-0.045, 2), -0.04);
        // Exact binary ties go away from zero.
        assert_eq!(round_to(0.125, 2), 0.13);
        assert_eq!(round_to(-0.375, 2), -0.38);
    }

    #[test]
    fn carries_and_large_values() {
        assert_eq!(round_to(6.99999999, 4), 7.0);
        assert_eq!(round_to(99.996, 2), 100.0);
        assert_eq!(round_to(1e20, 2), 1e20);
        assert_eq!(round_to(0.0, 2), 0.0);
        assert!(round_to(f64::NAN, 2).is_nan());
    }
}
