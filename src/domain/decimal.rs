//! Fixed-point rendering of engine floats for reports, backed by rust_decimal.

use rust_decimal::Decimal as RustDecimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of decimal places kept when a float is rendered into a report.
pub const REPORT_SCALE: u32 = 8;

/// Fixed-point decimal used in reports.
///
/// Serializes to a JSON number (not string).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Decimal(#[serde(with = "rust_decimal::serde::float")] RustDecimal);

impl Decimal {
    /// Truncate `value` toward zero to `scale` decimal places.
    ///
    /// Values whose scaled magnitude does not fit an `i64` saturate.
    pub fn from_f64_truncated(value: f64, scale: u32) -> Self {
        let scaled = (value * 10f64.powi(scale as i32)) as i64;
        Decimal(RustDecimal::new(scaled, scale))
    }

    /// Truncate to [`REPORT_SCALE`] places.
    pub fn from_f64(value: f64) -> Self {
        Self::from_f64_truncated(value, REPORT_SCALE)
    }

    /// Format without trailing zeros or exponent notation.
    pub fn to_canonical_string(&self) -> String {
        format!("{}", self.0.normalize())
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_canonical_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncates_to_eight_places() {
        let d = Decimal::from_f64(1.234567891234);
        assert_eq!(d.to_canonical_string(), "1.23456789");
    }

    #[test]
    fn test_truncates_toward_zero_for_negatives() {
        let d = Decimal::from_f64(-0.123456789);
        assert_eq!(d.to_canonical_string(), "-0.12345678");
    }

    #[test]
    fn test_whole_numbers_drop_trailing_zeros() {
        assert_eq!(Decimal::from_f64(66.0).to_string(), "66");
        assert!(Decimal::from_f64(1e-12).is_zero());
    }

    #[test]
    fn test_json_serialization_is_number() {
        let json = serde_json::to_value(Decimal::from_f64(12.5)).unwrap();
        assert!(json.is_number());
        assert_eq!(json.to_string(), "12.5");
    }
}
