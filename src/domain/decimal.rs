//! Lossless decimal amount type backed by rust_decimal.
//!
//! The engine computes in `f64`; this type is the boundary representation used
//! when amounts leave the engine as text (export files, share links, stored
//! history) so they never carry exponent notation or float noise.

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal as RustDecimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::warn;

/// Decimal places kept when converting an engine value to text.
pub const TEXT_DP: u32 = 10;

/// Lossless decimal amount.
///
/// Serializes to a JSON number (not a string).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Decimal(#[serde(with = "rust_decimal::serde::float")] RustDecimal);

impl Decimal {
    pub fn new(value: RustDecimal) -> Self {
        Decimal(value)
    }

    /// Convert an engine value, rounding to [`TEXT_DP`] places.
    ///
    /// Returns `None` for NaN, infinities and values outside the decimal range.
    pub fn from_f64(value: f64) -> Option<Self> {
        if !value.is_finite() {
            return None;
        }
        RustDecimal::from_f64(value).map(|d| Decimal(d.round_dp(TEXT_DP)))
    }

    /// Parse a Decimal from a string losslessly.
    ///
    /// # Errors
    /// Returns an error if the string is not a valid decimal number.
    pub fn from_str_canonical(s: &str) -> Result<Self, rust_decimal::Error> {
        RustDecimal::from_str(s.trim()).map(Decimal)
    }

    /// Format without exponent notation and without trailing zeros.
    pub fn to_canonical_string(&self) -> String {
        let normalized = self.0.normalize();
        format!("{}", normalized)
    }

    pub fn to_f64(&self) -> f64 {
        self.0.to_f64().unwrap_or(0.0)
    }

    pub fn inner(&self) -> RustDecimal {
        self.0
    }

    pub fn zero() -> Self {
        Decimal(RustDecimal::ZERO)
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        !self.is_zero() && self.0.is_sign_negative()
    }

    /// Round half away from zero to `dp` places.
    pub fn round_dp(&self, dp: u32) -> Self {
        Decimal(
            self.0
                .round_dp_with_strategy(dp, rust_decimal::RoundingStrategy::MidpointAwayFromZero),
        )
    }
}

/// Canonical text for an engine value.
///
/// Non-finite values fall back to `"0"`. Finite values beyond the decimal range
/// are written with `f64` formatting, which is also exponent-free.
pub fn canonical_f64(value: f64) -> String {
    if !value.is_finite() {
        return "0".to_string();
    }
    match Decimal::from_f64(value) {
        Some(d) => d.to_canonical_string(),
        None => {
            warn!(value, "amount outside decimal range, writing as float");
            format!("{}", value)
        }
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_canonical_string())
    }
}

impl FromStr for Decimal {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_str_canonical(s)
    }
}

impl From<RustDecimal> for Decimal {
    fn from(value: RustDecimal) -> Self {
        Decimal(value)
    }
}

impl From<Decimal> for RustDecimal {
    fn from(value: Decimal) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_f64_drops_float_noise() {
        let d = Decimal::from_f64(0.1 + 0.2).unwrap();
        assert_eq!(d.to_canonical_string(), "0.3");
    }

    #[test]
    fn test_from_f64_rejects_non_finite() {
        assert!(Decimal::from_f64(f64::NAN).is_none());
        assert!(Decimal::from_f64(f64::INFINITY).is_none());
        assert!(Decimal::from_f64(f64::NEG_INFINITY).is_none());
    }

    #[test]
    fn test_canonical_no_exponent() {
        let d = Decimal::from_f64(1.0e12).unwrap();
        let formatted = d.to_canonical_string();
        assert!(!formatted.contains('e'));
        assert_eq!(formatted, "1000000000000");

        let small = Decimal::from_f64(0.0363).unwrap();
        assert_eq!(small.to_canonical_string(), "0.0363");
    }

    #[test]
    fn test_canonical_f64_fallback() {
        assert_eq!(canonical_f64(f64::NAN), "0");
        assert_eq!(canonical_f64(f64::INFINITY), "0");
        assert_eq!(canonical_f64(20000.0), "20000");
    }

    #[test]
    fn test_parse_trims_whitespace() {
        let d = Decimal::from_str_canonical(" 1326.5 ").unwrap();
        assert_eq!(d.to_f64(), 1326.5);
    }

    #[test]
    fn test_round_dp_half_away_from_zero() {
        let d = Decimal::from_str_canonical("1090.5").unwrap();
        assert_eq!(d.round_dp(0).to_canonical_string(), "1091");
        let neg = Decimal::from_str_canonical("-2.5").unwrap();
        assert_eq!(neg.round_dp(0).to_canonical_string(), "-3");
        assert!(neg.is_negative());
    }

    #[test]
    fn test_json_serialization_is_number() {
        let d = Decimal::from_str_canonical("9583.09").unwrap();
        let json = serde_json::to_value(d).unwrap();
        assert!(json.is_number());
    }

    #[test]
    fn test_canonical_f64_beyond_decimal_range() {
        let text = canonical_f64(1.0e30);
        assert_ne!(text, "0");
        assert!(!text.contains('e'));
        assert_eq!(text.parse::<f64>().unwrap(), 1.0e30);
        assert!(canonical_f64(-1.0e30).starts_with('-'));
    }
}
