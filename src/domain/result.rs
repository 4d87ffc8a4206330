//! Calculator output types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Full per-order breakdown derived from one [`MarginInput`](super::MarginInput).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarginResult {
    /// Sale price plus shipping charged to the buyer.
    pub gmv: f64,
    pub base_fee: f64,
    pub linkage_fee: f64,
    pub shipping_fee: f64,
    pub total_fees: f64,
    pub vat: f64,
    pub expected_return_cost: f64,
    pub total_costs: f64,
    pub fixed_per_order: f64,
    /// Sale price minus marketplace fees.
    pub net_payout: f64,
    /// Sale price minus cost, fees and VAT.
    pub net_profit: f64,
    /// Percent of the sale price.
    pub net_margin_rate: f64,
    /// Base plus linkage rate, as a fraction.
    pub fee_rate_total: f64,
    /// Break-even sale price; `None` when fees alone consume the whole price.
    pub bep: Option<f64>,
}

/// Qualitative health of a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    /// Net payout is negative.
    Loss,
    /// Margin rate below 10%.
    Thin,
    Healthy,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Loss => "LOSS",
            Status::Thin => "THIN",
            Status::Healthy => "HEALTHY",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serialization() {
        assert_eq!(serde_json::to_string(&Status::Loss).unwrap(), "\"LOSS\"");
        assert_eq!(serde_json::to_string(&Status::Thin).unwrap(), "\"THIN\"");
        assert_eq!(
            serde_json::to_string(&Status::Healthy).unwrap(),
            "\"HEALTHY\""
        );
    }

    #[test]
    fn test_missing_bep_serializes_as_null() {
        let result = MarginResult::default();
        let json = serde_json::to_value(result).unwrap();
        assert!(json["bep"].is_null());
        assert!(json["netMarginRate"].is_number());
    }
}
