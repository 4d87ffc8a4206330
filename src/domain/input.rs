//! Calculator input record and its canonical, clamped form.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// VAT rate (percent) applied to general taxpayers when none is configured.
pub const DEFAULT_VAT_RATE: f64 = 10.0;

/// Korean VAT regime of the seller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaxType {
    /// General taxpayer: VAT on value added at the configured rate.
    #[default]
    General,
    /// Simplified taxpayer: modelled as VAT-exempt.
    #[serde(alias = "simple")]
    Simplified,
}

impl TaxType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaxType::General => "general",
            TaxType::Simplified => "simplified",
        }
    }
}

impl fmt::Display for TaxType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TaxType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "general" => Ok(TaxType::General),
            "simplified" | "simple" => Ok(TaxType::Simplified),
            other => Err(format!("unknown tax type: {}", other)),
        }
    }
}

/// Per-order inputs as entered by the seller.
///
/// Amounts are in won. Missing amounts deserialize to 0. Rate fields are
/// optional so that an absent new-named rate can fall back to its legacy alias.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MarginInput {
    pub sale_price: f64,
    /// Shipping fee charged to the buyer.
    pub received_shipping: f64,
    pub cost: f64,
    /// Outbound shipping paid by the seller.
    pub ship_out: f64,
    pub packaging: f64,
    pub ad_cost_per_order: f64,
    pub other_variable: f64,
    /// Percent of orders returned (0..=100).
    pub return_rate: f64,
    /// Shipping cost of one return.
    pub return_ship_back: f64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_fee_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linkage_fee_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipping_fee_rate: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_type: Option<TaxType>,
    /// Percent; ignored for simplified taxpayers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vat_rate: Option<f64>,

    /// Legacy alias of `base_fee_rate`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform_fee_rate: Option<f64>,
    /// Legacy alias of `linkage_fee_rate`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_fee_rate: Option<f64>,
    /// Legacy extra fee rate. Carried through storage and share links but never
    /// charged: the shipping fee reads `shipping_fee_rate` only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra_fee_rate: Option<f64>,
}

/// Canonical calculator input: every field finite and within range.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ResolvedInput {
    pub sale_price: f64,
    pub received_shipping: f64,
    pub cost: f64,
    pub ship_out: f64,
    pub packaging: f64,
    pub ad_cost_per_order: f64,
    pub other_variable: f64,
    /// Percent, 0..=100.
    pub return_rate: f64,
    pub return_ship_back: f64,
    /// Fractions, 0..=1.
    pub base_fee_rate: f64,
    pub linkage_fee_rate: f64,
    pub shipping_fee_rate: f64,
    pub tax_type: TaxType,
    /// Percent, 0..=100; always 0 for simplified taxpayers.
    pub vat_rate: f64,
}

impl ResolvedInput {
    /// Base plus linkage rate; the shipping rate applies to a different base.
    pub fn fee_rate_total(&self) -> f64 {
        self.base_fee_rate + self.linkage_fee_rate
    }

    /// Return rate as a fraction times the cost of one return.
    pub fn expected_return_cost(&self) -> f64 {
        (self.return_rate / 100.0) * self.return_ship_back
    }

    /// All per-order costs that do not depend on the sale price.
    pub fn fixed_per_order(&self) -> f64 {
        self.cost
            + self.ship_out
            + self.packaging
            + self.ad_cost_per_order
            + self.other_variable
            + self.expected_return_cost()
    }
}

/// Non-finite or negative values become 0.
pub fn clamp_non_negative(value: f64) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    value.max(0.0)
}

/// Clamp a fractional rate into `0..=1`; non-finite becomes 0.
pub fn clamp_fee_rate(value: f64) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    value.clamp(0.0, 1.0)
}

/// Clamp a percentage into `0..=100`; non-finite becomes 0.
pub fn clamp_percent(value: f64) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    value.clamp(0.0, 100.0)
}

impl MarginInput {
    /// Effective base rate: the new field when present, else the legacy alias.
    pub fn effective_base_fee_rate(&self) -> Option<f64> {
        self.base_fee_rate.or(self.platform_fee_rate)
    }

    pub fn effective_linkage_fee_rate(&self) -> Option<f64> {
        self.linkage_fee_rate.or(self.payment_fee_rate)
    }

    /// Shipping fee rate has no legacy alias.
    pub fn effective_shipping_fee_rate(&self) -> Option<f64> {
        self.shipping_fee_rate
    }

    /// Map this record onto the canonical form the formulas read.
    ///
    /// This is the only place legacy aliases and defaults are consulted.
    pub fn resolve(&self) -> ResolvedInput {
        let tax_type = self.tax_type.unwrap_or_default();
        let vat_rate = match tax_type {
            TaxType::Simplified => 0.0,
            TaxType::General => clamp_percent(self.vat_rate.unwrap_or(DEFAULT_VAT_RATE)),
        };

        ResolvedInput {
            sale_price: clamp_non_negative(self.sale_price),
            received_shipping: clamp_non_negative(self.received_shipping),
            cost: clamp_non_negative(self.cost),
            ship_out: clamp_non_negative(self.ship_out),
            packaging: clamp_non_negative(self.packaging),
            ad_cost_per_order: clamp_non_negative(self.ad_cost_per_order),
            other_variable: clamp_non_negative(self.other_variable),
            return_rate: clamp_percent(self.return_rate),
            return_ship_back: clamp_non_negative(self.return_ship_back),
            base_fee_rate: clamp_fee_rate(self.effective_base_fee_rate().unwrap_or(0.0)),
            linkage_fee_rate: clamp_fee_rate(self.effective_linkage_fee_rate().unwrap_or(0.0)),
            shipping_fee_rate: clamp_fee_rate(self.effective_shipping_fee_rate().unwrap_or(0.0)),
            tax_type,
            vat_rate,
        }
    }

    /// Same record with a different sale price.
    pub fn with_sale_price(&self, sale_price: f64) -> Self {
        MarginInput {
            sale_price,
            ..self.clone()
        }
    }
}
