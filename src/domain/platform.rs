//! Marketplace identifiers and their fee presets.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use super::input::MarginInput;

/// Default fee rates for a marketplace, as fractions of the charged base.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeePreset {
    /// Applied to the sale price.
    pub base_fee_rate: f64,
    /// Applied to the sale price (e.g. price-comparison exposure).
    pub linkage_fee_rate: f64,
    /// Applied to the shipping fee received from the buyer.
    pub shipping_fee_rate: f64,
}

impl FeePreset {
    pub const fn new(base_fee_rate: f64, linkage_fee_rate: f64, shipping_fee_rate: f64) -> Self {
        Self {
            base_fee_rate,
            linkage_fee_rate,
            shipping_fee_rate,
        }
    }

    /// Copy this preset's rates onto `input`, dropping any legacy rate aliases
    /// so the preset is what the calculator reads.
    pub fn apply(&self, input: &MarginInput) -> MarginInput {
        MarginInput {
            base_fee_rate: Some(self.base_fee_rate),
            linkage_fee_rate: Some(self.linkage_fee_rate),
            shipping_fee_rate: Some(self.shipping_fee_rate),
            platform_fee_rate: None,
            payment_fee_rate: None,
            extra_fee_rate: None,
            ..input.clone()
        }
    }
}

/// Supported marketplaces. `Other` is a blank preset for user-entered rates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Platform {
    #[serde(rename = "smartstore")]
    SmartStore,
    #[serde(rename = "coupang")]
    Coupang,
    #[serde(rename = "11st")]
    ElevenStreet,
    #[serde(rename = "gmarket")]
    Gmarket,
    #[serde(rename = "auction")]
    Auction,
    #[serde(rename = "interpark")]
    Interpark,
    #[serde(rename = "ohouse")]
    Ohouse,
    #[serde(rename = "cafe24")]
    Cafe24,
    #[serde(rename = "domeggook")]
    Domeggook,
    #[serde(rename = "other")]
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown platform: {0}")]
pub struct PlatformParseError(pub String);

impl Platform {
    pub const ALL: [Platform; 10] = [
        Platform::SmartStore,
        Platform::Coupang,
        Platform::ElevenStreet,
        Platform::Gmarket,
        Platform::Auction,
        Platform::Interpark,
        Platform::Ohouse,
        Platform::Cafe24,
        Platform::Domeggook,
        Platform::Other,
    ];

    /// Identifier used in share links, exports and stored history.
    pub fn id(&self) -> &'static str {
        match self {
            Platform::SmartStore => "smartstore",
            Platform::Coupang => "coupang",
            Platform::ElevenStreet => "11st",
            Platform::Gmarket => "gmarket",
            Platform::Auction => "auction",
            Platform::Interpark => "interpark",
            Platform::Ohouse => "ohouse",
            Platform::Cafe24 => "cafe24",
            Platform::Domeggook => "domeggook",
            Platform::Other => "other",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Platform::SmartStore => "스마트스토어",
            Platform::Coupang => "쿠팡",
            Platform::ElevenStreet => "11번가",
            Platform::Gmarket => "지마켓",
            Platform::Auction => "옥션",
            Platform::Interpark => "인터파크",
            Platform::Ohouse => "오늘의집",
            Platform::Cafe24 => "카페24",
            Platform::Domeggook => "도매꾹",
            Platform::Other => "기타",
        }
    }

    /// Default fee rates for this marketplace.
    pub fn preset(&self) -> FeePreset {
        match self {
            Platform::SmartStore => FeePreset::new(0.0363, 0.03, 0.0363),
            Platform::Coupang => FeePreset::new(0.1188, 0.0, 0.033),
            Platform::ElevenStreet
            | Platform::Gmarket
            | Platform::Auction
            | Platform::Interpark => FeePreset::new(0.13, 0.02, 0.033),
            Platform::Ohouse => FeePreset::new(0.11, 0.02, 0.033),
            Platform::Cafe24 => FeePreset::new(0.03, 0.0, 0.0),
            Platform::Domeggook => FeePreset::new(0.05, 0.0, 0.033),
            Platform::Other => FeePreset::new(0.0, 0.0, 0.0),
        }
    }
}

/// Fee preset lookup by platform identifier.
pub fn lookup(platform_id: &str) -> Result<FeePreset, PlatformParseError> {
    platform_id.parse::<Platform>().map(|p| p.preset())
}

impl FromStr for Platform {
    type Err = PlatformParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Platform::ALL
            .iter()
            .copied()
            .find(|p| p.id().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| PlatformParseError(trimmed.to_string()))
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.id())
    }
}
