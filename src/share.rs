//! Share-link state: platform plus input encoded as a URL query string.

use serde::{Deserialize, Serialize};
use url::form_urlencoded;

use crate::domain::decimal::canonical_f64;
use crate::domain::{MarginInput, Platform, TaxType, DEFAULT_VAT_RATE};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    pub platform: Platform,
    pub input: MarginInput,
}

/// Encode `state` as `key=value&...` without a leading `?`.
pub fn serialize_state(state: &AppState) -> String {
    let input = &state.input;
    let mut query = form_urlencoded::Serializer::new(String::new());

    query.append_pair("platform", state.platform.id());
    for (key, value) in [
        ("salePrice", input.sale_price),
        ("receivedShipping", input.received_shipping),
        ("cost", input.cost),
        ("shipOut", input.ship_out),
        ("packaging", input.packaging),
        ("adCostPerOrder", input.ad_cost_per_order),
        ("otherVariable", input.other_variable),
        ("returnRate", input.return_rate),
        ("returnShipBack", input.return_ship_back),
    ] {
        query.append_pair(key, &canonical_f64(value));
    }
    for (key, value) in [
        ("baseFeeRate", input.base_fee_rate),
        ("linkageFeeRate", input.linkage_fee_rate),
        ("shippingFeeRate", input.shipping_fee_rate),
    ] {
        if let Some(v) = value {
            query.append_pair(key, &canonical_f64(v));
        }
    }
    query.append_pair("taxType", input.tax_type.unwrap_or_default().as_str());
    query.append_pair(
        "vatRate",
        &canonical_f64(input.vat_rate.unwrap_or(DEFAULT_VAT_RATE)),
    );

    for (key, value) in [
        ("platformFeeRate", input.platform_fee_rate),
        ("paymentFeeRate", input.payment_fee_rate),
        ("extraFeeRate", input.extra_fee_rate),
    ] {
        if let Some(v) = value {
            query.append_pair(key, &canonical_f64(v));
        }
    }

    query.finish()
}

/// Decode a share query. Returns `None` when the platform is missing or unknown.
///
/// Numbers that fail to parse fall back to their defaults; rate keys that are
/// absent stay unset so legacy aliases can still apply.
pub fn deserialize_state(query: &str) -> Option<AppState> {
    let query = query.trim().trim_start_matches('?');
    let pairs: Vec<(String, String)> = form_urlencoded::parse(query.as_bytes())
        .into_owned()
        .collect();
    let get = |key: &str| {
        pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    };
    let number = |key: &str| -> Option<f64> {
        get(key)
            .and_then(|v| v.trim().parse::<f64>().ok())
            .filter(|v| !v.is_nan())
    };
    let amount = |key: &str| number(key).unwrap_or(0.0);

    let platform = get("platform")?.parse::<Platform>().ok()?;

    let tax_type = get("taxType")
        .and_then(|v| v.parse::<TaxType>().ok())
        .unwrap_or_default();

    let input = MarginInput {
        sale_price: amount("salePrice"),
        received_shipping: amount("receivedShipping"),
        cost: amount("cost"),
        ship_out: amount("shipOut"),
        packaging: amount("packaging"),
        ad_cost_per_order: amount("adCostPerOrder"),
        other_variable: amount("otherVariable"),
        return_rate: amount("returnRate"),
        return_ship_back: amount("returnShipBack"),
        base_fee_rate: number("baseFeeRate"),
        linkage_fee_rate: number("linkageFeeRate"),
        shipping_fee_rate: number("shippingFeeRate"),
        tax_type: Some(tax_type),
        vat_rate: Some(number("vatRate").unwrap_or(DEFAULT_VAT_RATE)),
        platform_fee_rate: number("platformFeeRate"),
        payment_fee_rate: number("paymentFeeRate"),
        extra_fee_rate: number("extraFeeRate"),
    };

    Some(AppState { platform, input })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> AppState {
        AppState {
            platform: Platform::SmartStore,
            input: Platform::SmartStore.preset().apply(&MarginInput {
                sale_price: 20000.0,
                cost: 8000.0,
                ship_out: 3000.0,
                return_rate: 5.0,
                return_ship_back: 3000.0,
                tax_type: Some(TaxType::General),
                vat_rate: Some(10.0),
                ..Default::default()
            }),
        }
    }

    #[test]
    fn test_serialize_layout() {
        let query = serialize_state(&state());
        assert!(query.starts_with("platform=smartstore&salePrice=20000&"));
        assert!(query.contains("baseFeeRate=0.0363"));
        assert!(query.ends_with("taxType=general&vatRate=10"));
        assert!(!query.contains("platformFeeRate"));
    }

    #[test]
    fn test_roundtrip() {
        let original = state();
        let restored = deserialize_state(&serialize_state(&original)).unwrap();
        assert_eq!(restored, original);
    }

    #[test]
    fn test_unknown_or_missing_platform() {
        assert!(deserialize_state("platform=amazon&salePrice=1").is_none());
        assert!(deserialize_state("salePrice=1").is_none());
    }

    #[test]
    fn test_bad_numbers_fall_back() {
        let state =
            deserialize_state("?platform=coupang&salePrice=abc&vatRate=NaN&taxType=simple").unwrap();
        assert_eq!(state.platform, Platform::Coupang);
        assert_eq!(state.input.sale_price, 0.0);
        assert_eq!(state.input.vat_rate, Some(10.0));
        assert_eq!(state.input.tax_type, Some(TaxType::Simplified));
    }

    #[test]
    fn test_legacy_only_link_still_applies_rates() {
        let state = deserialize_state("platform=other&salePrice=10000&platformFeeRate=0.1").unwrap();
        assert_eq!(state.input.base_fee_rate, None);
        assert_eq!(state.input.resolve().base_fee_rate, 0.1);
    }

    #[test]
    fn test_legacy_only_input_keeps_fees_across_roundtrip() {
        let original = AppState {
            platform: Platform::Other,
            input: MarginInput {
                sale_price: 10000.0,
                platform_fee_rate: Some(0.1),
                payment_fee_rate: Some(0.02),
                ..Default::default()
            },
        };
        let query = serialize_state(&original);
        assert!(!query.contains("baseFeeRate"));
        assert!(!query.contains("linkageFeeRate"));
        assert!(!query.contains("shippingFeeRate"));

        let restored = deserialize_state(&query).unwrap();
        assert_eq!(restored.input.base_fee_rate, None);
        let before = crate::engine::compute(&original.input);
        let after = crate::engine::compute(&restored.input);
        assert_eq!(before.base_fee, 1000.0);
        assert_eq!(after.base_fee, before.base_fee);
        assert_eq!(after.linkage_fee, before.linkage_fee);
        assert_eq!(after.total_fees, before.total_fees);
    }
}
