//! JSON and CSV export of a calculation, with a parse-back path.
//!
//! CSV exports are two-column `field,value` files so that every input and
//! result field survives a round trip. Amounts are written in canonical
//! decimal form; an uncomputable break-even price is an empty cell.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

use crate::domain::decimal::canonical_f64;
use crate::domain::{MarginInput, MarginResult, Platform, Status, TaxType};
use crate::engine::{classify_result, compute, Scenario};
use crate::format::{format_krw, format_percent};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Missing field: {0}")]
    MissingField(String),
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// One exported calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportRecord {
    pub platform: Platform,
    pub input: MarginInput,
    pub result: MarginResult,
    pub status: Status,
    pub generated_at: DateTime<Utc>,
}

impl ExportRecord {
    /// Compute `input` and stamp the record with the current time.
    pub fn new(platform: Platform, input: MarginInput) -> Self {
        let result = compute(&input);
        Self {
            platform,
            status: classify_result(&result),
            input,
            result,
            generated_at: Utc::now(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct FieldRow {
    field: String,
    value: String,
}

pub fn to_json(record: &ExportRecord) -> Result<String, ExportError> {
    Ok(serde_json::to_string_pretty(record)?)
}

pub fn from_json(json: &str) -> Result<ExportRecord, ExportError> {
    Ok(serde_json::from_str(json)?)
}

pub fn to_csv(record: &ExportRecord) -> Result<String, ExportError> {
    let input = &record.input;
    let result = &record.result;
    let optional = |v: Option<f64>| v.map(canonical_f64).unwrap_or_default();

    let rows: Vec<(&str, String)> = vec![
        ("platform", record.platform.id().to_string()),
        ("generatedAt", record.generated_at.to_rfc3339()),
        ("salePrice", canonical_f64(input.sale_price)),
        ("receivedShipping", canonical_f64(input.received_shipping)),
        ("cost", canonical_f64(input.cost)),
        ("shipOut", canonical_f64(input.ship_out)),
        ("packaging", canonical_f64(input.packaging)),
        ("adCostPerOrder", canonical_f64(input.ad_cost_per_order)),
        ("otherVariable", canonical_f64(input.other_variable)),
        ("returnRate", canonical_f64(input.return_rate)),
        ("returnShipBack", canonical_f64(input.return_ship_back)),
        ("baseFeeRate", optional(input.base_fee_rate)),
        ("linkageFeeRate", optional(input.linkage_fee_rate)),
        ("shippingFeeRate", optional(input.shipping_fee_rate)),
        (
            "taxType",
            input.tax_type.map(|t| t.as_str().to_string()).unwrap_or_default(),
        ),
        ("vatRate", optional(input.vat_rate)),
        ("platformFeeRate", optional(input.platform_fee_rate)),
        ("paymentFeeRate", optional(input.payment_fee_rate)),
        ("extraFeeRate", optional(input.extra_fee_rate)),
        ("gmv", canonical_f64(result.gmv)),
        ("baseFee", canonical_f64(result.base_fee)),
        ("linkageFee", canonical_f64(result.linkage_fee)),
        ("shippingFee", canonical_f64(result.shipping_fee)),
        ("totalFees", canonical_f64(result.total_fees)),
        ("vat", canonical_f64(result.vat)),
        ("expectedReturnCost", canonical_f64(result.expected_return_cost)),
        ("totalCosts", canonical_f64(result.total_costs)),
        ("fixedPerOrder", canonical_f64(result.fixed_per_order)),
        ("netPayout", canonical_f64(result.net_payout)),
        ("netProfit", canonical_f64(result.net_profit)),
        ("netMarginRate", canonical_f64(result.net_margin_rate)),
        ("feeRateTotal", canonical_f64(result.fee_rate_total)),
        ("bep", optional(result.bep)),
        ("status", record.status.as_str().to_string()),
    ];

    let mut writer = csv::Writer::from_writer(Vec::new());
    for (field, value) in rows {
        writer.serialize(FieldRow {
            field: field.to_string(),
            value,
        })?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| ExportError::InvalidValue("csv".to_string(), e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| ExportError::InvalidValue("csv".to_string(), e.to_string()))
}

pub fn from_csv(data: &str) -> Result<ExportRecord, ExportError> {
    let mut reader = csv::Reader::from_reader(data.as_bytes());
    let mut fields = HashMap::new();
    for row in reader.deserialize::<FieldRow>() {
        let row = row?;
        fields.insert(row.field, row.value);
    }
    let fields = CsvFields(fields);

    let platform = fields
        .required("platform")?
        .parse::<Platform>()
        .map_err(|e| ExportError::InvalidValue("platform".to_string(), e.to_string()))?;
    let generated_at = DateTime::parse_from_rfc3339(fields.required("generatedAt")?)
        .map_err(|e| ExportError::InvalidValue("generatedAt".to_string(), e.to_string()))?
        .with_timezone(&Utc);

    let tax_type = match fields.optional_text("taxType") {
        Some(s) => Some(
            s.parse::<TaxType>()
                .map_err(|e| ExportError::InvalidValue("taxType".to_string(), e))?,
        ),
        None => None,
    };

    let input = MarginInput {
        sale_price: fields.number("salePrice")?,
        received_shipping: fields.number("receivedShipping")?,
        cost: fields.number("cost")?,
        ship_out: fields.number("shipOut")?,
        packaging: fields.number("packaging")?,
        ad_cost_per_order: fields.number("adCostPerOrder")?,
        other_variable: fields.number("otherVariable")?,
        return_rate: fields.number("returnRate")?,
        return_ship_back: fields.number("returnShipBack")?,
        base_fee_rate: fields.optional_number("baseFeeRate")?,
        linkage_fee_rate: fields.optional_number("linkageFeeRate")?,
        shipping_fee_rate: fields.optional_number("shippingFeeRate")?,
        tax_type,
        vat_rate: fields.optional_number("vatRate")?,
        platform_fee_rate: fields.optional_number("platformFeeRate")?,
        payment_fee_rate: fields.optional_number("paymentFeeRate")?,
        extra_fee_rate: fields.optional_number("extraFeeRate")?,
    };

    let result = MarginResult {
        gmv: fields.number("gmv")?,
        base_fee: fields.number("baseFee")?,
        linkage_fee: fields.number("linkageFee")?,
        shipping_fee: fields.number("shippingFee")?,
        total_fees: fields.number("totalFees")?,
        vat: fields.number("vat")?,
        expected_return_cost: fields.number("expectedReturnCost")?,
        total_costs: fields.number("totalCosts")?,
        fixed_per_order: fields.number("fixedPerOrder")?,
        net_payout: fields.number("netPayout")?,
        net_profit: fields.number("netProfit")?,
        net_margin_rate: fields.number("netMarginRate")?,
        fee_rate_total: fields.number("feeRateTotal")?,
        bep: fields.optional_number("bep")?,
    };

    let status = match fields.required("status")? {
        "LOSS" => Status::Loss,
        "THIN" => Status::Thin,
        "HEALTHY" => Status::Healthy,
        other => {
            return Err(ExportError::InvalidValue(
                "status".to_string(),
                other.to_string(),
            ))
        }
    };

    Ok(ExportRecord {
        platform,
        input,
        result,
        status,
        generated_at,
    })
}

struct CsvFields(HashMap<String, String>);

impl CsvFields {
    fn required(&self, key: &str) -> Result<&str, ExportError> {
        self.0
            .get(key)
            .map(|s| s.as_str())
            .ok_or_else(|| ExportError::MissingField(key.to_string()))
    }

    fn optional_text(&self, key: &str) -> Option<&str> {
        self.0
            .get(key)
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
    }

    fn number(&self, key: &str) -> Result<f64, ExportError> {
        let raw = self.required(key)?;
        parse_number(key, raw)
    }

    fn optional_number(&self, key: &str) -> Result<Option<f64>, ExportError> {
        self.optional_text(key)
            .map(|raw| parse_number(key, raw))
            .transpose()
    }
}

fn parse_number(key: &str, raw: &str) -> Result<f64, ExportError> {
    raw.trim()
        .parse::<f64>()
        .map_err(|_| ExportError::InvalidValue(key.to_string(), raw.to_string()))
}

/// Scenario comparison table: one human-readable row per scenario.
pub fn scenarios_to_csv(platform: Platform, scenarios: &[Scenario]) -> Result<String, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record([
        "scenario",
        "platform",
        "salePrice",
        "cost",
        "totalCosts",
        "totalFees",
        "netPayout",
        "netMarginRate",
        "bep",
    ])?;
    for s in scenarios {
        writer.write_record([
            s.name.clone(),
            platform.id().to_string(),
            format_krw(s.input.sale_price),
            format_krw(s.input.cost),
            format_krw(s.result.total_costs),
            format_krw(s.result.total_fees),
            format_krw(s.result.net_payout),
            format_percent(s.result.net_margin_rate, 2),
            s.result
                .bep
                .map(format_krw)
                .unwrap_or_else(|| "n/a".to_string()),
        ])?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| ExportError::InvalidValue("csv".to_string(), e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| ExportError::InvalidValue("csv".to_string(), e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ScenarioSet;

    fn record() -> ExportRecord {
        ExportRecord::new(
            Platform::Coupang,
            Platform::Coupang.preset().apply(&MarginInput {
                sale_price: 10000.0,
                cost: 9000.0,
                ..Default::default()
            }),
        )
    }

    #[test]
    fn test_csv_has_field_value_header() {
        let csv = to_csv(&record()).unwrap();
        assert!(csv.starts_with("field,value\nplatform,coupang\n"));
        assert!(csv.contains("\nstatus,THIN\n"));
    }

    #[test]
    fn test_missing_field_is_reported() {
        let err = from_csv("field,value\nplatform,coupang\n").unwrap_err();
        assert!(matches!(err, ExportError::MissingField(ref f) if f == "generatedAt"));
    }

    #[test]
    fn test_invalid_number_is_reported() {
        let csv = to_csv(&record()).unwrap().replace("cost,9000", "cost,nine");
        let err = from_csv(&csv).unwrap_err();
        assert!(matches!(err, ExportError::InvalidValue(ref f, _) if f == "cost"));
    }

    #[test]
    fn test_bep_none_is_empty_cell() {
        let mut rec = record();
        rec.result.bep = None;
        let csv = to_csv(&rec).unwrap();
        assert!(csv.contains("\nbep,\n"));
        assert_eq!(from_csv(&csv).unwrap().result.bep, None);
    }

    #[test]
    fn test_scenarios_csv() {
        let set = ScenarioSet::new(&MarginInput {
            sale_price: 20000.0,
            cost: 8000.0,
            ..Default::default()
        });
        let csv = scenarios_to_csv(Platform::SmartStore, set.scenarios()).unwrap();
        let mut lines = csv.lines();
        assert!(lines.next().unwrap().starts_with("scenario,platform,"));
        let row = lines.next().unwrap();
        assert!(row.starts_with("Scenario A,smartstore,"));
        assert!(row.contains("\"₩20,000\""));
    }
}
