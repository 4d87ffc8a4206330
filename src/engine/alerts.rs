//! User-configurable threshold alerts over a computed result.
//!
//! These thresholds are independent of [`classify`](super::status::classify),
//! whose cut-offs are fixed.

use serde::{Deserialize, Serialize};

use crate::domain::MarginResult;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertSettings {
    /// Percent.
    pub min_margin_rate: f64,
    /// Percent of the sale price taken by base plus linkage fees.
    pub max_fee_rate: f64,
    pub enable_alerts: bool,
}

impl Default for AlertSettings {
    fn default() -> Self {
        Self {
            min_margin_rate: 10.0,
            max_fee_rate: 50.0,
            enable_alerts: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum AlertKind {
    LowMargin { margin_rate: f64, minimum: f64 },
    HighFeeRate { fee_rate: f64, maximum: f64 },
    Loss { net_profit: f64 },
    BreakEvenUncomputable,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub severity: Severity,
    #[serde(flatten)]
    pub kind: AlertKind,
}

impl Alert {
    pub fn message(&self) -> String {
        match self.kind {
            AlertKind::LowMargin {
                margin_rate,
                minimum,
            } => format!(
                "margin rate {:.2}% is below {:.2}%",
                margin_rate, minimum
            ),
            AlertKind::HighFeeRate { fee_rate, maximum } => {
                format!("total fee rate {:.2}% exceeds {:.2}%", fee_rate, maximum)
            }
            AlertKind::Loss { .. } => {
                "this order loses money; adjust the price or costs".to_string()
            }
            AlertKind::BreakEvenUncomputable => {
                "break-even price cannot be computed: fee rate is 100% or more".to_string()
            }
        }
    }
}

/// Alerts raised by `result` under `settings`, warnings before errors.
pub fn evaluate_alerts(result: &MarginResult, settings: &AlertSettings) -> Vec<Alert> {
    if !settings.enable_alerts {
        return Vec::new();
    }

    let mut alerts = Vec::new();

    // A negative margin is reported as a loss, not as a thin margin.
    if result.net_margin_rate < settings.min_margin_rate && result.net_margin_rate >= 0.0 {
        alerts.push(Alert {
            severity: Severity::Warning,
            kind: AlertKind::LowMargin {
                margin_rate: result.net_margin_rate,
                minimum: settings.min_margin_rate,
            },
        });
    }

    let fee_rate = result.fee_rate_total * 100.0;
    if fee_rate > settings.max_fee_rate {
        alerts.push(Alert {
            severity: Severity::Warning,
            kind: AlertKind::HighFeeRate {
                fee_rate,
                maximum: settings.max_fee_rate,
            },
        });
    }

    if result.net_profit < 0.0 {
        alerts.push(Alert {
            severity: Severity::Error,
            kind: AlertKind::Loss {
                net_profit: result.net_profit,
            },
        });
    }

    if result.bep.is_none() {
        alerts.push(Alert {
            severity: Severity::Error,
            kind: AlertKind::BreakEvenUncomputable,
        });
    }

    alerts
}
