use serde::{Deserialize, Serialize};

use super::simulation::simulate_volume;
use crate::domain::input::clamp_non_negative;
use crate::domain::MarginInput;

/// Days counted per payback month.
pub const DAYS_PER_MONTH: f64 = 30.0;

/// Return on an up-front investment at a steady monthly volume.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoiResult {
    pub initial_investment: f64,
    pub monthly_profit: f64,
    pub annual_profit: f64,
    /// Percent of the investment earned back per year.
    pub roi: f64,
    /// `f64::INFINITY` when the monthly profit is not positive.
    pub payback_months: f64,
    pub payback_days: f64,
}

impl RoiResult {
    /// True when the investment is never recovered.
    pub fn never_pays_back(&self) -> bool {
        self.payback_months.is_infinite()
    }
}

pub fn compute_roi(input: &MarginInput, initial_investment: f64, monthly_quantity: f64) -> RoiResult {
    let initial_investment = clamp_non_negative(initial_investment);
    let monthly_profit = simulate_volume(input, monthly_quantity).net_profit;
    let annual_profit = monthly_profit * 12.0;

    let roi = if initial_investment > 0.0 {
        annual_profit / initial_investment * 100.0
    } else {
        0.0
    };
    let payback_months = if monthly_profit > 0.0 {
        initial_investment / monthly_profit
    } else {
        f64::INFINITY
    };

    RoiResult {
        initial_investment,
        monthly_profit,
        annual_profit,
        roi,
        payback_months,
        payback_days: payback_months * DAYS_PER_MONTH,
    }
}
