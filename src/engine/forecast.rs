use serde::{Deserialize, Serialize};
use tracing::debug;

use super::simulation::simulate_volume;
use crate::domain::MarginInput;

pub const MONTHS_PER_YEAR: usize = 12;

/// One month of an annual forecast.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyForecast {
    /// 1-based month number.
    pub month: u32,
    pub sales_quantity: f64,
    pub revenue: f64,
    pub costs: f64,
    pub fees: f64,
    pub profit: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnualForecast {
    pub monthly: Vec<MonthlyForecast>,
    pub total_revenue: f64,
    pub total_costs: f64,
    pub total_fees: f64,
    pub total_profit: f64,
    pub average_monthly_profit: f64,
}

/// Simulate each month independently and total the year.
pub fn forecast_annual(
    input: &MarginInput,
    monthly_quantities: &[f64; MONTHS_PER_YEAR],
) -> AnnualForecast {
    let monthly: Vec<MonthlyForecast> = monthly_quantities
        .iter()
        .zip(1u32..)
        .map(|(&quantity, month)| {
            let sim = simulate_volume(input, quantity);
            MonthlyForecast {
                month,
                sales_quantity: sim.quantity,
                revenue: sim.total_revenue,
                costs: sim.total_costs,
                fees: sim.total_fees,
                profit: sim.net_profit,
            }
        })
        .collect();

    let total_revenue = monthly.iter().map(|m| m.revenue).sum();
    let total_costs = monthly.iter().map(|m| m.costs).sum();
    let total_fees = monthly.iter().map(|m| m.fees).sum();
    let total_profit: f64 = monthly.iter().map(|m| m.profit).sum();
    let average_monthly_profit = total_profit / MONTHS_PER_YEAR as f64;

    debug!(total_profit, "annual forecast computed");

    AnnualForecast {
        monthly,
        total_revenue,
        total_costs,
        total_fees,
        total_profit,
        average_monthly_profit,
    }
}
