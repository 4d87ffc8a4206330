use serde::{Deserialize, Serialize};

use super::margin::compute;
use crate::domain::input::clamp_non_negative;
use crate::domain::MarginInput;

/// Totals for selling `quantity` identical orders.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationResult {
    pub quantity: f64,
    pub total_revenue: f64,
    pub total_costs: f64,
    pub total_fees: f64,
    pub net_profit: f64,
    pub average_profit_per_unit: f64,
}

/// Scale one order's fees and costs linearly by `quantity`.
///
/// Revenue counts the sale price only. Non-finite or negative quantities are
/// treated as 0.
pub fn simulate_volume(input: &MarginInput, quantity: f64) -> SimulationResult {
    let quantity = clamp_non_negative(quantity);
    let unit = compute(input);
    let unit_price = input.resolve().sale_price;

    let total_revenue = unit_price * quantity;
    let total_fees = unit.total_fees * quantity;
    let total_costs = unit.total_costs * quantity;
    let net_profit = total_revenue - total_fees - total_costs;
    let average_profit_per_unit = if quantity > 0.0 {
        net_profit / quantity
    } else {
        0.0
    };

    SimulationResult {
        quantity,
        total_revenue,
        total_costs,
        total_fees,
        net_profit,
        average_profit_per_unit,
    }
}
