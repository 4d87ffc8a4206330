//! Sale price for a target margin.
//!
//! The target margin here is measured against sale price plus shipping revenue
//! net of its fee, and excludes VAT:
//!
//! ```text
//! (p + net_ship) * m = p + net_ship - p * f - fixed
//! ```
//!
//! where `f` is the base plus linkage rate and `fixed` every per-order cost that
//! does not depend on the price.
//!
//! [`solve_target_price`] keeps the long-standing closed form
//! `(net_ship * (1 - m) - fixed) / (1 - f - m)`, whose numerator has the
//! opposite sign of the equation's solution, so it is negative whenever the
//! fixed costs exceed the net shipping revenue. [`solve_target_price_checked`]
//! returns the solution of the equation itself.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::MarginInput;

/// Outcome of the target-price solver.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "price", rename_all = "lowercase")]
pub enum TargetPrice {
    Feasible(f64),
    /// Fee rate plus target margin reach 100%: no price can deliver the target.
    Infeasible,
}

impl TargetPrice {
    pub fn price(&self) -> Option<f64> {
        match self {
            TargetPrice::Feasible(p) => Some(*p),
            TargetPrice::Infeasible => None,
        }
    }
}

fn denominator(fee_rate_total: f64, m: f64) -> Option<f64> {
    let denominator = 1.0 - fee_rate_total - m;
    if denominator <= 0.0 {
        debug!(
            fee_rate_total,
            target_margin = m * 100.0,
            "target margin unreachable at this fee rate"
        );
        return None;
    }
    Some(denominator)
}

/// Solve for the minimum sale price. `input.sale_price` is ignored.
///
/// `target_margin_rate` is a percentage. Solutions below zero mean any price
/// meets the target and are reported as `Feasible(0.0)`.
pub fn solve_target_price_checked(input: &MarginInput, target_margin_rate: f64) -> TargetPrice {
    if !target_margin_rate.is_finite() {
        return TargetPrice::Infeasible;
    }
    let r = input.resolve();
    let m = target_margin_rate / 100.0;
    let Some(denominator) = denominator(r.fee_rate_total(), m) else {
        return TargetPrice::Infeasible;
    };

    let net_ship = r.received_shipping * (1.0 - r.shipping_fee_rate);
    let numerator = r.fixed_per_order() - net_ship * (1.0 - m);
    TargetPrice::Feasible((numerator / denominator).max(0.0))
}

/// Closed-form target price `(net_ship * (1 - m) - fixed) / (1 - f - m)`.
///
/// Returns 0 when fee rate plus target margin reach 100%. The value is not
/// clamped and is negative for any order whose fixed costs exceed its net
/// shipping revenue; 0 is ambiguous between "infeasible" and a genuine zero.
/// Use [`solve_target_price_checked`] for the solved minimum price.
pub fn solve_target_price(input: &MarginInput, target_margin_rate: f64) -> f64 {
    if !target_margin_rate.is_finite() {
        return 0.0;
    }
    let r = input.resolve();
    let m = target_margin_rate / 100.0;
    let Some(denominator) = denominator(r.fee_rate_total(), m) else {
        return 0.0;
    };

    let net_ship = r.received_shipping * (1.0 - r.shipping_fee_rate);
    (net_ship * (1.0 - m) - r.fixed_per_order()) / denominator
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_input() -> MarginInput {
        MarginInput {
            cost: 8000.0,
            ship_out: 3000.0,
            packaging: 500.0,
            base_fee_rate: Some(0.1),
            linkage_fee_rate: Some(0.02),
            ..Default::default()
        }
    }

    #[test]
    fn test_checked_price_meets_target() {
        let input = base_input();
        let price = solve_target_price_checked(&input, 20.0).price().unwrap();
        // fixed 11500, denominator 1 - 0.12 - 0.2
        assert!((price - 11500.0 / 0.68).abs() < 1e-6);

        let profit = price - price * 0.12 - 11500.0;
        assert!((profit / price - 0.2).abs() < 1e-9);
    }

    #[test]
    fn test_closed_form_keeps_numerator_sign() {
        let input = MarginInput {
            cost: 8000.0,
            ship_out: 3000.0,
            base_fee_rate: Some(0.1),
            ..Default::default()
        };
        let price = solve_target_price(&input, 20.0);
        assert!((price - (-11000.0 / 0.7)).abs() < 1e-6);
        assert!((price + 15714.29).abs() < 0.01);

        let checked = solve_target_price_checked(&input, 20.0).price().unwrap();
        assert!((checked + price).abs() < 1e-6);
    }

    #[test]
    fn test_closed_form_with_shipping_revenue() {
        let input = MarginInput {
            received_shipping: 10000.0,
            cost: 100.0,
            shipping_fee_rate: Some(0.0),
            ..Default::default()
        };
        // (10000 * 0.9 - 100) / 0.9
        let price = solve_target_price(&input, 10.0);
        assert!((price - 8900.0 / 0.9).abs() < 1e-6);
    }

    #[test]
    fn test_sale_price_is_ignored() {
        let a = solve_target_price(&base_input(), 15.0);
        let b = solve_target_price(&base_input().with_sale_price(99999.0), 15.0);
        assert_eq!(a, b);
    }

    #[test]
    fn test_shipping_revenue_lowers_checked_price() {
        let mut input = base_input();
        let without = solve_target_price_checked(&input, 15.0).price().unwrap();
        input.received_shipping = 3000.0;
        input.shipping_fee_rate = Some(0.033);
        let with = solve_target_price_checked(&input, 15.0).price().unwrap();
        assert!(with < without);
    }

    #[test]
    fn test_infeasible_boundary_returns_zero() {
        let input = MarginInput {
            cost: 5000.0,
            base_fee_rate: Some(0.5),
            ..Default::default()
        };
        assert_eq!(solve_target_price(&input, 50.0), 0.0);
        assert_eq!(
            solve_target_price_checked(&input, 50.0),
            TargetPrice::Infeasible
        );
        assert!(solve_target_price(&input, 49.0) < 0.0);
        assert_eq!(solve_target_price(&base_input(), 95.0), 0.0);
        assert_eq!(solve_target_price(&input, f64::NAN), 0.0);
        assert_eq!(
            solve_target_price_checked(&input, f64::NAN),
            TargetPrice::Infeasible
        );
    }

    #[test]
    fn test_shipping_covers_costs() {
        let input = MarginInput {
            received_shipping: 10000.0,
            cost: 100.0,
            ..Default::default()
        };
        assert_eq!(
            solve_target_price_checked(&input, 10.0),
            TargetPrice::Feasible(0.0)
        );
    }
}
