use crate::domain::{MarginInput, MarginResult};

/// VAT on value added, with sale price and cost both VAT-inclusive.
///
/// Zero when there is no value added or no rate.
pub fn calculate_vat(sale_price: f64, cost: f64, vat_rate: f64) -> f64 {
    if vat_rate <= 0.0 || sale_price <= cost {
        return 0.0;
    }
    let rate = vat_rate / 100.0;
    let vat = (sale_price - cost) / (1.0 + rate) * rate;
    vat.max(0.0)
}

/// Compute the full per-order breakdown for `input`.
///
/// Never fails: invalid numbers are clamped by [`MarginInput::resolve`] first.
pub fn compute(input: &MarginInput) -> MarginResult {
    let r = input.resolve();

    let gmv = r.sale_price + r.received_shipping;

    let base_fee = r.sale_price * r.base_fee_rate;
    let linkage_fee = r.sale_price * r.linkage_fee_rate;
    let shipping_fee = r.received_shipping * r.shipping_fee_rate;
    let total_fees = base_fee + linkage_fee + shipping_fee;

    let vat = calculate_vat(r.sale_price, r.cost, r.vat_rate);

    let expected_return_cost = r.expected_return_cost();
    let fixed_per_order = r.fixed_per_order();
    let total_costs = fixed_per_order;

    let net_payout = r.sale_price - total_fees;
    let net_profit = r.sale_price - r.cost - total_fees - vat;
    let net_margin_rate = if r.sale_price > 0.0 {
        net_profit / r.sale_price * 100.0
    } else {
        0.0
    };

    let fee_rate_total = r.fee_rate_total();
    let bep = break_even_price(fixed_per_order, r.cost, r.vat_rate, fee_rate_total);

    MarginResult {
        gmv,
        base_fee,
        linkage_fee,
        shipping_fee,
        total_fees,
        vat,
        expected_return_cost,
        total_costs,
        fixed_per_order,
        net_payout,
        net_profit,
        net_margin_rate,
        fee_rate_total,
        bep,
    }
}

/// `None` when the price-proportional fees reach 100%.
fn break_even_price(
    fixed_per_order: f64,
    cost: f64,
    vat_rate: f64,
    fee_rate_total: f64,
) -> Option<f64> {
    if fee_rate_total >= 1.0 {
        return None;
    }
    let denominator = 1.0 - fee_rate_total;
    // VAT term evaluated at a zero sale price, kept as the adjustment the
    // break-even has always used.
    let vat_adjustment = if vat_rate > 0.0 {
        calculate_vat(0.0, cost, vat_rate)
    } else {
        0.0
    };
    Some((fixed_per_order + vat_adjustment) / denominator)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TaxType;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn test_vat_on_value_added() {
        let vat = calculate_vat(20000.0, 8000.0, 10.0);
        assert!(approx(vat, 12000.0 / 1.1 * 0.1));
    }

    #[test]
    fn test_vat_zero_cases() {
        assert_eq!(calculate_vat(8000.0, 8000.0, 10.0), 0.0);
        assert_eq!(calculate_vat(5000.0, 8000.0, 10.0), 0.0);
        assert_eq!(calculate_vat(20000.0, 8000.0, 0.0), 0.0);
    }

    #[test]
    fn test_fees_apply_to_their_bases() {
        let input = MarginInput {
            sale_price: 10000.0,
            received_shipping: 3000.0,
            base_fee_rate: Some(0.1),
            linkage_fee_rate: Some(0.02),
            shipping_fee_rate: Some(0.05),
            ..Default::default()
        };
        let r = compute(&input);
        assert!(approx(r.base_fee, 1000.0));
        assert!(approx(r.linkage_fee, 200.0));
        assert!(approx(r.shipping_fee, 150.0));
        assert!(approx(r.total_fees, 1350.0));
        assert!(approx(r.fee_rate_total, 0.12));
        assert_eq!(r.gmv, 13000.0);
    }

    #[test]
    fn test_simplified_taxpayer_pays_no_vat() {
        let input = MarginInput {
            sale_price: 20000.0,
            cost: 8000.0,
            tax_type: Some(TaxType::Simplified),
            ..Default::default()
        };
        let r = compute(&input);
        assert_eq!(r.vat, 0.0);
        assert_eq!(r.net_profit, 12000.0);
    }

    #[test]
    fn test_zero_sale_price() {
        let input = MarginInput {
            received_shipping: 2500.0,
            cost: 1000.0,
            base_fee_rate: Some(0.1),
            ..Default::default()
        };
        let r = compute(&input);
        assert_eq!(r.net_margin_rate, 0.0);
        assert_eq!(r.gmv, 2500.0);
        assert_eq!(r.base_fee, 0.0);
    }

    #[test]
    fn test_bep_feasible() {
        let input = MarginInput {
            cost: 9000.0,
            ship_out: 1000.0,
            base_fee_rate: Some(0.2),
            ..Default::default()
        };
        let r = compute(&input);
        assert!(approx(r.bep.unwrap(), 10000.0 / 0.8));
    }

    #[test]
    fn test_bep_infeasible_at_full_fee() {
        let input = MarginInput {
            sale_price: 10000.0,
            base_fee_rate: Some(0.7),
            linkage_fee_rate: Some(0.3),
            ..Default::default()
        };
        assert_eq!(compute(&input).bep, None);
    }

    #[test]
    fn test_non_finite_inputs_are_clamped() {
        let input = MarginInput {
            sale_price: f64::NAN,
            cost: f64::INFINITY,
            packaging: -100.0,
            base_fee_rate: Some(f64::NAN),
            ..Default::default()
        };
        let r = compute(&input);
        assert_eq!(r.net_profit, 0.0);
        assert_eq!(r.total_costs, 0.0);
        assert_eq!(r.bep, Some(0.0));
    }
}
