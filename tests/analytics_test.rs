//! Target price, volume, forecast, ROI and comparison analytics.

use seller_margin::engine::{
    solve_target_price_checked, ScenarioSet, TargetPrice, MAX_SCENARIOS,
};
use seller_margin::{
    compare_platforms, compute, compute_roi, forecast_annual, rank_platforms, simulate_volume,
    solve_target_price, MarginInput, Platform,
};

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-6
}

fn base_input() -> MarginInput {
    MarginInput {
        sale_price: 20000.0,
        cost: 8000.0,
        ship_out: 3000.0,
        base_fee_rate: Some(0.1),
        linkage_fee_rate: Some(0.0),
        shipping_fee_rate: Some(0.0),
        ..Default::default()
    }
}

#[test]
fn target_price_reaches_requested_margin() {
    let input = base_input();
    let price = solve_target_price_checked(&input, 20.0).price().unwrap();
    // (8000 + 3000) / (1 - 0.1 - 0.2)
    assert!(approx(price, 11000.0 / 0.7));

    let unit = compute(&MarginInput {
        sale_price: price,
        ..input
    });
    let margin = (price - unit.total_fees - unit.fixed_per_order) / price;
    assert!(approx(margin, 0.2));
}

#[test]
fn target_price_closed_form_is_negated_solution() {
    let input = base_input();
    let price = solve_target_price(&input, 20.0);
    // (0 * 0.8 - 11000) / (1 - 0.1 - 0.2)
    assert!(approx(price, -11000.0 / 0.7));
}

#[test]
fn target_price_feasibility_boundary_returns_zero() {
    let input = MarginInput {
        base_fee_rate: Some(0.5),
        ..base_input()
    };
    assert_eq!(solve_target_price(&input, 50.0), 0.0);
    assert_eq!(
        solve_target_price_checked(&input, 50.0),
        TargetPrice::Infeasible
    );
    assert_eq!(solve_target_price(&input, 80.0), 0.0);
    assert_eq!(
        solve_target_price_checked(&input, 80.0),
        TargetPrice::Infeasible
    );
}

#[test]
fn target_price_ignores_current_sale_price() {
    let a = solve_target_price(&base_input(), 15.0);
    let b = solve_target_price(
        &MarginInput {
            sale_price: 1.0,
            ..base_input()
        },
        15.0,
    );
    assert_eq!(a, b);
}

#[test]
fn simulation_scales_per_unit_figures() {
    let input = base_input();
    let unit = compute(&input);
    let sim = simulate_volume(&input, 100.0);

    assert!(approx(sim.total_revenue, 2_000_000.0));
    assert!(approx(sim.total_fees, unit.total_fees * 100.0));
    assert!(approx(sim.total_costs, unit.total_costs * 100.0));
    assert!(approx(
        sim.net_profit,
        sim.total_revenue - sim.total_fees - sim.total_costs
    ));
    assert!(approx(sim.average_profit_per_unit, sim.net_profit / 100.0));
}

#[test]
fn simulation_with_zero_quantity() {
    let sim = simulate_volume(&base_input(), 0.0);
    assert_eq!(sim.total_revenue, 0.0);
    assert_eq!(sim.average_profit_per_unit, 0.0);
}

#[test]
fn forecast_totals_twelve_months() {
    let input = base_input();
    let quantities = [10.0, 20.0, 30.0, 40.0, 50.0, 60.0, 70.0, 80.0, 90.0, 100.0, 110.0, 120.0];
    let forecast = forecast_annual(&input, &quantities);

    assert_eq!(forecast.monthly.len(), 12);
    assert_eq!(forecast.monthly[0].month, 1);
    assert_eq!(forecast.monthly[11].month, 12);

    let total_qty: f64 = quantities.iter().sum();
    let yearly = simulate_volume(&input, total_qty);
    assert!(approx(forecast.total_revenue, yearly.total_revenue));
    assert!((forecast.total_profit - yearly.net_profit).abs() < 1e-3);
    assert!(approx(
        forecast.average_monthly_profit,
        forecast.total_profit / 12.0
    ));
}

#[test]
fn roi_without_profit_never_pays_back() {
    let input = MarginInput {
        sale_price: 0.0,
        ..Default::default()
    };
    let roi = compute_roi(&input, 1_000_000.0, 100.0);
    assert_eq!(roi.monthly_profit, 0.0);
    assert_eq!(roi.payback_months, f64::INFINITY);
    assert!(roi.never_pays_back());
    assert_eq!(roi.roi, 0.0);
}

#[test]
fn roi_with_profit_has_finite_payback() {
    let roi = compute_roi(&base_input(), 1_000_000.0, 100.0);
    assert!(roi.monthly_profit > 0.0);
    assert!(roi.payback_months.is_finite());
    assert!(approx(roi.payback_days, roi.payback_months * 30.0));
}

#[test]
fn compare_two_platforms_reports_differences() {
    let input = MarginInput {
        sale_price: 20000.0,
        cost: 8000.0,
        ..Default::default()
    };
    let cmp = compare_platforms(&input, Platform::SmartStore, Platform::Coupang);
    assert_eq!(cmp.first.platform, Platform::SmartStore);
    assert_eq!(cmp.second.platform, Platform::Coupang);
    assert!(approx(
        cmp.payout_diff,
        cmp.first.result.net_payout - cmp.second.result.net_payout
    ));
    assert!(cmp.payout_diff > 0.0);
}

#[test]
fn ranking_covers_every_platform_best_first() {
    let input = MarginInput {
        sale_price: 20000.0,
        cost: 8000.0,
        ..Default::default()
    };
    let ranked = rank_platforms(&input);
    assert_eq!(ranked.len(), Platform::ALL.len());
    assert_eq!(ranked[0].platform, Platform::Other);
    assert!(ranked
        .windows(2)
        .all(|w| w[0].result.net_profit >= w[1].result.net_profit));
}

#[test]
fn scenario_set_is_bounded() {
    let mut set = ScenarioSet::new(&base_input());
    while set.scenarios().len() < MAX_SCENARIOS {
        set.add(&base_input()).unwrap();
    }
    assert!(set.add(&base_input()).is_err());
    assert!(set.best().is_some());
}
