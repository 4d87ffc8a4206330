//! Pure calculation engine.
//!
//! Every function here is synchronous and referentially transparent: the same
//! input always yields bit-identical output, and nothing touches the clock,
//! randomness, disk or network.

pub mod alerts;
pub mod compare;
pub mod forecast;
pub mod margin;
pub mod roi;
pub mod simulation;
pub mod status;
pub mod target;

pub use alerts::{evaluate_alerts, Alert, AlertKind, AlertSettings, Severity};
pub use compare::{
    compare_platforms, rank_platforms, PlatformComparison, PlatformOutcome, Scenario, ScenarioSet,
    MAX_SCENARIOS,
};
pub use forecast::{forecast_annual, AnnualForecast, MonthlyForecast, MONTHS_PER_YEAR};
pub use margin::{calculate_vat, compute};
pub use roi::{compute_roi, RoiResult};
pub use simulation::{simulate_volume, SimulationResult};
pub use status::{classify, classify_result, THIN_MARGIN_THRESHOLD};
pub use target::{solve_target_price, solve_target_price_checked, TargetPrice};
