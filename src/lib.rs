pub mod config;
pub mod db;
pub mod domain;
pub mod engine;
pub mod error;
pub mod export;
pub mod format;
pub mod history;
pub mod share;
pub mod store;

pub use config::Config;
pub use db::{init_db, Repository};
pub use domain::{
    lookup, Decimal, FeePreset, MarginInput, MarginResult, Platform, ResolvedInput, Status,
    TaxType,
};
pub use engine::{
    classify, compare_platforms, compute, compute_roi, evaluate_alerts, forecast_annual,
    rank_platforms, simulate_volume, solve_target_price,
};
pub use error::AppError;
pub use history::HistoryManager;
pub use store::{KeyValueStore, MemoryStore, StoreError};
