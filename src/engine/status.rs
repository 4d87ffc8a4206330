use crate::domain::{MarginResult, Status};

/// Margin rate (percent) below which a profitable order is still flagged thin.
pub const THIN_MARGIN_THRESHOLD: f64 = 10.0;

/// Label a result: negative payout is a loss, low margin is thin.
pub fn classify(net_payout: f64, net_margin_rate: f64) -> Status {
    if net_payout < 0.0 {
        return Status::Loss;
    }
    if net_margin_rate < THIN_MARGIN_THRESHOLD {
        return Status::Thin;
    }
    Status::Healthy
}

/// Shorthand for [`classify`] on a computed result.
pub fn classify_result(result: &MarginResult) -> Status {
    classify(result.net_payout, result.net_margin_rate)
}
