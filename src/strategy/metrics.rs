// src/strategy/metrics.rs

//! Stock metrics: coverage target, surplus and need per branch/product.
//!
//! Rounding is directional. Targets and needs round up so a branch is never
//! under-provisioned; surplus rounds down so a branch never promises stock it
//! does not have. Both helpers below are the only place quantities cross from
//! `f64` into whole units.

use crate::model::record::{BranchProductRecord, RawRecord, StockMetrics};
use crate::simulation::config::BalancingConfig;

/// Rounds up to whole units, clamping negatives and non-finite values to 0.
pub fn round_up(value: f64) -> u32 {
    if !value.is_finite() || value <= 0.0 {
        return 0;
    }
    value.ceil().min(u32::MAX as f64) as u32
}

/// Rounds down to whole units, clamping negatives and non-finite values to 0.
pub fn round_down(value: f64) -> u32 {
    if !value.is_finite() || value <= 0.0 {
        return 0;
    }
    value.floor().min(u32::MAX as f64) as u32
}

/// Derives coverage, surplus and need from raw sales and balance.
pub fn compute_metrics(sales: f64, balance: f64, config: &BalancingConfig) -> StockMetrics {
    let period = f64::from(config.period_days.max(1));
    let avg_sales = sales / period;

    // Multiply before dividing so whole-unit sales stay exact ahead of ceil()
    let coverage_quantity = round_up(sales * f64::from(config.coverage_days) / period);
    let surplus_quantity = round_down(balance - f64::from(coverage_quantity));
    let raw_needed = round_up(f64::from(coverage_quantity) - balance);

    let max_balance = f64::from(config.max_balance_for_need);
    let needed_quantity = if balance >= max_balance {
        // Already at the cap
        0
    } else if coverage_quantity >= config.min_coverage_for_small_need_suppression
        && raw_needed > 0
        && raw_needed < config.min_need_threshold
    {
        // Not worth a transfer
        0
    } else {
        raw_needed.min(round_down(max_balance - balance))
    };

    StockMetrics {
        avg_sales,
        coverage_quantity,
        surplus_quantity,
        needed_quantity,
    }
}

pub fn evaluate(raw: &RawRecord, config: &BalancingConfig) -> BranchProductRecord {
    let metrics = compute_metrics(raw.sales, raw.balance, config);
    BranchProductRecord::from_parts(raw, metrics)
}
