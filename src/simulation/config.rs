// src/simulation/config.rs

use crate::error::{BalancingError, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;

/// Weights of the urgency score used to rank needing branches.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriorityWeights {
    pub balance: f64,
    pub need: f64,
    pub sales: f64,
}

impl Default for PriorityWeights {
    fn default() -> Self {
        Self {
            balance: 0.60,
            need: 0.30,
            sales: 0.10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalancingConfig {
    /// Length of the sales period in days.
    pub period_days: u32,
    /// Days of sales a branch should hold.
    pub coverage_days: u32,
    /// No branch may end up above this balance; branches at or above it need nothing.
    pub max_balance_for_need: u32,
    pub min_coverage_for_small_need_suppression: u32,
    pub min_need_threshold: u32,
    pub weights: PriorityWeights,
}

impl Default for BalancingConfig {
    fn default() -> Self {
        Self {
            period_days: 30,
            coverage_days: 20,
            max_balance_for_need: 30,
            min_coverage_for_small_need_suppression: 15,
            min_need_threshold: 10,
            weights: PriorityWeights::default(),
        }
    }
}

impl BalancingConfig {
    /// Defaults overlaid with `REBALANCE_*` environment variables.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        let config = Self {
            period_days: env_or("REBALANCE_PERIOD_DAYS", defaults.period_days)?,
            coverage_days: env_or("REBALANCE_COVERAGE_DAYS", defaults.coverage_days)?,
            max_balance_for_need: env_or("REBALANCE_MAX_BALANCE", defaults.max_balance_for_need)?,
            min_coverage_for_small_need_suppression: env_or(
                "REBALANCE_MIN_COVERAGE_FOR_SUPPRESSION",
                defaults.min_coverage_for_small_need_suppression,
            )?,
            min_need_threshold: env_or("REBALANCE_MIN_NEED", defaults.min_need_threshold)?,
            weights: PriorityWeights {
                balance: env_or("REBALANCE_WEIGHT_BALANCE", defaults.weights.balance)?,
                need: env_or("REBALANCE_WEIGHT_NEED", defaults.weights.need)?,
                sales: env_or("REBALANCE_WEIGHT_SALES", defaults.weights.sales)?,
            },
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.period_days == 0 {
            return Err(BalancingError::InvalidConfig(
                "period_days must be at least 1".to_string(),
            ));
        }
        if self.coverage_days == 0 {
            return Err(BalancingError::InvalidConfig(
                "coverage_days must be at least 1".to_string(),
            ));
        }
        let weights = [
            ("balance", self.weights.balance),
            ("need", self.weights.need),
            ("sales", self.weights.sales),
        ];
        for (name, weight) in weights {
            if !weight.is_finite() || weight < 0.0 {
                return Err(BalancingError::InvalidConfig(format!(
                    "weight {} must be a finite non-negative number, got {}",
                    name, weight
                )));
            }
        }
        Ok(())
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> Result<T> {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().map_err(|_| {
            BalancingError::InvalidConfig(format!("{} has an invalid value: {:?}", key, raw))
        }),
        Err(_) => Ok(default),
    }
}
