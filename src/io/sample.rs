// src/io/sample.rs

use crate::error::{BalancingError, Result};
use crate::model::network::Network;
use crate::model::record::RawRecord;
use rand::Rng;
use rand_distr::{Distribution, Normal};

/// Shape of the randomly generated demo data.
#[derive(Debug, Clone, Copy)]
pub struct SampleProfile {
    /// Mean period sales per branch/product.
    pub mean_sales: f64,
    pub sales_std_dev: f64,
    pub mean_balance: f64,
    pub balance_std_dev: f64,
}

impl Default for SampleProfile {
    fn default() -> Self {
        Self {
            mean_sales: 30.0,
            sales_std_dev: 25.0,
            mean_balance: 25.0,
            balance_std_dev: 20.0,
        }
    }
}

/// Generates a network where every branch stocks the same `products` items.
///
/// Sales and balances are drawn from normal distributions, rounded to whole
/// units and clamped at 0, which gives a realistic mix of surplus, need and
/// scarce products.
pub fn generate_sample_network<R: Rng>(
    branches: &[&str],
    products: usize,
    profile: SampleProfile,
    rng: &mut R,
) -> Result<Network> {
    for (name, std_dev) in [
        ("sales", profile.sales_std_dev),
        ("balance", profile.balance_std_dev),
    ] {
        if !std_dev.is_finite() || std_dev < 0.0 {
            return Err(BalancingError::InvalidConfig(format!(
                "{} std dev must be a finite non-negative number, got {}",
                name, std_dev
            )));
        }
    }

    let sales = Normal::new(profile.mean_sales, profile.sales_std_dev)
        .map_err(|e| BalancingError::InvalidConfig(format!("sales distribution: {}", e)))?;
    let balance = Normal::new(profile.mean_balance, profile.balance_std_dev)
        .map_err(|e| BalancingError::InvalidConfig(format!("balance distribution: {}", e)))?;

    let mut records = Vec::with_capacity(branches.len());
    for branch in branches {
        let rows = (0..products)
            .map(|p| {
                RawRecord::new(
                    format!("P{:03}", p + 1),
                    format!("Product {}", p + 1),
                    whole_units(sales.sample(rng)),
                    whole_units(balance.sample(rng)),
                )
            })
            .collect();
        records.push((branch.to_string(), rows));
    }

    Network::new(branches.iter().map(|b| b.to_string()).collect(), records)
}

fn whole_units(value: f64) -> f64 {
    value.round().max(0.0)
}
