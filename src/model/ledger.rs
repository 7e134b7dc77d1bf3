// src/model/ledger.rs

use serde::Serialize;
use std::collections::BTreeMap;

/// Which matching pass produced a withdrawal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MatchRound {
    /// Round 1: priority order, proportional caps under scarcity.
    Primary,
    /// Round 2: surplus stranded after Round 1.
    Redistribution,
}

/// A single branch-to-branch transfer of one product.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WithdrawalEntry {
    pub source_branch: String,
    pub target_branch: String,
    pub product_code: String,
    pub amount: u32,
    /// Surplus the source still has for this product right after the transfer.
    pub source_surplus_remaining: u32,
    pub round: MatchRound,
}

/// Running total of surplus already committed per (source branch, product).
///
/// Totals only grow during a run; a fresh ledger is created for every run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WithdrawalLedger {
    withdrawn: BTreeMap<String, BTreeMap<String, u32>>,
}

impl WithdrawalLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn withdrawn(&self, branch: &str, product: &str) -> u32 {
        self.withdrawn
            .get(branch)
            .and_then(|products| products.get(product))
            .copied()
            .unwrap_or(0)
    }

    /// Surplus still available at `branch` given its original `surplus`.
    pub fn available(&self, branch: &str, product: &str, surplus: u32) -> u32 {
        surplus.saturating_sub(self.withdrawn(branch, product))
    }

    /// Commits `amount` units and returns the new cumulative total.
    pub fn record(&mut self, branch: &str, product: &str, amount: u32) -> u32 {
        let total = self
            .withdrawn
            .entry(branch.to_string())
            .or_default()
            .entry(product.to_string())
            .or_insert(0);
        *total += amount;
        *total
    }

    pub fn total(&self) -> u64 {
        self.iter().map(|(_, _, amount)| u64::from(amount)).sum()
    }

    /// All (branch, product, withdrawn) entries in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, u32)> {
        self.withdrawn.iter().flat_map(|(branch, products)| {
            products
                .iter()
                .map(move |(product, amount)| (branch.as_str(), product.as_str(), *amount))
        })
    }
}

/// Incoming withdrawals per (target branch, product), indexed by position.
#[derive(Debug, Clone, PartialEq)]
pub struct WithdrawalBook {
    slots: Vec<Vec<Vec<WithdrawalEntry>>>,
}

impl WithdrawalBook {
    pub fn new(branch_count: usize, product_count: usize) -> Self {
        Self {
            slots: vec![vec![Vec::new(); product_count]; branch_count],
        }
    }

    pub fn push(&mut self, target: usize, product: usize, entry: WithdrawalEntry) {
        self.slots[target][product].push(entry);
    }

    pub fn entries(&self, target: usize, product: usize) -> &[WithdrawalEntry] {
        &self.slots[target][product]
    }

    /// Total units received by `target` for `product`.
    pub fn received(&self, target: usize, product: usize) -> u32 {
        self.entries(target, product).iter().map(|e| e.amount).sum()
    }

    /// Largest number of sources feeding any single branch/product.
    pub fn max_fan_in(&self) -> usize {
        self.slots
            .iter()
            .flatten()
            .map(Vec::len)
            .max()
            .unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = &WithdrawalEntry> {
        self.slots.iter().flatten().flatten()
    }
}
