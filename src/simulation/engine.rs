// src/simulation/engine.rs

use crate::error::Result;
use crate::model::ledger::{MatchRound, WithdrawalBook, WithdrawalEntry, WithdrawalLedger};
use crate::model::network::Network;
use crate::model::record::BranchProductRecord;
use crate::simulation::config::BalancingConfig;
use crate::simulation::matching::{match_primary, redistribute, FillReport, FillState, ProductContext};
use crate::strategy::metrics::evaluate;
use crate::strategy::priority::{needing_order, WeightedScore};
use crate::strategy::proportional::allocate_scarce;
use crate::strategy::traits::{BranchPosition, ScoringPolicy};
use serde::Serialize;
use std::fmt;
use tracing::{debug, info};

/// Runs the full rebalancing pipeline over a network.
///
/// Products are processed one after another and, within a product, needing
/// branches strictly in priority order: every withdrawal changes what later
/// branches can still draw.
#[derive(Debug)]
pub struct BalancingEngine {
    config: BalancingConfig,
    scorer: Box<dyn ScoringPolicy>,
}

impl BalancingEngine {
    /// Engine with the weighted urgency score from `config.weights`.
    pub fn new(config: BalancingConfig) -> Result<Self> {
        let scorer = Box::new(WeightedScore::new(config.weights));
        Self::with_scorer(config, scorer)
    }

    pub fn with_scorer(config: BalancingConfig, scorer: Box<dyn ScoringPolicy>) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, scorer })
    }

    pub fn config(&self) -> &BalancingConfig {
        &self.config
    }

    pub fn run(&self, network: &Network) -> BalancingOutcome {
        let branches = network.branches();
        let product_count = network.product_count();
        info!(
            branches = branches.len(),
            products = product_count,
            "starting rebalancing run"
        );

        // 1. Stock metrics, independently per branch
        let records: Vec<Vec<BranchProductRecord>> = (0..network.branch_count())
            .map(|b| {
                network
                    .records(b)
                    .iter()
                    .map(|raw| evaluate(raw, &self.config))
                    .collect()
            })
            .collect();

        let columns: Vec<Vec<BranchPosition>> =
            (0..product_count).map(|p| column(&records, p)).collect();

        let mut ledger = WithdrawalLedger::new();
        let mut book = WithdrawalBook::new(branches.len(), product_count);
        let mut fills = Vec::new();
        let mut scarce_products = 0;

        // 2. Round 1, product by product
        for (product, column) in columns.iter().enumerate() {
            let ctx = ProductContext {
                product,
                product_code: &records[0][product].product_code,
                branches,
                column,
            };

            let order = needing_order(column, self.scorer.as_ref());
            if order.is_empty() {
                continue;
            }

            let scarcity = allocate_scarce(column, self.scorer.as_ref());
            if let Some(allocation) = &scarcity {
                scarce_products += 1;
                debug!(
                    product = ctx.product_code,
                    surplus = allocation.total_surplus,
                    needed = allocation.total_needed,
                    assigned = allocation.assigned(),
                    "scarce product, fair shares applied"
                );
            }

            fills.extend(match_primary(
                &ctx,
                &order,
                scarcity.as_ref(),
                &mut ledger,
                &mut book,
            ));
        }

        // 3. Round 2 re-scans every product once Round 1 is complete
        for (product, column) in columns.iter().enumerate() {
            let ctx = ProductContext {
                product,
                product_code: &records[0][product].product_code,
                branches,
                column,
            };
            let moved = redistribute(&ctx, self.config.max_balance_for_need, &mut ledger, &mut book);
            if moved > 0 {
                debug!(product = ctx.product_code, moved, "recovered stranded surplus");
            }
        }

        let outcome = BalancingOutcome {
            branches: branches.to_vec(),
            records,
            book,
            ledger,
            fills,
            scarce_products,
        };

        let summary = outcome.summary();
        info!(
            transferred = summary.transferred,
            redistributed = summary.redistributed,
            scarce_products = summary.scarce_products,
            "rebalancing run complete"
        );
        outcome
    }
}

fn column(records: &[Vec<BranchProductRecord>], product: usize) -> Vec<BranchPosition> {
    records
        .iter()
        .enumerate()
        .map(|(index, rows)| {
            let record = &rows[product];
            BranchPosition {
                index,
                balance: record.balance,
                avg_sales: record.avg_sales,
                surplus: record.surplus_quantity,
                needed: record.needed_quantity,
            }
        })
        .collect()
}

// =========================================================================
// Outcome
// =========================================================================

/// Result of one run: evaluated records, every withdrawal, and the ledger.
#[derive(Debug, Clone, PartialEq)]
pub struct BalancingOutcome {
    branches: Vec<String>,
    records: Vec<Vec<BranchProductRecord>>,
    book: WithdrawalBook,
    ledger: WithdrawalLedger,
    fills: Vec<FillReport>,
    scarce_products: usize,
}

impl BalancingOutcome {
    pub fn branches(&self) -> &[String] {
        &self.branches
    }

    pub fn product_count(&self) -> usize {
        self.records.first().map_or(0, Vec::len)
    }

    /// Records of one branch with coverage, surplus and need filled in.
    pub fn records(&self, branch: usize) -> &[BranchProductRecord] {
        &self.records[branch]
    }

    /// Incoming withdrawals for a branch/product, in the order they were made.
    pub fn withdrawals(&self, branch: usize, product: usize) -> &[WithdrawalEntry] {
        self.book.entries(branch, product)
    }

    pub fn received(&self, branch: usize, product: usize) -> u32 {
        self.book.received(branch, product)
    }

    /// Original surplus minus everything withdrawn from it.
    pub fn surplus_remaining(&self, branch: usize, product: usize) -> u32 {
        let record = &self.records[branch][product];
        self.ledger.available(
            &self.branches[branch],
            &record.product_code,
            record.surplus_quantity,
        )
    }

    /// Uniform slot width: the largest fan-in of any branch/product.
    pub fn slot_count(&self) -> usize {
        self.book.max_fan_in()
    }

    /// Withdrawals padded with `None` up to `slot_count()`.
    pub fn padded_slots(&self, branch: usize, product: usize) -> Vec<Option<&WithdrawalEntry>> {
        let entries = self.withdrawals(branch, product);
        (0..self.slot_count()).map(|slot| entries.get(slot)).collect()
    }

    /// Every withdrawal, grouped by receiving branch then product.
    pub fn entries(&self) -> impl Iterator<Item = &WithdrawalEntry> {
        self.book.iter()
    }

    pub fn ledger(&self) -> &WithdrawalLedger {
        &self.ledger
    }

    pub fn fills(&self) -> &[FillReport] {
        &self.fills
    }

    pub fn summary(&self) -> RunSummary {
        let mut summary = RunSummary {
            branches: self.branches.len(),
            products: self.product_count(),
            scarce_products: self.scarce_products,
            transferred: self.ledger.total(),
            ..Default::default()
        };

        for record in self.records.iter().flatten() {
            summary.total_surplus += u64::from(record.surplus_quantity);
            summary.total_needed += u64::from(record.needed_quantity);
        }
        for entry in self.entries() {
            if entry.round == MatchRound::Redistribution {
                summary.redistributed += u64::from(entry.amount);
            }
        }
        summary.partially_satisfied = self
            .fills
            .iter()
            .filter(|fill| fill.state == FillState::PartiallySatisfied)
            .count();
        summary
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub branches: usize,
    pub products: usize,
    pub total_surplus: u64,
    pub total_needed: u64,
    /// Units moved across both rounds.
    pub transferred: u64,
    /// Units moved by Round 2 alone.
    pub redistributed: u64,
    pub scarce_products: usize,
    pub partially_satisfied: usize,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Branches:            {}", self.branches)?;
        writeln!(f, "Products:            {}", self.products)?;
        writeln!(f, "Total surplus:       {}", self.total_surplus)?;
        writeln!(f, "Total need:          {}", self.total_needed)?;
        writeln!(
            f,
            "Units transferred:   {} ({} in redistribution)",
            self.transferred, self.redistributed
        )?;
        writeln!(f, "Scarce products:     {}", self.scarce_products)?;
        write!(f, "Partially satisfied: {}", self.partially_satisfied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::record::RawRecord;

    fn network(rows: &[(&str, &[(&str, f64, f64)])]) -> Network {
        let branches = rows.iter().map(|(b, _)| b.to_string()).collect();
        let records = rows.iter().map(|(branch, products)| {
            let raw = products
                .iter()
                .map(|(code, sales, balance)| RawRecord::new(*code, *code, *sales, *balance))
                .collect();
            (branch.to_string(), raw)
        });
        Network::new(branches, records).unwrap()
    }

    #[test]
    fn surplus_flows_to_needing_branch() {
        let net = network(&[
            ("A", &[("P1", 60.0, 5.0)]),
            ("B", &[("P1", 15.0, 60.0)]),
        ]);
        let outcome = BalancingEngine::new(BalancingConfig::default()).unwrap().run(&net);

        // A: coverage 40, need min(35, 25) = 25. B: coverage 10, surplus 50
        assert_eq!(outcome.records(0)[0].needed_quantity, 25);
        assert_eq!(outcome.records(1)[0].surplus_quantity, 50);
        assert_eq!(outcome.received(0, 0), 25);
        assert_eq!(outcome.surplus_remaining(1, 0), 25);
        assert_eq!(outcome.slot_count(), 1);
        assert_eq!(outcome.fills()[0].state, FillState::Satisfied);
    }

    #[test]
    fn padded_slots_have_uniform_width() {
        let net = network(&[
            ("A", &[("P1", 60.0, 2.0), ("P2", 0.0, 0.0)]),
            ("B", &[("P1", 0.0, 10.0), ("P2", 0.0, 0.0)]),
            ("C", &[("P1", 0.0, 12.0), ("P2", 0.0, 0.0)]),
        ]);
        let outcome = BalancingEngine::new(BalancingConfig::default()).unwrap().run(&net);

        assert_eq!(outcome.slot_count(), 2);
        let a_slots = outcome.padded_slots(0, 0);
        assert_eq!(a_slots.len(), 2);
        assert_eq!(a_slots[0].map(|e| e.source_branch.as_str()), Some("C"));
        assert_eq!(a_slots[1].map(|e| e.source_branch.as_str()), Some("B"));
        assert!(outcome.padded_slots(1, 1).iter().all(Option::is_none));
    }

    #[test]
    fn summary_counts_scarcity_and_partial_fills() {
        let net = network(&[
            ("A", &[("P1", 60.0, 0.0)]),
            ("B", &[("P1", 45.0, 0.0)]),
            ("C", &[("P1", 0.0, 8.0)]),
        ]);
        let outcome = BalancingEngine::new(BalancingConfig::default()).unwrap().run(&net);
        let summary = outcome.summary();

        assert_eq!(summary.total_surplus, 8);
        assert_eq!(summary.total_needed, 60);
        assert_eq!(summary.scarce_products, 1);
        assert_eq!(summary.transferred, 8);
        let moved: u64 = outcome.entries().map(|e| u64::from(e.amount)).sum();
        assert_eq!(summary.transferred, moved);
        assert_eq!(summary.partially_satisfied, 0);
        assert_eq!(outcome.surplus_remaining(2, 0), 0);
    }

    #[test]
    fn invalid_config_is_rejected_up_front() {
        let config = BalancingConfig {
            period_days: 0,
            ..Default::default()
        };
        assert!(BalancingEngine::new(config).is_err());
    }
}
