//! Property-based tests for the rebalancing invariants
//!
//! These hold for every network, not just the hand-picked scenarios.

use proptest::prelude::*;
use std::collections::HashMap;
use stock_rebalancer::io::reporting::{write_allocation_table, write_withdrawal_log};
use stock_rebalancer::strategy::metrics::round_down;
use stock_rebalancer::strategy::priority::needing_order;
use stock_rebalancer::strategy::proportional::allocate_scarce;
use stock_rebalancer::{
    BalancingConfig, BalancingEngine, BalancingOutcome, BranchPosition, Network, RawRecord,
    ScoringPolicy, WeightedScore,
};

fn build_network(branches: usize, products: usize, cells: &[(u32, u32)]) -> Network {
    let names: Vec<String> = (0..branches).map(|b| format!("branch-{}", b)).collect();
    let records = names.iter().enumerate().map(|(b, name)| {
        let rows = (0..products)
            .map(|p| {
                let (sales, balance) = cells[b * products + p];
                RawRecord::new(format!("P{}", p), format!("Product {}", p), f64::from(sales), f64::from(balance))
            })
            .collect();
        (name.clone(), rows)
    });
    Network::new(names.clone(), records).unwrap()
}

fn network_strategy() -> impl Strategy<Value = Network> {
    (2usize..=6, 1usize..=5).prop_flat_map(|(branches, products)| {
        prop::collection::vec((0u32..200, 0u32..80), branches * products)
            .prop_map(move |cells| build_network(branches, products, &cells))
    })
}

fn run(network: &Network) -> BalancingOutcome {
    BalancingEngine::new(BalancingConfig::default())
        .unwrap()
        .run(network)
}

fn outgoing(outcome: &BalancingOutcome) -> HashMap<(String, String), u32> {
    let mut totals = HashMap::new();
    for entry in outcome.entries() {
        *totals
            .entry((entry.source_branch.clone(), entry.product_code.clone()))
            .or_insert(0) += entry.amount;
    }
    totals
}

// ============================================================================
// Engine invariants
// ============================================================================

proptest! {
    /// Property: a branch never ends above the balance cap and never both gives and needs
    #[test]
    fn receivers_stay_within_cap(network in network_strategy()) {
        let outcome = run(&network);
        let cap = f64::from(BalancingConfig::default().max_balance_for_need);

        for b in 0..outcome.branches().len() {
            for (p, record) in outcome.records(b).iter().enumerate() {
                prop_assert!(!(record.surplus_quantity > 0 && record.needed_quantity > 0));
                let received = outcome.received(b, p);
                prop_assert!(received <= record.needed_quantity);
                if received > 0 {
                    prop_assert!(record.balance + f64::from(received) <= cap);
                }
            }
        }
    }

    /// Property: no source gives more than its surplus, and every unit is accounted for
    #[test]
    fn surplus_is_conserved(network in network_strategy()) {
        let outcome = run(&network);
        let out = outgoing(&outcome);

        for p in 0..outcome.product_count() {
            let mut original = 0u64;
            let mut remaining = 0u64;
            let mut withdrawn = 0u64;
            for (b, branch) in outcome.branches().iter().enumerate() {
                let record = &outcome.records(b)[p];
                let given = out
                    .get(&(branch.clone(), record.product_code.clone()))
                    .copied()
                    .unwrap_or(0);
                prop_assert!(given <= record.surplus_quantity);
                prop_assert_eq!(given, outcome.ledger().withdrawn(branch, &record.product_code));

                original += u64::from(record.surplus_quantity);
                remaining += u64::from(outcome.surplus_remaining(b, p));
                withdrawn += u64::from(given);
            }
            prop_assert_eq!(remaining + withdrawn, original);
        }
    }

    /// Property: same input, same output, down to the written bytes
    #[test]
    fn runs_are_deterministic(network in network_strategy()) {
        let first = run(&network);
        let second = run(&network);
        prop_assert_eq!(&first, &second);

        let mut a = Vec::new();
        let mut b = Vec::new();
        write_allocation_table(&mut a, &first).unwrap();
        write_allocation_table(&mut b, &second).unwrap();
        write_withdrawal_log(&mut a, &first).unwrap();
        write_withdrawal_log(&mut b, &second).unwrap();
        prop_assert_eq!(a, b);
    }
}

// ============================================================================
// Scarcity fairness
// ============================================================================

fn column_strategy() -> impl Strategy<Value = Vec<BranchPosition>> {
    prop::collection::vec((0u32..30, 0u32..100, 0u32..25, 0u32..31, any::<bool>()), 2..=8).prop_map(
        |cells| {
            cells
                .into_iter()
                .enumerate()
                .map(|(index, (balance, sales_tenths, surplus, needed, gives))| BranchPosition {
                    index,
                    balance: f64::from(balance),
                    avg_sales: f64::from(sales_tenths) / 10.0,
                    surplus: if gives { surplus } else { 0 },
                    needed: if gives { 0 } else { needed },
                })
                .collect()
        },
    )
}

proptest! {
    /// Property: fair shares never exceed the pool, a branch's need, or its share plus one unit
    #[test]
    fn scarce_shares_are_bounded(column in column_strategy()) {
        let policy = WeightedScore::default();
        if let Some(allocation) = allocate_scarce(&column, &policy) {
            prop_assert!(allocation.assigned() <= allocation.total_surplus);

            let ranked = needing_order(&column, &policy);
            let score_sum: f64 = ranked.iter().map(|r| r.score).sum();
            for position in &column {
                let cap = allocation.cap(position.index);
                prop_assert!(cap <= position.needed);
                if position.needed > 0 {
                    let share = policy.score(position) / score_sum;
                    let fair = round_down(share * allocation.total_surplus as f64);
                    prop_assert!(cap <= fair + 1);
                }
            }
        }
    }

    /// Property: a needing branch is left at zero only once nobody holds more than one unit
    #[test]
    fn zero_shares_only_when_donors_are_exhausted(column in column_strategy()) {
        if let Some(allocation) = allocate_scarce(&column, &WeightedScore::default()) {
            let starved = column
                .iter()
                .any(|p| p.needed > 0 && allocation.cap(p.index) == 0);
            if starved {
                prop_assert!(allocation.allocated.iter().all(|&a| a <= 1));
            }
        }
    }
}
