// src/strategy/priority.rs

use crate::model::ledger::WithdrawalLedger;
use crate::simulation::config::PriorityWeights;
use crate::strategy::traits::{BranchPosition, ScoringPolicy};

/// Keeps the balance term finite for branches with nothing on hand.
const BALANCE_OFFSET: f64 = 0.1;

// =========================================================================
// Weighted urgency score
// =========================================================================

/// Favours branches close to stock-out, with large need and fast sales.
///
/// Formula: W_bal / (balance + 0.1) + W_need * needed + W_sales * avg_sales
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightedScore {
    weights: PriorityWeights,
}

impl WeightedScore {
    pub fn new(weights: PriorityWeights) -> Self {
        Self { weights }
    }
}

impl Default for WeightedScore {
    fn default() -> Self {
        Self::new(PriorityWeights::default())
    }
}

impl ScoringPolicy for WeightedScore {
    fn score(&self, position: &BranchPosition) -> f64 {
        let w = &self.weights;
        w.balance * (1.0 / (position.balance + BALANCE_OFFSET))
            + w.need * f64::from(position.needed)
            + w.sales * position.avg_sales
    }
}

// =========================================================================
// Orderings
// =========================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankedBranch {
    pub index: usize,
    pub score: f64,
}

/// Needing branches of one product in service order, most urgent first.
///
/// Equal scores keep network order.
pub fn needing_order(column: &[BranchPosition], policy: &dyn ScoringPolicy) -> Vec<RankedBranch> {
    let mut ranked: Vec<RankedBranch> = column
        .iter()
        .filter(|position| position.needed > 0)
        .map(|position| RankedBranch {
            index: position.index,
            score: policy.score(position),
        })
        .collect();

    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
    ranked
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceCandidate {
    pub index: usize,
    pub available: u32,
}

/// Branches that can still give `product` to `requester`, best source first.
///
/// Sources are ordered by available surplus (desc), then balance (desc), then
/// daily sales (asc): drain large, slow-moving stock first. Availability is
/// read from the ledger, so sources already tapped by earlier requesters drop
/// down the list or out of it.
pub fn source_order(
    column: &[BranchPosition],
    requester: usize,
    branches: &[String],
    product: &str,
    ledger: &WithdrawalLedger,
) -> Vec<SourceCandidate> {
    let mut sources: Vec<SourceCandidate> = column
        .iter()
        .filter(|position| position.index != requester)
        .map(|position| SourceCandidate {
            index: position.index,
            available: ledger.available(&branches[position.index], product, position.surplus),
        })
        .filter(|source| source.available > 0)
        .collect();

    sources.sort_by(|a, b| {
        let (pa, pb) = (&column[a.index], &column[b.index]);
        b.available
            .cmp(&a.available)
            .then_with(|| pb.balance.total_cmp(&pa.balance))
            .then_with(|| pa.avg_sales.total_cmp(&pb.avg_sales))
    });
    sources
}
