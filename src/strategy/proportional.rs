// src/strategy/proportional.rs

//! Fair shares of a scarce product.
//!
//! When the network holds less surplus than its branches need, each needing
//! branch gets a share proportional to its urgency score instead of the first
//! branches in line taking everything.

use crate::strategy::metrics::round_down;
use crate::strategy::priority::{needing_order, RankedBranch};
use crate::strategy::traits::{BranchPosition, ScoringPolicy};
use tracing::debug;

/// Round 1 caps for one scarce product.
#[derive(Debug, Clone, PartialEq)]
pub struct ScarcityAllocation {
    pub total_surplus: u64,
    pub total_needed: u64,
    /// Cap per branch, indexed by network position. Zero for non-needing branches.
    pub allocated: Vec<u32>,
}

impl ScarcityAllocation {
    pub fn cap(&self, index: usize) -> u32 {
        self.allocated.get(index).copied().unwrap_or(0)
    }

    pub fn assigned(&self) -> u64 {
        self.allocated.iter().map(|&a| u64::from(a)).sum()
    }
}

pub fn totals(column: &[BranchPosition]) -> (u64, u64) {
    column.iter().fold((0, 0), |(surplus, needed), p| {
        (surplus + u64::from(p.surplus), needed + u64::from(p.needed))
    })
}

/// Computes fair-share caps, or `None` when the product is not scarce.
pub fn allocate_scarce(
    column: &[BranchPosition],
    policy: &dyn ScoringPolicy,
) -> Option<ScarcityAllocation> {
    let (total_surplus, total_needed) = totals(column);
    if total_needed == 0 || total_surplus >= total_needed {
        return None;
    }

    let ranked = needing_order(column, policy);
    let score_sum: f64 = ranked.iter().map(|r| r.score).sum();
    let by_score = score_sum.is_finite() && score_sum > 0.0;
    if !by_score {
        debug!(score_sum, "degenerate scores, splitting by raw need");
    }

    let mut allocated = vec![0u32; column.len()];
    let mut budget = total_surplus;
    for entry in &ranked {
        let needed = column[entry.index].needed;
        let share = if by_score {
            entry.score / score_sum
        } else {
            f64::from(needed) / total_needed as f64
        };
        // Never above the branch's own need, never above what is left
        let amount = u64::from(round_down(share * total_surplus as f64))
            .min(u64::from(needed))
            .min(budget);
        allocated[entry.index] = amount as u32;
        budget -= amount;
    }

    redistribute_to_unserved(&mut allocated, &ranked, column);

    Some(ScarcityAllocation {
        total_surplus,
        total_needed,
        allocated,
    })
}

/// Moves single units from branches holding more than one to needing
/// branches that got nothing from rounding.
///
/// Unserved branches are visited by daily sales (desc) then balance (asc);
/// each takes one unit from the largest current allocation, earlier priority
/// winning ties. Stops when either side runs out.
fn redistribute_to_unserved(
    allocated: &mut [u32],
    ranked: &[RankedBranch],
    column: &[BranchPosition],
) {
    let mut unserved: Vec<usize> = ranked
        .iter()
        .map(|r| r.index)
        .filter(|&index| allocated[index] == 0)
        .collect();
    unserved.sort_by(|&a, &b| {
        let (pa, pb) = (&column[a], &column[b]);
        pb.avg_sales
            .total_cmp(&pa.avg_sales)
            .then_with(|| pa.balance.total_cmp(&pb.balance))
    });

    for target in unserved {
        let mut donor: Option<usize> = None;
        for r in ranked {
            let amount = allocated[r.index];
            if amount > 1 && donor.map_or(true, |d| amount > allocated[d]) {
                donor = Some(r.index);
            }
        }
        let Some(donor) = donor else {
            break;
        };
        allocated[donor] -= 1;
        allocated[target] += 1;
    }
}
