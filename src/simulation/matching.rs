// src/simulation/matching.rs

use crate::model::ledger::{MatchRound, WithdrawalBook, WithdrawalEntry, WithdrawalLedger};
use crate::strategy::metrics::round_down;
use crate::strategy::priority::{source_order, RankedBranch};
use crate::strategy::proportional::ScarcityAllocation;
use crate::strategy::traits::BranchPosition;
use serde::Serialize;
use tracing::trace;

/// Everything the matching rounds need to know about one product.
#[derive(Debug, Clone, Copy)]
pub struct ProductContext<'a> {
    /// Product position in the network.
    pub product: usize,
    pub product_code: &'a str,
    pub branches: &'a [String],
    /// One position per branch, indexed by network position.
    pub column: &'a [BranchPosition],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FillState {
    Satisfied,
    /// Sources ran out before the cap was reached. Expected under scarcity.
    PartiallySatisfied,
}

/// Round 1 result for one needing branch and product.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FillReport {
    pub branch: String,
    pub product_code: String,
    pub needed: u32,
    /// How much the branch was allowed to draw.
    pub cap: u32,
    pub received: u32,
    pub state: FillState,
}

// =========================================================================
// Round 1: priority order, capped by need or fair share
// =========================================================================

/// Serves needing branches of one product in `order`.
///
/// Each branch draws up to its cap: the fair share from `scarcity` when the
/// product is scarce, its full need otherwise.
pub fn match_primary(
    ctx: &ProductContext<'_>,
    order: &[RankedBranch],
    scarcity: Option<&ScarcityAllocation>,
    ledger: &mut WithdrawalLedger,
    book: &mut WithdrawalBook,
) -> Vec<FillReport> {
    let mut reports = Vec::with_capacity(order.len());

    for ranked in order {
        let target = ranked.index;
        let needed = ctx.column[target].needed;
        let cap = scarcity.map_or(needed, |allocation| allocation.cap(target));

        let received = draw(ctx, target, cap, MatchRound::Primary, ledger, book);
        let state = if received >= cap {
            FillState::Satisfied
        } else {
            FillState::PartiallySatisfied
        };

        reports.push(FillReport {
            branch: ctx.branches[target].clone(),
            product_code: ctx.product_code.to_string(),
            needed,
            cap,
            received,
            state,
        });
    }

    reports
}

// =========================================================================
// Round 2: recover surplus stranded by Round 1
// =========================================================================

/// Routes leftover surplus of one product to branches that still need it and
/// are below `max_balance`.
///
/// Candidates are served lowest post-Round-1 balance first, faster sellers
/// winning ties. Returns the number of units moved.
pub fn redistribute(
    ctx: &ProductContext<'_>,
    max_balance: u32,
    ledger: &mut WithdrawalLedger,
    book: &mut WithdrawalBook,
) -> u32 {
    let mut candidates: Vec<(usize, f64, u32)> = Vec::new();
    for position in ctx.column {
        let received = book.received(position.index, ctx.product);
        let outstanding = position.needed.saturating_sub(received);
        if outstanding == 0 {
            continue;
        }
        let current_balance = position.balance + f64::from(received);
        let headroom = round_down(f64::from(max_balance) - current_balance);
        let capacity = outstanding.min(headroom);
        if capacity > 0 {
            candidates.push((position.index, current_balance, capacity));
        }
    }

    candidates.sort_by(|a, b| {
        a.1.total_cmp(&b.1)
            .then_with(|| ctx.column[b.0].avg_sales.total_cmp(&ctx.column[a.0].avg_sales))
    });

    candidates
        .into_iter()
        .map(|(target, _, capacity)| {
            draw(ctx, target, capacity, MatchRound::Redistribution, ledger, book)
        })
        .sum()
}

/// Pulls up to `limit` units into `target` from the best available sources,
/// committing every transfer to the ledger and the book.
fn draw(
    ctx: &ProductContext<'_>,
    target: usize,
    limit: u32,
    round: MatchRound,
    ledger: &mut WithdrawalLedger,
    book: &mut WithdrawalBook,
) -> u32 {
    if limit == 0 {
        return 0;
    }

    let mut remaining = limit;
    for source in source_order(ctx.column, target, ctx.branches, ctx.product_code, ledger) {
        if remaining == 0 {
            break;
        }
        let transfer = remaining.min(source.available);
        if transfer == 0 {
            continue;
        }

        let source_branch = &ctx.branches[source.index];
        let withdrawn = ledger.record(source_branch, ctx.product_code, transfer);
        let source_surplus_remaining = ctx.column[source.index].surplus.saturating_sub(withdrawn);

        trace!(
            product = ctx.product_code,
            from = source_branch.as_str(),
            to = ctx.branches[target].as_str(),
            amount = transfer,
            ?round,
            "withdrawal"
        );

        book.push(
            target,
            ctx.product,
            WithdrawalEntry {
                source_branch: source_branch.clone(),
                target_branch: ctx.branches[target].clone(),
                product_code: ctx.product_code.to_string(),
                amount: transfer,
                source_surplus_remaining,
                round,
            },
        );
        remaining -= transfer;
    }

    limit - remaining
}
