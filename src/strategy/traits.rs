// src/strategy/traits.rs

use std::fmt::Debug;

/// One branch's stock position for a single product, as seen by the ranking
/// and allocation code.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BranchPosition {
    /// Position of the branch in the network.
    pub index: usize,
    pub balance: f64,
    pub avg_sales: f64,
    pub surplus: u32,
    pub needed: u32,
}

/// Scores how urgently a needing branch should be served.
///
/// The same score drives the service order and the fair-share split under
/// scarcity, so both always agree on who comes first.
pub trait ScoringPolicy: Debug + Send + Sync {
    /// Higher means more urgent. Only called for branches with `needed > 0`.
    fn score(&self, position: &BranchPosition) -> f64;
}
