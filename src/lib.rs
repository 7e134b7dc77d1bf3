//! Stock redistribution across a fixed network of pharmacy branches.
//!
//! For every product the engine computes each branch's need and surplus,
//! ranks needing branches by urgency, splits scarce surplus fairly, and then
//! matches surplus to need in two rounds while keeping every branch below
//! the balance cap.

pub mod error;
pub mod io;
pub mod model;
pub mod simulation;
pub mod strategy;

pub use error::{BalancingError, Result};
pub use model::ledger::{MatchRound, WithdrawalEntry, WithdrawalLedger};
pub use model::network::Network;
pub use model::record::{BranchProductRecord, RawRecord, StockMetrics};
pub use simulation::config::{BalancingConfig, PriorityWeights};
pub use simulation::engine::{BalancingEngine, BalancingOutcome, RunSummary};
pub use simulation::matching::{FillReport, FillState};
pub use strategy::priority::WeightedScore;
pub use strategy::traits::{BranchPosition, ScoringPolicy};
