//! Lane bookkeeping for the reoptimized strategy.

use malaga_sim::PortfolioReturnRecord;
use malaga_traits::{Date, DateRange, WeightVector};
use serde::{Deserialize, Serialize};

/// States of the reoptimized lane.
///
/// Each test date except the last walks through
/// `AwaitingTrainingWindow -> Optimizing -> Simulating` before the lane moves
/// to the next date; the lane is `Done` once only the final date remains.
#[derive(Debug, Clone, PartialEq)]
pub enum RebalanceState {
    /// Waiting for the point-in-time window of test date `step`.
    AwaitingTrainingWindow {
        /// Index into the test dates
        step: usize,
    },
    /// Solving for the replica on test date `step`.
    Optimizing {
        /// Index into the test dates
        step: usize,
        /// Training window in use
        window: DateRange,
    },
    /// Simulating one interval with the chosen weights.
    Simulating {
        /// Index into the test dates
        step: usize,
        /// Training window the weights came from
        window: DateRange,
        /// Weights held over the interval
        weights: WeightVector,
        /// Whether the weights were carried from the previous step
        carried_forward: bool,
    },
    /// No interval left to simulate.
    Done,
}

/// One completed reoptimization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RebalanceStep {
    /// Decision date (interval start)
    pub date: Date,
    /// Training window used for the decision
    pub window: DateRange,
    /// Number of training dates in the window
    pub training_observations: usize,
    /// Weights held over the interval
    pub weights: WeightVector,
    /// Whether the optimizer failed and the previous weights were held
    pub carried_forward: bool,
    /// Simulation records for the interval
    pub records: Vec<PortfolioReturnRecord>,
}

/// Concatenate the records of consecutive steps.
pub fn concat_records(steps: &[RebalanceStep]) -> Vec<PortfolioReturnRecord> {
    steps.iter().flat_map(|s| s.records.iter().cloned()).collect()
}
