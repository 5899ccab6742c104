//! Backtest results and failures.

use std::collections::BTreeMap;

use malaga_eval::{Comparison, Strategy, TrackingStatistics};
use malaga_sim::PortfolioReturnRecord;
use malaga_traits::{Date, MalagaError, WeightVector};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::lane::RebalanceStep;

/// Results of a completed replication backtest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestReport {
    /// Test range dates (rebalance boundaries)
    pub test_dates: Vec<Date>,
    /// Weights of the once-optimized replica at the test start
    pub optimized_weights: WeightVector,
    /// Simulation records per lane, in date order
    pub lanes: BTreeMap<Strategy, Vec<PortfolioReturnRecord>>,
    /// Every reoptimization of the rebalanced lane
    pub steps: Vec<RebalanceStep>,
    /// Aligned period and cumulative returns
    pub comparison: Comparison,
    /// Tracking statistics of each candidate against the benchmark
    pub tracking: BTreeMap<Strategy, TrackingStatistics>,
}

impl BacktestReport {
    /// Records of `lane`, empty if the lane did not run.
    pub fn records(&self, lane: Strategy) -> &[PortfolioReturnRecord] {
        self.lanes.get(&lane).map(Vec::as_slice).unwrap_or_default()
    }
}

/// Lane output computed before a failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PartialResults {
    /// Records of every lane that completed
    pub lanes: BTreeMap<Strategy, Vec<PortfolioReturnRecord>>,
    /// Reoptimizations completed before the failure
    pub steps: Vec<RebalanceStep>,
}

/// A lane stopped at a specific date.
#[derive(Debug, Error)]
#[error("{lane} lane failed on {date}: {source}")]
pub struct BacktestFailure {
    /// Lane that failed
    pub lane: Strategy,
    /// Decision or interval-start date of the failure
    pub date: Date,
    /// Underlying error
    #[source]
    pub source: MalagaError,
    /// Results computed before the failure
    pub partial: PartialResults,
}

/// Errors returned by a backtest run.
#[derive(Debug, Error)]
pub enum BacktestError {
    /// Configuration or input data rejected before any lane ran.
    #[error("Backtest setup failed: {0}")]
    Setup(#[from] MalagaError),

    /// A lane failed partway through.
    #[error(transparent)]
    Lane(#[from] Box<BacktestFailure>),
}

impl BacktestError {
    /// Date of a lane failure.
    pub fn date(&self) -> Option<Date> {
        match self {
            Self::Lane(failure) => Some(failure.date),
            Self::Setup(_) => None,
        }
    }

    /// Results computed before a lane failure.
    pub fn partial(&self) -> Option<&PartialResults> {
        match self {
            Self::Lane(failure) => Some(&failure.partial),
            Self::Setup(_) => None,
        }
    }

    /// The underlying error.
    pub fn cause(&self) -> &MalagaError {
        match self {
            Self::Lane(failure) => &failure.source,
            Self::Setup(err) => err,
        }
    }
}
