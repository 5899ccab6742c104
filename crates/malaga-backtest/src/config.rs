//! Backtest configuration.

use malaga_traits::{Date, MalagaError, Result, WeightVector};
use serde::{Deserialize, Serialize};

/// How far back the optimized lanes look when training.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum WindowPolicy {
    /// Every observation up to the cutoff; grows by one day per step.
    #[default]
    Expanding,
    /// Only the most recent `observations` dates up to the cutoff.
    Rolling {
        /// Number of trading dates kept
        observations: usize,
    },
}

/// What the reoptimized lane does when the optimizer fails on a day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum FailurePolicy {
    /// Stop the run at the failing date.
    #[default]
    Abort,
    /// Hold the previous day's optimized weights for the failing day.
    /// A failure on the first day still aborts.
    CarryForward,
}

/// Configuration for a replication backtest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestConfig {
    /// Allocation being replicated
    pub benchmark: WeightVector,
    /// Naive replica used as the comparison baseline
    pub default_weights: WeightVector,
    /// Fraction every replica must hold in cash, in `[0, 1)`
    pub cash_drag: f64,
    /// Last date of the initial training window (inclusive)
    pub training_end: Date,
    /// First date of the test range (inclusive)
    pub testing_start: Date,
    /// Training window policy for both optimized lanes
    #[serde(default)]
    pub window: WindowPolicy,
    /// Failure handling for the reoptimized lane
    #[serde(default)]
    pub failure: FailurePolicy,
}

impl BacktestConfig {
    /// Create a configuration with an expanding window that aborts on failure.
    #[must_use]
    pub const fn new(
        benchmark: WeightVector,
        default_weights: WeightVector,
        cash_drag: f64,
        training_end: Date,
        testing_start: Date,
    ) -> Self {
        Self {
            benchmark,
            default_weights,
            cash_drag,
            training_end,
            testing_start,
            window: WindowPolicy::Expanding,
            failure: FailurePolicy::Abort,
        }
    }

    /// Create a configuration whose default portfolio equal-weights the
    /// benchmark's securities after setting aside `cash_drag`.
    ///
    /// # Errors
    ///
    /// `InvalidConstraint` when `cash_drag` is outside `[0, 1)` or the
    /// benchmark holds no securities.
    pub fn with_equal_weight_default(
        benchmark: WeightVector,
        cash_drag: f64,
        training_end: Date,
        testing_start: Date,
    ) -> Result<Self> {
        let default_weights =
            WeightVector::equal_weighted(benchmark.securities().map(|(t, _)| t), cash_drag)?;
        Ok(Self::new(
            benchmark,
            default_weights,
            cash_drag,
            training_end,
            testing_start,
        ))
    }

    /// Set the training window policy.
    pub fn with_window(mut self, window: WindowPolicy) -> Self {
        self.window = window;
        self
    }

    /// Set the failure policy.
    pub fn with_failure_policy(mut self, failure: FailurePolicy) -> Self {
        self.failure = failure;
        self
    }

    /// Check the parameters that do not depend on the returns data.
    ///
    /// # Errors
    ///
    /// - `InvalidConstraint` for a cash drag outside `[0, 1)` or an empty
    ///   rolling window
    /// - `InvalidDate` when training does not end before testing starts
    pub fn validate(&self) -> Result<()> {
        if !(0.0..1.0).contains(&self.cash_drag) {
            return Err(MalagaError::InvalidConstraint(format!(
                "cash drag {} outside [0, 1)",
                self.cash_drag
            )));
        }
        if self.training_end >= self.testing_start {
            return Err(MalagaError::InvalidDate(format!(
                "training ends {} but testing starts {}",
                self.training_end, self.testing_start
            )));
        }
        if self.window == (WindowPolicy::Rolling { observations: 0 }) {
            return Err(MalagaError::InvalidConstraint(
                "rolling window needs at least one observation".to_string(),
            ));
        }
        Ok(())
    }
}
