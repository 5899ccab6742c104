//! Minimum active-risk replication under a cash drag.
//!
//! The replica holds `1 - c` across the benchmark's securities, long only,
//! and `c` in cash. Among those allocations it picks the one whose returns
//! over the training window deviate least from the benchmark's:
//!
//! ```text
//! minimize    (w - b)' S (w - b)
//! subject to  w >= 0,  sum(w) = 1 - c
//! ```
//!
//! where `S` is the (shrunk) sample covariance of the securities' training
//! returns and `b` the benchmark's non-cash weights. Since cash returns zero,
//! `(w - b)' S (w - b)` is exactly the sample variance of the daily return
//! difference between replica and benchmark.
//!
//! The problem is solved by accelerated projected gradient descent with
//! adaptive momentum restart, projecting onto the scaled simplex each step.

use std::iter;

use malaga_traits::stats::sample_std;
use malaga_traits::{CASH, MalagaError, Optimizer, Result, ReturnsMatrix, WeightVector};
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

use crate::covariance::{self, Shrinkage};
use crate::simplex;

/// Configuration for [`ActiveRiskMinimizer`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MinimizerConfig {
    /// Iteration budget before giving up with `OptimizationDidNotConverge`
    pub max_iterations: usize,
    /// Convergence threshold on the max-norm of the projected-gradient step
    pub tolerance: f64,
    /// Covariance shrinkage policy
    pub shrinkage: Shrinkage,
    /// Minimum number of complete training observations (at least 2)
    pub min_observations: usize,
}

impl Default for MinimizerConfig {
    fn default() -> Self {
        Self {
            max_iterations: 20_000,
            tolerance: 1e-10,
            shrinkage: Shrinkage::Auto,
            min_observations: 2,
        }
    }
}

/// Long-only tracking-variance minimizer.
///
/// # Examples
///
/// ```rust,no_run
/// use malaga_optim::{ActiveRiskMinimizer, MinimizerConfig, Shrinkage};
///
/// let minimizer = ActiveRiskMinimizer::new(MinimizerConfig {
///     shrinkage: Shrinkage::Fixed(0.1),
///     ..Default::default()
/// });
/// assert_eq!(minimizer.config().min_observations, 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ActiveRiskMinimizer {
    config: MinimizerConfig,
}

impl ActiveRiskMinimizer {
    /// Create a minimizer with the given configuration.
    #[must_use]
    pub const fn new(config: MinimizerConfig) -> Self {
        Self { config }
    }

    /// The minimizer's configuration.
    #[must_use]
    pub const fn config(&self) -> &MinimizerConfig {
        &self.config
    }

    /// Solve for the replica of `benchmark` holding `cash_drag` in cash.
    ///
    /// The result is deterministic: identical inputs give identical weights.
    ///
    /// # Errors
    ///
    /// - `InvalidConstraint` when `cash_drag` is outside `[0, 1)` or the
    ///   benchmark holds no securities
    /// - `InsufficientTrainingData` when a benchmark security has no training
    ///   column, or fewer than `min_observations` rows are complete
    /// - `OptimizationDidNotConverge` when the iteration budget runs out
    pub fn minimize_active_risk(
        &self,
        benchmark: &WeightVector,
        cash_drag: f64,
        training: &ReturnsMatrix,
    ) -> Result<WeightVector> {
        if !(0.0..1.0).contains(&cash_drag) {
            return Err(MalagaError::InvalidConstraint(format!(
                "cash drag {cash_drag} outside [0, 1)"
            )));
        }

        let (securities, bench): (Vec<&str>, Vec<f64>) = benchmark.securities().unzip();
        if securities.is_empty() {
            return Err(MalagaError::InvalidConstraint(
                "benchmark holds no securities".to_string(),
            ));
        }

        let block = self.training_block(&securities, training)?;
        let estimate = covariance::estimate(&block, self.config.shrinkage).ok_or_else(|| {
            MalagaError::InsufficientTrainingData("covariance needs 2 observations".to_string())
        })?;

        let invested = 1.0 - cash_drag;
        let target = Array1::from(bench);
        let start = starting_point(&target, invested);
        let (solution, iterations) = self.solve(&estimate.matrix, &target, start, invested)?;
        let solution = renormalize(solution, invested);

        tracing::debug!(
            securities = securities.len(),
            observations = estimate.n_obs,
            shrinkage = estimate.shrinkage,
            iterations,
            cash_drag,
            "minimized active risk"
        );

        WeightVector::new(
            securities
                .iter()
                .map(|t| t.to_string())
                .zip(solution.iter().copied())
                .chain(iter::once((CASH.to_string(), cash_drag))),
        )
    }

    /// Training returns for `securities`, keeping only complete rows.
    fn training_block(&self, securities: &[&str], training: &ReturnsMatrix) -> Result<Array2<f64>> {
        if let Some(missing) = securities.iter().find(|t| !training.contains(t)) {
            return Err(MalagaError::InsufficientTrainingData(format!(
                "no training returns for {missing}"
            )));
        }

        let block = training.select(securities)?;
        let complete: Vec<usize> = block
            .rows()
            .into_iter()
            .enumerate()
            .filter(|(_, row)| row.iter().all(|r| r.is_finite()))
            .map(|(i, _)| i)
            .collect();

        let required = self.config.min_observations.max(2);
        if complete.len() < required {
            return Err(MalagaError::InsufficientTrainingData(format!(
                "{} complete observations, need {required}",
                complete.len()
            )));
        }

        Ok(block.select(Axis(0), &complete))
    }

    /// Accelerated projected gradient on `(w - b)' S (w - b)`.
    fn solve(
        &self,
        cov: &Array2<f64>,
        target: &Array1<f64>,
        start: Array1<f64>,
        invested: f64,
    ) -> Result<(Array1<f64>, usize)> {
        let lipschitz = 2.0 * covariance::spectral_bound(cov);
        if lipschitz <= f64::MIN_POSITIVE {
            // Flat objective: every feasible allocation tracks equally well
            return Ok((start, 0));
        }
        let step_size = 1.0 / lipschitz;

        let mut x = start.clone();
        let mut y = start;
        let mut momentum = 1.0_f64;
        let mut residual = f64::INFINITY;

        for iteration in 1..=self.config.max_iterations {
            let gradient = cov.dot(&(&y - target)) * 2.0;
            let next = simplex::project(&(&y - &(gradient * step_size)), invested);

            residual = max_abs(&(&next - &y));
            if residual <= self.config.tolerance {
                return Ok((next, iteration));
            }

            let delta = &next - &x;
            if (&y - &next).dot(&delta) > 0.0 {
                momentum = 1.0;
                y = next.clone();
            } else {
                let following = (1.0 + (1.0 + 4.0 * momentum * momentum).sqrt()) / 2.0;
                y = &next + &(delta * ((momentum - 1.0) / following));
                momentum = following;
            }
            x = next;
        }

        Err(MalagaError::OptimizationDidNotConverge {
            iterations: self.config.max_iterations,
            step: residual,
        })
    }
}

impl Optimizer for ActiveRiskMinimizer {
    fn optimize(
        &self,
        benchmark: &WeightVector,
        cash_drag: f64,
        training: &ReturnsMatrix,
    ) -> Result<WeightVector> {
        self.minimize_active_risk(benchmark, cash_drag, training)
    }

    fn name(&self) -> &str {
        "active_risk_minimizer"
    }
}

/// Sample variance of the daily return difference `candidate - benchmark`
/// over `training`.
///
/// Returns NaN with fewer than two complete rows.
///
/// # Errors
///
/// `UnknownSecurity` when either allocation names a security without a column.
pub fn tracking_difference_variance(
    candidate: &WeightVector,
    benchmark: &WeightVector,
    training: &ReturnsMatrix,
) -> Result<f64> {
    let mut active = Array1::<f64>::zeros(training.tickers().len());
    for (ticker, w) in candidate.iter() {
        active[training.column_index(ticker)?] += w;
    }
    for (ticker, w) in benchmark.iter() {
        active[training.column_index(ticker)?] -= w;
    }

    let differences = training.values().dot(&active);
    Ok(sample_std(&differences.to_vec()).powi(2))
}

/// Benchmark weights scaled to `invested`, or equal weights when the
/// benchmark has nothing invested.
fn starting_point(target: &Array1<f64>, invested: f64) -> Array1<f64> {
    let total: f64 = target.iter().filter(|w| **w > 0.0).sum();
    if total > 0.0 {
        target.mapv(|w| w.max(0.0) * invested / total)
    } else {
        Array1::from_elem(target.len(), invested / target.len() as f64)
    }
}

/// Clip at zero and rescale so the weights sum to exactly `invested`.
fn renormalize(weights: Array1<f64>, invested: f64) -> Array1<f64> {
    let clipped = weights.mapv(|w| w.max(0.0));
    let total = clipped.sum();
    if total > 0.0 {
        clipped * (invested / total)
    } else {
        Array1::from_elem(clipped.len(), invested / clipped.len() as f64)
    }
}

fn max_abs(v: &Array1<f64>) -> f64 {
    v.iter().fold(0.0, |m, x| m.max(x.abs()))
}
