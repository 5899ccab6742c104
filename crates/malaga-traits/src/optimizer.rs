//! Core trait definition for replication optimizers.

use crate::error::Result;
use crate::matrix::ReturnsMatrix;
use crate::weights::WeightVector;

/// Produces a replicating allocation for a benchmark under a fixed cash drag.
///
/// Implementors receive only the training slice the caller decided is
/// available at decision time; they must not reach for any other data.
/// All implementations must be thread-safe (Send + Sync) so lanes can run in
/// parallel.
///
/// # Examples
///
/// ```rust,no_run
/// use malaga_traits::{Optimizer, ReturnsMatrix, Result, WeightVector};
///
/// /// Holds the benchmark's securities pro rata, ignoring the training data.
/// struct ProRata;
///
/// impl Optimizer for ProRata {
///     fn optimize(
///         &self,
///         benchmark: &WeightVector,
///         cash_drag: f64,
///         _training: &ReturnsMatrix,
///     ) -> Result<WeightVector> {
///         let invested: f64 = benchmark.securities().map(|(_, w)| w).sum();
///         let scale = (1.0 - cash_drag) / invested;
///         WeightVector::new(
///             benchmark
///                 .securities()
///                 .map(|(t, w)| (t.to_string(), w * scale))
///                 .chain([("cash".to_string(), cash_drag)]),
///         )
///     }
///
///     fn name(&self) -> &str {
///         "pro_rata"
///     }
/// }
/// ```
pub trait Optimizer: Send + Sync {
    /// Solve for a replicating allocation.
    ///
    /// # Arguments
    ///
    /// * `benchmark` - Allocation to track, may carry a `cash` entry
    /// * `cash_drag` - Cash fraction the replica must hold, in `[0, 1)`
    /// * `training` - Returns available at decision time
    ///
    /// # Returns
    ///
    /// An allocation over the benchmark's non-cash securities summing to
    /// `1 - cash_drag`, plus a `cash` entry equal to `cash_drag`.
    ///
    /// # Errors
    ///
    /// - `InvalidConstraint` when `cash_drag` is outside `[0, 1)`
    /// - `InsufficientTrainingData` when `training` cannot support an estimate
    /// - `OptimizationDidNotConverge` when the solver budget is exhausted
    fn optimize(
        &self,
        benchmark: &WeightVector,
        cash_drag: f64,
        training: &ReturnsMatrix,
    ) -> Result<WeightVector>;

    /// Name of this optimizer.
    ///
    /// Used for logging and to identify retries.
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optimizer_is_send_sync() {
        fn assert_send_sync<T: Send + Sync + ?Sized>() {}
        assert_send_sync::<dyn Optimizer>();
    }
}
