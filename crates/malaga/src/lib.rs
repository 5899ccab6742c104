#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/malaga/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! # malaga
//!
//! Benchmark replication under cash drag.
//!
//! malaga is an umbrella crate that re-exports all malaga sub-crates for
//! convenience.
//!
//! ## Quick Start
//!
//! ```ignore
//! use malaga::prelude::*;
//! use malaga::optim::ActiveRiskMinimizer;
//! use malaga::backtest::{Backtest, BacktestConfig};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let benchmark = WeightVector::new([("RY CN", 0.5), ("TD CN", 0.5)])?;
//! let config = BacktestConfig::with_equal_weight_default(
//!     benchmark,
//!     0.005,
//!     Date::from_ymd_opt(2023, 12, 29).unwrap(),
//!     Date::from_ymd_opt(2024, 1, 3).unwrap(),
//! )?;
//!
//! let report = Backtest::new(config, ActiveRiskMinimizer::default()).run(&returns)?;
//! let df = report.comparison.to_dataframe()?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Crate Organization
//!
//! - [`traits`] - Data model and trait definitions ([`Optimizer`], [`ReturnsMatrixProvider`])
//! - [`sim`] - Drifting-weight portfolio simulation
//! - [`optim`] - Tracking-variance minimization
//! - [`eval`] - Strategy comparison and tracking statistics
//! - [`backtest`] - Replication backtest orchestration
//!
//! ## Architecture
//!
//! 1. **Providers** turn price history into a returns matrix
//! 2. **Optimizers** choose a replica from a point-in-time training window
//! 3. **The simulator** drifts allocations through rebalance intervals
//! 4. **The comparison** aligns every strategy on the benchmark and measures tracking

/// Version information for the malaga crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// Core Types
// ============================================================================

/// Data model and trait definitions.
///
/// - [`ReturnsMatrix`] - Date-indexed security returns with a zero `cash` column
/// - [`WeightVector`] - Validated allocation
/// - [`DateRange`] - Half-open date ranges for point-in-time slicing
/// - [`Optimizer`] - Produces a replica for a benchmark under cash drag
/// - [`ReturnsMatrixProvider`] - Source of returns matrices
pub mod traits {
    pub use malaga_traits::*;
}

// Re-export core traits at top level for convenience
pub use malaga_traits::{Optimizer, ReturnsMatrixProvider};

// Re-export error types
pub use malaga_traits::{MalagaError, Result};

// Re-export common types
pub use malaga_traits::{CASH, Date, DateRange, ReturnsMatrix, Ticker, WeightVector};

// ============================================================================
// Simulation
// ============================================================================

/// Drifting-weight portfolio simulation.
///
/// Weights set at the first boundary drift with realized returns:
///
/// ```text
/// w_j' = w_j (1 + r_j) / (1 + sum_k w_k r_k)
/// ```
pub mod sim {
    pub use malaga_sim::*;
}

// ============================================================================
// Optimization
// ============================================================================

/// Tracking-variance minimization.
///
/// The [`ActiveRiskMinimizer`](optim::ActiveRiskMinimizer) solves
///
/// ```text
/// minimize    (w - b)' S (w - b)
/// subject to  w >= 0,  sum(w) = 1 - cash_drag
/// ```
///
/// over the benchmark's securities, shrinking the sample covariance `S` when
/// the training window has fewer observations than securities.
pub mod optim {
    pub use malaga_optim::*;
}

// ============================================================================
// Evaluation
// ============================================================================

/// Strategy comparison and tracking statistics.
///
/// Tracking error is the sample standard deviation of the period return
/// difference, in basis points:
///
/// ```text
/// TE = 1e4 * std(r_bench - r_candidate)
/// ```
pub mod eval {
    pub use malaga_eval::*;
}

// ============================================================================
// Backtesting
// ============================================================================

/// Replication backtest orchestration.
pub mod backtest {
    pub use malaga_backtest::*;
}

// ============================================================================
// Prelude
// ============================================================================

/// Prelude module for convenient imports.
///
/// ```ignore
/// use malaga::prelude::*;
/// ```
pub mod prelude {
    pub use crate::backtest::{Backtest, BacktestConfig, BacktestReport};
    pub use crate::eval::{Comparison, Strategy, TrackingStatistics};
    pub use crate::{
        CASH, Date, DateRange, MalagaError, Optimizer, Result, ReturnsMatrix,
        ReturnsMatrixProvider, Ticker, WeightVector,
    };
}

// ============================================================================
// Tests
// ============================================================================
