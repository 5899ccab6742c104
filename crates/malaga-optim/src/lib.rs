//! Replication optimizers for malaga.
//!
//! This crate finds the long-only allocation that best tracks a benchmark
//! when part of the portfolio must sit in cash. It provides:
//! - [`ActiveRiskMinimizer`]: minimum tracking-variance replication
//! - [`covariance`]: sample covariance estimation with shrinkage
//! - [`simplex`]: Euclidean projection onto the scaled probability simplex
//!
//! # Examples
//!
//! ```rust,no_run
//! use malaga_optim::{ActiveRiskMinimizer, MinimizerConfig};
//! use malaga_traits::{Date, ReturnsMatrix, WeightVector};
//!
//! let dates: Vec<Date> = (1..=5)
//!     .map(|d| Date::from_ymd_opt(2024, 1, d).unwrap())
//!     .collect();
//! let training = ReturnsMatrix::from_columns(
//!     dates,
//!     vec![
//!         ("RY CN", vec![0.010, -0.004, 0.006, 0.002, -0.011]),
//!         ("TD CN", vec![0.012, -0.006, 0.004, 0.001, -0.009]),
//!     ],
//! )
//! .unwrap();
//!
//! let benchmark = WeightVector::new([("RY CN", 0.5), ("TD CN", 0.5)]).unwrap();
//! let minimizer = ActiveRiskMinimizer::new(MinimizerConfig::default());
//! let replica = minimizer
//!     .minimize_active_risk(&benchmark, 0.005, &training)
//!     .unwrap();
//! assert_eq!(replica.cash(), 0.005);
//! ```

pub mod covariance;
mod minimizer;
pub mod simplex;

// Re-export main types
pub use covariance::{CovarianceEstimate, Shrinkage};
pub use minimizer::{ActiveRiskMinimizer, MinimizerConfig, tracking_difference_variance};
