//! Strategy comparison for malaga replication backtests.
//!
//! This crate turns per-security simulation records into the figures a
//! replication study reports:
//! - Per-interval portfolio returns grouped from simulation records
//! - Alignment of every strategy on the benchmark's periods
//! - Cumulative compounded returns
//! - Tracking statistics in basis points
//! - DataFrame export of the comparison table
//!
//! # Example
//!
//! ```rust,ignore
//! use malaga_eval::{Comparison, Strategy, TrackingConfig};
//!
//! let comparison = Comparison::from_records(
//!     &bench_records,
//!     &[(Strategy::Optimized, &optimized_records), (Strategy::Default, &default_records)],
//! );
//! let te = comparison.tracking(Strategy::Optimized, &TrackingConfig::default());
//! println!("tracking error: {:.2} bps", te.tracking_error_bps);
//!
//! let df = comparison.to_dataframe()?;
//! ```

pub mod aggregate;
pub mod comparison;
pub mod tracking;

// Re-export main types
pub use aggregate::{PeriodReturn, cumulative_returns, period_returns};
pub use comparison::{Comparison, ComparisonRow, Strategy, StrategyPoint};
pub use tracking::{TrackingConfig, TrackingStatistics};
