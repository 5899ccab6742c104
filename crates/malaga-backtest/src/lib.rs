//! Benchmark replication backtests for malaga.
//!
//! This crate runs a replication study over a returns matrix:
//! - A benchmark and a default portfolio drifting from the test start
//! - A replica optimized once on the initial training window
//! - A replica re-optimized at every test date on a point-in-time window
//! - Aligned comparison and tracking statistics across all four
//!
//! Failures stop the run at the failing lane and date, keeping everything
//! computed before them; see [`FailurePolicy`] and [`Backtest::with_retry`]
//! for the configured alternatives.
//!
//! # Example
//!
//! ```rust,ignore
//! use malaga_backtest::{Backtest, BacktestConfig, WindowPolicy};
//! use malaga_optim::ActiveRiskMinimizer;
//!
//! let config = BacktestConfig::with_equal_weight_default(
//!     benchmark,
//!     0.005,
//!     training_end,
//!     testing_start,
//! )?
//!     .with_window(WindowPolicy::Rolling { observations: 504 });
//!
//! match Backtest::new(config, ActiveRiskMinimizer::default()).run(&returns) {
//!     Ok(report) => println!("{} rebalances", report.steps.len()),
//!     Err(err) => eprintln!("stopped on {:?}: {err}", err.date()),
//! }
//! ```

pub mod config;
pub mod lane;
mod orchestrator;
pub mod report;
pub mod window;

// Re-export main types
pub use config::{BacktestConfig, FailurePolicy, WindowPolicy};
pub use lane::{RebalanceState, RebalanceStep};
pub use orchestrator::{Backtest, BacktestResult};
pub use report::{BacktestError, BacktestFailure, BacktestReport, PartialResults};
pub use window::training_window;
