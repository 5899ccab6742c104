#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/malaga/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![deny(unsafe_code)]

//! Core type and trait definitions for the malaga replication backtester.
//!
//! This crate provides the foundational data model (returns matrices, weight
//! vectors, date ranges) and the seams between the numeric engines: the
//! returns provider and the replication optimizer.

/// The version of the malaga-traits crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Module declarations
pub mod error;
pub mod matrix;
pub mod optimizer;
pub mod provider;
pub mod stats;
pub mod types;
pub mod weights;

// Re-exports
pub use error::{MalagaError, Result};
pub use matrix::{DateRange, ReturnsMatrix};
pub use optimizer::Optimizer;
pub use provider::{PriceHistoryProvider, ReturnsMatrixProvider};
pub use types::{CASH, Date, MarketData, Ticker};
pub use weights::{WEIGHT_SUM_TOLERANCE, WeightVector};
