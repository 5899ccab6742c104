//! Portfolio return simulation for malaga.
//!
//! This crate propagates an allocation forward through a sequence of
//! rebalance boundaries, letting weights drift with realized security
//! returns between boundaries:
//! - [`simulate`] produces one [`PortfolioReturnRecord`] per security and interval
//! - [`drift`] applies a single period of weight drift
//! - [`weights_by_start_date`] recovers the drifted allocation in force at each
//!   interval start
//!
//! # Example
//!
//! ```rust,ignore
//! use malaga_sim::simulate;
//!
//! let test_dates = matrix.dates_in(DateRange::starting(testing_start));
//! let records = simulate(test_dates, &benchmark, &matrix)?;
//! ```

pub mod record;
pub mod simulator;

// Re-export main types
pub use record::{PortfolioReturnRecord, weights_by_start_date};
pub use simulator::{drift, simulate};
