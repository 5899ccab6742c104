//! Error types for the malaga workspace.
//!
//! Every engine (simulator, minimizer, orchestrator, aggregator) reports
//! failures through [`MalagaError`]. The first four variants form the
//! replication error taxonomy; the remaining ones cover malformed inputs and
//! DataFrame interchange.

use thiserror::Error;

/// The main error type for malaga operations.
#[derive(Debug, Error)]
pub enum MalagaError {
    /// A weight references a security absent from the returns matrix.
    #[error("Unknown security: {ticker}")]
    UnknownSecurity {
        /// The offending identifier.
        ticker: String,
    },

    /// A constraint is out of range, e.g. cash drag outside [0, 1) or
    /// weights that do not sum to one.
    #[error("Invalid constraint: {0}")]
    InvalidConstraint(String),

    /// Too few observations or securities for a stable covariance estimate,
    /// even after regularization.
    #[error("Insufficient training data: {0}")]
    InsufficientTrainingData(String),

    /// The solver exhausted its iteration budget.
    #[error("Optimization did not converge after {iterations} iterations (last step {step:e})")]
    OptimizationDidNotConverge {
        /// Number of iterations performed.
        iterations: usize,
        /// Size of the last weight update (max-norm).
        step: f64,
    },

    /// Error due to invalid or malformed data.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Error when a date is out of range or invalid.
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    /// Error from Polars operations.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),
}

impl MalagaError {
    /// Shorthand for [`MalagaError::UnknownSecurity`].
    pub fn unknown_security(ticker: impl Into<String>) -> Self {
        Self::UnknownSecurity {
            ticker: ticker.into(),
        }
    }
}

/// A specialized Result type for malaga operations.
///
/// This is a convenience type that uses [`MalagaError`] as the error type.
pub type Result<T> = std::result::Result<T, MalagaError>;
