//! Common types used throughout the malaga workspace.
//!
//! This module defines the security identifier and date types, the reserved
//! cash identifier, and the price-history container consumed by
//! [`PriceHistoryProvider`](crate::PriceHistoryProvider).

use polars::prelude::*;

use crate::error::{MalagaError, Result};

// Re-export date type from chrono
pub use chrono::NaiveDate as Date;

/// A security identifier.
///
/// Tickers are opaque keys such as `"RY CN"` or `"TD CN"`.
pub type Ticker = String;

/// Reserved identifier for the zero-volatility, zero-return cash holding.
pub const CASH: &str = "cash";

/// Returns whether `ticker` is the reserved cash identifier.
pub fn is_cash(ticker: &str) -> bool {
    ticker == CASH
}

/// Container for long-format price history.
///
/// `MarketData` wraps a Polars DataFrame with one row per (security, date).
///
/// # Expected Schema
///
/// - `symbol`: Security identifier (string)
/// - `date`: Trading date (date)
/// - `close`: Closing (or total-return) price (f64)
///
/// # Example
///
/// ```no_run
/// use malaga_traits::MarketData;
/// use polars::prelude::*;
///
/// let df = df! {
///     "symbol" => &["RY CN", "TD CN"],
///     "close" => &[150.0, 80.0],
/// }.unwrap();
///
/// let market_data = MarketData::new(df);
/// ```
#[derive(Debug, Clone)]
pub struct MarketData {
    /// The underlying DataFrame containing price history.
    data: DataFrame,
}

impl MarketData {
    /// Columns a price frame must carry.
    pub const REQUIRED_COLUMNS: [&'static str; 3] = ["symbol", "date", "close"];

    /// Creates a new `MarketData` instance from a DataFrame.
    #[must_use]
    pub const fn new(data: DataFrame) -> Self {
        Self { data }
    }

    /// Returns a reference to the underlying DataFrame.
    #[must_use]
    pub const fn data(&self) -> &DataFrame {
        &self.data
    }

    /// Consumes self and returns the underlying DataFrame.
    pub fn into_inner(self) -> DataFrame {
        self.data
    }

    /// Returns the number of rows in the price history.
    pub fn len(&self) -> usize {
        self.data.height()
    }

    /// Returns whether the price history is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Checks if a column exists in the price history.
    pub fn has_column(&self, name: &str) -> bool {
        self.data
            .get_column_names()
            .iter()
            .any(|s| s.as_str() == name)
    }

    /// Verifies that every column in [`Self::REQUIRED_COLUMNS`] is present.
    pub fn validate_schema(&self) -> Result<()> {
        for col in Self::REQUIRED_COLUMNS {
            if !self.has_column(col) {
                return Err(MalagaError::InvalidData(format!(
                    "price history is missing required column '{col}'"
                )));
            }
        }
        Ok(())
    }
}

impl From<DataFrame> for MarketData {
    fn from(data: DataFrame) -> Self {
        Self::new(data)
    }
}

impl AsRef<DataFrame> for MarketData {
    fn as_ref(&self) -> &DataFrame {
        &self.data
    }
}
