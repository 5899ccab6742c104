//! Sources of returns matrices.
//!
//! The backtest treats its returns as coming from an external collaborator.
//! [`ReturnsMatrixProvider`] is that seam; [`PriceHistoryProvider`] is the
//! in-process implementation built on a long-format price frame.

use std::collections::BTreeMap;

use ndarray::Array2;
use polars::prelude::*;

use crate::error::{MalagaError, Result};
use crate::matrix::ReturnsMatrix;
use crate::types::{Date, MarketData, Ticker, is_cash};

/// Days between 0001-01-01 (CE) and the Unix epoch, used to decode Polars dates.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// Supplies day-over-day security returns.
///
/// Correctness of the underlying data (point-in-time accuracy, survivorship)
/// is assumed by the rest of the workspace, not validated.
pub trait ReturnsMatrixProvider {
    /// Returns for `securities` from `start` onward.
    ///
    /// The result always carries a zero `cash` column; requesting `"cash"`
    /// explicitly is allowed and has no further effect.
    ///
    /// # Errors
    ///
    /// `UnknownSecurity` when a requested security has no data.
    fn returns_matrix(&self, securities: &[Ticker], start: Date) -> Result<ReturnsMatrix>;
}

/// Builds returns matrices from price history.
///
/// Returns are simple close-to-close changes computed on the dates common to
/// every requested security, so each row is a trading day for the whole
/// universe. The first available date on or after `start` anchors the
/// computation and produces no row of its own.
///
/// # Example
///
/// ```no_run
/// use malaga_traits::{Date, MarketData, PriceHistoryProvider, ReturnsMatrixProvider};
/// use polars::prelude::*;
///
/// let dates = [
///     Date::from_ymd_opt(2024, 1, 2).unwrap(),
///     Date::from_ymd_opt(2024, 1, 3).unwrap(),
/// ];
/// let df = df! {
///     "symbol" => &["RY CN", "RY CN"],
///     "date" => &dates,
///     "close" => &[100.0, 101.0],
/// }.unwrap();
///
/// let provider = PriceHistoryProvider::new(MarketData::new(df));
/// let matrix = provider
///     .returns_matrix(&["RY CN".to_string()], dates[0])
///     .unwrap();
/// assert_eq!(matrix.n_dates(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct PriceHistoryProvider {
    prices: MarketData,
}

impl PriceHistoryProvider {
    /// Create a provider over the given price history.
    #[must_use]
    pub const fn new(prices: MarketData) -> Self {
        Self { prices }
    }

    /// The underlying price history.
    #[must_use]
    pub const fn prices(&self) -> &MarketData {
        &self.prices
    }

    /// Closing prices of one security on or after `start`, keyed by date.
    fn closes(&self, symbol: &str, start: Date) -> Result<BTreeMap<Date, f64>> {
        let df = self.prices.data();

        let symbol_mask = df
            .column("symbol")?
            .as_materialized_series()
            .str()?
            .equal(symbol);
        let filtered = df.filter(&symbol_mask)?;

        let dates = filtered.column("date")?.as_materialized_series().date()?;
        let closes = filtered.column("close")?.as_materialized_series().f64()?;

        let mut out = BTreeMap::new();
        for (date, close) in dates.into_iter().zip(closes.into_iter()) {
            let (Some(date), Some(close)) = (date, close) else {
                continue;
            };
            let date = Date::from_num_days_from_ce_opt(date + UNIX_EPOCH_DAYS_FROM_CE)
                .ok_or_else(|| MalagaError::InvalidDate(format!("unrepresentable date {date}")))?;
            if date < start {
                continue;
            }
            if out.insert(date, close).is_some() {
                return Err(MalagaError::InvalidData(format!(
                    "duplicate price for {symbol} on {date}"
                )));
            }
        }
        Ok(out)
    }
}

impl ReturnsMatrixProvider for PriceHistoryProvider {
    fn returns_matrix(&self, securities: &[Ticker], start: Date) -> Result<ReturnsMatrix> {
        self.prices.validate_schema()?;

        let securities: Vec<&Ticker> = securities.iter().filter(|t| !is_cash(t)).collect();

        let mut series = Vec::with_capacity(securities.len());
        for symbol in &securities {
            let closes = self.closes(symbol, start)?;
            if closes.is_empty() {
                return Err(MalagaError::unknown_security(symbol.as_str()));
            }
            series.push(closes);
        }

        // Dates on which every security traded
        let common: Vec<Date> = match series.split_first() {
            Some((first, rest)) => first
                .keys()
                .filter(|d| rest.iter().all(|s| s.contains_key(d)))
                .copied()
                .collect(),
            None => Vec::new(),
        };

        if common.len() < 2 {
            return Err(MalagaError::InvalidData(format!(
                "need at least 2 common trading dates from {start}, got {}",
                common.len()
            )));
        }

        let mut values = Array2::zeros((common.len() - 1, securities.len()));
        for (j, closes) in series.iter().enumerate() {
            for (i, pair) in common.windows(2).enumerate() {
                let prev = closes[&pair[0]];
                let curr = closes[&pair[1]];
                if prev <= 0.0 || !prev.is_finite() || !curr.is_finite() {
                    return Err(MalagaError::InvalidData(format!(
                        "invalid prices for {} around {}",
                        securities[j], pair[1]
                    )));
                }
                values[[i, j]] = curr / prev - 1.0;
            }
        }

        tracing::debug!(
            securities = securities.len(),
            rows = common.len() - 1,
            %start,
            "built returns matrix from price history"
        );

        ReturnsMatrix::new(
            common[1..].to_vec(),
            securities.into_iter().cloned().collect(),
            values,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CASH;
    use approx::assert_abs_diff_eq;

    fn d(day: u32) -> Date {
        Date::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn provider() -> PriceHistoryProvider {
        // B is missing 01-04, so that date is not a common trading day.
        let df = df! {
            "symbol" => &["A", "A", "A", "A", "B", "B", "B"],
            "date" => &[d(2), d(3), d(4), d(5), d(2), d(3), d(5)],
            "close" => &[100.0, 101.0, 99.0, 103.0, 50.0, 50.0, 55.0],
        }
        .unwrap();
        PriceHistoryProvider::new(MarketData::new(df))
    }

    #[test]
    fn test_returns_on_common_dates() {
        let securities = vec!["A".to_string(), "B".to_string(), CASH.to_string()];
        let m = provider().returns_matrix(&securities, d(1)).unwrap();

        assert_eq!(m.dates(), &[d(3), d(5)]);
        let a = m.column("A").unwrap();
        assert_abs_diff_eq!(a[0], 0.01, epsilon = 1e-12);
        assert_abs_diff_eq!(a[1], 103.0 / 101.0 - 1.0, epsilon = 1e-12);
        let b = m.column("B").unwrap();
        assert_abs_diff_eq!(b[1], 0.1, epsilon = 1e-12);
        assert!(m.column(CASH).unwrap().iter().all(|&r| r == 0.0));
    }

    #[test]
    fn test_start_date_anchors_first_row() {
        let m = provider()
            .returns_matrix(&["A".to_string()], d(3))
            .unwrap();
        assert_eq!(m.dates(), &[d(4), d(5)]);
        assert_abs_diff_eq!(m.column("A").unwrap()[0], 99.0 / 101.0 - 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_unknown_security() {
        let err = provider()
            .returns_matrix(&["ZZ".to_string()], d(1))
            .unwrap_err();
        assert!(matches!(err, MalagaError::UnknownSecurity { .. }));
    }

    #[test]
    fn test_missing_column() {
        let df = df! { "symbol" => &["A"], "close" => &[1.0] }.unwrap();
        let err = PriceHistoryProvider::new(MarketData::new(df))
            .returns_matrix(&["A".to_string()], d(1))
            .unwrap_err();
        assert!(matches!(err, MalagaError::InvalidData(_)));
    }
}
