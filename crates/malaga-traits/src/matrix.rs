//! Dense, date-indexed security returns and the date ranges used to slice them.

use std::collections::HashMap;
use std::fmt;

use ndarray::{Array2, ArrayView1, ArrayView2, Axis, s};
use serde::{Deserialize, Serialize};

use crate::error::{MalagaError, Result};
use crate::types::{CASH, Date, Ticker};

/// Half-open date range `[start, end)`.
///
/// A missing bound is unbounded on that side. Point-in-time slicing is always
/// expressed through this type: a training window that must exclude the
/// decision date `d` is `DateRange::before(d)`, never a formatted date string.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    start: Option<Date>,
    end: Option<Date>,
}

impl DateRange {
    /// The unbounded range.
    #[must_use]
    pub const fn all() -> Self {
        Self {
            start: None,
            end: None,
        }
    }

    /// Every date strictly before `end`.
    #[must_use]
    pub const fn before(end: Date) -> Self {
        Self {
            start: None,
            end: Some(end),
        }
    }

    /// Every date up to and including `last`.
    #[must_use]
    pub fn through(last: Date) -> Self {
        Self {
            start: None,
            end: last.succ_opt(),
        }
    }

    /// Every date on or after `start`.
    #[must_use]
    pub const fn starting(start: Date) -> Self {
        Self {
            start: Some(start),
            end: None,
        }
    }

    /// `[start, end)`, rejecting empty or inverted ranges.
    pub fn between(start: Date, end: Date) -> Result<Self> {
        if start >= end {
            return Err(MalagaError::InvalidDate(format!(
                "range start {start} is not before end {end}"
            )));
        }
        Ok(Self {
            start: Some(start),
            end: Some(end),
        })
    }

    /// Replace the lower bound.
    #[must_use]
    pub const fn with_start(self, start: Date) -> Self {
        Self {
            start: Some(start),
            end: self.end,
        }
    }

    /// Inclusive lower bound, if any.
    #[must_use]
    pub const fn start(&self) -> Option<Date> {
        self.start
    }

    /// Exclusive upper bound, if any.
    #[must_use]
    pub const fn end(&self) -> Option<Date> {
        self.end
    }

    /// Whether `date` falls inside the range.
    pub fn contains(&self, date: Date) -> bool {
        self.start.is_none_or(|s| date >= s) && self.end.is_none_or(|e| date < e)
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.start {
            Some(s) => write!(f, "[{s}, ")?,
            None => write!(f, "(-inf, ")?,
        }
        match self.end {
            Some(e) => write!(f, "{e})"),
            None => write!(f, "+inf)"),
        }
    }
}

/// Day-over-day fractional returns, one row per trading date and one column
/// per security.
///
/// # Invariants
///
/// - dates are strictly ascending (sorted, no duplicates)
/// - identifiers are unique
/// - a `cash` column is always present and identically zero
///
/// The matrix is read-only once built; slicing produces new matrices.
#[derive(Debug, Clone)]
pub struct ReturnsMatrix {
    dates: Vec<Date>,
    tickers: Vec<Ticker>,
    index: HashMap<Ticker, usize>,
    values: Array2<f64>,
}

impl ReturnsMatrix {
    /// Build a matrix from its date index, column identifiers and values
    /// (`dates.len()` rows by `tickers.len()` columns).
    ///
    /// A zero `cash` column is appended when absent.
    ///
    /// # Errors
    ///
    /// - [`MalagaError::InvalidData`] on shape mismatch, duplicate identifiers
    ///   or a non-zero `cash` column
    /// - [`MalagaError::InvalidDate`] when dates are not strictly ascending
    pub fn new(dates: Vec<Date>, tickers: Vec<Ticker>, values: Array2<f64>) -> Result<Self> {
        if values.nrows() != dates.len() || values.ncols() != tickers.len() {
            return Err(MalagaError::InvalidData(format!(
                "returns shape {:?} does not match {} dates x {} securities",
                values.shape(),
                dates.len(),
                tickers.len()
            )));
        }

        if let Some(pair) = dates.windows(2).find(|w| w[0] >= w[1]) {
            return Err(MalagaError::InvalidDate(format!(
                "date index not strictly ascending at {} -> {}",
                pair[0], pair[1]
            )));
        }

        let mut index = HashMap::with_capacity(tickers.len() + 1);
        for (i, ticker) in tickers.iter().enumerate() {
            if index.insert(ticker.clone(), i).is_some() {
                return Err(MalagaError::InvalidData(format!(
                    "duplicate security column '{ticker}'"
                )));
            }
        }

        let mut tickers = tickers;
        let cash_col = index.get(CASH).copied();
        let values = match cash_col {
            Some(col) => {
                if values.column(col).iter().any(|&r| r != 0.0) {
                    return Err(MalagaError::InvalidData(
                        "cash column must be identically zero".to_string(),
                    ));
                }
                values
            }
            None => {
                index.insert(CASH.to_string(), tickers.len());
                tickers.push(CASH.to_string());
                let mut extended = Array2::zeros((dates.len(), tickers.len()));
                extended
                    .slice_mut(s![.., ..tickers.len() - 1])
                    .assign(&values);
                extended
            }
        };

        Ok(Self {
            dates,
            tickers,
            index,
            values,
        })
    }

    /// Build a matrix from named return columns of equal length.
    pub fn from_columns<K>(dates: Vec<Date>, columns: Vec<(K, Vec<f64>)>) -> Result<Self>
    where
        K: Into<Ticker>,
    {
        let n_rows = dates.len();
        let mut tickers = Vec::with_capacity(columns.len());
        let mut values = Array2::zeros((n_rows, columns.len()));
        for (j, (ticker, column)) in columns.into_iter().enumerate() {
            let ticker = ticker.into();
            if column.len() != n_rows {
                return Err(MalagaError::InvalidData(format!(
                    "column '{ticker}' has {} rows, expected {n_rows}",
                    column.len()
                )));
            }
            for (i, r) in column.into_iter().enumerate() {
                values[[i, j]] = r;
            }
            tickers.push(ticker);
        }
        Self::new(dates, tickers, values)
    }

    /// The ascending date index.
    pub fn dates(&self) -> &[Date] {
        &self.dates
    }

    /// Column identifiers, `cash` included.
    pub fn tickers(&self) -> &[Ticker] {
        &self.tickers
    }

    /// Raw values, rows by date.
    pub fn values(&self) -> ArrayView2<'_, f64> {
        self.values.view()
    }

    /// Number of dates (rows).
    pub fn n_dates(&self) -> usize {
        self.dates.len()
    }

    /// Whether the matrix has no rows.
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Last date in the index.
    pub fn last_date(&self) -> Option<Date> {
        self.dates.last().copied()
    }

    /// Whether `ticker` has a column.
    pub fn contains(&self, ticker: &str) -> bool {
        self.index.contains_key(ticker)
    }

    /// Column position of `ticker`.
    pub fn column_index(&self, ticker: &str) -> Result<usize> {
        self.index
            .get(ticker)
            .copied()
            .ok_or_else(|| MalagaError::unknown_security(ticker))
    }

    /// Returns of `ticker` over the whole index.
    pub fn column(&self, ticker: &str) -> Result<ArrayView1<'_, f64>> {
        Ok(self.values.column(self.column_index(ticker)?))
    }

    /// Row position of `date`, if it is in the index.
    pub fn row_of(&self, date: Date) -> Option<usize> {
        self.dates.binary_search(&date).ok()
    }

    /// Row bounds `[lo, hi)` covered by `range`.
    pub fn row_bounds(&self, range: DateRange) -> (usize, usize) {
        let lo = range
            .start()
            .map_or(0, |s| self.dates.partition_point(|d| *d < s));
        let hi = range
            .end()
            .map_or(self.dates.len(), |e| self.dates.partition_point(|d| *d < e));
        (lo, hi.max(lo))
    }

    /// Dates of the index falling inside `range`.
    pub fn dates_in(&self, range: DateRange) -> &[Date] {
        let (lo, hi) = self.row_bounds(range);
        &self.dates[lo..hi]
    }

    /// Rows falling inside `range`, as a new matrix with the same columns.
    pub fn slice(&self, range: DateRange) -> Self {
        let (lo, hi) = self.row_bounds(range);
        Self {
            dates: self.dates[lo..hi].to_vec(),
            tickers: self.tickers.clone(),
            index: self.index.clone(),
            values: self.values.slice(s![lo..hi, ..]).to_owned(),
        }
    }

    /// Returns of the given securities, columns in the order requested.
    ///
    /// # Errors
    ///
    /// [`MalagaError::UnknownSecurity`] for an identifier without a column.
    pub fn select<S: AsRef<str>>(&self, tickers: &[S]) -> Result<Array2<f64>> {
        let cols = tickers
            .iter()
            .map(|t| self.column_index(t.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Ok(self.values.select(Axis(1), &cols))
    }

    /// Compounded return of column `col` over rows `(from, to]`, i.e. from
    /// the close of `from` to the close of `to`.
    pub fn compounded_return(&self, col: usize, from: usize, to: usize) -> f64 {
        self.values
            .slice(s![from + 1..=to, col])
            .iter()
            .fold(1.0, |acc, r| acc * (1.0 + r))
            - 1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn d(day: u32) -> Date {
        Date::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn sample() -> ReturnsMatrix {
        ReturnsMatrix::from_columns(
            vec![d(2), d(3), d(4), d(5)],
            vec![
                ("X", vec![0.01, -0.01, 0.02, 0.0]),
                ("Y", vec![0.0, 0.0, 0.0, 0.03]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_cash_column_added() {
        let m = sample();
        assert_eq!(m.tickers().len(), 3);
        assert!(m.contains(CASH));
        assert!(m.column(CASH).unwrap().iter().all(|&r| r == 0.0));
        assert_eq!(m.column_index("Y").unwrap(), 1);
    }

    #[test]
    fn test_rejects_unsorted_dates() {
        let err = ReturnsMatrix::from_columns(vec![d(3), d(2)], vec![("X", vec![0.0, 0.0])])
            .unwrap_err();
        assert!(matches!(err, MalagaError::InvalidDate(_)));

        let err = ReturnsMatrix::from_columns(vec![d(2), d(2)], vec![("X", vec![0.0, 0.0])])
            .unwrap_err();
        assert!(matches!(err, MalagaError::InvalidDate(_)));
    }

    #[test]
    fn test_rejects_nonzero_cash() {
        let err = ReturnsMatrix::from_columns(vec![d(2)], vec![(CASH, vec![0.01])]).unwrap_err();
        assert!(matches!(err, MalagaError::InvalidData(_)));
    }

    #[test]
    fn test_unknown_column() {
        let err = sample().column("Z").unwrap_err();
        assert!(matches!(err, MalagaError::UnknownSecurity { ticker } if ticker == "Z"));
    }

    #[test]
    fn test_date_range_slicing() {
        let m = sample();
        assert_eq!(m.dates_in(DateRange::before(d(4))), &[d(2), d(3)]);
        assert_eq!(m.dates_in(DateRange::through(d(4))), &[d(2), d(3), d(4)]);
        assert_eq!(m.dates_in(DateRange::starting(d(4))), &[d(4), d(5)]);
        assert!(m.dates_in(DateRange::before(d(1))).is_empty());

        let sliced = m.slice(DateRange::between(d(3), d(5)).unwrap());
        assert_eq!(sliced.dates(), &[d(3), d(4)]);
        assert_abs_diff_eq!(sliced.column("X").unwrap()[1], 0.02);
    }

    #[test]
    fn test_date_range_contains() {
        let range = DateRange::between(d(3), d(5)).unwrap();
        assert!(!range.contains(d(2)));
        assert!(range.contains(d(3)));
        assert!(range.contains(d(4)));
        assert!(!range.contains(d(5)));
        assert!(DateRange::between(d(5), d(5)).is_err());
        assert_eq!(range.to_string(), "[2024-01-03, 2024-01-05)");
    }

    #[test]
    fn test_compounded_return() {
        let m = sample();
        let x = m.column_index("X").unwrap();
        // close of 01-02 to close of 01-04
        assert_abs_diff_eq!(
            m.compounded_return(x, 0, 2),
            0.99 * 1.02 - 1.0,
            epsilon = 1e-15
        );
        assert_abs_diff_eq!(m.compounded_return(x, 1, 2), 0.02, epsilon = 1e-15);
    }

    #[test]
    fn test_select_orders_columns() {
        let m = sample();
        let selected = m.select(&["Y", "X"]).unwrap();
        assert_eq!(selected.shape(), &[4, 2]);
        assert_abs_diff_eq!(selected[[0, 1]], 0.01);
        assert!(m.select(&["nope"]).is_err());
    }
}
