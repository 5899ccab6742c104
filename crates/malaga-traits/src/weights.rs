//! Validated portfolio allocations.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{MalagaError, Result};
use crate::types::{CASH, Ticker, is_cash};

/// Maximum absolute deviation of a weight sum from 1.0 accepted at construction.
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// A mapping from security identifier to fractional weight.
///
/// A `WeightVector` is only ever built through [`WeightVector::new`] (or the
/// helpers layered on it), which enforces the allocation invariants at the
/// rebalance instant:
///
/// - at least one entry, every weight finite
/// - no duplicate identifiers
/// - the `cash` entry, when present, is non-negative
/// - weights sum to 1.0 within [`WEIGHT_SUM_TOLERANCE`]
///
/// Entries are kept in identifier order so iteration is deterministic.
///
/// # Example
///
/// ```
/// use malaga_traits::WeightVector;
///
/// let weights = WeightVector::new([("RY CN", 0.5), ("TD CN", 0.5)]).unwrap();
/// assert_eq!(weights.get("RY CN"), Some(0.5));
/// assert_eq!(weights.cash(), 0.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<Ticker, f64>", into = "BTreeMap<Ticker, f64>")]
pub struct WeightVector {
    weights: BTreeMap<Ticker, f64>,
}

impl WeightVector {
    /// Build a weight vector, validating the allocation invariants.
    ///
    /// # Errors
    ///
    /// Returns [`MalagaError::InvalidConstraint`] when any invariant listed on
    /// the type is violated.
    pub fn new<I, K>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, f64)>,
        K: Into<Ticker>,
    {
        let mut weights = BTreeMap::new();
        for (ticker, weight) in entries {
            let ticker = ticker.into();
            if !weight.is_finite() {
                return Err(MalagaError::InvalidConstraint(format!(
                    "weight for '{ticker}' is not finite"
                )));
            }
            if is_cash(&ticker) && weight < 0.0 {
                return Err(MalagaError::InvalidConstraint(format!(
                    "cash weight must be non-negative, got {weight}"
                )));
            }
            if weights.insert(ticker.clone(), weight).is_some() {
                return Err(MalagaError::InvalidConstraint(format!(
                    "duplicate weight for '{ticker}'"
                )));
            }
        }

        if weights.is_empty() {
            return Err(MalagaError::InvalidConstraint(
                "weight vector has no entries".to_string(),
            ));
        }

        let sum: f64 = weights.values().sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(MalagaError::InvalidConstraint(format!(
                "weights sum to {sum}, expected 1"
            )));
        }

        Ok(Self { weights })
    }

    /// Equal-weight the given securities after setting aside `cash`.
    ///
    /// Each security receives `(1 - cash) / n`; a `cash` entry is always
    /// present, even when it is zero.
    pub fn equal_weighted<I, K>(tickers: I, cash: f64) -> Result<Self>
    where
        I: IntoIterator<Item = K>,
        K: Into<Ticker>,
    {
        let tickers: Vec<Ticker> = tickers
            .into_iter()
            .map(Into::into)
            .filter(|t| !is_cash(t))
            .collect();
        if tickers.is_empty() {
            return Err(MalagaError::InvalidConstraint(
                "equal weighting needs at least one security".to_string(),
            ));
        }
        if !(0.0..1.0).contains(&cash) {
            return Err(MalagaError::InvalidConstraint(format!(
                "cash fraction {cash} outside [0, 1)"
            )));
        }

        let each = (1.0 - cash) / tickers.len() as f64;
        Self::new(
            tickers
                .into_iter()
                .map(|t| (t, each))
                .chain(std::iter::once((CASH.to_string(), cash))),
        )
    }

    /// Weight of `ticker`, if present.
    pub fn get(&self, ticker: &str) -> Option<f64> {
        self.weights.get(ticker).copied()
    }

    /// Whether `ticker` has an entry.
    pub fn contains(&self, ticker: &str) -> bool {
        self.weights.contains_key(ticker)
    }

    /// Cash weight (zero when there is no `cash` entry).
    pub fn cash(&self) -> f64 {
        self.get(CASH).unwrap_or(0.0)
    }

    /// Number of entries, including `cash`.
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    /// Always false: construction rejects empty vectors.
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// Sum of all weights.
    pub fn sum(&self) -> f64 {
        self.weights.values().sum()
    }

    /// Iterate `(ticker, weight)` in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.weights.iter().map(|(t, w)| (t.as_str(), *w))
    }

    /// Iterate non-cash `(ticker, weight)` entries in identifier order.
    pub fn securities(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.iter().filter(|(t, _)| !is_cash(t))
    }

    /// Identifiers in order, including `cash` when present.
    pub fn tickers(&self) -> impl Iterator<Item = &str> + '_ {
        self.weights.keys().map(String::as_str)
    }
}

impl TryFrom<BTreeMap<Ticker, f64>> for WeightVector {
    type Error = MalagaError;

    fn try_from(map: BTreeMap<Ticker, f64>) -> Result<Self> {
        Self::new(map)
    }
}

impl From<WeightVector> for BTreeMap<Ticker, f64> {
    fn from(weights: WeightVector) -> Self {
        weights.weights
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_new_valid() {
        let w = WeightVector::new([("A", 0.3), ("B", 0.6), (CASH, 0.1)]).unwrap();
        assert_eq!(w.len(), 3);
        assert_abs_diff_eq!(w.cash(), 0.1);
        assert_abs_diff_eq!(w.sum(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_rejects_bad_sum() {
        let err = WeightVector::new([("A", 0.3), ("B", 0.3)]).unwrap_err();
        assert!(matches!(err, MalagaError::InvalidConstraint(_)));
    }

    #[test]
    fn test_rejects_negative_cash() {
        let err = WeightVector::new([("A", 1.1), (CASH, -0.1)]).unwrap_err();
        assert!(matches!(err, MalagaError::InvalidConstraint(_)));
    }

    #[test]
    fn test_rejects_duplicates_and_nan() {
        assert!(WeightVector::new([("A", 0.5), ("A", 0.5)]).is_err());
        assert!(WeightVector::new([("A", f64::NAN)]).is_err());
        assert!(WeightVector::new(Vec::<(String, f64)>::new()).is_err());
    }

    #[test]
    fn test_equal_weighted_with_cash() {
        let tickers = ["BNS CN", "BMO CN", "TD CN", "CM CN", "RY CN", "NA CN"];
        let w = WeightVector::equal_weighted(tickers, 0.005).unwrap();

        assert_eq!(w.len(), 7);
        assert_abs_diff_eq!(w.cash(), 0.005);
        assert_abs_diff_eq!(w.get("RY CN").unwrap(), 0.995 / 6.0, epsilon = 1e-15);
        assert_eq!(w.securities().count(), 6);
    }

    #[test]
    fn test_equal_weighted_rejects_full_cash() {
        assert!(WeightVector::equal_weighted(["A"], 1.0).is_err());
    }

    #[test]
    fn test_iteration_is_ordered() {
        let w = WeightVector::new([("Z", 0.5), ("A", 0.5)]).unwrap();
        let tickers: Vec<&str> = w.tickers().collect();
        assert_eq!(tickers, vec!["A", "Z"]);
    }
}
