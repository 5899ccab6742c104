//! Per-security, per-interval simulation output.

use std::collections::BTreeMap;

use malaga_traits::{Date, Result, Ticker, WeightVector};
use serde::{Deserialize, Serialize};

/// One security's holding over one rebalance interval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioReturnRecord {
    /// Interval start (weights are observed at this close)
    pub start_date: Date,
    /// Interval end
    pub end_date: Date,
    /// Security identifier
    pub ticker: Ticker,
    /// Weight in force at `start_date`, after drift since the last rebalance
    pub start_wt: f64,
    /// Compounded security return from `start_date` to `end_date`
    pub period_return: f64,
    /// Holding value per unit invested at the last rebalance:
    /// `start_wt * (1 + compounded portfolio return since that rebalance)`
    pub start_value: f64,
}

impl PortfolioReturnRecord {
    /// Contribution of this holding to the portfolio's interval return.
    pub fn weighted_return(&self) -> f64 {
        self.start_wt * self.period_return
    }
}

/// Allocation in force at each interval start, rebuilt from records.
///
/// Every group of records sharing a `start_date` becomes one validated
/// [`WeightVector`]. Records are expected in simulation order, but grouping
/// does not depend on it.
///
/// # Errors
///
/// `InvalidConstraint` if a group's weights do not form a valid allocation.
pub fn weights_by_start_date(
    records: &[PortfolioReturnRecord],
) -> Result<BTreeMap<Date, WeightVector>> {
    let mut groups: BTreeMap<Date, Vec<(Ticker, f64)>> = BTreeMap::new();
    for record in records {
        groups
            .entry(record.start_date)
            .or_default()
            .push((record.ticker.clone(), record.start_wt));
    }

    groups
        .into_iter()
        .map(|(date, entries)| Ok((date, WeightVector::new(entries)?)))
        .collect()
}
