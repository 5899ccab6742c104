//! Per-interval portfolio returns from simulation records.

use std::collections::BTreeMap;

use malaga_sim::PortfolioReturnRecord;
use malaga_traits::Date;
use serde::{Deserialize, Serialize};

/// A strategy's return over one rebalance interval.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PeriodReturn {
    /// Interval start
    pub start_date: Date,
    /// Interval end
    pub end_date: Date,
    /// Portfolio return `sum(start_wt * period_return)` over the interval
    pub value: f64,
}

/// Group records by `(start_date, end_date)` and sum their weighted returns.
///
/// The output is ordered by interval start, then end.
///
/// # Examples
///
/// ```rust,ignore
/// let records = simulate(&dates, &weights, &returns)?;
/// let series = period_returns(&records);
/// assert_eq!(series.len(), dates.len() - 1);
/// ```
pub fn period_returns(records: &[PortfolioReturnRecord]) -> Vec<PeriodReturn> {
    let mut grouped: BTreeMap<(Date, Date), f64> = BTreeMap::new();
    for record in records {
        *grouped
            .entry((record.start_date, record.end_date))
            .or_insert(0.0) += record.weighted_return();
    }

    grouped
        .into_iter()
        .map(|((start_date, end_date), value)| PeriodReturn {
            start_date,
            end_date,
            value,
        })
        .collect()
}

/// Running compounded return `prod(1 + r) - 1`.
///
/// Missing periods stay missing and leave the running product untouched.
pub fn cumulative_returns(returns: &[Option<f64>]) -> Vec<Option<f64>> {
    let mut growth = 1.0;
    returns
        .iter()
        .map(|r| {
            r.map(|r| {
                growth *= 1.0 + r;
                growth - 1.0
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use malaga_sim::simulate;
    use malaga_traits::{ReturnsMatrix, WeightVector};

    fn d(day: u32) -> Date {
        Date::from_ymd_opt(2024, 3, day).unwrap()
    }

    #[test]
    fn test_static_fifty_fifty() {
        // X: +1%, -1%, +2%; Y flat
        let returns = ReturnsMatrix::from_columns(
            vec![d(1), d(4), d(5), d(6)],
            vec![
                ("X", vec![0.0, 0.01, -0.01, 0.02]),
                ("Y", vec![0.0, 0.0, 0.0, 0.0]),
            ],
        )
        .unwrap();
        let weights = WeightVector::new([("X", 0.5), ("Y", 0.5)]).unwrap();

        let mut records = Vec::new();
        for pair in returns.dates().windows(2) {
            records.extend(simulate(pair, &weights, &returns).unwrap());
        }
        let series = period_returns(&records);

        assert_eq!(series.len(), 3);
        assert_abs_diff_eq!(series[0].value, 0.005, epsilon = 1e-15);
        assert_abs_diff_eq!(series[1].value, -0.005, epsilon = 1e-15);
        assert_abs_diff_eq!(series[2].value, 0.01, epsilon = 1e-15);
        assert_eq!(series[2].start_date, d(5));
        assert_eq!(series[2].end_date, d(6));

        let values: Vec<Option<f64>> = series.iter().map(|p| Some(p.value)).collect();
        let cumulative = cumulative_returns(&values);
        assert_abs_diff_eq!(
            cumulative[2].unwrap(),
            1.005 * 0.995 * 1.01 - 1.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_grouping_ignores_record_order() {
        let record = |start: u32, ticker: &str, start_wt: f64, period_return: f64| {
            PortfolioReturnRecord {
                start_date: d(start),
                end_date: d(start + 1),
                ticker: ticker.to_string(),
                start_wt,
                period_return,
                start_value: start_wt,
            }
        };
        let records = vec![
            record(2, "A", 0.5, 0.02),
            record(1, "A", 0.5, 0.01),
            record(2, "B", 0.5, 0.0),
            record(1, "B", 0.5, 0.03),
        ];
        let series = period_returns(&records);

        assert_eq!(series[0].start_date, d(1));
        assert_abs_diff_eq!(series[0].value, 0.02, epsilon = 1e-15);
        assert_abs_diff_eq!(series[1].value, 0.01, epsilon = 1e-15);
    }

    #[test]
    fn test_cumulative_skips_missing() {
        let cumulative = cumulative_returns(&[Some(0.1), None, Some(0.1)]);
        assert_abs_diff_eq!(cumulative[0].unwrap(), 0.1, epsilon = 1e-15);
        assert!(cumulative[1].is_none());
        assert_abs_diff_eq!(cumulative[2].unwrap(), 0.21, epsilon = 1e-12);
    }

    #[test]
    fn test_empty() {
        assert!(period_returns(&[]).is_empty());
        assert!(cumulative_returns(&[]).is_empty());
    }
}
