//! Aligned strategy comparison table.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use malaga_sim::PortfolioReturnRecord;
use malaga_traits::{Date, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

use crate::aggregate::{PeriodReturn, cumulative_returns, period_returns};
use crate::tracking::{TrackingConfig, TrackingStatistics};

/// The strategies compared in a replication backtest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Strategy {
    /// The benchmark allocation, drifting from the test start
    Benchmark,
    /// Optimized once at the test start, then drifting
    Optimized,
    /// Re-optimized at every rebalance date
    Rebalanced,
    /// The default allocation, drifting from the test start
    Default,
}

impl Strategy {
    /// All strategies, benchmark first.
    pub const ALL: [Self; 4] = [Self::Benchmark, Self::Optimized, Self::Rebalanced, Self::Default];

    /// Strategies measured against the benchmark.
    pub const CANDIDATES: [Self; 3] = [Self::Optimized, Self::Rebalanced, Self::Default];

    /// Column name used in exported tables.
    #[must_use]
    pub const fn column_name(self) -> &'static str {
        match self {
            Self::Benchmark => "bench",
            Self::Optimized => "optimized",
            Self::Rebalanced => "optimized_rebal",
            Self::Default => "default",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.column_name())
    }
}

/// One strategy's figures for one period.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrategyPoint {
    /// Return over the period
    pub period_return: f64,
    /// Compounded return from the first period through this one
    pub cumulative: f64,
}

/// One aligned period of the comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRow {
    /// Period start
    pub start_date: Date,
    /// Period end
    pub end_date: Date,
    /// Figures for every strategy with a return on this period
    pub points: BTreeMap<Strategy, StrategyPoint>,
}

impl ComparisonRow {
    /// Figures for `strategy`, if it has a return on this period.
    pub fn get(&self, strategy: Strategy) -> Option<&StrategyPoint> {
        self.points.get(&strategy)
    }
}

/// Period and cumulative returns of every strategy, aligned on the
/// benchmark's periods.
///
/// Alignment is a left join on the period start: a candidate period with
/// no benchmark counterpart is dropped, and a benchmark period the candidate
/// lacks is left empty rather than filled with zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    strategies: Vec<Strategy>,
    rows: Vec<ComparisonRow>,
}

impl Comparison {
    /// Align candidate period returns on the benchmark's.
    ///
    /// A `Benchmark` entry among `candidates` is ignored.
    pub fn align(benchmark: &[PeriodReturn], candidates: &[(Strategy, &[PeriodReturn])]) -> Self {
        let mut strategies = vec![Strategy::Benchmark];
        let mut columns: Vec<(Strategy, Vec<Option<f64>>)> = vec![(
            Strategy::Benchmark,
            benchmark.iter().map(|p| Some(p.value)).collect(),
        )];

        for (strategy, series) in candidates {
            if *strategy == Strategy::Benchmark || strategies.contains(strategy) {
                continue;
            }
            let by_start: HashMap<Date, f64> =
                series.iter().map(|p| (p.start_date, p.value)).collect();
            strategies.push(*strategy);
            columns.push((
                *strategy,
                benchmark
                    .iter()
                    .map(|p| by_start.get(&p.start_date).copied())
                    .collect(),
            ));
        }

        let mut rows: Vec<ComparisonRow> = benchmark
            .iter()
            .map(|p| ComparisonRow {
                start_date: p.start_date,
                end_date: p.end_date,
                points: BTreeMap::new(),
            })
            .collect();

        for (strategy, values) in &columns {
            let cumulative = cumulative_returns(values);
            for ((row, value), cum) in rows.iter_mut().zip(values).zip(cumulative) {
                if let (Some(period_return), Some(cumulative)) = (value, cum) {
                    row.points.insert(
                        *strategy,
                        StrategyPoint {
                            period_return: *period_return,
                            cumulative,
                        },
                    );
                }
            }
        }

        strategies.sort();
        Self { strategies, rows }
    }

    /// Aggregate each strategy's simulation records and align them.
    pub fn from_records(
        benchmark: &[PortfolioReturnRecord],
        candidates: &[(Strategy, &[PortfolioReturnRecord])],
    ) -> Self {
        let aggregated: Vec<(Strategy, Vec<PeriodReturn>)> = candidates
            .iter()
            .map(|(strategy, records)| (*strategy, period_returns(records)))
            .collect();
        let borrowed: Vec<(Strategy, &[PeriodReturn])> = aggregated
            .iter()
            .map(|(strategy, series)| (*strategy, series.as_slice()))
            .collect();
        Self::align(&period_returns(benchmark), &borrowed)
    }

    /// Strategies present in the comparison, benchmark first.
    pub fn strategies(&self) -> &[Strategy] {
        &self.strategies
    }

    /// The aligned rows, in period order.
    pub fn rows(&self) -> &[ComparisonRow] {
        &self.rows
    }

    /// Number of aligned periods.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the comparison has no periods.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Period returns of `strategy` on the benchmark's periods.
    pub fn period_returns(&self, strategy: Strategy) -> Vec<Option<f64>> {
        self.rows
            .iter()
            .map(|row| row.get(strategy).map(|p| p.period_return))
            .collect()
    }

    /// Compounded return of `strategy` through its last aligned period.
    pub fn final_cumulative(&self, strategy: Strategy) -> Option<f64> {
        self.rows
            .iter()
            .rev()
            .find_map(|row| row.get(strategy).map(|p| p.cumulative))
    }

    /// Tracking statistics of `strategy` against the benchmark.
    pub fn tracking(&self, strategy: Strategy, config: &TrackingConfig) -> TrackingStatistics {
        let pairs: Vec<(f64, Option<f64>)> = self
            .rows
            .iter()
            .filter_map(|row| {
                row.get(Strategy::Benchmark)
                    .map(|b| (b.period_return, row.get(strategy).map(|p| p.period_return)))
            })
            .collect();
        TrackingStatistics::calculate(&pairs, config)
    }

    /// Tracking statistics of every candidate present.
    pub fn tracking_summary(
        &self,
        config: &TrackingConfig,
    ) -> BTreeMap<Strategy, TrackingStatistics> {
        self.strategies
            .iter()
            .filter(|s| **s != Strategy::Benchmark)
            .map(|s| (*s, self.tracking(*s, config)))
            .collect()
    }

    /// Export as a DataFrame with `start_date`, `end_date` and, per strategy,
    /// a period-return column and a `<name>_cumprod` column. Missing values
    /// are null.
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let starts: Vec<Date> = self.rows.iter().map(|r| r.start_date).collect();
        let ends: Vec<Date> = self.rows.iter().map(|r| r.end_date).collect();

        let mut columns = vec![
            Column::new("start_date".into(), starts),
            Column::new("end_date".into(), ends),
        ];
        for strategy in &self.strategies {
            let name = strategy.column_name();
            let points: Vec<Option<&StrategyPoint>> =
                self.rows.iter().map(|r| r.get(*strategy)).collect();
            let period: Vec<Option<f64>> =
                points.iter().map(|p| p.map(|p| p.period_return)).collect();
            let cumulative: Vec<Option<f64>> =
                points.iter().map(|p| p.map(|p| p.cumulative)).collect();
            columns.push(Column::new(name.into(), period));
            columns.push(Column::new(format!("{name}_cumprod").into(), cumulative));
        }

        Ok(DataFrame::new(columns)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn d(day: u32) -> Date {
        Date::from_ymd_opt(2024, 5, day).unwrap()
    }

    fn series(values: &[(u32, f64)]) -> Vec<PeriodReturn> {
        values
            .iter()
            .map(|(day, value)| PeriodReturn {
                start_date: d(*day),
                end_date: d(day + 1),
                value: *value,
            })
            .collect()
    }

    #[test]
    fn test_left_join_on_benchmark() {
        let bench = series(&[(1, 0.01), (2, -0.02), (3, 0.03)]);
        // Candidate misses day 2 and has an extra day 9
        let optimized = series(&[(1, 0.01), (3, 0.02), (9, 0.5)]);
        let comparison = Comparison::align(&bench, &[(Strategy::Optimized, optimized.as_slice())]);

        assert_eq!(comparison.len(), 3);
        assert_eq!(
            comparison.period_returns(Strategy::Optimized),
            vec![Some(0.01), None, Some(0.02)]
        );
        assert_abs_diff_eq!(
            comparison.final_cumulative(Strategy::Optimized).unwrap(),
            1.01 * 1.02 - 1.0,
            epsilon = 1e-12
        );
        assert_abs_diff_eq!(
            comparison.final_cumulative(Strategy::Benchmark).unwrap(),
            1.01 * 0.98 * 1.03 - 1.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_strategies_ordered() {
        let bench = series(&[(1, 0.01)]);
        let comparison = Comparison::align(
            &bench,
            &[
                (Strategy::Default, bench.as_slice()),
                (Strategy::Benchmark, bench.as_slice()),
                (Strategy::Optimized, bench.as_slice()),
            ],
        );
        assert_eq!(
            comparison.strategies(),
            &[Strategy::Benchmark, Strategy::Optimized, Strategy::Default]
        );
    }

    #[test]
    fn test_tracking_identical_is_zero() {
        let bench = series(&[(1, 0.01), (2, -0.02), (3, 0.03)]);
        let comparison = Comparison::align(&bench, &[(Strategy::Rebalanced, bench.as_slice())]);
        let summary = comparison.tracking_summary(&TrackingConfig::default());

        assert_eq!(summary.len(), 1);
        assert_eq!(summary[&Strategy::Rebalanced].tracking_error_bps, 0.0);
    }

    #[test]
    fn test_to_dataframe() {
        let bench = series(&[(1, 0.01), (2, -0.02)]);
        let optimized = series(&[(2, -0.01)]);
        let comparison = Comparison::align(
            &bench,
            &[
                (Strategy::Optimized, optimized.as_slice()),
                (Strategy::Default, bench.as_slice()),
            ],
        );
        let df = comparison.to_dataframe().unwrap();

        let names: Vec<&str> = df.get_column_names().iter().map(|n| n.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "start_date",
                "end_date",
                "bench",
                "bench_cumprod",
                "optimized",
                "optimized_cumprod",
                "default",
                "default_cumprod",
            ]
        );
        assert_eq!(df.height(), 2);

        let optimized = df.column("optimized").unwrap().as_materialized_series().f64().unwrap();
        assert_eq!(optimized.get(0), None);
        assert_eq!(optimized.get(1), Some(-0.01));

        let bench_cum = df
            .column("bench_cumprod")
            .unwrap()
            .as_materialized_series()
            .f64()
            .unwrap();
        assert_abs_diff_eq!(bench_cum.get(1).unwrap(), 1.01 * 0.98 - 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_empty_benchmark() {
        let comparison = Comparison::align(&[], &[]);
        assert!(comparison.is_empty());
        assert_eq!(comparison.to_dataframe().unwrap().height(), 0);
    }
}
