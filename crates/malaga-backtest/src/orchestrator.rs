//! Replication backtest orchestration.
//!
//! Four lanes share one read-only returns matrix:
//! - `Benchmark` and `Default` drift from the test start without rebalancing
//! - `Optimized` is solved once on the initial training window, then drifts
//! - `Rebalanced` is re-solved at every test date but the last, tracking the
//!   benchmark's drifted weights on that date
//!
//! The first three lanes are independent and run in parallel. The rebalanced
//! lane needs the benchmark's records and runs afterwards, one date at a time.

use std::collections::{BTreeMap, BTreeSet};

use malaga_eval::{Comparison, Strategy, TrackingConfig};
use malaga_sim::{PortfolioReturnRecord, simulate, weights_by_start_date};
use malaga_traits::{
    Date, DateRange, MalagaError, Optimizer, Result, ReturnsMatrix, ReturnsMatrixProvider, Ticker,
    WeightVector,
};
use tracing::{debug, error, info, warn};

use crate::config::{BacktestConfig, FailurePolicy};
use crate::lane::{RebalanceState, RebalanceStep, concat_records};
use crate::report::{BacktestError, BacktestFailure, BacktestReport, PartialResults};
use crate::window::training_window;

/// Result of a backtest run.
pub type BacktestResult<T> = std::result::Result<T, BacktestError>;

/// A lane failure before partial results are attached.
#[derive(Debug)]
struct LaneError {
    lane: Strategy,
    date: Date,
    source: MalagaError,
}

impl LaneError {
    fn into_failure(self, partial: PartialResults) -> BacktestError {
        error!(lane = %self.lane, date = %self.date, error = %self.source, "lane failed");
        BacktestError::Lane(Box::new(BacktestFailure {
            lane: self.lane,
            date: self.date,
            source: self.source,
            partial,
        }))
    }
}

type LaneResult<T> = std::result::Result<T, LaneError>;

/// Benchmark replication backtest.
///
/// # Examples
///
/// ```rust,ignore
/// use malaga_backtest::{Backtest, BacktestConfig};
/// use malaga_optim::ActiveRiskMinimizer;
///
/// let config = BacktestConfig::with_equal_weight_default(
///     benchmark,
///     0.005,
///     training_end,
///     testing_start,
/// )?;
/// let report = Backtest::new(config, ActiveRiskMinimizer::default()).run(&returns)?;
///
/// for (strategy, stats) in &report.tracking {
///     println!("{strategy}: {:.2} bps", stats.tracking_error_bps);
/// }
/// ```
pub struct Backtest {
    config: BacktestConfig,
    optimizer: Box<dyn Optimizer>,
    retry: Option<Box<dyn Optimizer>>,
    tracking: TrackingConfig,
}

impl std::fmt::Debug for Backtest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Backtest")
            .field("config", &self.config)
            .field("optimizer", &self.optimizer.name())
            .field("retry", &self.retry.as_ref().map(|r| r.name()))
            .field("tracking", &self.tracking)
            .finish()
    }
}

impl Backtest {
    /// Create a backtest solving replicas with `optimizer`.
    pub fn new(config: BacktestConfig, optimizer: impl Optimizer + 'static) -> Self {
        Self {
            config,
            optimizer: Box::new(optimizer),
            retry: None,
            tracking: TrackingConfig::default(),
        }
    }

    /// Fall back to `optimizer` whenever the primary optimizer fails.
    ///
    /// Every retry is logged with the date and the primary error.
    pub fn with_retry(mut self, optimizer: impl Optimizer + 'static) -> Self {
        self.retry = Some(Box::new(optimizer));
        self
    }

    /// Set the configuration used for tracking statistics.
    pub fn with_tracking_config(mut self, tracking: TrackingConfig) -> Self {
        self.tracking = tracking;
        self
    }

    /// The backtest configuration.
    #[must_use]
    pub const fn config(&self) -> &BacktestConfig {
        &self.config
    }

    /// Fetch returns from `start` for every security held by the benchmark
    /// or the default portfolio, then run.
    ///
    /// # Errors
    ///
    /// `BacktestError::Setup` when the provider fails, otherwise as [`Backtest::run`].
    pub fn run_with_provider<P>(&self, provider: &P, start: Date) -> BacktestResult<BacktestReport>
    where
        P: ReturnsMatrixProvider + ?Sized,
    {
        let securities: Vec<Ticker> = self
            .config
            .benchmark
            .securities()
            .chain(self.config.default_weights.securities())
            .map(|(t, _)| t.to_string())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        debug!(securities = securities.len(), %start, "fetching returns matrix");
        let returns = provider.returns_matrix(&securities, start)?;
        self.run(&returns)
    }

    /// Run every lane over the test range of `returns`.
    ///
    /// The test range is every matrix date on or after `testing_start`.
    ///
    /// # Errors
    ///
    /// - `BacktestError::Setup` for an invalid configuration or a test range
    ///   shorter than two dates
    /// - `BacktestError::Lane` when a lane fails, carrying the lane, the
    ///   date, and every result computed before the failure
    pub fn run(&self, returns: &ReturnsMatrix) -> BacktestResult<BacktestReport> {
        self.config.validate()?;

        let test_dates = returns
            .dates_in(DateRange::starting(self.config.testing_start))
            .to_vec();
        let (Some(first), Some(last)) = (test_dates.first(), test_dates.last()) else {
            return Err(MalagaError::InvalidDate(format!(
                "no returns on or after {}",
                self.config.testing_start
            ))
            .into());
        };
        if test_dates.len() < 2 {
            return Err(MalagaError::InvalidDate(format!(
                "test range from {first} needs at least 2 dates"
            ))
            .into());
        }

        info!(
            optimizer = self.optimizer.name(),
            %first,
            %last,
            dates = test_dates.len(),
            cash_drag = self.config.cash_drag,
            "starting replication backtest"
        );

        let ((bench, default), optimized) = rayon::join(
            || {
                rayon::join(
                    || {
                        self.drifting_lane(
                            Strategy::Benchmark,
                            &self.config.benchmark,
                            &test_dates,
                            returns,
                        )
                    },
                    || {
                        self.drifting_lane(
                            Strategy::Default,
                            &self.config.default_weights,
                            &test_dates,
                            returns,
                        )
                    },
                )
            },
            || self.optimized_lane(&test_dates, returns),
        );

        let mut partial = PartialResults::default();
        let mut failure = None;
        keep_lane(&mut partial, &mut failure, Strategy::Benchmark, bench);
        keep_lane(&mut partial, &mut failure, Strategy::Default, default);
        let optimized = optimized.map(|(weights, records)| {
            partial.lanes.insert(Strategy::Optimized, records);
            weights
        });
        let optimized_weights = match (failure, optimized) {
            (Some(err), _) | (None, Err(err)) => return Err(err.into_failure(partial)),
            (None, Ok(weights)) => weights,
        };

        let bench_records = lane_records(&partial.lanes, Strategy::Benchmark);
        let benchmark_weights = match weights_by_start_date(bench_records) {
            Ok(weights) => weights,
            Err(source) => {
                let err = LaneError {
                    lane: Strategy::Rebalanced,
                    date: *first,
                    source,
                };
                return Err(err.into_failure(partial));
            }
        };

        let steps = match self.rebalanced_lane(returns, &test_dates, &benchmark_weights) {
            Ok(steps) => steps,
            Err((err, steps)) => {
                partial.steps = steps;
                return Err(err.into_failure(partial));
            }
        };

        let mut lanes = partial.lanes;
        lanes.insert(Strategy::Rebalanced, concat_records(&steps));

        let candidates: Vec<(Strategy, &[PortfolioReturnRecord])> = Strategy::CANDIDATES
            .iter()
            .map(|s| (*s, lane_records(&lanes, *s)))
            .collect();
        let comparison =
            Comparison::from_records(lane_records(&lanes, Strategy::Benchmark), &candidates);
        let tracking = comparison.tracking_summary(&self.tracking);

        for (strategy, stats) in &tracking {
            info!(
                %strategy,
                tracking_error_bps = stats.tracking_error_bps,
                annualized_bps = stats.annualized_bps,
                mean_difference_bps = stats.mean_difference_bps,
                "tracking versus benchmark"
            );
        }

        Ok(BacktestReport {
            test_dates,
            optimized_weights,
            lanes,
            steps,
            comparison,
            tracking,
        })
    }

    /// Simulate `weights` over the whole test range without rebalancing.
    fn drifting_lane(
        &self,
        lane: Strategy,
        weights: &WeightVector,
        test_dates: &[Date],
        returns: &ReturnsMatrix,
    ) -> LaneResult<Vec<PortfolioReturnRecord>> {
        let records = simulate(test_dates, weights, returns).map_err(|source| LaneError {
            lane,
            date: test_dates[0],
            source,
        })?;
        info!(%lane, records = records.len(), "lane complete");
        Ok(records)
    }

    /// Optimize once on the initial training window, then drift.
    fn optimized_lane(
        &self,
        test_dates: &[Date],
        returns: &ReturnsMatrix,
    ) -> LaneResult<(WeightVector, Vec<PortfolioReturnRecord>)> {
        let lane = Strategy::Optimized;
        let date = test_dates[0];
        let fail = |source: MalagaError| LaneError { lane, date, source };

        let window = training_window(
            returns,
            self.config.training_end,
            test_dates,
            0,
            self.config.window,
        )
        .map_err(fail)?;
        let training = returns.slice(window);
        let weights = self
            .optimize(&self.config.benchmark, &training, date)
            .map_err(fail)?;
        debug!(%lane, %window, observations = training.n_dates(), "optimized static replica");

        let records = simulate(test_dates, &weights, returns).map_err(fail)?;
        info!(%lane, records = records.len(), "lane complete");
        Ok((weights, records))
    }

    /// Reoptimize at every test date but the last and hold each replica for
    /// one interval.
    ///
    /// On failure, the steps completed so far are returned with the error.
    fn rebalanced_lane(
        &self,
        returns: &ReturnsMatrix,
        test_dates: &[Date],
        benchmark_weights: &BTreeMap<Date, WeightVector>,
    ) -> std::result::Result<Vec<RebalanceStep>, (LaneError, Vec<RebalanceStep>)> {
        let lane = Strategy::Rebalanced;
        let mut steps: Vec<RebalanceStep> = Vec::with_capacity(test_dates.len() - 1);
        let mut state = RebalanceState::AwaitingTrainingWindow { step: 0 };

        loop {
            state = match state {
                RebalanceState::AwaitingTrainingWindow { step } if step + 1 >= test_dates.len() => {
                    RebalanceState::Done
                }
                RebalanceState::AwaitingTrainingWindow { step } => match training_window(
                    returns,
                    self.config.training_end,
                    test_dates,
                    step,
                    self.config.window,
                ) {
                    Ok(window) => RebalanceState::Optimizing { step, window },
                    Err(source) => {
                        let date = test_dates[step];
                        return Err((LaneError { lane, date, source }, steps));
                    }
                },
                RebalanceState::Optimizing { step, window } => {
                    let date = test_dates[step];
                    let training = returns.slice(window);
                    debug!(%date, %window, observations = training.n_dates(), "reoptimizing");

                    let solved = benchmark_weights
                        .get(&date)
                        .ok_or_else(|| {
                            MalagaError::InvalidDate(format!("no benchmark weights on {date}"))
                        })
                        .and_then(|benchmark| self.optimize(benchmark, &training, date));

                    match solved {
                        Ok(weights) => RebalanceState::Simulating {
                            step,
                            window,
                            weights,
                            carried_forward: false,
                        },
                        Err(source) => {
                            let previous = match self.config.failure {
                                FailurePolicy::CarryForward => {
                                    steps.last().map(|s| s.weights.clone())
                                }
                                FailurePolicy::Abort => None,
                            };
                            match previous {
                                Some(weights) => {
                                    warn!(
                                        %date,
                                        error = %source,
                                        "optimizer failed, carrying previous weights forward"
                                    );
                                    RebalanceState::Simulating {
                                        step,
                                        window,
                                        weights,
                                        carried_forward: true,
                                    }
                                }
                                None => return Err((LaneError { lane, date, source }, steps)),
                            }
                        }
                    }
                }
                RebalanceState::Simulating {
                    step,
                    window,
                    weights,
                    carried_forward,
                } => {
                    let date = test_dates[step];
                    match simulate(&test_dates[step..=step + 1], &weights, returns) {
                        Ok(records) => {
                            steps.push(RebalanceStep {
                                date,
                                window,
                                training_observations: returns.dates_in(window).len(),
                                weights,
                                carried_forward,
                                records,
                            });
                            RebalanceState::AwaitingTrainingWindow { step: step + 1 }
                        }
                        Err(source) => return Err((LaneError { lane, date, source }, steps)),
                    }
                }
                RebalanceState::Done => break,
            };
        }

        info!(
            %lane,
            steps = steps.len(),
            carried_forward = steps.iter().filter(|s| s.carried_forward).count(),
            "lane complete"
        );
        Ok(steps)
    }

    /// Solve with the primary optimizer, falling back to the retry optimizer.
    fn optimize(
        &self,
        benchmark: &WeightVector,
        training: &ReturnsMatrix,
        date: Date,
    ) -> Result<WeightVector> {
        let cash_drag = self.config.cash_drag;
        match self.optimizer.optimize(benchmark, cash_drag, training) {
            Ok(weights) => Ok(weights),
            Err(err) => match &self.retry {
                Some(retry) => {
                    warn!(
                        %date,
                        error = %err,
                        primary = self.optimizer.name(),
                        retry = retry.name(),
                        "retrying optimization with alternate optimizer"
                    );
                    retry.optimize(benchmark, cash_drag, training)
                }
                None => Err(err),
            },
        }
    }
}

fn keep_lane(
    partial: &mut PartialResults,
    failure: &mut Option<LaneError>,
    lane: Strategy,
    result: LaneResult<Vec<PortfolioReturnRecord>>,
) {
    match result {
        Ok(records) => {
            partial.lanes.insert(lane, records);
        }
        Err(err) => {
            failure.get_or_insert(err);
        }
    }
}

fn lane_records(
    lanes: &BTreeMap<Strategy, Vec<PortfolioReturnRecord>>,
    lane: Strategy,
) -> &[PortfolioReturnRecord] {
    lanes.get(&lane).map(Vec::as_slice).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WindowPolicy;
    use approx::assert_abs_diff_eq;
    use malaga_optim::ActiveRiskMinimizer;
    use malaga_traits::CASH;
    use std::sync::{Arc, Mutex};

    fn dates() -> Vec<Date> {
        Date::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .iter_days()
            .take(20)
            .collect()
    }

    fn returns() -> ReturnsMatrix {
        let n = dates().len();
        let column = |j: usize, beta: f64| -> Vec<f64> {
            (0..n)
                .map(|t| {
                    let t = t as f64;
                    beta * 0.01 * (0.7 * t).sin() + 0.003 * (1.3 * t + j as f64).cos()
                })
                .collect()
        };
        ReturnsMatrix::from_columns(
            dates(),
            vec![("A", column(0, 1.0)), ("B", column(1, 0.8)), ("C", column(2, 1.4))],
        )
        .unwrap()
    }

    fn training_end() -> Date {
        dates()[9]
    }

    fn test_dates() -> Vec<Date> {
        dates()[10..].to_vec()
    }

    fn config(cash_drag: f64) -> BacktestConfig {
        let benchmark =
            WeightVector::new([("A", 0.5), ("B", 0.3), ("C", 0.2), (CASH, 0.0)]).unwrap();
        BacktestConfig::with_equal_weight_default(benchmark, cash_drag, training_end(), dates()[10])
            .unwrap()
    }

    /// Holds the benchmark's securities pro rata.
    struct ProRata;

    impl Optimizer for ProRata {
        fn optimize(
            &self,
            benchmark: &WeightVector,
            cash_drag: f64,
            _training: &ReturnsMatrix,
        ) -> Result<WeightVector> {
            let invested: f64 = benchmark.securities().map(|(_, w)| w).sum();
            WeightVector::new(
                benchmark
                    .securities()
                    .map(|(t, w)| (t.to_string(), w * (1.0 - cash_drag) / invested))
                    .chain([(CASH.to_string(), cash_drag)]),
            )
        }

        fn name(&self) -> &str {
            "pro_rata"
        }
    }

    #[derive(Debug, Clone)]
    struct Call {
        benchmark: WeightVector,
        last_training_date: Option<Date>,
    }

    /// Records every call, then answers pro rata.
    #[derive(Default)]
    struct Spy {
        calls: Arc<Mutex<Vec<Call>>>,
    }

    impl Optimizer for Spy {
        fn optimize(
            &self,
            benchmark: &WeightVector,
            cash_drag: f64,
            training: &ReturnsMatrix,
        ) -> Result<WeightVector> {
            self.calls.lock().unwrap().push(Call {
                benchmark: benchmark.clone(),
                last_training_date: training.last_date(),
            });
            ProRata.optimize(benchmark, cash_drag, training)
        }

        fn name(&self) -> &str {
            "spy"
        }
    }

    /// Fails when the training window ends on `cutoff`.
    struct FailOn {
        cutoff: Date,
    }

    impl Optimizer for FailOn {
        fn optimize(
            &self,
            benchmark: &WeightVector,
            cash_drag: f64,
            training: &ReturnsMatrix,
        ) -> Result<WeightVector> {
            if training.last_date() == Some(self.cutoff) {
                return Err(MalagaError::OptimizationDidNotConverge {
                    iterations: 10,
                    step: 1e-3,
                });
            }
            ProRata.optimize(benchmark, cash_drag, training)
        }

        fn name(&self) -> &str {
            "fail_on"
        }
    }

    struct AlwaysFail;

    impl Optimizer for AlwaysFail {
        fn optimize(&self, _: &WeightVector, _: f64, _: &ReturnsMatrix) -> Result<WeightVector> {
            Err(MalagaError::InsufficientTrainingData("never enough".to_string()))
        }

        fn name(&self) -> &str {
            "always_fail"
        }
    }

    #[test]
    fn test_no_look_ahead() {
        let spy = Spy::default();
        let calls = Arc::clone(&spy.calls);
        let report = Backtest::new(config(0.005), spy).run(&returns()).unwrap();

        let calls = calls.lock().unwrap();
        let test_dates = test_dates();
        // One static solve, then one per test date but the last
        assert_eq!(calls.len(), 1 + test_dates.len() - 1);
        assert_eq!(calls[0].last_training_date, Some(training_end()));

        let drifted = weights_by_start_date(report.records(Strategy::Benchmark)).unwrap();
        for (step, call) in calls[1..].iter().enumerate() {
            let decision = test_dates[step];
            let expected_cutoff = if step == 0 {
                training_end()
            } else {
                test_dates[step - 1]
            };
            assert_eq!(call.last_training_date, Some(expected_cutoff));
            assert!(call.last_training_date.unwrap() < decision);
            assert_eq!(call.benchmark, drifted[&decision]);
        }
    }

    #[test]
    fn test_terminal_condition() {
        let report = Backtest::new(config(0.005), ProRata).run(&returns()).unwrap();
        let test_dates = test_dates();

        assert_eq!(report.steps.len(), test_dates.len() - 1);
        assert_eq!(report.steps.last().unwrap().date, test_dates[test_dates.len() - 2]);
        let last_end = report
            .records(Strategy::Rebalanced)
            .iter()
            .map(|r| r.end_date)
            .max();
        assert_eq!(last_end, test_dates.last().copied());
        assert_eq!(report.comparison.len(), test_dates.len() - 1);
    }

    #[test]
    fn test_training_window_grows_one_day() {
        let report = Backtest::new(config(0.005), ProRata).run(&returns()).unwrap();
        let sizes: Vec<usize> = report.steps.iter().map(|s| s.training_observations).collect();

        assert_eq!(sizes[0], 10);
        assert_eq!(sizes[1], 11);
        assert!(sizes.windows(2).skip(1).all(|w| w[1] == w[0] + 1));
    }

    #[test]
    fn test_rolling_window() {
        let config = config(0.005).with_window(WindowPolicy::Rolling { observations: 5 });
        let report = Backtest::new(config, ProRata).run(&returns()).unwrap();
        assert!(report.steps.iter().all(|s| s.training_observations == 5));
    }

    #[test]
    fn test_failure_surfaces_date() {
        let test_dates = test_dates();
        let optimizer = FailOn {
            cutoff: test_dates[3],
        };
        let err = Backtest::new(config(0.005), optimizer)
            .run(&returns())
            .unwrap_err();

        assert_eq!(err.date(), Some(test_dates[4]));
        let BacktestError::Lane(failure) = &err else {
            panic!("expected a lane failure, got {err}");
        };
        assert_eq!(failure.lane, Strategy::Rebalanced);
        assert!(matches!(
            failure.source,
            MalagaError::OptimizationDidNotConverge { .. }
        ));

        let partial = err.partial().unwrap();
        assert_eq!(partial.steps.len(), 4);
        assert!(partial.lanes.contains_key(&Strategy::Benchmark));
        assert!(partial.lanes.contains_key(&Strategy::Default));
        assert!(partial.lanes.contains_key(&Strategy::Optimized));
    }

    #[test]
    fn test_carry_forward() {
        let test_dates = test_dates();
        let optimizer = FailOn {
            cutoff: test_dates[3],
        };
        let config = config(0.005).with_failure_policy(FailurePolicy::CarryForward);
        let report = Backtest::new(config, optimizer).run(&returns()).unwrap();

        assert_eq!(report.steps.len(), test_dates.len() - 1);
        assert!(report.steps[4].carried_forward);
        assert_eq!(report.steps[4].weights, report.steps[3].weights);
        assert_eq!(report.steps.iter().filter(|s| s.carried_forward).count(), 1);
    }

    #[test]
    fn test_static_lane_failure_keeps_drifting_lanes() {
        let err = Backtest::new(config(0.005), AlwaysFail)
            .run(&returns())
            .unwrap_err();

        let BacktestError::Lane(failure) = &err else {
            panic!("expected a lane failure, got {err}");
        };
        assert_eq!(failure.lane, Strategy::Optimized);
        assert_eq!(failure.date, test_dates()[0]);
        assert!(matches!(
            failure.source,
            MalagaError::InsufficientTrainingData(_)
        ));
        assert_eq!(failure.partial.lanes.len(), 2);
    }

    #[test]
    fn test_retry_optimizer() {
        let report = Backtest::new(config(0.005), AlwaysFail)
            .with_retry(ProRata)
            .run(&returns())
            .unwrap();
        assert_eq!(report.steps.len(), test_dates().len() - 1);
        assert_abs_diff_eq!(
            report.optimized_weights.get("A").unwrap(),
            0.5 * 0.995,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_unknown_security_in_default() {
        let mut config = config(0.005);
        config.default_weights = WeightVector::new([("A", 0.5), ("Z", 0.5)]).unwrap();
        let err = Backtest::new(config, ProRata).run(&returns()).unwrap_err();

        let BacktestError::Lane(failure) = &err else {
            panic!("expected a lane failure, got {err}");
        };
        assert_eq!(failure.lane, Strategy::Default);
        assert!(matches!(
            &failure.source,
            MalagaError::UnknownSecurity { ticker } if ticker == "Z"
        ));
    }

    #[test]
    fn test_short_test_range() {
        let mut config = config(0.005);
        config.testing_start = *dates().last().unwrap();
        let err = Backtest::new(config, ProRata).run(&returns()).unwrap_err();
        assert!(matches!(
            err,
            BacktestError::Setup(MalagaError::InvalidDate(_))
        ));
    }

    #[test]
    fn test_full_run_with_minimizer() {
        let cash_drag = 0.005;
        let report = Backtest::new(config(cash_drag), ActiveRiskMinimizer::default())
            .run(&returns())
            .unwrap();

        assert_eq!(report.optimized_weights.cash(), cash_drag);
        assert_eq!(report.tracking.len(), 3);
        assert_eq!(report.comparison.strategies(), &Strategy::ALL);
        assert!(report.tracking[&Strategy::Default].tracking_error_bps > 0.0);

        for step in &report.steps {
            assert_eq!(step.weights.cash(), cash_drag);
            let invested: f64 = step.weights.securities().map(|(_, w)| w).sum();
            assert_abs_diff_eq!(invested, 1.0 - cash_drag, epsilon = 1e-9);
        }

        for lane in Strategy::ALL {
            let by_date = weights_by_start_date(report.records(lane)).unwrap();
            for weights in by_date.values() {
                assert_abs_diff_eq!(weights.sum(), 1.0, epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn test_run_with_provider() {
        struct Fixed {
            requested: Mutex<Vec<Ticker>>,
        }

        impl ReturnsMatrixProvider for Fixed {
            fn returns_matrix(&self, securities: &[Ticker], _start: Date) -> Result<ReturnsMatrix> {
                self.requested.lock().unwrap().extend_from_slice(securities);
                Ok(returns())
            }
        }

        let provider = Fixed {
            requested: Mutex::new(Vec::new()),
        };
        let report = Backtest::new(config(0.005), ProRata)
            .run_with_provider(&provider, dates()[0])
            .unwrap();

        assert_eq!(*provider.requested.lock().unwrap(), vec!["A", "B", "C"]);
        assert_eq!(report.test_dates, test_dates());
    }
}
