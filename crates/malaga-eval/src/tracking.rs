//! Tracking statistics between a candidate and the benchmark.

use malaga_traits::stats::{BPS, mean, sample_std};
use serde::{Deserialize, Serialize};

/// Configuration for tracking statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackingConfig {
    /// Number of trading days per year for annualization
    pub trading_days_per_year: usize,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            trading_days_per_year: 252,
        }
    }
}

/// How closely a candidate followed the benchmark.
///
/// All figures are in basis points of the period return difference
/// `benchmark - candidate`. Statistics are NaN with fewer than two aligned
/// periods.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackingStatistics {
    /// Sample standard deviation of the difference (N-1 denominator)
    pub tracking_error_bps: f64,
    /// Tracking error scaled by the square root of the trading year
    pub annualized_bps: f64,
    /// Mean difference; positive when the candidate lagged
    pub mean_difference_bps: f64,
    /// Number of aligned periods
    pub n_obs: usize,
}

impl TrackingStatistics {
    /// Calculate tracking statistics from aligned period returns.
    ///
    /// Pairs where the candidate is missing are skipped.
    ///
    /// # Arguments
    ///
    /// * `pairs` - `(benchmark, candidate)` period returns on the benchmark's index
    /// * `config` - Configuration for annualization
    pub fn calculate(pairs: &[(f64, Option<f64>)], config: &TrackingConfig) -> Self {
        let differences: Vec<f64> = pairs
            .iter()
            .filter_map(|(bench, candidate)| candidate.map(|c| bench - c))
            .filter(|d| d.is_finite())
            .collect();

        let n_obs = differences.len();
        if n_obs < 2 {
            return Self {
                tracking_error_bps: f64::NAN,
                annualized_bps: f64::NAN,
                mean_difference_bps: if n_obs == 1 { differences[0] * BPS } else { f64::NAN },
                n_obs,
            };
        }

        let tracking_error_bps = sample_std(&differences) * BPS;
        Self {
            tracking_error_bps,
            annualized_bps: tracking_error_bps * (config.trading_days_per_year as f64).sqrt(),
            mean_difference_bps: mean(&differences) * BPS,
            n_obs,
        }
    }
}
