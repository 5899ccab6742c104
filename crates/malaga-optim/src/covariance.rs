//! Sample covariance estimation with shrinkage toward a scaled identity.

use ndarray::{Array2, Axis};
use serde::{Deserialize, Serialize};

/// Shrinkage applied to the sample covariance before optimization.
///
/// The shrunk estimate is `(1 - delta) * S + delta * mu * I`, where `mu` is the
/// average sample variance. Shrinkage makes a rank-deficient estimate
/// (fewer observations than securities) positive definite.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub enum Shrinkage {
    /// Use the raw sample covariance.
    None,
    /// Shrink only when the sample covariance is rank deficient, with
    /// intensity `n / (n + T)` for `n` securities and `T` observations.
    #[default]
    Auto,
    /// Always shrink with the given intensity in `[0, 1]`.
    Fixed(f64),
}

impl Shrinkage {
    /// Shrinkage intensity for `n_obs` observations of `n_assets` securities.
    pub fn intensity(&self, n_obs: usize, n_assets: usize) -> f64 {
        match *self {
            Self::None => 0.0,
            Self::Auto if n_obs <= n_assets => n_assets as f64 / (n_assets + n_obs) as f64,
            Self::Auto => 0.0,
            Self::Fixed(delta) => delta.clamp(0.0, 1.0),
        }
    }
}

/// Covariance estimate and how it was produced.
#[derive(Debug, Clone)]
pub struct CovarianceEstimate {
    /// The (possibly shrunk) covariance matrix
    pub matrix: Array2<f64>,
    /// Shrinkage intensity that was applied
    pub shrinkage: f64,
    /// Number of observations used
    pub n_obs: usize,
}

/// Sample covariance (N-1 denominator) of the columns of `returns`.
///
/// Returns `None` with fewer than two observations.
pub fn sample_covariance(returns: &Array2<f64>) -> Option<Array2<f64>> {
    let n_obs = returns.nrows();
    if n_obs < 2 {
        return None;
    }

    let means = returns.mean_axis(Axis(0))?;
    let centered = returns - &means;
    Some(centered.t().dot(&centered) / (n_obs - 1) as f64)
}

/// Shrink `cov` toward `mu * I` with intensity `delta`.
pub fn shrink(cov: &Array2<f64>, delta: f64) -> Array2<f64> {
    if delta <= 0.0 {
        return cov.clone();
    }

    let n = cov.nrows();
    let mu = cov.diag().sum() / n as f64;
    let mut shrunk = cov * (1.0 - delta);
    for i in 0..n {
        shrunk[[i, i]] += delta * mu;
    }
    shrunk
}

/// Estimate the covariance of `returns` (observations by securities).
///
/// Returns `None` with fewer than two observations.
pub fn estimate(returns: &Array2<f64>, shrinkage: Shrinkage) -> Option<CovarianceEstimate> {
    let sample = sample_covariance(returns)?;
    let delta = shrinkage.intensity(returns.nrows(), returns.ncols());
    Some(CovarianceEstimate {
        matrix: shrink(&sample, delta),
        shrinkage: delta,
        n_obs: returns.nrows(),
    })
}

/// Upper bound on the largest eigenvalue of a symmetric matrix
/// (maximum absolute row sum, by Gershgorin's theorem).
pub fn spectral_bound(matrix: &Array2<f64>) -> f64 {
    matrix
        .rows()
        .into_iter()
        .map(|row| row.iter().map(|x| x.abs()).sum::<f64>())
        .fold(0.0, f64::max)
}
