//! Statistical utility functions shared by the optimizer and the aggregator.

/// Basis points per unit of return.
pub const BPS: f64 = 1e4;

/// Arithmetic mean of the finite values, or NaN when there are none.
pub fn mean(values: &[f64]) -> f64 {
    let (sum, n) = values
        .iter()
        .filter(|x| x.is_finite())
        .fold((0.0, 0_usize), |(s, n), x| (s + x, n + 1));
    if n == 0 { f64::NAN } else { sum / n as f64 }
}

/// Sample standard deviation (N-1 denominator) of the finite values.
///
/// Returns NaN with fewer than two finite observations, matching the
/// convention used for undefined statistics elsewhere in the workspace.
///
/// # Examples
///
/// ```
/// use malaga_traits::stats::sample_std;
///
/// assert_eq!(sample_std(&[0.5, 0.5, 0.5]), 0.0);
/// assert!(sample_std(&[0.5]).is_nan());
/// ```
pub fn sample_std(values: &[f64]) -> f64 {
    let finite: Vec<f64> = values.iter().copied().filter(|x| x.is_finite()).collect();
    if finite.len() < 2 {
        return f64::NAN;
    }

    let m = mean(&finite);
    // Sample variance with N-1 denominator (Bessel's correction)
    let variance = finite.iter().map(|x| (x - m).powi(2)).sum::<f64>() / (finite.len() - 1) as f64;
    variance.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_mean_basic() {
        assert_relative_eq!(mean(&[1.0, 2.0, 3.0, 4.0, 5.0]), 3.0);
        assert!(mean(&[]).is_nan());
    }

    #[test]
    fn test_mean_skips_nan() {
        assert_relative_eq!(mean(&[1.0, f64::NAN, 3.0]), 2.0);
    }

    #[test]
    fn test_sample_std_basic() {
        // Var = 2.5 for 1..=5 with N-1 denominator
        assert_relative_eq!(sample_std(&[1.0, 2.0, 3.0, 4.0, 5.0]), 2.5_f64.sqrt());
    }

    #[test]
    fn test_sample_std_constant_is_exact_zero() {
        assert_eq!(sample_std(&[0.0, 0.0, 0.0, 0.0]), 0.0);
    }

    #[test]
    fn test_sample_std_insufficient() {
        assert!(sample_std(&[]).is_nan());
        assert!(sample_std(&[1.0, f64::NAN]).is_nan());
    }
}
