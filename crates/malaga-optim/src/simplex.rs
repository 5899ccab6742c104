//! Euclidean projection onto the scaled probability simplex.

use ndarray::Array1;

/// Project `v` onto `{x : x >= 0, sum(x) = total}`.
///
/// Uses the sort-and-threshold construction: find the largest `rho` such that
/// `u_rho > (sum_{i <= rho} u_i - total) / rho` over the values sorted in
/// descending order, then shift every coordinate by that threshold and clip
/// at zero. A non-positive `total` projects to the origin.
///
/// # Examples
///
/// ```
/// use malaga_optim::simplex::project;
/// use ndarray::array;
///
/// let p = project(&array![0.8, 0.8], 1.0);
/// assert!((p[0] - 0.5).abs() < 1e-15);
/// ```
pub fn project(v: &Array1<f64>, total: f64) -> Array1<f64> {
    if v.is_empty() || total <= 0.0 {
        return Array1::zeros(v.len());
    }

    let mut sorted = v.to_vec();
    sorted.sort_by(|a, b| b.total_cmp(a));

    let mut cumsum = 0.0;
    let mut theta = 0.0;
    for (i, u) in sorted.iter().enumerate() {
        cumsum += u;
        let candidate = (cumsum - total) / (i + 1) as f64;
        if u - candidate > 0.0 {
            theta = candidate;
        }
    }

    v.mapv(|x| (x - theta).max(0.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn test_point_on_simplex_is_fixed() {
        let v = array![0.2, 0.3, 0.495];
        let p = project(&v, 0.995);
        for (a, b) in p.iter().zip(v.iter()) {
            assert_abs_diff_eq!(a, b, epsilon = 1e-15);
        }
    }

    #[test]
    fn test_negative_coordinates_clipped() {
        let p = project(&array![1.2, -0.4], 1.0);
        assert_abs_diff_eq!(p[0], 1.0, epsilon = 1e-15);
        assert_eq!(p[1], 0.0);
    }

    #[test]
    fn test_sum_matches_total() {
        let p = project(&array![3.0, -1.0, 0.7, 0.1, 2.2], 0.95);
        assert_abs_diff_eq!(p.sum(), 0.95, epsilon = 1e-12);
        assert!(p.iter().all(|&x| x >= 0.0));
    }

    #[test]
    fn test_zero_total() {
        let p = project(&array![0.3, 0.7], 0.0);
        assert!(p.iter().all(|&x| x == 0.0));
    }
}
