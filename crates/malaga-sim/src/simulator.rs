//! Drifting-weight portfolio simulation.
//!
//! Weights are set once, at the first boundary, and then only move through
//! [`drift`]: each security's weight grows with its own return and shrinks
//! with the portfolio's. No rebalancing happens inside [`simulate`]; callers
//! express a rebalance by starting a new simulation.

use malaga_traits::{Date, MalagaError, Result, ReturnsMatrix, WeightVector};

use crate::record::PortfolioReturnRecord;

/// Apply one period of weight drift.
///
/// # Arguments
///
/// * `weights` - Weights at the start of the period (summing to 1)
/// * `returns` - Security returns over the period, aligned with `weights`
///
/// # Returns
///
/// The drifted weights `w_j (1 + r_j) / (1 + R)` and the portfolio return
/// `R = sum_j w_j r_j`.
///
/// # Errors
///
/// `InvalidData` when the portfolio loses everything (`1 + R <= 0`).
///
/// # Examples
///
/// ```
/// use malaga_sim::drift;
///
/// let (w, r) = drift(&[0.5, 0.5], &[0.10, 0.0]).unwrap();
/// assert!((r - 0.05).abs() < 1e-15);
/// assert!((w[0] - 0.55 / 1.05).abs() < 1e-15);
/// ```
pub fn drift(weights: &[f64], returns: &[f64]) -> Result<(Vec<f64>, f64)> {
    let portfolio_return: f64 = weights.iter().zip(returns).map(|(w, r)| w * r).sum();
    let growth = 1.0 + portfolio_return;
    if growth <= 0.0 || !growth.is_finite() {
        return Err(MalagaError::InvalidData(format!(
            "portfolio return {portfolio_return} leaves no capital to drift"
        )));
    }

    let drifted = weights
        .iter()
        .zip(returns)
        .map(|(w, r)| w * (1.0 + r) / growth)
        .collect();
    Ok((drifted, portfolio_return))
}

/// Simulate an allocation across consecutive rebalance boundaries.
///
/// For every consecutive pair `(d_i, d_{i+1})` of `dates`, one record per
/// security in `initial_weights` is emitted, in identifier order. The weight
/// in force at `d_0` is the initial weight; at later boundaries it is the
/// weight drifted through the previous intervals. Each record's
/// `period_return` is the security's compounded return over the matrix rows
/// `(d_i, d_{i+1}]`.
///
/// # Arguments
///
/// * `dates` - At least two strictly ascending dates from the matrix index
/// * `initial_weights` - Allocation at `d_0`
/// * `returns` - Returns covering every date in `dates`
///
/// # Errors
///
/// - `InvalidDate` for fewer than two dates, unsorted dates, or dates missing
///   from the matrix index
/// - `UnknownSecurity` for a weight without a matrix column
/// - `InvalidData` for non-finite returns or a wiped-out portfolio
pub fn simulate(
    dates: &[Date],
    initial_weights: &WeightVector,
    returns: &ReturnsMatrix,
) -> Result<Vec<PortfolioReturnRecord>> {
    if dates.len() < 2 {
        return Err(MalagaError::InvalidDate(format!(
            "simulation needs at least 2 rebalance dates, got {}",
            dates.len()
        )));
    }
    if let Some(pair) = dates.windows(2).find(|w| w[0] >= w[1]) {
        return Err(MalagaError::InvalidDate(format!(
            "rebalance dates not strictly ascending at {} -> {}",
            pair[0], pair[1]
        )));
    }

    let rows = dates
        .iter()
        .map(|d| {
            returns
                .row_of(*d)
                .ok_or_else(|| MalagaError::InvalidDate(format!("{d} is not in the returns index")))
        })
        .collect::<Result<Vec<_>>>()?;

    let (tickers, mut weights): (Vec<&str>, Vec<f64>) = initial_weights.iter().unzip();
    let columns = tickers
        .iter()
        .map(|t| returns.column_index(t))
        .collect::<Result<Vec<_>>>()?;

    let mut records = Vec::with_capacity((dates.len() - 1) * tickers.len());
    let mut growth = 1.0;

    for (i, bounds) in rows.windows(2).enumerate() {
        let (start_date, end_date) = (dates[i], dates[i + 1]);

        let period_returns: Vec<f64> = columns
            .iter()
            .map(|&col| returns.compounded_return(col, bounds[0], bounds[1]))
            .collect();

        if let Some(j) = period_returns.iter().position(|r| !r.is_finite()) {
            return Err(MalagaError::InvalidData(format!(
                "non-finite return for {} over {start_date} -> {end_date}",
                tickers[j]
            )));
        }

        records.extend(tickers.iter().zip(&weights).zip(&period_returns).map(
            |((ticker, &start_wt), &period_return)| PortfolioReturnRecord {
                start_date,
                end_date,
                ticker: (*ticker).to_string(),
                start_wt,
                period_return,
                start_value: start_wt * growth,
            },
        ));

        let (drifted, portfolio_return) = drift(&weights, &period_returns)?;
        weights = drifted;
        growth *= 1.0 + portfolio_return;
    }

    tracing::trace!(
        intervals = dates.len() - 1,
        securities = tickers.len(),
        "simulated portfolio"
    );

    Ok(records)
}
