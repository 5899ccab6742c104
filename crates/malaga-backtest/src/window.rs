//! Point-in-time training windows.
//!
//! Every training slice handed to an optimizer is produced here, so the
//! look-ahead guarantee lives in one place: the window for a decision on
//! `test_dates[step]` ends strictly before that date.

use malaga_traits::{Date, DateRange, MalagaError, Result, ReturnsMatrix};

use crate::config::WindowPolicy;

/// Training window for the decision taken at `test_dates[step]`.
///
/// The cutoff is `training_end` for the first step and the previous test
/// date afterwards, so an expanding window grows by exactly one trading day
/// per step. A rolling window keeps the last `observations` dates of the
/// matrix up to the cutoff.
///
/// # Errors
///
/// - `InvalidDate` when `step` is past the test range or the cutoff is not
///   strictly before the decision date
/// - `InvalidConstraint` for a rolling window of zero observations
pub fn training_window(
    returns: &ReturnsMatrix,
    training_end: Date,
    test_dates: &[Date],
    step: usize,
    policy: WindowPolicy,
) -> Result<DateRange> {
    if matches!(policy, WindowPolicy::Rolling { observations: 0 }) {
        return Err(MalagaError::InvalidConstraint(
            "rolling window needs at least one observation".into(),
        ));
    }
    let decision = *test_dates.get(step).ok_or_else(|| {
        MalagaError::InvalidDate(format!(
            "step {step} is outside a test range of {} dates",
            test_dates.len()
        ))
    })?;
    let cutoff = match step {
        0 => training_end,
        _ => test_dates[step - 1],
    };
    if cutoff >= decision {
        return Err(MalagaError::InvalidDate(format!(
            "training cutoff {cutoff} is not before decision date {decision}"
        )));
    }

    let expanding = DateRange::through(cutoff);
    let window = match policy {
        WindowPolicy::Expanding => expanding,
        WindowPolicy::Rolling { observations } => {
            let available = returns.dates_in(expanding);
            match available.len().checked_sub(observations) {
                Some(skip) if skip > 0 => expanding.with_start(available[skip]),
                _ => expanding,
            }
        }
    };

    debug_assert!(window.end().is_some_and(|end| end <= decision));
    Ok(window)
}
