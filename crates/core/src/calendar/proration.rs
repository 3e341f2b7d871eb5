//! Whole-month proration and working-day helpers.

use chrono::{Datelike, NaiveDate};

use super::types::CalendarError;

/// Whole-month distance between two dates.
///
/// `(to.year - from.year) * 12 + (to.month - from.month)`; a partial month
/// counts as a full unit and days within the month never matter. This is the
/// single proration unit used by every accrual algorithm.
#[must_use]
pub fn months_between(to: NaiveDate, from: NaiveDate) -> i32 {
    (to.year() - from.year()) * 12 + (to.month().cast_signed() - from.month().cast_signed())
}

/// Walks backward from `date` to the nearest working day.
///
/// The walk is iterative and bounded: after `max_lookback` non-working
/// candidates the search fails instead of recursing into misconfigured
/// holiday data.
///
/// # Errors
///
/// Returns [`CalendarError::NoWorkingDay`] when the window is exhausted.
pub fn last_working_day<F>(
    date: NaiveDate,
    is_non_working: F,
    max_lookback: u32,
) -> Result<NaiveDate, CalendarError>
where
    F: Fn(NaiveDate) -> bool,
{
    let mut candidate = date;
    for _ in 0..=max_lookback {
        if !is_non_working(candidate) {
            return Ok(candidate);
        }
        candidate = candidate
            .pred_opt()
            .ok_or(CalendarError::NoWorkingDay {
                from: date,
                lookback: max_lookback,
            })?;
    }
    Err(CalendarError::NoWorkingDay {
        from: date,
        lookback: max_lookback,
    })
}
