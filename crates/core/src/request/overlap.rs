//! Date-overlap detection between leave requests.

use chrono::NaiveDate;

use crate::request::types::{LeaveDate, LeaveRequest};

/// Finds the first candidate date already covered by an active request.
///
/// Requests in cancelled or rejected status do not block; two half-day
/// requests on the same date block each other only when they cover the
/// same session. The request being edited can be excluded by filtering
/// it out of `existing` beforehand.
#[must_use]
pub fn find_overlap(candidate: &[LeaveDate], existing: &[LeaveRequest]) -> Option<NaiveDate> {
    for date in candidate {
        for request in existing {
            if !request.status.blocks_overlap() {
                continue;
            }
            if request.dates.iter().any(|held| date.collides_with(held)) {
                return Some(date.date);
            }
        }
    }
    None
}
