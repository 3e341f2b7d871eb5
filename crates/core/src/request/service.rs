//! Request submission validation and status transitions.

use crate::request::error::RequestError;
use crate::request::overlap::find_overlap;
use crate::request::types::{LeaveDate, LeaveRequest, LeaveStatus};

/// Stateless rules for the request lifecycle.
pub struct RequestService;

impl RequestService {
    /// Validates a new or re-submitted set of leave dates.
    ///
    /// `existing` should hold the user's other requests; cancelled and
    /// rejected ones are ignored by the overlap check.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::EmptyDates`] when no dates are given and
    /// [`RequestError::OverlappingLeave`] on a date collision.
    pub fn validate_submission(
        dates: &[LeaveDate],
        existing: &[LeaveRequest],
    ) -> Result<(), RequestError> {
        if dates.is_empty() {
            return Err(RequestError::EmptyDates);
        }
        if let Some(date) = find_overlap(dates, existing) {
            return Err(RequestError::OverlappingLeave { date });
        }
        Ok(())
    }

    /// Moves `request` to `to`, returning the previous status.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::InvalidTransition`] when the transition
    /// table does not allow the move.
    pub fn transition(
        request: &mut LeaveRequest,
        to: LeaveStatus,
    ) -> Result<LeaveStatus, RequestError> {
        let from = request.status;
        if !from.can_transition_to(to) {
            return Err(RequestError::InvalidTransition { from, to });
        }
        request.status = to;
        Ok(from)
    }
}
