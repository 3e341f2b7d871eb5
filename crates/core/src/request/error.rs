//! Request validation errors.

use chrono::NaiveDate;
use thiserror::Error;

use crate::request::types::LeaveStatus;

/// Errors from request submission and status transitions.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RequestError {
    /// The requested status change is not in the transition table.
    #[error("cannot move a leave request from {from} to {to}")]
    InvalidTransition {
        /// Current status.
        from: LeaveStatus,
        /// Requested status.
        to: LeaveStatus,
    },

    /// The request named no leave dates.
    #[error("a leave request must name at least one leave date")]
    EmptyDates,

    /// A requested date collides with another active request.
    #[error("an active leave request already covers {date}")]
    OverlappingLeave {
        /// Date already covered.
        date: NaiveDate,
    },
}

impl RequestError {
    /// Stable machine-readable code, aligned with [`LedgerError`]'s
    /// codes for the same conditions.
    ///
    /// [`LedgerError`]: crate::ledger::LedgerError
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidTransition { .. } => "INVALID_STATUS_TRANSITION",
            Self::EmptyDates => "EMPTY_LEAVE_DATES",
            Self::OverlappingLeave { .. } => "OVERLAPPING_LEAVE",
        }
    }

    /// HTTP status this error maps to at an API boundary.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::InvalidTransition { .. } | Self::EmptyDates | Self::OverlappingLeave { .. } => {
                400
            }
        }
    }
}
