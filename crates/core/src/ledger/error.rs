//! Ledger error taxonomy.
//!
//! Every ledger operation funnels into [`LedgerError`]. Variants are
//! grouped by how callers should react: conflicts ask for a re-read
//! and retry, validation failures are caller bugs or bad input, not-
//! found variants are lookup misses, and invariant/storage failures
//! are server-side faults.

use chrono::NaiveDate;
use furlough_shared::types::{LeaveTypeId, QuarterId, RequestId, UserId};
use thiserror::Error;

use crate::calendar::CalendarError;
use crate::request::error::RequestError;
use crate::request::types::LeaveStatus;

/// Errors raised by ledger reads, writes, and recomputations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    // === Conflicts (409) ===
    /// The request status changed between read and write.
    #[error("leave request status changed underneath the operation: expected {expected}, found {actual}")]
    StatusConflict {
        /// Status the operation expected to find.
        expected: LeaveStatus,
        /// Status actually stored.
        actual: LeaveStatus,
    },

    /// The ledger was modified concurrently.
    #[error("ledger for user {user_id} was modified concurrently: expected version {expected}, found {actual}")]
    VersionMismatch {
        /// Ledger owner.
        user_id: UserId,
        /// Version the write was based on.
        expected: u64,
        /// Version found in the store.
        actual: u64,
    },

    /// A ledger already exists for this user and fiscal year.
    #[error("a ledger for user {user_id} already exists for this fiscal year")]
    DuplicateLedger {
        /// Ledger owner.
        user_id: UserId,
    },

    /// A leave request with this id already exists.
    #[error("leave request {request_id} already exists")]
    DuplicateRequest {
        /// Id already in use.
        request_id: RequestId,
    },

    // === Validation (400) ===
    /// A leave date falls outside every quarter of the calendar.
    #[error("leave date {date} falls outside every quarter of the fiscal year")]
    DateOutsideQuarters {
        /// Offending date.
        date: NaiveDate,
    },

    /// An employee's join date falls outside the quarter calendar.
    #[error("join date {join_date} falls outside every quarter of the fiscal year")]
    JoinDateOutsideCalendar {
        /// Offending join date.
        join_date: NaiveDate,
    },

    /// No working day was found within the backward lookback window.
    #[error("no working day within {lookback} days before {from}")]
    NoWorkingDay {
        /// The date the walk started from.
        from: NaiveDate,
        /// The lookback window that was exhausted.
        lookback: u32,
    },

    /// A leave request carried no dates.
    #[error("a leave request must name at least one leave date")]
    EmptyLeaveDates,

    /// A requested date collides with another active request.
    #[error("an active leave request already covers {date}")]
    OverlappingLeave {
        /// Date already covered.
        date: NaiveDate,
    },

    /// The requested status transition is not allowed.
    #[error("cannot move a leave request from {from} to {to}")]
    InvalidTransition {
        /// Current status.
        from: LeaveStatus,
        /// Requested status.
        to: LeaveStatus,
    },

    /// The leave type does not deduct from the ledger.
    #[error("leave type {name:?} does not deduct from the ledger")]
    NotALedgerLeaveType {
        /// Leave type name as configured.
        name: String,
    },

    /// The quarter calendar itself is malformed.
    #[error("invalid quarter calendar: {message}")]
    InvalidCalendar {
        /// What the calendar validation rejected.
        message: String,
    },

    // === Not found (404) ===
    /// No ledger exists for the user in the active fiscal year.
    #[error("no ledger found for user {user_id}")]
    LedgerNotFound {
        /// Ledger owner.
        user_id: UserId,
    },

    /// The leave request does not exist.
    #[error("leave request {request_id} not found")]
    RequestNotFound {
        /// Missing request.
        request_id: RequestId,
    },

    /// The employee does not exist.
    #[error("employee {user_id} not found")]
    EmployeeNotFound {
        /// Missing employee.
        user_id: UserId,
    },

    /// No quarter calendar is configured for the active fiscal year.
    #[error("no quarter calendar is configured for the active fiscal year")]
    CalendarNotFound,

    /// The leave type does not exist.
    #[error("leave type {leave_type_id} not found")]
    LeaveTypeNotFound {
        /// Missing leave type.
        leave_type_id: LeaveTypeId,
    },

    // === Invariant and storage faults (500) ===
    /// A post-mutation arithmetic invariant check failed.
    #[error("ledger arithmetic invariant violated: {detail}")]
    InvariantViolation {
        /// Which check failed, and where.
        detail: String,
    },

    /// The ledger has no entry for a quarter the calendar defines.
    #[error("ledger has no entry for quarter {quarter_id}")]
    QuarterEntryMissing {
        /// Quarter without an entry.
        quarter_id: QuarterId,
    },

    /// The backing store failed.
    #[error("storage operation failed: {message}")]
    Store {
        /// Store-level failure description.
        message: String,
    },
}

impl LedgerError {
    /// Stable machine-readable error code.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::StatusConflict { .. } => "LEAVE_STATUS_CONFLICT",
            Self::VersionMismatch { .. } => "LEDGER_VERSION_MISMATCH",
            Self::DuplicateLedger { .. } => "DUPLICATE_LEDGER",
            Self::DuplicateRequest { .. } => "DUPLICATE_LEAVE_REQUEST",
            Self::DateOutsideQuarters { .. } => "DATE_OUTSIDE_QUARTERS",
            Self::JoinDateOutsideCalendar { .. } => "JOIN_DATE_OUTSIDE_CALENDAR",
            Self::NoWorkingDay { .. } => "NO_WORKING_DAY",
            Self::EmptyLeaveDates => "EMPTY_LEAVE_DATES",
            Self::OverlappingLeave { .. } => "OVERLAPPING_LEAVE",
            Self::InvalidTransition { .. } => "INVALID_STATUS_TRANSITION",
            Self::NotALedgerLeaveType { .. } => "NOT_A_LEDGER_LEAVE_TYPE",
            Self::InvalidCalendar { .. } => "INVALID_CALENDAR",
            Self::LedgerNotFound { .. } => "LEDGER_NOT_FOUND",
            Self::RequestNotFound { .. } => "LEAVE_REQUEST_NOT_FOUND",
            Self::EmployeeNotFound { .. } => "EMPLOYEE_NOT_FOUND",
            Self::CalendarNotFound => "CALENDAR_NOT_FOUND",
            Self::LeaveTypeNotFound { .. } => "LEAVE_TYPE_NOT_FOUND",
            Self::InvariantViolation { .. } => "ARITHMETIC_INVARIANT_VIOLATION",
            Self::QuarterEntryMissing { .. } => "QUARTER_ENTRY_MISSING",
            Self::Store { .. } => "STORE_ERROR",
        }
    }

    /// HTTP status this error maps to at an API boundary.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::StatusConflict { .. }
            | Self::VersionMismatch { .. }
            | Self::DuplicateLedger { .. }
            | Self::DuplicateRequest { .. } => 409,
            Self::DateOutsideQuarters { .. }
            | Self::JoinDateOutsideCalendar { .. }
            | Self::NoWorkingDay { .. }
            | Self::EmptyLeaveDates
            | Self::OverlappingLeave { .. }
            | Self::InvalidTransition { .. }
            | Self::NotALedgerLeaveType { .. }
            | Self::InvalidCalendar { .. } => 400,
            Self::LedgerNotFound { .. }
            | Self::RequestNotFound { .. }
            | Self::EmployeeNotFound { .. }
            | Self::CalendarNotFound
            | Self::LeaveTypeNotFound { .. } => 404,
            Self::InvariantViolation { .. } | Self::QuarterEntryMissing { .. } | Self::Store { .. } => {
                500
            }
        }
    }

    /// Whether re-reading and retrying the operation may succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::StatusConflict { .. } | Self::VersionMismatch { .. } | Self::Store { .. }
        )
    }
}

impl From<CalendarError> for LedgerError {
    fn from(err: CalendarError) -> Self {
        match err {
            CalendarError::NoWorkingDay { from, lookback } => Self::NoWorkingDay { from, lookback },
            other => Self::InvalidCalendar {
                message: other.to_string(),
            },
        }
    }
}

impl From<RequestError> for LedgerError {
    fn from(err: RequestError) -> Self {
        match err {
            RequestError::InvalidTransition { from, to } => Self::InvalidTransition { from, to },
            RequestError::EmptyDates => Self::EmptyLeaveDates,
            RequestError::OverlappingLeave { date } => Self::OverlappingLeave { date },
        }
    }
}
