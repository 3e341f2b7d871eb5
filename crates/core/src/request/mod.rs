//! Leave request lifecycle.
//!
//! Requests move through a small state machine; the ledger reacts to
//! the transitions. This module owns the request types, the transition
//! rules, submission validation, and date-overlap detection.

pub mod error;
pub mod overlap;
pub mod service;
pub mod types;

pub use error::RequestError;
pub use overlap::find_overlap;
pub use service::RequestService;
pub use types::{HalfDay, LeaveDate, LeaveRequest, LeaveStatus};
