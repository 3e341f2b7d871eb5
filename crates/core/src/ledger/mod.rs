//! Leave balance ledger.
//!
//! This module implements the per-user, per-fiscal-year leave balance
//! record and every algorithm that mutates it:
//! - Ledger, quarter-entry, and aggregation types
//! - New-hire and fiscal-year seeding
//! - Quarterly rollover with carry-over
//! - Probation-to-permanent entitlement recomputation
//! - Entitlement-edit deltas
//! - Approval/cancellation delta application
//! - Post-mutation invariant validation
//! - Error types for every ledger operation

pub mod accrual;
pub mod error;
pub mod types;
pub mod validation;

#[cfg(test)]
mod accrual_props;
#[cfg(test)]
mod validation_props;

pub use accrual::{AccrualContext, AccrualService, RolloverOutcome};
pub use error::LedgerError;
pub use types::{ApprovedLeaves, LeaveLedger, QuarterEntry, TakenLeaves};
pub use validation::validate_ledger;
