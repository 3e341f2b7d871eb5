//! Core leave accrual and ledger logic for Furlough.
//!
//! This crate contains pure business logic with ZERO web or database
//! dependencies. All domain types, accrual arithmetic, and state-machine
//! rules live here.
//!
//! # Modules
//!
//! - `calendar` - Fiscal-year quarter calendar and whole-month proration
//! - `leave_type` - Leave-type registry and ledger participation rules
//! - `employment` - Employment-status snapshots and deduction gates
//! - `ledger` - The per-user, per-fiscal-year leave balance ledger
//! - `request` - Leave request lifecycle state machine

pub mod calendar;
pub mod employment;
pub mod leave_type;
pub mod ledger;
pub mod request;
