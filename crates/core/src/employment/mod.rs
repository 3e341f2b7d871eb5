//! Employment-status snapshots.
//!
//! Position and status-change data gate which parts of the ledger a leave
//! approval touches: quarter entries always track approved dates, annual
//! pools only move for permanent employees.

pub mod types;

pub use types::{EmployeeSnapshot, Position};
