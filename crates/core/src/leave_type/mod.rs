//! Leave-type registry.
//!
//! Annual entitlements per leave type. Only casual and sick leave
//! participate in ledger deduction; every other type passes through the
//! request lifecycle without touching balances.

pub mod types;

pub use types::{LeaveKind, LeaveTypeRegistry, LeaveTypeSnapshot};
