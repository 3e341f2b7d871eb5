//! Ledger engine for Furlough.
//!
//! Wires the pure accrual logic from `furlough-core` to a backing
//! store: request transitions with conflict detection, per-ledger
//! compare-and-swap writes, batch recomputations with bounded
//! parallelism, and change events for a notification collaborator.
//!
//! # Modules
//!
//! - `store` - Storage traits and the in-memory implementation
//! - `service` - [`LedgerEngine`]: per-user ledger operations
//! - `orchestrator` - Batch operations across all active employees
//! - `events` - Ledger-change events and sinks

pub mod events;
pub mod orchestrator;
pub mod service;
pub mod store;

pub use events::{ChangeReason, EventSink, LedgerChanged, NullSink, TracingSink};
pub use orchestrator::{BatchReport, UserOutcome};
pub use service::{LedgerEngine, LedgerView};
pub use store::memory::MemoryStore;
pub use store::{Store, StoreError};
