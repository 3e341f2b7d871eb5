//! Ledger-change events.
//!
//! Every successful mutation emits one [`LedgerChanged`] per affected
//! user. Delivery is somebody else's job: the engine hands events to an
//! [`EventSink`] and moves on. A `None` message means the change is
//! silent for the employee (probation rollovers, structural edits).

use furlough_shared::types::{FiscalYearId, UserId};

/// Why a ledger changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeReason {
    /// Initial seeding for a new hire.
    Seeded,
    /// A leave request was approved.
    Approval,
    /// An approved request was cancelled and its days returned.
    Cancellation,
    /// The quarterly rollover granted a new quarter.
    QuarterRollover,
    /// A fresh ledger was seeded at fiscal-year reset.
    FiscalYearReset,
    /// The employee turned permanent and entitlements were recomputed.
    StatusChange,
    /// An admin edited a leave type's annual entitlement.
    EntitlementEdit,
    /// The quarter calendar gained or lost quarters.
    StructureEdit,
}

/// One ledger mutation, as seen by a notification collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerChanged {
    /// Whose ledger changed.
    pub user_id: UserId,
    /// Fiscal year of the ledger.
    pub fiscal_year: FiscalYearId,
    /// What happened.
    pub reason: ChangeReason,
    /// Employee-facing message, or `None` when the change is silent.
    pub message: Option<String>,
}

/// Receives ledger-change events.
///
/// Implementations must not block: the engine publishes inline during
/// mutation handling.
pub trait EventSink: Send + Sync {
    /// Hands one event to the sink.
    fn publish(&self, event: LedgerChanged);
}

/// Logs every event at info level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn publish(&self, event: LedgerChanged) {
        tracing::info!(
            user_id = %event.user_id,
            fiscal_year = %event.fiscal_year,
            reason = ?event.reason,
            silent = event.message.is_none(),
            "ledger changed"
        );
    }
}

/// Swallows all events.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn publish(&self, _event: LedgerChanged) {}
}

/// Standard employee-facing text for a quarterly rollover.
pub(crate) const ROLLOVER_MESSAGE: &str = "Your quarterly leave has been updated.";
