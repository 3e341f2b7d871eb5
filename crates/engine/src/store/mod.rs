//! Storage traits.
//!
//! The engine talks to storage through four narrow traits, one per
//! aggregate. Implementations must provide per-key atomicity for the
//! two compare-and-swap operations ([`LedgerStore::update_ledger`] and
//! [`RequestStore::swap_status`]); everything else is plain reads and
//! writes. [`memory::MemoryStore`] implements all four.

pub mod memory;

use async_trait::async_trait;
use furlough_core::calendar::QuarterCalendar;
use furlough_core::employment::EmployeeSnapshot;
use furlough_core::leave_type::LeaveTypeRegistry;
use furlough_core::ledger::{LeaveLedger, LedgerError};
use furlough_core::request::{LeaveRequest, LeaveStatus};
use furlough_shared::types::{FiscalYearId, RequestId, UserId};
use thiserror::Error;

/// A storage-level failure: connectivity, serialization, corruption.
///
/// Domain conditions (missing rows, version conflicts) are modelled in
/// the operation results instead, so implementations reserve this for
/// faults a retry might fix.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct StoreError {
    /// Backend-specific failure description.
    pub message: String,
}

impl StoreError {
    /// Wraps a backend failure description.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<StoreError> for LedgerError {
    fn from(err: StoreError) -> Self {
        Self::Store {
            message: err.message,
        }
    }
}

/// Result of a versioned ledger write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CasResult {
    /// The write landed; the stored version is now `version`.
    Applied {
        /// Version after the write.
        version: u64,
    },
    /// The stored version differed from the expectation; nothing was
    /// written.
    Conflict {
        /// Version actually in the store.
        actual: u64,
    },
    /// No ledger to update.
    Missing,
}

/// Result of a guarded request-status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusSwap {
    /// The status moved.
    Applied,
    /// The stored status differed from the expectation; nothing moved.
    Conflict {
        /// Status actually in the store.
        actual: LeaveStatus,
    },
    /// No such request.
    NotFound,
}

/// Leave balance ledgers, keyed by user and fiscal year.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Fetches one user's ledger for a fiscal year.
    async fn ledger(
        &self,
        user_id: UserId,
        fiscal_year: FiscalYearId,
    ) -> Result<Option<LeaveLedger>, StoreError>;

    /// Inserts a new ledger. Returns false, writing nothing, when the
    /// (user, fiscal year) pair already has one.
    async fn insert_ledger(&self, ledger: &LeaveLedger) -> Result<bool, StoreError>;

    /// Replaces a ledger if its stored version still equals
    /// `expected_version`, bumping the version on success.
    ///
    /// The version check and the write must be atomic per ledger.
    async fn update_ledger(
        &self,
        ledger: &LeaveLedger,
        expected_version: u64,
    ) -> Result<CasResult, StoreError>;
}

/// Leave requests.
#[async_trait]
pub trait RequestStore: Send + Sync {
    /// Fetches one request.
    async fn request(&self, request_id: RequestId) -> Result<Option<LeaveRequest>, StoreError>;

    /// All requests ever filed by a user.
    async fn requests_for_user(&self, user_id: UserId) -> Result<Vec<LeaveRequest>, StoreError>;

    /// Inserts or replaces a request.
    async fn put_request(&self, request: &LeaveRequest) -> Result<(), StoreError>;

    /// Moves a request's status from `expected` to `next`.
    ///
    /// The status check and the write must be atomic per request; this
    /// is the concurrent-approval guard.
    async fn swap_status(
        &self,
        request_id: RequestId,
        expected: LeaveStatus,
        next: LeaveStatus,
    ) -> Result<StatusSwap, StoreError>;
}

/// Employee snapshots.
#[async_trait]
pub trait EmployeeStore: Send + Sync {
    /// Fetches one employee.
    async fn employee(&self, user_id: UserId) -> Result<Option<EmployeeSnapshot>, StoreError>;

    /// Every employee still with the company, in no particular order.
    async fn active_employees(&self) -> Result<Vec<EmployeeSnapshot>, StoreError>;

    /// Inserts or replaces an employee snapshot.
    async fn upsert_employee(&self, employee: &EmployeeSnapshot) -> Result<(), StoreError>;
}

/// Reference data: the active quarter calendar and leave types.
#[async_trait]
pub trait ReferenceStore: Send + Sync {
    /// The calendar of the fiscal year mutations currently run against.
    async fn active_calendar(&self) -> Result<Option<QuarterCalendar>, StoreError>;

    /// Installs a new active calendar.
    async fn set_active_calendar(&self, calendar: &QuarterCalendar) -> Result<(), StoreError>;

    /// The configured leave types.
    async fn leave_types(&self) -> Result<LeaveTypeRegistry, StoreError>;

    /// Replaces the configured leave types.
    async fn set_leave_types(&self, registry: &LeaveTypeRegistry) -> Result<(), StoreError>;
}

/// Everything the engine needs from one backing store.
pub trait Store: LedgerStore + RequestStore + EmployeeStore + ReferenceStore {}

impl<T: LedgerStore + RequestStore + EmployeeStore + ReferenceStore> Store for T {}
