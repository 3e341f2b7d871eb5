//! In-memory store.
//!
//! Backs the engine with `DashMap`s. Per-key atomicity for the two
//! compare-and-swap operations comes from DashMap's entry locking: the
//! shard lock is held across the check and the write.

use std::sync::RwLock;

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use furlough_core::calendar::QuarterCalendar;
use furlough_core::employment::EmployeeSnapshot;
use furlough_core::leave_type::LeaveTypeRegistry;
use furlough_core::ledger::LeaveLedger;
use furlough_core::request::{LeaveRequest, LeaveStatus};
use furlough_shared::types::{FiscalYearId, RequestId, UserId};

use crate::store::{
    CasResult, EmployeeStore, LedgerStore, ReferenceStore, RequestStore, StatusSwap, StoreError,
};

/// Thread-safe in-memory implementation of every store trait.
///
/// Suitable for tests and single-process deployments; nothing is
/// persisted across restarts.
#[derive(Debug, Default)]
pub struct MemoryStore {
    ledgers: DashMap<(UserId, FiscalYearId), LeaveLedger>,
    requests: DashMap<RequestId, LeaveRequest>,
    employees: DashMap<UserId, EmployeeSnapshot>,
    calendar: RwLock<Option<QuarterCalendar>>,
    leave_types: RwLock<LeaveTypeRegistry>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_poisoned() -> StoreError {
        StoreError::new("reference data lock poisoned")
    }
}

#[async_trait]
impl LedgerStore for MemoryStore {
    async fn ledger(
        &self,
        user_id: UserId,
        fiscal_year: FiscalYearId,
    ) -> Result<Option<LeaveLedger>, StoreError> {
        Ok(self
            .ledgers
            .get(&(user_id, fiscal_year))
            .map(|entry| entry.clone()))
    }

    async fn insert_ledger(&self, ledger: &LeaveLedger) -> Result<bool, StoreError> {
        match self.ledgers.entry((ledger.user_id, ledger.fiscal_year)) {
            Entry::Occupied(_) => Ok(false),
            Entry::Vacant(slot) => {
                slot.insert(ledger.clone());
                Ok(true)
            }
        }
    }

    async fn update_ledger(
        &self,
        ledger: &LeaveLedger,
        expected_version: u64,
    ) -> Result<CasResult, StoreError> {
        match self.ledgers.entry((ledger.user_id, ledger.fiscal_year)) {
            Entry::Occupied(mut slot) => {
                let actual = slot.get().version;
                if actual != expected_version {
                    return Ok(CasResult::Conflict { actual });
                }
                let mut stored = ledger.clone();
                stored.version = expected_version + 1;
                slot.insert(stored);
                Ok(CasResult::Applied {
                    version: expected_version + 1,
                })
            }
            Entry::Vacant(_) => Ok(CasResult::Missing),
        }
    }
}

#[async_trait]
impl RequestStore for MemoryStore {
    async fn request(&self, request_id: RequestId) -> Result<Option<LeaveRequest>, StoreError> {
        Ok(self.requests.get(&request_id).map(|entry| entry.clone()))
    }

    async fn requests_for_user(&self, user_id: UserId) -> Result<Vec<LeaveRequest>, StoreError> {
        Ok(self
            .requests
            .iter()
            .filter(|entry| entry.user_id == user_id)
            .map(|entry| entry.clone())
            .collect())
    }

    async fn put_request(&self, request: &LeaveRequest) -> Result<(), StoreError> {
        self.requests.insert(request.id, request.clone());
        Ok(())
    }

    async fn swap_status(
        &self,
        request_id: RequestId,
        expected: LeaveStatus,
        next: LeaveStatus,
    ) -> Result<StatusSwap, StoreError> {
        match self.requests.entry(request_id) {
            Entry::Occupied(mut slot) => {
                let actual = slot.get().status;
                if actual != expected {
                    return Ok(StatusSwap::Conflict { actual });
                }
                slot.get_mut().status = next;
                Ok(StatusSwap::Applied)
            }
            Entry::Vacant(_) => Ok(StatusSwap::NotFound),
        }
    }
}

#[async_trait]
impl EmployeeStore for MemoryStore {
    async fn employee(&self, user_id: UserId) -> Result<Option<EmployeeSnapshot>, StoreError> {
        Ok(self.employees.get(&user_id).map(|entry| entry.clone()))
    }

    async fn active_employees(&self) -> Result<Vec<EmployeeSnapshot>, StoreError> {
        Ok(self
            .employees
            .iter()
            .filter(|entry| entry.active)
            .map(|entry| entry.clone())
            .collect())
    }

    async fn upsert_employee(&self, employee: &EmployeeSnapshot) -> Result<(), StoreError> {
        self.employees.insert(employee.id, employee.clone());
        Ok(())
    }
}

#[async_trait]
impl ReferenceStore for MemoryStore {
    async fn active_calendar(&self) -> Result<Option<QuarterCalendar>, StoreError> {
        Ok(self
            .calendar
            .read()
            .map_err(|_| Self::lock_poisoned())?
            .clone())
    }

    async fn set_active_calendar(&self, calendar: &QuarterCalendar) -> Result<(), StoreError> {
        *self.calendar.write().map_err(|_| Self::lock_poisoned())? = Some(calendar.clone());
        Ok(())
    }

    async fn leave_types(&self) -> Result<LeaveTypeRegistry, StoreError> {
        Ok(self
            .leave_types
            .read()
            .map_err(|_| Self::lock_poisoned())?
            .clone())
    }

    async fn set_leave_types(&self, registry: &LeaveTypeRegistry) -> Result<(), StoreError> {
        *self.leave_types.write().map_err(|_| Self::lock_poisoned())? = registry.clone();
        Ok(())
    }
}
