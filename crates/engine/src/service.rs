//! Per-user ledger operations.
//!
//! [`LedgerEngine`] is the write path for everything that touches one
//! ledger at a time. Every mutation follows the same shape: guard the
//! request transition with a status compare-and-swap, recompute the
//! ledger through the pure accrual functions, validate, then write
//! back with a version compare-and-swap. A ledger write that loses the
//! race reverts the request status and surfaces a conflict; nothing is
//! retried automatically.

use std::sync::Arc;

use chrono::NaiveDate;
use furlough_core::calendar::{self, QuarterCalendar};
use furlough_core::employment::EmployeeSnapshot;
use furlough_core::leave_type::LeaveTypeRegistry;
use furlough_core::ledger::{
    validate_ledger, AccrualContext, AccrualService, LeaveLedger, LedgerError, QuarterEntry,
    TakenLeaves,
};
use furlough_core::request::{LeaveRequest, LeaveStatus, RequestService};
use furlough_shared::types::{FiscalYearId, QuarterId, RequestId, UserId};
use furlough_shared::EngineConfig;
use serde::Serialize;

use crate::events::{ChangeReason, EventSink, LedgerChanged, TracingSink};
use crate::store::{CasResult, StatusSwap, Store};

/// Read-model projection of one ledger, optionally narrowed to a
/// single quarter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LedgerView {
    /// Ledger owner.
    pub user_id: UserId,
    /// Fiscal year the ledger covers.
    pub fiscal_year: FiscalYearId,
    /// Annual sick pool.
    pub remaining_sick: furlough_shared::LeaveDays,
    /// Annual casual pool.
    pub remaining_casual: furlough_shared::LeaveDays,
    /// Quarter entries, filtered when a quarter was requested.
    pub entries: Vec<QuarterEntry>,
    /// Version the projection was taken at.
    pub version: u64,
}

impl LedgerView {
    fn project(ledger: LeaveLedger, quarter_filter: Option<QuarterId>) -> Self {
        let entries = match quarter_filter {
            Some(quarter_id) => ledger
                .entries
                .iter()
                .filter(|entry| entry.quarter_id == quarter_id)
                .copied()
                .collect(),
            None => ledger.entries,
        };
        Self {
            user_id: ledger.user_id,
            fiscal_year: ledger.fiscal_year,
            remaining_sick: ledger.remaining_sick,
            remaining_casual: ledger.remaining_casual,
            entries,
            version: ledger.version,
        }
    }
}

/// The ledger write path over a backing store.
pub struct LedgerEngine<S> {
    store: Arc<S>,
    config: EngineConfig,
    events: Arc<dyn EventSink>,
}

impl<S: Store> LedgerEngine<S> {
    /// Builds an engine that logs its change events.
    #[must_use]
    pub fn new(store: Arc<S>, config: EngineConfig) -> Self {
        Self::with_events(store, config, Arc::new(TracingSink))
    }

    /// Builds an engine publishing change events to `events`.
    #[must_use]
    pub fn with_events(store: Arc<S>, config: EngineConfig, events: Arc<dyn EventSink>) -> Self {
        Self {
            store,
            config,
            events,
        }
    }

    /// Projects one user's ledger for a fiscal year.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::LedgerNotFound`] when the pair has no
    /// ledger.
    pub async fn get_ledger(
        &self,
        user_id: UserId,
        fiscal_year: FiscalYearId,
        quarter_filter: Option<QuarterId>,
    ) -> Result<LedgerView, LedgerError> {
        let ledger = self.ledger(user_id, fiscal_year).await?;
        Ok(LedgerView::project(ledger, quarter_filter))
    }

    /// Files a new leave request in pending state.
    ///
    /// The request id must be fresh: re-opening a stored request goes
    /// through [`reapply`](Self::reapply), never through submission.
    /// The date list must be non-empty and must not collide with the
    /// user's other active requests; complementary half-days on the
    /// same date are allowed. The stored status is always pending,
    /// whatever the caller put on the request.
    pub async fn submit_request(&self, request: LeaveRequest) -> Result<(), LedgerError> {
        self.employee(request.user_id).await?;
        if self.store.request(request.id).await?.is_some() {
            return Err(LedgerError::DuplicateRequest {
                request_id: request.id,
            });
        }
        let registry = self.store.leave_types().await?;
        if registry.kind_of(request.leave_type_id).is_none() {
            return Err(LedgerError::LeaveTypeNotFound {
                leave_type_id: request.leave_type_id,
            });
        }
        let existing = self.store.requests_for_user(request.user_id).await?;
        RequestService::validate_submission(&request.dates, &existing)?;

        let stored = LeaveRequest {
            status: LeaveStatus::Pending,
            ..request
        };
        self.store.put_request(&stored).await?;
        tracing::debug!(request_id = %stored.id, user_id = %stored.user_id, "leave request filed");
        Ok(())
    }

    /// Approves a pending request and charges its days to the ledger.
    ///
    /// `previous_status` is the status the caller last saw; the
    /// transition is rejected with a conflict when it no longer
    /// matches. If the ledger write loses its own race the request
    /// status is reverted and the conflict surfaced, so the caller can
    /// re-fetch and retry explicitly.
    pub async fn apply_approval(
        &self,
        request_id: RequestId,
        previous_status: LeaveStatus,
        today: NaiveDate,
    ) -> Result<(), LedgerError> {
        let request = self.request(request_id).await?;
        self.swap_request_status(request_id, previous_status, LeaveStatus::Approved)
            .await?;

        if let Err(err) = self.charge_ledger(&request, today, false).await {
            self.revert_request_status(request_id, LeaveStatus::Approved, previous_status)
                .await;
            return Err(err);
        }
        Ok(())
    }

    /// Cancels a request. Days charged by an earlier approval are
    /// returned; cancelling a still-pending request releases nothing.
    pub async fn apply_cancellation(
        &self,
        request_id: RequestId,
        previous_status: LeaveStatus,
        today: NaiveDate,
    ) -> Result<(), LedgerError> {
        let request = self.request(request_id).await?;
        self.swap_request_status(request_id, previous_status, LeaveStatus::Cancelled)
            .await?;

        if previous_status.counts_as_taken() {
            if let Err(err) = self.charge_ledger(&request, today, true).await {
                self.revert_request_status(request_id, LeaveStatus::Cancelled, previous_status)
                    .await;
                return Err(err);
            }
        }
        Ok(())
    }

    /// Records an employee withdrawing an approved request.
    ///
    /// The days stay charged until an admin confirms the cancellation,
    /// so only the status moves.
    pub async fn apply_user_cancellation(
        &self,
        request_id: RequestId,
        previous_status: LeaveStatus,
    ) -> Result<(), LedgerError> {
        self.swap_request_status(request_id, previous_status, LeaveStatus::UserCancelled)
            .await
    }

    /// Rejects a pending request. Nothing was charged, nothing moves.
    pub async fn apply_rejection(
        &self,
        request_id: RequestId,
        previous_status: LeaveStatus,
    ) -> Result<(), LedgerError> {
        self.swap_request_status(request_id, previous_status, LeaveStatus::Rejected)
            .await
    }

    /// Re-opens a cancelled or rejected request as pending.
    ///
    /// The dates are re-checked for overlap: requests filed since the
    /// original submission may now cover them.
    pub async fn reapply(
        &self,
        request_id: RequestId,
        previous_status: LeaveStatus,
    ) -> Result<(), LedgerError> {
        let request = self.request(request_id).await?;
        let existing: Vec<LeaveRequest> = self
            .store
            .requests_for_user(request.user_id)
            .await?
            .into_iter()
            .filter(|other| other.id != request_id)
            .collect();
        RequestService::validate_submission(&request.dates, &existing)?;

        self.swap_request_status(request_id, previous_status, LeaveStatus::Pending)
            .await
    }

    /// Creates and stores a new hire's ledger.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::DuplicateLedger`] when the user already
    /// has a ledger for the active fiscal year and
    /// [`LedgerError::JoinDateOutsideCalendar`] when no quarter
    /// contains the join date.
    pub async fn seed_ledger(&self, user_id: UserId, today: NaiveDate) -> Result<(), LedgerError> {
        let (calendar, registry) = self.reference().await?;
        let employee = self.employee(user_id).await?;

        let ctx = AccrualContext::new(&calendar, &registry, today);
        let ledger = AccrualService::seed_ledger(&ctx, &employee)?;
        validate_ledger(&calendar, &ledger, today)?;

        if !self.store.insert_ledger(&ledger).await? {
            return Err(LedgerError::DuplicateLedger { user_id });
        }
        self.publish(user_id, calendar.fiscal_year, ChangeReason::Seeded, None);
        Ok(())
    }

    /// Recomputes entitlements after an employee turns permanent.
    ///
    /// Stamps today as the status-change date, persists the updated
    /// snapshot, and rebuilds the ledger from the year's taken-leave
    /// history. Interns are skipped entirely.
    pub async fn recompute_on_status_change(
        &self,
        user_id: UserId,
        today: NaiveDate,
    ) -> Result<(), LedgerError> {
        let (calendar, registry) = self.reference().await?;
        let mut employee = self.employee(user_id).await?;
        if employee.position.is_intern() {
            return Ok(());
        }

        employee.status_change_date = Some(today);
        self.store.upsert_employee(&employee).await?;

        let ledger = self.ledger(user_id, calendar.fiscal_year).await?;
        let taken = self.taken_for(user_id, &calendar, &registry).await?;
        let ctx = AccrualContext::new(&calendar, &registry, today);
        let next = AccrualService::apply_status_change(&ctx, &employee, &ledger, &taken)?;

        self.commit_ledger(&next, ledger.version, &calendar, today)
            .await?;
        self.publish(
            user_id,
            calendar.fiscal_year,
            ChangeReason::StatusChange,
            None,
        );
        Ok(())
    }

    /// Walks back from `date` to the nearest working day, bounded by
    /// the configured holiday lookback.
    ///
    /// `is_non_working` decides weekends and holidays.
    pub fn last_working_day<F>(&self, date: NaiveDate, is_non_working: F) -> Result<NaiveDate, LedgerError>
    where
        F: Fn(NaiveDate) -> bool,
    {
        calendar::last_working_day(
            date,
            is_non_working,
            self.config.calendar.max_holiday_lookback_days,
        )
        .map_err(Into::into)
    }

    // --- shared plumbing, also used by the batch operations ---

    pub(crate) fn batch_concurrency(&self) -> usize {
        self.config.batch.concurrency.max(1)
    }

    pub(crate) fn store(&self) -> &S {
        &self.store
    }

    pub(crate) fn publish(
        &self,
        user_id: UserId,
        fiscal_year: FiscalYearId,
        reason: ChangeReason,
        message: Option<String>,
    ) {
        self.events.publish(LedgerChanged {
            user_id,
            fiscal_year,
            reason,
            message,
        });
    }

    pub(crate) async fn reference(
        &self,
    ) -> Result<(QuarterCalendar, LeaveTypeRegistry), LedgerError> {
        let calendar = self
            .store
            .active_calendar()
            .await?
            .ok_or(LedgerError::CalendarNotFound)?;
        let registry = self.store.leave_types().await?;
        Ok((calendar, registry))
    }

    pub(crate) async fn employee(&self, user_id: UserId) -> Result<EmployeeSnapshot, LedgerError> {
        self.store
            .employee(user_id)
            .await?
            .ok_or(LedgerError::EmployeeNotFound { user_id })
    }

    pub(crate) async fn ledger(
        &self,
        user_id: UserId,
        fiscal_year: FiscalYearId,
    ) -> Result<LeaveLedger, LedgerError> {
        self.store
            .ledger(user_id, fiscal_year)
            .await?
            .ok_or(LedgerError::LedgerNotFound { user_id })
    }

    async fn request(&self, request_id: RequestId) -> Result<LeaveRequest, LedgerError> {
        self.store
            .request(request_id)
            .await?
            .ok_or(LedgerError::RequestNotFound { request_id })
    }

    /// Aggregates the user's taken leave (approved and
    /// employee-cancelled dates) bucketed by quarter.
    pub(crate) async fn taken_for(
        &self,
        user_id: UserId,
        calendar: &QuarterCalendar,
        registry: &LeaveTypeRegistry,
    ) -> Result<TakenLeaves, LedgerError> {
        let requests = self.store.requests_for_user(user_id).await?;
        let observations = requests
            .iter()
            .filter(|request| request.status.counts_as_taken())
            .filter_map(|request| {
                registry
                    .kind_of(request.leave_type_id)
                    .map(|kind| (request, kind))
            })
            .flat_map(|(request, kind)| {
                request
                    .dates
                    .iter()
                    .map(move |leave_date| (leave_date.date, kind, leave_date.weight()))
            });
        Ok(TakenLeaves::collect(calendar, observations))
    }

    /// Validates and writes one recomputed ledger under version CAS.
    pub(crate) async fn commit_ledger(
        &self,
        next: &LeaveLedger,
        expected_version: u64,
        calendar: &QuarterCalendar,
        today: NaiveDate,
    ) -> Result<(), LedgerError> {
        validate_ledger(calendar, next, today)?;
        match self.store.update_ledger(next, expected_version).await? {
            CasResult::Applied { version } => {
                tracing::debug!(user_id = %next.user_id, version, "ledger committed");
                Ok(())
            }
            CasResult::Conflict { actual } => Err(LedgerError::VersionMismatch {
                user_id: next.user_id,
                expected: expected_version,
                actual,
            }),
            CasResult::Missing => Err(LedgerError::LedgerNotFound {
                user_id: next.user_id,
            }),
        }
    }

    async fn swap_request_status(
        &self,
        request_id: RequestId,
        expected: LeaveStatus,
        next: LeaveStatus,
    ) -> Result<(), LedgerError> {
        if !expected.can_transition_to(next) {
            return Err(LedgerError::InvalidTransition {
                from: expected,
                to: next,
            });
        }
        match self.store.swap_status(request_id, expected, next).await? {
            StatusSwap::Applied => Ok(()),
            StatusSwap::Conflict { actual } => Err(LedgerError::StatusConflict { expected, actual }),
            StatusSwap::NotFound => Err(LedgerError::RequestNotFound { request_id }),
        }
    }

    /// Compensating write after a failed ledger update. Bypasses the
    /// transition table on purpose; this undoes a half-applied
    /// operation rather than performing a domain transition.
    async fn revert_request_status(
        &self,
        request_id: RequestId,
        from: LeaveStatus,
        back_to: LeaveStatus,
    ) {
        match self.store.swap_status(request_id, from, back_to).await {
            Ok(StatusSwap::Applied) => {}
            outcome => {
                tracing::warn!(
                    request_id = %request_id,
                    ?outcome,
                    "could not revert request status after ledger write failure"
                );
            }
        }
    }

    /// Applies (or reverses) a request's ledger deltas and commits.
    ///
    /// Leave types outside the ledger pass through without touching
    /// balances.
    async fn charge_ledger(
        &self,
        request: &LeaveRequest,
        today: NaiveDate,
        invert: bool,
    ) -> Result<(), LedgerError> {
        let (calendar, registry) = self.reference().await?;
        let kind = registry.kind_of(request.leave_type_id).ok_or(
            LedgerError::LeaveTypeNotFound {
                leave_type_id: request.leave_type_id,
            },
        )?;
        if !kind.deducts_balance() {
            return Ok(());
        }

        let employee = self.employee(request.user_id).await?;
        let ledger = self.ledger(request.user_id, calendar.fiscal_year).await?;
        let ctx = AccrualContext::new(&calendar, &registry, today);
        let next = if invert {
            AccrualService::apply_cancellation(&ctx, &employee, kind, &request.dates, &ledger)?
        } else {
            AccrualService::apply_approval(&ctx, &employee, kind, &request.dates, &ledger)?
        };

        self.commit_ledger(&next, ledger.version, &calendar, today)
            .await?;
        self.publish(
            request.user_id,
            calendar.fiscal_year,
            if invert {
                ChangeReason::Cancellation
            } else {
                ChangeReason::Approval
            },
            None,
        );
        Ok(())
    }
}
