//! Batch recomputation across the active workforce.
//!
//! These operations fan one recompute out over every active employee
//! with bounded concurrency. A batch never aborts on a single bad
//! ledger: each user's failure is captured in the [`BatchReport`],
//! logged, and the rest of the workforce proceeds.

use std::future::Future;

use chrono::NaiveDate;
use furlough_core::calendar::QuarterCalendar;
use furlough_core::employment::EmployeeSnapshot;
use furlough_core::leave_type::{LeaveKind, LeaveTypeRegistry};
use furlough_core::ledger::{validate_ledger, AccrualContext, AccrualService, LedgerError};
use furlough_shared::types::{LeaveTypeId, UserId};
use furlough_shared::LeaveDays;
use futures::stream::{self, StreamExt};

use crate::events::{ChangeReason, ROLLOVER_MESSAGE};
use crate::service::LedgerEngine;
use crate::store::Store;

/// Result of one user's slice of a batch recompute.
#[derive(Debug)]
pub struct UserOutcome {
    /// Employee the outcome belongs to.
    pub user_id: UserId,
    /// What happened for this user; errors here never stopped the batch.
    pub result: Result<(), LedgerError>,
}

/// Aggregated outcome of a batch recompute.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// One entry per employee the batch touched.
    pub outcomes: Vec<UserOutcome>,
}

impl BatchReport {
    /// Number of users whose recompute succeeded.
    #[must_use]
    pub fn success_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|outcome| outcome.result.is_ok())
            .count()
    }

    /// Number of users whose recompute failed.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.outcomes.len() - self.success_count()
    }

    /// True when every user succeeded.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failure_count() == 0
    }

    /// The failed outcomes.
    pub fn failures(&self) -> impl Iterator<Item = &UserOutcome> {
        self.outcomes
            .iter()
            .filter(|outcome| outcome.result.is_err())
    }
}

impl<S: Store> LedgerEngine<S> {
    /// Seeds ledgers for a batch of new hires.
    pub async fn seed_ledgers(&self, user_ids: Vec<UserId>, today: NaiveDate) -> BatchReport {
        let jobs: Vec<_> = user_ids
            .into_iter()
            .map(|user_id| (user_id, self.seed_ledger(user_id, today)))
            .collect();
        self.run_batch("seed_ledgers", jobs).await
    }

    /// Rolls every active employee's ledger into the quarter containing
    /// `today`.
    ///
    /// Ledgers already rolled (or in a reset-disabled quarter) are left
    /// untouched, so re-running after a partial failure is safe.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::CalendarNotFound`] when no calendar is
    /// active; per-user failures land in the report instead.
    pub async fn recompute_on_rollover(
        &self,
        today: NaiveDate,
    ) -> Result<BatchReport, LedgerError> {
        let (calendar, registry) = self.reference().await?;
        let employees = self.store().active_employees().await?;
        let jobs: Vec<_> = employees
            .into_iter()
            .map(|employee| {
                (
                    employee.id,
                    self.rollover_user(employee, &calendar, &registry, today),
                )
            })
            .collect();
        Ok(self.run_batch("quarter_rollover", jobs).await)
    }

    /// Opens the new fiscal year: seeds a fresh ledger for every active
    /// employee who does not already have one, pre-charging quarters
    /// from leave already booked into the new year.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::CalendarNotFound`] when no calendar is
    /// active; per-user failures land in the report instead.
    pub async fn recompute_on_fiscal_year(
        &self,
        today: NaiveDate,
    ) -> Result<BatchReport, LedgerError> {
        let (calendar, registry) = self.reference().await?;
        let employees = self.store().active_employees().await?;
        let jobs: Vec<_> = employees
            .into_iter()
            .map(|employee| {
                (
                    employee.id,
                    self.fiscal_seed_user(employee, &calendar, &registry, today),
                )
            })
            .collect();
        Ok(self.run_batch("fiscal_year_reset", jobs).await)
    }

    /// Propagates an edited annual entitlement to every ledger.
    ///
    /// `old_days` and `new_days` are the entitlement before and after
    /// the edit; only the difference is applied, so balances already
    /// spent are preserved. Employees without a ledger this year are
    /// skipped.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::LeaveTypeNotFound`] for an unknown type
    /// and [`LedgerError::NotALedgerLeaveType`] when the type is
    /// neither sick nor casual.
    pub async fn recompute_on_entitlement_edit(
        &self,
        leave_type_id: LeaveTypeId,
        old_days: LeaveDays,
        new_days: LeaveDays,
        today: NaiveDate,
    ) -> Result<BatchReport, LedgerError> {
        let (calendar, registry) = self.reference().await?;
        let snapshot = registry
            .get(leave_type_id)
            .ok_or(LedgerError::LeaveTypeNotFound { leave_type_id })?;
        let kind = snapshot.kind();
        if !kind.deducts_balance() {
            return Err(LedgerError::NotALedgerLeaveType {
                name: snapshot.name.clone(),
            });
        }

        let delta = new_days - old_days;
        if delta.is_zero() {
            return Ok(BatchReport::default());
        }

        let employees = self.store().active_employees().await?;
        let jobs: Vec<_> = employees
            .into_iter()
            .map(|employee| {
                (
                    employee.id,
                    self.entitlement_user(employee, &calendar, &registry, kind, delta, today),
                )
            })
            .collect();
        Ok(self.run_batch("entitlement_edit", jobs).await)
    }

    /// Installs an edited quarter calendar and realigns every ledger's
    /// entries to it.
    ///
    /// Entries for surviving quarters keep their balances, new quarters
    /// start zeroed, and entries for removed quarters are dropped. The
    /// calendar is installed first so concurrent reads see the new
    /// structure while ledgers migrate.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Store`] when the calendar cannot be
    /// installed; per-user failures land in the report instead.
    pub async fn on_quarter_structure_edit(
        &self,
        new_calendar: QuarterCalendar,
        today: NaiveDate,
    ) -> Result<BatchReport, LedgerError> {
        let previous = self.store().active_calendar().await?;
        self.store().set_active_calendar(&new_calendar).await?;
        match &previous {
            Some(previous) => {
                let diff = QuarterCalendar::diff(previous, &new_calendar);
                tracing::info!(
                    fiscal_year = %new_calendar.fiscal_year,
                    added = diff.added.len(),
                    removed = diff.removed.len(),
                    "quarter calendar replaced"
                );
            }
            None => {
                tracing::info!(
                    fiscal_year = %new_calendar.fiscal_year,
                    quarters = new_calendar.quarters().len(),
                    "quarter calendar installed"
                );
            }
        }

        let employees = self.store().active_employees().await?;
        let jobs: Vec<_> = employees
            .into_iter()
            .map(|employee| (employee.id, self.structure_user(employee, &new_calendar, today)))
            .collect();
        Ok(self.run_batch("quarter_structure_edit", jobs).await)
    }

    // --- per-user batch steps ---

    async fn rollover_user(
        &self,
        employee: EmployeeSnapshot,
        calendar: &QuarterCalendar,
        registry: &LeaveTypeRegistry,
        today: NaiveDate,
    ) -> Result<(), LedgerError> {
        let ledger = self.ledger(employee.id, calendar.fiscal_year).await?;
        let ctx = AccrualContext::new(calendar, registry, today);
        let outcome = AccrualService::apply_quarter_rollover(&ctx, &employee, &ledger)?;
        if !outcome.rolled {
            return Ok(());
        }

        self.commit_ledger(&outcome.ledger, ledger.version, calendar, today)
            .await?;
        let message = outcome.notify.then(|| ROLLOVER_MESSAGE.to_owned());
        self.publish(
            employee.id,
            calendar.fiscal_year,
            ChangeReason::QuarterRollover,
            message,
        );
        Ok(())
    }

    async fn fiscal_seed_user(
        &self,
        employee: EmployeeSnapshot,
        calendar: &QuarterCalendar,
        registry: &LeaveTypeRegistry,
        today: NaiveDate,
    ) -> Result<(), LedgerError> {
        if self
            .store()
            .ledger(employee.id, calendar.fiscal_year)
            .await?
            .is_some()
        {
            return Ok(());
        }

        let taken = self.taken_for(employee.id, calendar, registry).await?;
        let ctx = AccrualContext::new(calendar, registry, today);
        let ledger = AccrualService::seed_fiscal_year(&ctx, &employee, &taken);
        validate_ledger(calendar, &ledger, today)?;

        // A concurrent seeding of the same user is not an error.
        if self.store().insert_ledger(&ledger).await? {
            self.publish(
                employee.id,
                calendar.fiscal_year,
                ChangeReason::FiscalYearReset,
                None,
            );
        }
        Ok(())
    }

    async fn entitlement_user(
        &self,
        employee: EmployeeSnapshot,
        calendar: &QuarterCalendar,
        registry: &LeaveTypeRegistry,
        kind: LeaveKind,
        delta: LeaveDays,
        today: NaiveDate,
    ) -> Result<(), LedgerError> {
        let Some(ledger) = self
            .store()
            .ledger(employee.id, calendar.fiscal_year)
            .await?
        else {
            return Ok(());
        };

        let ctx = AccrualContext::new(calendar, registry, today);
        let next = AccrualService::apply_entitlement_delta(&ctx, &employee, &ledger, kind, delta)?;
        if next == ledger {
            return Ok(());
        }

        self.commit_ledger(&next, ledger.version, calendar, today)
            .await?;
        self.publish(
            employee.id,
            calendar.fiscal_year,
            ChangeReason::EntitlementEdit,
            None,
        );
        Ok(())
    }

    async fn structure_user(
        &self,
        employee: EmployeeSnapshot,
        calendar: &QuarterCalendar,
        today: NaiveDate,
    ) -> Result<(), LedgerError> {
        let Some(ledger) = self
            .store()
            .ledger(employee.id, calendar.fiscal_year)
            .await?
        else {
            return Ok(());
        };

        let next = AccrualService::apply_structure_edit(calendar, &ledger);
        if next == ledger {
            return Ok(());
        }

        self.commit_ledger(&next, ledger.version, calendar, today)
            .await?;
        self.publish(
            employee.id,
            calendar.fiscal_year,
            ChangeReason::StructureEdit,
            None,
        );
        Ok(())
    }

    /// Drives per-user jobs with bounded concurrency and collects one
    /// outcome per user.
    async fn run_batch<Fut>(&self, operation: &'static str, jobs: Vec<(UserId, Fut)>) -> BatchReport
    where
        Fut: Future<Output = Result<(), LedgerError>>,
    {
        let total = jobs.len();
        let outcomes: Vec<UserOutcome> = stream::iter(jobs)
            .map(|(user_id, job)| async move {
                UserOutcome {
                    user_id,
                    result: job.await,
                }
            })
            .buffer_unordered(self.batch_concurrency())
            .collect()
            .await;

        let report = BatchReport { outcomes };
        for outcome in report.failures() {
            if let Err(err) = &outcome.result {
                tracing::warn!(
                    operation,
                    user_id = %outcome.user_id,
                    error = %err,
                    "batch step failed; user skipped"
                );
            }
        }
        tracing::info!(
            operation,
            total,
            succeeded = report.success_count(),
            failed = report.failure_count(),
            "batch recompute finished"
        );
        report
    }
}
