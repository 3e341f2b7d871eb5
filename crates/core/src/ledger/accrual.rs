//! Accrual algorithms.
//!
//! Every function here is a pure transform: it reads a ledger, returns
//! a recomputed copy, and never talks to storage. Callers persist the
//! result under their own concurrency control and discard it on error,
//! so a failed transform can never leave a half-written ledger behind.

use chrono::NaiveDate;
use furlough_shared::types::LedgerId;
use furlough_shared::LeaveDays;

use crate::calendar::{months_between, QuarterCalendar};
use crate::employment::EmployeeSnapshot;
use crate::leave_type::{LeaveKind, LeaveTypeRegistry};
use crate::ledger::error::LedgerError;
use crate::ledger::types::{LeaveLedger, QuarterEntry, TakenLeaves};
use crate::request::types::LeaveDate;

/// Immutable inputs shared by every accrual computation.
///
/// Snapshots are taken once per operation so a recomputation sees one
/// consistent calendar and entitlement table throughout.
#[derive(Debug, Clone, Copy)]
pub struct AccrualContext<'a> {
    /// Quarter calendar for the fiscal year being mutated.
    pub calendar: &'a QuarterCalendar,
    /// Leave type entitlements.
    pub leave_types: &'a LeaveTypeRegistry,
    /// Date the operation runs on.
    pub today: NaiveDate,
}

impl<'a> AccrualContext<'a> {
    /// Bundles the snapshots for one operation.
    #[must_use]
    pub fn new(
        calendar: &'a QuarterCalendar,
        leave_types: &'a LeaveTypeRegistry,
        today: NaiveDate,
    ) -> Self {
        Self {
            calendar,
            leave_types,
            today,
        }
    }
}

/// Result of a quarterly rollover for one employee.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RolloverOutcome {
    /// Recomputed ledger.
    pub ledger: LeaveLedger,
    /// Whether the rollover changed anything.
    pub rolled: bool,
    /// Whether the employee should be told their balance moved.
    /// Always false for employees on probation.
    pub notify: bool,
}

/// Stateless accrual rules.
pub struct AccrualService;

impl AccrualService {
    /// Seeds a new hire's ledger for the fiscal year containing their
    /// join date.
    ///
    /// The join quarter is prorated by whole months remaining between
    /// the join date and the quarter's end; every other quarter gets
    /// its own base allocation. Annual pools start at the full
    /// configured entitlement.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::JoinDateOutsideCalendar`] when no quarter
    /// contains the join date.
    pub fn seed_ledger(
        ctx: &AccrualContext<'_>,
        employee: &EmployeeSnapshot,
    ) -> Result<LeaveLedger, LedgerError> {
        let join_quarter = ctx.calendar.current_quarter(employee.join_date).ok_or(
            LedgerError::JoinDateOutsideCalendar {
                join_date: employee.join_date,
            },
        )?;
        let join_quarter_id = join_quarter.id;

        let entries = ctx
            .calendar
            .quarters()
            .iter()
            .map(|quarter| {
                let allocated = if quarter.id == join_quarter_id {
                    LeaveDays::from_months(months_between(quarter.to_date, employee.join_date))
                } else {
                    quarter.base_allocation
                };
                QuarterEntry::seeded(quarter.id, allocated)
            })
            .collect();

        Ok(LeaveLedger {
            id: LedgerId::new(),
            user_id: employee.id,
            fiscal_year: ctx.calendar.fiscal_year,
            remaining_sick: ctx.leave_types.sick_annual_days(),
            remaining_casual: ctx.leave_types.casual_annual_days(),
            entries,
            version: 0,
        })
    }

    /// Seeds a ledger at fiscal-year reset for an employee who already
    /// has leave history in the new year.
    ///
    /// `taken` must aggregate the employee's approved and
    /// employee-cancelled leave dates falling inside the new calendar.
    /// Pools start at the annual entitlement minus days taken; each
    /// quarter entry is pre-charged with the days already falling in
    /// it.
    #[must_use]
    pub fn seed_fiscal_year(
        ctx: &AccrualContext<'_>,
        employee: &EmployeeSnapshot,
        taken: &TakenLeaves,
    ) -> LeaveLedger {
        let months_in_first = LeaveDays::from_months(ctx.calendar.first_quarter().span_months());

        let entries = ctx
            .calendar
            .quarters()
            .iter()
            .map(|quarter| {
                let allocated = if employee.position.is_probation() {
                    months_in_first
                } else {
                    quarter.base_allocation
                };
                let approved = taken.for_quarter(quarter.id);
                QuarterEntry {
                    quarter_id: quarter.id,
                    allocated,
                    remaining: allocated - approved.total(),
                    carried_over: LeaveDays::ZERO,
                    approved,
                }
            })
            .collect();

        LeaveLedger {
            id: LedgerId::new(),
            user_id: employee.id,
            fiscal_year: ctx.calendar.fiscal_year,
            remaining_sick: ctx.leave_types.sick_annual_days() - taken.total_sick(),
            remaining_casual: ctx.leave_types.casual_annual_days() - taken.total_casual(),
            entries,
            version: 0,
        }
    }

    /// Rolls the ledger into the quarter containing `ctx.today`.
    ///
    /// Unused positive balance from the previous quarter is carried
    /// forward for everyone but interns. Interns are re-granted by
    /// month count, probationers keep month-counted allocations, and
    /// everyone else gets the quarter's base allocation. Running the
    /// rollover twice in the same quarter is a no-op the second time.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::DateOutsideQuarters`] when today falls in
    /// no quarter, and [`LedgerError::QuarterEntryMissing`] when the
    /// ledger lacks an entry the calendar defines.
    pub fn apply_quarter_rollover(
        ctx: &AccrualContext<'_>,
        employee: &EmployeeSnapshot,
        ledger: &LeaveLedger,
    ) -> Result<RolloverOutcome, LedgerError> {
        let current = ctx
            .calendar
            .current_quarter(ctx.today)
            .ok_or(LedgerError::DateOutsideQuarters { date: ctx.today })?;

        if current.reset_disabled {
            return Ok(RolloverOutcome {
                ledger: ledger.clone(),
                rolled: false,
                notify: false,
            });
        }

        let months_in_quarter = LeaveDays::from_months(current.span_months());

        let carried = match ctx.calendar.previous_quarter(current.id) {
            Some(previous) if employee.position.carries_over() => {
                let previous_entry =
                    ledger
                        .entry(previous.id)
                        .ok_or(LedgerError::QuarterEntryMissing {
                            quarter_id: previous.id,
                        })?;
                if previous_entry.remaining.is_positive() {
                    previous_entry.remaining + previous_entry.carried_over
                } else {
                    LeaveDays::ZERO
                }
            }
            _ => LeaveDays::ZERO,
        };

        let grant = if carried.is_positive() {
            if employee.position.is_probation() {
                months_in_quarter
            } else {
                current.base_allocation
            }
        } else if employee.position.is_intern() {
            months_in_quarter
        } else {
            current.base_allocation
        };

        let mut next = ledger.clone();
        let entry = next
            .entry_mut(current.id)
            .ok_or(LedgerError::QuarterEntryMissing {
                quarter_id: current.id,
            })?;
        entry.remaining = carried + grant - entry.approved.total();
        entry.carried_over = carried;
        if employee.position.is_probation() {
            entry.allocated = months_in_quarter;
        }

        let rolled = next != *ledger;
        let notify = rolled && !employee.position.is_probation();
        Ok(RolloverOutcome {
            ledger: next,
            rolled,
            notify,
        })
    }

    /// Recomputes a ledger when an employee turns permanent.
    ///
    /// The employee's entitlement for the rest of the year is capped by
    /// the months they will actually serve; sick entitlement is
    /// forfeited first and casual absorbs any overflow. The current
    /// quarter entry is re-prorated from the join date when it falls in
    /// this quarter, otherwise from today, with days already taken this
    /// quarter added back as approved. Future quarters are reset to
    /// their base allocation. Interns are left untouched.
    ///
    /// `employee` is the post-change snapshot; `ctx.today` is the
    /// status-change date. `taken` must aggregate approved and
    /// employee-cancelled dates across the whole fiscal year.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::DateOutsideQuarters`] when today falls in
    /// no quarter, and [`LedgerError::QuarterEntryMissing`] when the
    /// ledger lacks the current quarter's entry.
    pub fn apply_status_change(
        ctx: &AccrualContext<'_>,
        employee: &EmployeeSnapshot,
        ledger: &LeaveLedger,
        taken: &TakenLeaves,
    ) -> Result<LeaveLedger, LedgerError> {
        if employee.position.is_intern() {
            return Ok(ledger.clone());
        }

        let current = ctx
            .calendar
            .current_quarter(ctx.today)
            .ok_or(LedgerError::DateOutsideQuarters { date: ctx.today })?;

        let sick_annual = ctx.leave_types.sick_annual_days();
        let casual_annual = ctx.leave_types.casual_annual_days();
        let total_entitlement = sick_annual + casual_annual;

        let future_base: LeaveDays = ctx
            .calendar
            .future_quarters(ctx.today)
            .iter()
            .map(|quarter| quarter.base_allocation)
            .sum();
        let year_allocated =
            LeaveDays::from_months(months_between(current.to_date, ctx.today)) + future_base;
        let leave_not_entitled = (total_entitlement - year_allocated).max_zero();

        // Current-quarter reproration, anchored to the join date when
        // the employee joined inside this quarter.
        let quarter_taken = taken.for_quarter(current.id);
        let taken_this_quarter = quarter_taken.total();
        let anchor = if current.contains_date(employee.join_date) {
            employee.join_date
        } else {
            ctx.today
        };
        let new_allocated = LeaveDays::from_months(months_between(current.to_date, anchor));

        let mut next = ledger.clone();
        let old = next
            .entry(current.id)
            .copied()
            .ok_or(LedgerError::QuarterEntryMissing {
                quarter_id: current.id,
            })?;

        let carried = if old.remaining.is_positive() {
            (old.remaining + taken_this_quarter - old.allocated
                + LeaveDays::from_months(months_between(ctx.today, anchor)))
            .max_zero()
        } else {
            LeaveDays::ZERO
        };

        // Sick forfeits first; casual absorbs whatever the sick pool
        // could not cover. Carry-over lands in the casual pool.
        let sick_reduction = if leave_not_entitled > sick_annual {
            sick_annual
        } else {
            leave_not_entitled
        };
        let casual_overflow = (leave_not_entitled - sick_annual).max_zero();
        next.remaining_sick = sick_annual - sick_reduction - taken.total_sick();
        next.remaining_casual = casual_annual - casual_overflow - taken.total_casual() + carried;

        if let Some(entry) = next.entry_mut(current.id) {
            entry.allocated = new_allocated;
            entry.carried_over = carried;
            entry.remaining = new_allocated + carried - taken_this_quarter;
            entry.approved = quarter_taken;
        }

        for quarter in ctx.calendar.future_quarters(ctx.today) {
            if let Some(entry) = next.entry_mut(quarter.id) {
                entry.allocated = quarter.base_allocation;
                entry.remaining = quarter.base_allocation;
            }
        }

        Ok(next)
    }

    /// Applies an admin edit of a leave type's annual entitlement.
    ///
    /// `delta` is new minus old annual days. Only permanent employees
    /// are affected: the matching annual pool and the current quarter's
    /// remaining balance both move by `delta`, which may push them
    /// negative when entitlement shrinks retroactively.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::NotALedgerLeaveType`] for leave kinds the
    /// ledger does not track and [`LedgerError::DateOutsideQuarters`]
    /// when today falls in no quarter.
    pub fn apply_entitlement_delta(
        ctx: &AccrualContext<'_>,
        employee: &EmployeeSnapshot,
        ledger: &LeaveLedger,
        kind: LeaveKind,
        delta: LeaveDays,
    ) -> Result<LeaveLedger, LedgerError> {
        if !kind.deducts_balance() {
            return Err(LedgerError::NotALedgerLeaveType {
                name: kind.to_string(),
            });
        }
        if !employee.position.is_permanent() {
            return Ok(ledger.clone());
        }

        let current = ctx
            .calendar
            .current_quarter(ctx.today)
            .ok_or(LedgerError::DateOutsideQuarters { date: ctx.today })?;

        let mut next = ledger.clone();
        if let Some(pool) = next.pool_mut(kind) {
            *pool += delta;
        }
        let entry = next
            .entry_mut(current.id)
            .ok_or(LedgerError::QuarterEntryMissing {
                quarter_id: current.id,
            })?;
        entry.remaining += delta;
        Ok(next)
    }

    /// Re-shapes a ledger after the quarter calendar is edited.
    ///
    /// Entries are rebuilt in the new calendar's order: quarters the
    /// ledger already tracks keep their values, added quarters get a
    /// zero entry, removed quarters drop theirs.
    #[must_use]
    pub fn apply_structure_edit(calendar: &QuarterCalendar, ledger: &LeaveLedger) -> LeaveLedger {
        let mut next = ledger.clone();
        next.entries = calendar
            .quarters()
            .iter()
            .map(|quarter| {
                ledger
                    .entry(quarter.id)
                    .copied()
                    .unwrap_or_else(|| QuarterEntry::zeroed(quarter.id))
            })
            .collect();
        next
    }

    /// Charges an approved request to the ledger.
    ///
    /// Each date deducts its weight from the containing quarter's
    /// remaining balance and records it as approved, skipping dates
    /// before the employee's status-change date. Annual pools move only
    /// for permanent employees.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::NotALedgerLeaveType`] for kinds the
    /// ledger does not track, [`LedgerError::EmptyLeaveDates`] for an
    /// empty date list, and [`LedgerError::DateOutsideQuarters`] when
    /// any date falls in no quarter; nothing is applied on error.
    pub fn apply_approval(
        ctx: &AccrualContext<'_>,
        employee: &EmployeeSnapshot,
        kind: LeaveKind,
        dates: &[LeaveDate],
        ledger: &LeaveLedger,
    ) -> Result<LeaveLedger, LedgerError> {
        Self::apply_spend(ctx, employee, kind, dates, ledger, false)
    }

    /// Reverses a previously applied approval, the exact numeric
    /// inverse of [`AccrualService::apply_approval`].
    ///
    /// # Errors
    ///
    /// Same failure modes as [`AccrualService::apply_approval`].
    pub fn apply_cancellation(
        ctx: &AccrualContext<'_>,
        employee: &EmployeeSnapshot,
        kind: LeaveKind,
        dates: &[LeaveDate],
        ledger: &LeaveLedger,
    ) -> Result<LeaveLedger, LedgerError> {
        Self::apply_spend(ctx, employee, kind, dates, ledger, true)
    }

    fn apply_spend(
        ctx: &AccrualContext<'_>,
        employee: &EmployeeSnapshot,
        kind: LeaveKind,
        dates: &[LeaveDate],
        ledger: &LeaveLedger,
        invert: bool,
    ) -> Result<LeaveLedger, LedgerError> {
        if !kind.deducts_balance() {
            return Err(LedgerError::NotALedgerLeaveType {
                name: kind.to_string(),
            });
        }
        if dates.is_empty() {
            return Err(LedgerError::EmptyLeaveDates);
        }

        let mut next = ledger.clone();
        for leave_date in dates {
            let quarter = ctx
                .calendar
                .current_quarter(leave_date.date)
                .ok_or(LedgerError::DateOutsideQuarters {
                    date: leave_date.date,
                })?;
            if !employee.date_counts(leave_date.date) {
                continue;
            }

            let weight = leave_date.weight();
            let entry = next
                .entry_mut(quarter.id)
                .ok_or(LedgerError::QuarterEntryMissing {
                    quarter_id: quarter.id,
                })?;
            if invert {
                entry.remaining += weight;
                entry.approved.release(kind, weight);
            } else {
                entry.remaining -= weight;
                entry.approved.record(kind, weight);
            }

            if employee.counts_toward_pools(leave_date.date) {
                if let Some(pool) = next.pool_mut(kind) {
                    if invert {
                        *pool += weight;
                    } else {
                        *pool -= weight;
                    }
                }
            }
        }
        Ok(next)
    }
}
