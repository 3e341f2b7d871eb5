//! Ledger data types.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use furlough_shared::types::{FiscalYearId, LedgerId, QuarterId, UserId};
use furlough_shared::LeaveDays;
use serde::{Deserialize, Serialize};

use crate::calendar::QuarterCalendar;
use crate::leave_type::LeaveKind;

/// Approved leave days for one quarter, split by ledger-tracked kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ApprovedLeaves {
    /// Approved sick leave days.
    pub sick: LeaveDays,
    /// Approved casual leave days.
    pub casual: LeaveDays,
}

impl ApprovedLeaves {
    /// No approved leaves.
    pub const ZERO: Self = Self {
        sick: LeaveDays::ZERO,
        casual: LeaveDays::ZERO,
    };

    /// Sum of both kinds.
    #[must_use]
    pub fn total(&self) -> LeaveDays {
        self.sick + self.casual
    }

    /// True when both counters are exactly zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.sick.is_zero() && self.casual.is_zero()
    }

    /// Adds `weight` to the counter for `kind`.
    ///
    /// Kinds that do not deduct from the ledger are ignored; callers
    /// reject those before recording.
    pub fn record(&mut self, kind: LeaveKind, weight: LeaveDays) {
        match kind {
            LeaveKind::Sick => self.sick += weight,
            LeaveKind::Casual => self.casual += weight,
            LeaveKind::Other => {}
        }
    }

    /// Removes `weight` from the counter for `kind`.
    pub fn release(&mut self, kind: LeaveKind, weight: LeaveDays) {
        match kind {
            LeaveKind::Sick => self.sick -= weight,
            LeaveKind::Casual => self.casual -= weight,
            LeaveKind::Other => {}
        }
    }
}

/// Balance record for a single quarter of the fiscal year.
///
/// Entries mirror the quarter calendar one-to-one and in order; the
/// validator enforces that correspondence after every mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuarterEntry {
    /// Calendar quarter this entry belongs to.
    pub quarter_id: QuarterId,
    /// Days granted for the quarter.
    pub allocated: LeaveDays,
    /// Days still available. May go negative under spend-ahead.
    pub remaining: LeaveDays,
    /// Days carried forward from the previous quarter.
    pub carried_over: LeaveDays,
    /// Approved days charged against this quarter.
    pub approved: ApprovedLeaves,
}

impl QuarterEntry {
    /// Fresh entry with `allocated` granted and nothing spent.
    #[must_use]
    pub fn seeded(quarter_id: QuarterId, allocated: LeaveDays) -> Self {
        Self {
            quarter_id,
            allocated,
            remaining: allocated,
            carried_over: LeaveDays::ZERO,
            approved: ApprovedLeaves::ZERO,
        }
    }

    /// All-zero entry, used when a quarter is added to the calendar
    /// after the ledger was created.
    #[must_use]
    pub fn zeroed(quarter_id: QuarterId) -> Self {
        Self::seeded(quarter_id, LeaveDays::ZERO)
    }

    /// True when nothing has been charged to or carried into this
    /// entry yet.
    #[must_use]
    pub fn is_untouched(&self) -> bool {
        self.approved.is_zero() && self.carried_over.is_zero()
    }
}

/// Per-user, per-fiscal-year leave balance record.
///
/// The annual pools track sick and casual balances across the whole
/// year; the quarter entries track the quarterly grants. The two views
/// move together on approval and cancellation but are recomputed by
/// different algorithms, so neither is derivable from the other.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveLedger {
    /// Ledger id.
    pub id: LedgerId,
    /// Owning employee.
    pub user_id: UserId,
    /// Fiscal year this ledger covers.
    pub fiscal_year: FiscalYearId,
    /// Annual sick pool. May go negative.
    pub remaining_sick: LeaveDays,
    /// Annual casual pool. May go negative.
    pub remaining_casual: LeaveDays,
    /// One entry per calendar quarter, in calendar order.
    pub entries: Vec<QuarterEntry>,
    /// Optimistic concurrency token, bumped by the store on every
    /// successful write.
    pub version: u64,
}

impl LeaveLedger {
    /// Entry for `quarter_id`, if the ledger tracks that quarter.
    #[must_use]
    pub fn entry(&self, quarter_id: QuarterId) -> Option<&QuarterEntry> {
        self.entries.iter().find(|e| e.quarter_id == quarter_id)
    }

    /// Mutable entry for `quarter_id`.
    pub fn entry_mut(&mut self, quarter_id: QuarterId) -> Option<&mut QuarterEntry> {
        self.entries.iter_mut().find(|e| e.quarter_id == quarter_id)
    }

    /// Annual pool for `kind`. `None` for kinds the ledger does not
    /// track.
    #[must_use]
    pub fn pool(&self, kind: LeaveKind) -> Option<LeaveDays> {
        match kind {
            LeaveKind::Sick => Some(self.remaining_sick),
            LeaveKind::Casual => Some(self.remaining_casual),
            LeaveKind::Other => None,
        }
    }

    /// Mutable annual pool for `kind`.
    pub fn pool_mut(&mut self, kind: LeaveKind) -> Option<&mut LeaveDays> {
        match kind {
            LeaveKind::Sick => Some(&mut self.remaining_sick),
            LeaveKind::Casual => Some(&mut self.remaining_casual),
            LeaveKind::Other => None,
        }
    }

    /// Total approved days across all quarters.
    #[must_use]
    pub fn total_approved(&self) -> ApprovedLeaves {
        let mut total = ApprovedLeaves::ZERO;
        for entry in &self.entries {
            total.sick += entry.approved.sick;
            total.casual += entry.approved.casual;
        }
        total
    }
}

/// Leave already taken this fiscal year, bucketed per quarter.
///
/// Built from approved and employee-cancelled requests when a ledger
/// has to be rebuilt from history (fiscal-year reset, status change).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TakenLeaves {
    by_quarter: BTreeMap<QuarterId, ApprovedLeaves>,
}

impl TakenLeaves {
    /// Empty aggregation.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Buckets `observations` of (leave date, kind, day weight) by the
    /// quarter containing each date.
    ///
    /// Dates outside every calendar quarter and kinds the ledger does
    /// not track are skipped.
    #[must_use]
    pub fn collect<I>(calendar: &QuarterCalendar, observations: I) -> Self
    where
        I: IntoIterator<Item = (NaiveDate, LeaveKind, LeaveDays)>,
    {
        let mut taken = Self::new();
        for (date, kind, weight) in observations {
            if let Some(quarter) = calendar.current_quarter(date) {
                taken.record(quarter.id, kind, weight);
            }
        }
        taken
    }

    /// Adds `weight` of `kind` to the bucket for `quarter_id`.
    pub fn record(&mut self, quarter_id: QuarterId, kind: LeaveKind, weight: LeaveDays) {
        if kind.deducts_balance() {
            self.by_quarter
                .entry(quarter_id)
                .or_default()
                .record(kind, weight);
        }
    }

    /// Taken leaves charged to `quarter_id`.
    #[must_use]
    pub fn for_quarter(&self, quarter_id: QuarterId) -> ApprovedLeaves {
        self.by_quarter
            .get(&quarter_id)
            .copied()
            .unwrap_or(ApprovedLeaves::ZERO)
    }

    /// Sick days taken across the year.
    #[must_use]
    pub fn total_sick(&self) -> LeaveDays {
        self.by_quarter.values().map(|a| a.sick).sum()
    }

    /// Casual days taken across the year.
    #[must_use]
    pub fn total_casual(&self) -> LeaveDays {
        self.by_quarter.values().map(|a| a.casual).sum()
    }
}
