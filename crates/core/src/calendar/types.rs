//! Quarter and calendar snapshot types.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use furlough_shared::types::{FiscalYearId, QuarterId};
use furlough_shared::LeaveDays;

use super::proration::months_between;

/// Errors raised while building or querying a quarter calendar.
#[derive(Debug, Error)]
pub enum CalendarError {
    /// A calendar must define at least one quarter.
    #[error("Calendar must define at least one quarter")]
    EmptyCalendar,

    /// A quarter's start date is after its end date.
    #[error("Quarter {name} has an invalid date range: {from} > {to}")]
    InvalidQuarterRange {
        /// The quarter name.
        name: String,
        /// The quarter start date.
        from: NaiveDate,
        /// The quarter end date.
        to: NaiveDate,
    },

    /// Two quarters overlap or are out of order.
    #[error("Quarter {next} starts on or before the end of quarter {previous}")]
    OverlappingQuarters {
        /// The earlier quarter name.
        previous: String,
        /// The later quarter name.
        next: String,
    },

    /// No working day was found within the backward lookback window.
    #[error("No working day within {lookback} days before {from}")]
    NoWorkingDay {
        /// The date the walk started from.
        from: NaiveDate,
        /// The lookback window that was exhausted.
        lookback: u32,
    },
}

/// A contiguous sub-period of a fiscal year with its own base entitlement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quarter {
    /// Unique quarter identifier.
    pub id: QuarterId,
    /// Display name, e.g. "Q1".
    pub name: String,
    /// First day of the quarter (inclusive).
    pub from_date: NaiveDate,
    /// Last day of the quarter (inclusive).
    pub to_date: NaiveDate,
    /// Base leave entitlement granted for the quarter, in days.
    pub base_allocation: LeaveDays,
    /// When set, the quarterly rollover skips runs landing in this quarter.
    pub reset_disabled: bool,
}

impl Quarter {
    /// Returns true if the date falls within this quarter (inclusive).
    #[must_use]
    pub fn contains_date(&self, date: NaiveDate) -> bool {
        date >= self.from_date && date <= self.to_date
    }

    /// Whole-month span of the quarter, the proration unit used for
    /// intern and probation allocations.
    #[must_use]
    pub fn span_months(&self) -> i32 {
        months_between(self.to_date, self.from_date)
    }

    /// Returns true if the quarter starts strictly after the given date.
    #[must_use]
    pub fn is_future(&self, today: NaiveDate) -> bool {
        self.from_date > today
    }
}

/// Immutable snapshot of a fiscal year's ordered quarters.
///
/// Construction validates ordering and non-overlap. Gaps between quarters
/// are tolerated here; a date falling into a gap resolves no quarter and
/// is rejected at the point of use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuarterCalendar {
    /// The fiscal year these quarters belong to.
    pub fiscal_year: FiscalYearId,
    /// Display label, e.g. "FY 2026".
    pub label: String,
    quarters: Vec<Quarter>,
}

impl QuarterCalendar {
    /// Builds a calendar from ordered quarters.
    ///
    /// # Errors
    ///
    /// Returns an error if the list is empty, a quarter's range is
    /// inverted, or any two quarters overlap / are out of order.
    pub fn new(
        fiscal_year: FiscalYearId,
        label: impl Into<String>,
        quarters: Vec<Quarter>,
    ) -> Result<Self, CalendarError> {
        if quarters.is_empty() {
            return Err(CalendarError::EmptyCalendar);
        }
        for quarter in &quarters {
            if quarter.from_date > quarter.to_date {
                return Err(CalendarError::InvalidQuarterRange {
                    name: quarter.name.clone(),
                    from: quarter.from_date,
                    to: quarter.to_date,
                });
            }
        }
        for pair in quarters.windows(2) {
            if pair[1].from_date <= pair[0].to_date {
                return Err(CalendarError::OverlappingQuarters {
                    previous: pair[0].name.clone(),
                    next: pair[1].name.clone(),
                });
            }
        }
        Ok(Self {
            fiscal_year,
            label: label.into(),
            quarters,
        })
    }

    /// The ordered quarters of the fiscal year.
    #[must_use]
    pub fn quarters(&self) -> &[Quarter] {
        &self.quarters
    }

    /// The first quarter of the fiscal year.
    #[must_use]
    pub fn first_quarter(&self) -> &Quarter {
        &self.quarters[0]
    }

    /// The quarter whose `[from_date, to_date]` contains the date, if any.
    #[must_use]
    pub fn current_quarter(&self, date: NaiveDate) -> Option<&Quarter> {
        self.quarters.iter().find(|q| q.contains_date(date))
    }

    /// Quarters starting strictly after the given date, in order.
    #[must_use]
    pub fn future_quarters(&self, date: NaiveDate) -> Vec<&Quarter> {
        self.quarters.iter().filter(|q| q.is_future(date)).collect()
    }

    /// Looks up a quarter by id.
    #[must_use]
    pub fn quarter(&self, id: QuarterId) -> Option<&Quarter> {
        self.quarters.iter().find(|q| q.id == id)
    }

    /// The quarter immediately preceding the given one in calendar order.
    #[must_use]
    pub fn previous_quarter(&self, id: QuarterId) -> Option<&Quarter> {
        let index = self.quarters.iter().position(|q| q.id == id)?;
        index.checked_sub(1).map(|i| &self.quarters[i])
    }

    /// First day of the fiscal year.
    #[must_use]
    pub fn starts_on(&self) -> NaiveDate {
        self.quarters[0].from_date
    }

    /// Last day of the fiscal year.
    #[must_use]
    pub fn ends_on(&self) -> NaiveDate {
        self.quarters[self.quarters.len() - 1].to_date
    }

    /// Structural difference between two calendar snapshots, keyed by
    /// quarter id. Drives the propagation of calendar edits to ledgers.
    #[must_use]
    pub fn diff(old: &Self, new: &Self) -> CalendarDiff {
        let added = new
            .quarters
            .iter()
            .filter(|q| old.quarter(q.id).is_none())
            .cloned()
            .collect();
        let removed = old
            .quarters
            .iter()
            .filter(|q| new.quarter(q.id).is_none())
            .map(|q| q.id)
            .collect();
        CalendarDiff { added, removed }
    }
}

/// Quarters added and removed between two calendar snapshots.
#[derive(Debug, Clone, PartialEq)]
pub struct CalendarDiff {
    /// Quarters present in the new snapshot only.
    pub added: Vec<Quarter>,
    /// Ids of quarters present in the old snapshot only.
    pub removed: Vec<QuarterId>,
}

impl CalendarDiff {
    /// Returns true if the snapshots are structurally identical.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}
