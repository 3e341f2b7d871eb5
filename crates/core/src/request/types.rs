//! Leave request types and status machine.

use std::fmt;

use chrono::NaiveDate;
use furlough_shared::types::{LeaveTypeId, RequestId, UserId};
use furlough_shared::LeaveDays;
use serde::{Deserialize, Serialize};

/// Lifecycle status of a leave request.
///
/// `UserCancelled` is the employee withdrawing an already-approved
/// request; the days stay charged until an admin confirms the
/// cancellation. An employee withdrawing a still-pending request goes
/// straight to `Cancelled`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LeaveStatus {
    /// Submitted, awaiting a decision.
    Pending,
    /// Granted; days are charged to the ledger.
    Approved,
    /// Declined; nothing was charged.
    Rejected,
    /// Withdrawn or admin-cancelled; nothing remains charged.
    Cancelled,
    /// Employee withdrew after approval; days remain charged.
    UserCancelled,
}

impl LeaveStatus {
    /// Status name in its stored form.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Cancelled => "cancelled",
            Self::UserCancelled => "user-cancelled",
        }
    }

    /// Whether `next` is a legal transition from this status.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Approved | Self::Rejected | Self::Cancelled)
                | (Self::Approved, Self::Cancelled | Self::UserCancelled)
                | (Self::UserCancelled, Self::Cancelled)
                | (Self::Cancelled | Self::Rejected, Self::Pending)
        )
    }

    /// Whether days in this status count as taken leave.
    ///
    /// Employee-cancelled days stay charged until an admin confirms,
    /// so they count alongside approved days.
    #[must_use]
    pub fn counts_as_taken(&self) -> bool {
        matches!(self, Self::Approved | Self::UserCancelled)
    }

    /// Whether a request in this status blocks new requests on the
    /// same dates.
    #[must_use]
    pub fn blocks_overlap(&self) -> bool {
        !matches!(self, Self::Cancelled | Self::Rejected)
    }
}

impl fmt::Display for LeaveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which half of the working day a half-day leave covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HalfDay {
    /// Morning session.
    FirstHalf,
    /// Afternoon session.
    SecondHalf,
}

/// One requested day of leave, optionally a half day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveDate {
    /// Calendar date of the leave.
    pub date: NaiveDate,
    /// Half-day session, or `None` for a full day.
    pub half: Option<HalfDay>,
}

impl LeaveDate {
    /// Full day on `date`.
    #[must_use]
    pub fn full(date: NaiveDate) -> Self {
        Self { date, half: None }
    }

    /// Half day on `date`.
    #[must_use]
    pub fn half(date: NaiveDate, session: HalfDay) -> Self {
        Self {
            date,
            half: Some(session),
        }
    }

    /// Days this date charges to the ledger: 1 or 0.5.
    #[must_use]
    pub fn weight(&self) -> LeaveDays {
        if self.half.is_some() {
            LeaveDays::HALF
        } else {
            LeaveDays::ONE
        }
    }

    /// Whether this date collides with `other`.
    ///
    /// Two half days on the same date only collide when they cover the
    /// same session.
    #[must_use]
    pub fn collides_with(&self, other: &Self) -> bool {
        if self.date != other.date {
            return false;
        }
        match (self.half, other.half) {
            (Some(a), Some(b)) => a == b,
            _ => true,
        }
    }
}

/// A leave request and its current position in the state machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveRequest {
    /// Request id.
    pub id: RequestId,
    /// Requesting employee.
    pub user_id: UserId,
    /// Leave type being requested.
    pub leave_type_id: LeaveTypeId,
    /// Requested dates, each possibly a half day.
    pub dates: Vec<LeaveDate>,
    /// Current lifecycle status.
    pub status: LeaveStatus,
    /// Free-form reason given by the employee.
    pub reason: Option<String>,
}

impl LeaveRequest {
    /// Total days this request charges when approved.
    #[must_use]
    pub fn total_days(&self) -> LeaveDays {
        self.dates.iter().map(LeaveDate::weight).sum()
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use rust_decimal_macros::dec;

    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[rstest]
    #[case(LeaveStatus::Pending, LeaveStatus::Approved, true)]
    #[case(LeaveStatus::Pending, LeaveStatus::Rejected, true)]
    #[case(LeaveStatus::Pending, LeaveStatus::Cancelled, true)]
    #[case(LeaveStatus::Pending, LeaveStatus::UserCancelled, false)]
    #[case(LeaveStatus::Approved, LeaveStatus::Cancelled, true)]
    #[case(LeaveStatus::Approved, LeaveStatus::UserCancelled, true)]
    #[case(LeaveStatus::Approved, LeaveStatus::Rejected, false)]
    #[case(LeaveStatus::Approved, LeaveStatus::Pending, false)]
    #[case(LeaveStatus::UserCancelled, LeaveStatus::Cancelled, true)]
    #[case(LeaveStatus::UserCancelled, LeaveStatus::Approved, false)]
    #[case(LeaveStatus::Cancelled, LeaveStatus::Pending, true)]
    #[case(LeaveStatus::Rejected, LeaveStatus::Pending, true)]
    #[case(LeaveStatus::Cancelled, LeaveStatus::Approved, false)]
    #[case(LeaveStatus::Rejected, LeaveStatus::Cancelled, false)]
    fn test_transition_table(
        #[case] from: LeaveStatus,
        #[case] to: LeaveStatus,
        #[case] allowed: bool,
    ) {
        assert_eq!(from.can_transition_to(to), allowed);
    }

    #[test]
    fn test_no_status_transitions_to_itself() {
        for status in [
            LeaveStatus::Pending,
            LeaveStatus::Approved,
            LeaveStatus::Rejected,
            LeaveStatus::Cancelled,
            LeaveStatus::UserCancelled,
        ] {
            assert!(!status.can_transition_to(status));
        }
    }

    #[test]
    fn test_taken_statuses() {
        assert!(LeaveStatus::Approved.counts_as_taken());
        assert!(LeaveStatus::UserCancelled.counts_as_taken());
        assert!(!LeaveStatus::Pending.counts_as_taken());
        assert!(!LeaveStatus::Cancelled.counts_as_taken());
        assert!(!LeaveStatus::Rejected.counts_as_taken());
    }

    #[test]
    fn test_status_serializes_in_kebab_case() {
        let json = serde_json::to_string(&LeaveStatus::UserCancelled).unwrap();
        assert_eq!(json, "\"user-cancelled\"");
        let back: LeaveStatus = serde_json::from_str("\"user-cancelled\"").unwrap();
        assert_eq!(back, LeaveStatus::UserCancelled);
    }

    #[test]
    fn test_half_days_weigh_half() {
        let full = LeaveDate::full(date(2026, 3, 2));
        let half = LeaveDate::half(date(2026, 3, 3), HalfDay::FirstHalf);
        assert_eq!(full.weight(), LeaveDays::ONE);
        assert_eq!(half.weight(), LeaveDays::HALF);
    }

    #[rstest]
    #[case(None, None, true)]
    #[case(None, Some(HalfDay::FirstHalf), true)]
    #[case(Some(HalfDay::SecondHalf), None, true)]
    #[case(Some(HalfDay::FirstHalf), Some(HalfDay::FirstHalf), true)]
    #[case(Some(HalfDay::FirstHalf), Some(HalfDay::SecondHalf), false)]
    fn test_same_date_collision(
        #[case] a: Option<HalfDay>,
        #[case] b: Option<HalfDay>,
        #[case] collides: bool,
    ) {
        let d = date(2026, 4, 6);
        let lhs = LeaveDate { date: d, half: a };
        let rhs = LeaveDate { date: d, half: b };
        assert_eq!(lhs.collides_with(&rhs), collides);
        assert_eq!(rhs.collides_with(&lhs), collides);
    }

    #[test]
    fn test_different_dates_never_collide() {
        let a = LeaveDate::full(date(2026, 4, 6));
        let b = LeaveDate::full(date(2026, 4, 7));
        assert!(!a.collides_with(&b));
    }

    #[test]
    fn test_total_days_mixes_full_and_half() {
        let request = LeaveRequest {
            id: RequestId::new(),
            user_id: UserId::new(),
            leave_type_id: LeaveTypeId::new(),
            dates: vec![
                LeaveDate::full(date(2026, 5, 4)),
                LeaveDate::full(date(2026, 5, 5)),
                LeaveDate::half(date(2026, 5, 6), HalfDay::SecondHalf),
            ],
            status: LeaveStatus::Pending,
            reason: None,
        };
        assert_eq!(request.total_days(), LeaveDays(dec!(2.5)));
    }
}
