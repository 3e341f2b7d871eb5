//! Employee position and snapshot types.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use furlough_shared::types::UserId;

/// Employment-status category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    /// Intern: month-prorated quarter allocation, no carry-over, no pools.
    Intern,
    /// Probation: quarter entries track leave, annual pools do not move.
    Probation,
    /// Permanent: full participation including annual pools.
    Permanent,
}

impl Position {
    /// Returns the string form of the position.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Intern => "intern",
            Self::Probation => "probation",
            Self::Permanent => "permanent",
        }
    }

    /// Parses a position from its string form.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "intern" => Some(Self::Intern),
            "probation" => Some(Self::Probation),
            "permanent" => Some(Self::Permanent),
            _ => None,
        }
    }

    /// Returns true for interns.
    #[must_use]
    pub const fn is_intern(self) -> bool {
        matches!(self, Self::Intern)
    }

    /// Returns true for employees on probation.
    #[must_use]
    pub const fn is_probation(self) -> bool {
        matches!(self, Self::Probation)
    }

    /// Returns true for permanent employees.
    #[must_use]
    pub const fn is_permanent(self) -> bool {
        matches!(self, Self::Permanent)
    }

    /// Unused quarter balance rolls forward for everyone but interns.
    #[must_use]
    pub const fn carries_over(self) -> bool {
        !matches!(self, Self::Intern)
    }

    /// Annual pools move only for permanent employees.
    #[must_use]
    pub const fn deducts_annual_pools(self) -> bool {
        matches!(self, Self::Permanent)
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Immutable snapshot of one employee's ledger-relevant state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeSnapshot {
    /// Unique employee identifier.
    pub id: UserId,
    /// Current employment-status category.
    pub position: Position,
    /// Date of hire.
    pub join_date: NaiveDate,
    /// Date the employee became permanent, when recorded.
    pub status_change_date: Option<NaiveDate>,
    /// False once the employee has left; inactive employees are excluded
    /// from every batch recomputation.
    pub active: bool,
}

impl EmployeeSnapshot {
    /// Whether a leave on this date touches quarter entries.
    ///
    /// Dates before a recorded permanent-status change belong to the
    /// pre-permanent accounting and are skipped; with no change recorded
    /// every date counts.
    #[must_use]
    pub fn date_counts(&self, leave_date: NaiveDate) -> bool {
        self.status_change_date
            .is_none_or(|changed| leave_date >= changed)
    }

    /// Whether a leave on this date also moves the annual pools:
    /// the date must count and the employee must be permanent.
    #[must_use]
    pub fn counts_toward_pools(&self, leave_date: NaiveDate) -> bool {
        self.position.deducts_annual_pools() && self.date_counts(leave_date)
    }
}
