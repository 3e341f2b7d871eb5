//! Leave-type snapshot and classification types.

use serde::{Deserialize, Serialize};

use furlough_shared::types::LeaveTypeId;
use furlough_shared::LeaveDays;

/// Ledger-relevant classification of a leave type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeaveKind {
    /// Casual leave, deducted from the casual annual pool.
    Casual,
    /// Sick leave, deducted from the sick annual pool.
    Sick,
    /// Any other leave type; informational only, no ledger deduction.
    Other,
}

impl LeaveKind {
    /// Classifies a leave type by its exact display name.
    ///
    /// The domain-significant names are "Casual Leave" and "Sick Leave";
    /// anything else is informational.
    #[must_use]
    pub fn classify(name: &str) -> Self {
        match name {
            "Casual Leave" => Self::Casual,
            "Sick Leave" => Self::Sick,
            _ => Self::Other,
        }
    }

    /// Returns true if requests of this kind deduct ledger balances.
    #[must_use]
    pub const fn deducts_balance(self) -> bool {
        matches!(self, Self::Casual | Self::Sick)
    }
}

impl std::fmt::Display for LeaveKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Casual => write!(f, "casual"),
            Self::Sick => write!(f, "sick"),
            Self::Other => write!(f, "other"),
        }
    }
}

/// Immutable snapshot of one leave type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaveTypeSnapshot {
    /// Unique leave-type identifier.
    pub id: LeaveTypeId,
    /// Display name, e.g. "Casual Leave".
    pub name: String,
    /// Annual entitlement in days.
    pub annual_days: LeaveDays,
}

impl LeaveTypeSnapshot {
    /// Ledger classification of this type.
    #[must_use]
    pub fn kind(&self) -> LeaveKind {
        LeaveKind::classify(&self.name)
    }
}

/// Immutable snapshot of all configured leave types.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LeaveTypeRegistry {
    types: Vec<LeaveTypeSnapshot>,
}

impl LeaveTypeRegistry {
    /// Builds a registry from leave-type snapshots.
    #[must_use]
    pub fn new(types: Vec<LeaveTypeSnapshot>) -> Self {
        Self { types }
    }

    /// All configured leave types.
    #[must_use]
    pub fn types(&self) -> &[LeaveTypeSnapshot] {
        &self.types
    }

    /// Looks up a leave type by id.
    #[must_use]
    pub fn get(&self, id: LeaveTypeId) -> Option<&LeaveTypeSnapshot> {
        self.types.iter().find(|t| t.id == id)
    }

    /// Ledger classification of a leave type by id.
    #[must_use]
    pub fn kind_of(&self, id: LeaveTypeId) -> Option<LeaveKind> {
        self.get(id).map(LeaveTypeSnapshot::kind)
    }

    /// Annual entitlement for a ledger kind; zero when the type is not
    /// configured. `Other` has no entitlement.
    #[must_use]
    pub fn annual_days(&self, kind: LeaveKind) -> LeaveDays {
        if !kind.deducts_balance() {
            return LeaveDays::ZERO;
        }
        self.types
            .iter()
            .find(|t| t.kind() == kind)
            .map_or(LeaveDays::ZERO, |t| t.annual_days)
    }

    /// Annual casual entitlement.
    #[must_use]
    pub fn casual_annual_days(&self) -> LeaveDays {
        self.annual_days(LeaveKind::Casual)
    }

    /// Annual sick entitlement.
    #[must_use]
    pub fn sick_annual_days(&self) -> LeaveDays {
        self.annual_days(LeaveKind::Sick)
    }

    /// Combined sick + casual annual entitlement.
    #[must_use]
    pub fn total_entitlement(&self) -> LeaveDays {
        self.sick_annual_days() + self.casual_annual_days()
    }
}
