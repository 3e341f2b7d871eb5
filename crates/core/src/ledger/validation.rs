//! Post-mutation invariant checks.
//!
//! Every mutation runs the ledger through [`validate_ledger`] before it
//! is persisted; a violation rejects the write and surfaces as a server
//! fault. Remaining balances and annual pools are allowed to go
//! negative (spend-ahead and retroactive entitlement cuts), so they are
//! deliberately not checked here.

use chrono::NaiveDate;

use crate::calendar::QuarterCalendar;
use crate::ledger::error::LedgerError;
use crate::ledger::types::LeaveLedger;

/// Checks the arithmetic invariants a ledger must satisfy after any
/// mutation.
///
/// - Entries mirror the calendar's quarters one-to-one, in order.
/// - Allocated, carried-over, and approved counters are non-negative.
/// - A future quarter nothing has touched yet still has its full
///   allocation remaining.
///
/// # Errors
///
/// Returns [`LedgerError::InvariantViolation`] naming the first failed
/// check.
pub fn validate_ledger(
    calendar: &QuarterCalendar,
    ledger: &LeaveLedger,
    today: NaiveDate,
) -> Result<(), LedgerError> {
    let quarters = calendar.quarters();
    if ledger.entries.len() != quarters.len() {
        return Err(LedgerError::InvariantViolation {
            detail: format!(
                "ledger tracks {} entries for {} calendar quarters",
                ledger.entries.len(),
                quarters.len()
            ),
        });
    }

    for (quarter, entry) in quarters.iter().zip(&ledger.entries) {
        if entry.quarter_id != quarter.id {
            return Err(LedgerError::InvariantViolation {
                detail: format!(
                    "entry order diverges from the calendar at quarter {}",
                    quarter.name
                ),
            });
        }

        if entry.allocated.is_negative() {
            return Err(LedgerError::InvariantViolation {
                detail: format!("negative allocation in quarter {}", quarter.name),
            });
        }
        if entry.carried_over.is_negative() {
            return Err(LedgerError::InvariantViolation {
                detail: format!("negative carry-over in quarter {}", quarter.name),
            });
        }
        if entry.approved.sick.is_negative() || entry.approved.casual.is_negative() {
            return Err(LedgerError::InvariantViolation {
                detail: format!("negative approved count in quarter {}", quarter.name),
            });
        }

        if quarter.is_future(today) && entry.is_untouched() && entry.remaining != entry.allocated {
            return Err(LedgerError::InvariantViolation {
                detail: format!(
                    "future quarter {} has {} remaining against {} allocated",
                    quarter.name, entry.remaining, entry.allocated
                ),
            });
        }
    }

    Ok(())
}
