//! Property tests for ledger invariant validation.

use chrono::{Days, NaiveDate};
use furlough_shared::types::{FiscalYearId, LeaveTypeId, QuarterId, UserId};
use furlough_shared::LeaveDays;
use proptest::prelude::*;
use uuid::Uuid;

use crate::calendar::{Quarter, QuarterCalendar};
use crate::employment::{EmployeeSnapshot, Position};
use crate::leave_type::{LeaveKind, LeaveTypeRegistry, LeaveTypeSnapshot};
use crate::ledger::accrual::{AccrualContext, AccrualService};
use crate::ledger::validation::validate_ledger;
use crate::request::types::{HalfDay, LeaveDate};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn calendar() -> QuarterCalendar {
    let quarter = |n: u128, from, to| Quarter {
        id: QuarterId::from_uuid(Uuid::from_u128(n)),
        name: format!("Q{n}"),
        from_date: from,
        to_date: to,
        base_allocation: LeaveDays::from_whole(3),
        reset_disabled: false,
    };
    QuarterCalendar::new(
        FiscalYearId::new(),
        "FY2026".to_owned(),
        vec![
            quarter(1, date(2026, 1, 1), date(2026, 3, 31)),
            quarter(2, date(2026, 4, 1), date(2026, 6, 30)),
            quarter(3, date(2026, 7, 1), date(2026, 9, 30)),
            quarter(4, date(2026, 10, 1), date(2026, 12, 31)),
        ],
    )
    .unwrap()
}

fn registry() -> LeaveTypeRegistry {
    LeaveTypeRegistry::new(vec![
        LeaveTypeSnapshot {
            id: LeaveTypeId::new(),
            name: "Casual Leave".to_owned(),
            annual_days: LeaveDays::from_whole(12),
        },
        LeaveTypeSnapshot {
            id: LeaveTypeId::new(),
            name: "Sick Leave".to_owned(),
            annual_days: LeaveDays::from_whole(12),
        },
    ])
}

fn arb_approval() -> impl Strategy<Value = (LeaveKind, Vec<LeaveDate>)> {
    let kind = prop_oneof![Just(LeaveKind::Sick), Just(LeaveKind::Casual)];
    let leave_date = (
        0u64..365,
        proptest::option::of(prop_oneof![
            Just(HalfDay::FirstHalf),
            Just(HalfDay::SecondHalf)
        ]),
    )
        .prop_map(|(offset, half)| LeaveDate {
            date: date(2026, 1, 1) + Days::new(offset),
            half,
        });
    (kind, proptest::collection::vec(leave_date, 1..4))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // Any chain of approvals starting from a seeded ledger keeps the
    // validator satisfied, even when balances run negative.
    #[test]
    fn prop_approval_chains_never_break_invariants(
        approvals in proptest::collection::vec(arb_approval(), 1..6),
        today_offset in 0u64..365,
    ) {
        let calendar = calendar();
        let registry = registry();
        let today = date(2026, 1, 1) + Days::new(today_offset);
        let ctx = AccrualContext::new(&calendar, &registry, today);
        let employee = EmployeeSnapshot {
            id: UserId::new(),
            position: Position::Permanent,
            join_date: date(2026, 1, 1),
            status_change_date: None,
            active: true,
        };

        let mut ledger = AccrualService::seed_ledger(&ctx, &employee).unwrap();
        for (kind, dates) in &approvals {
            ledger =
                AccrualService::apply_approval(&ctx, &employee, *kind, dates, &ledger).unwrap();
            prop_assert!(validate_ledger(&calendar, &ledger, employee.join_date).is_ok());
        }
    }

    // Reordering entries always trips the mirror check.
    #[test]
    fn prop_shuffled_entries_are_rejected(i in 0usize..4, j in 0usize..4) {
        prop_assume!(i != j);
        let calendar = calendar();
        let registry = registry();
        let ctx = AccrualContext::new(&calendar, &registry, date(2026, 1, 1));
        let employee = EmployeeSnapshot {
            id: UserId::new(),
            position: Position::Permanent,
            join_date: date(2026, 1, 1),
            status_change_date: None,
            active: true,
        };

        let mut ledger = AccrualService::seed_ledger(&ctx, &employee).unwrap();
        ledger.entries.swap(i, j);
        prop_assert!(validate_ledger(&calendar, &ledger, date(2026, 1, 1)).is_err());
    }

    // Driving any per-quarter counter negative is always caught.
    #[test]
    fn prop_negative_counters_are_rejected(
        entry_index in 0usize..4,
        field in 0usize..3,
        magnitude in 1i64..10,
    ) {
        let calendar = calendar();
        let registry = registry();
        let ctx = AccrualContext::new(&calendar, &registry, date(2026, 1, 1));
        let employee = EmployeeSnapshot {
            id: UserId::new(),
            position: Position::Permanent,
            join_date: date(2026, 1, 1),
            status_change_date: None,
            active: true,
        };

        let mut ledger = AccrualService::seed_ledger(&ctx, &employee).unwrap();
        let value = LeaveDays::from_whole(-magnitude);
        let entry = &mut ledger.entries[entry_index];
        match field {
            0 => entry.allocated = value,
            1 => entry.carried_over = value,
            _ => entry.approved.sick = value,
        }

        prop_assert!(validate_ledger(&calendar, &ledger, date(2026, 1, 1)).is_err());
    }
}
