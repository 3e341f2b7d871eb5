//! Property tests for the accrual algorithms.

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

fn quarter_id(n: u128) -> QuarterId {
    QuarterId::from_uuid(Uuid::from_u128(n))
}

fn calendar() -> QuarterCalendar {
    let quarter = |n: u128, from, to| Quarter {
        id: quarter_id(n),
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

fn employee(position: Position, join_date: NaiveDate) -> EmployeeSnapshot {
    EmployeeSnapshot {
        id: UserId::new(),
        position,
        join_date,
        status_change_date: None,
        active: true,
    }
}

fn in_year(offset: u64) -> NaiveDate {
    date(2026, 1, 1) + Days::new(offset)
}

fn arb_position() -> impl Strategy<Value = Position> {
    prop_oneof![
        Just(Position::Intern),
        Just(Position::Probation),
        Just(Position::Permanent),
    ]
}

fn arb_ledger_kind() -> impl Strategy<Value = LeaveKind> {
    prop_oneof![Just(LeaveKind::Sick), Just(LeaveKind::Casual)]
}

fn arb_leave_date() -> impl Strategy<Value = LeaveDate> {
    (
        0u64..365,
        proptest::option::of(prop_oneof![
            Just(HalfDay::FirstHalf),
            Just(HalfDay::SecondHalf)
        ]),
    )
        .prop_map(|(offset, half)| LeaveDate {
            date: in_year(offset),
            half,
        })
}

fn arb_leave_dates() -> impl Strategy<Value = Vec<LeaveDate>> {
    proptest::collection::vec(arb_leave_date(), 1..6)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // Approve then cancel with the same snapshot is a numeric no-op,
    // whatever the position, gating date, or half-day mix.
    #[test]
    fn prop_approval_then_cancellation_restores_the_ledger(
        position in arb_position(),
        kind in arb_ledger_kind(),
        dates in arb_leave_dates(),
        change_offset in proptest::option::of(0u64..365),
    ) {
        let calendar = calendar();
        let registry = registry();
        let ctx = AccrualContext::new(&calendar, &registry, date(2026, 6, 15));
        let mut employee = employee(position, date(2026, 1, 1));
        employee.status_change_date = change_offset.map(in_year);

        let ledger = AccrualService::seed_ledger(&ctx, &employee).unwrap();
        let approved =
            AccrualService::apply_approval(&ctx, &employee, kind, &dates, &ledger).unwrap();
        let reverted =
            AccrualService::apply_cancellation(&ctx, &employee, kind, &dates, &approved).unwrap();

        prop_assert_eq!(reverted, ledger);
    }

    // remaining + approved is conserved per entry by approval: what
    // leaves the balance shows up as approved, or the date was gated
    // out and neither side moved.
    #[test]
    fn prop_approval_conserves_remaining_plus_approved(
        position in arb_position(),
        kind in arb_ledger_kind(),
        dates in arb_leave_dates(),
    ) {
        let calendar = calendar();
        let registry = registry();
        let ctx = AccrualContext::new(&calendar, &registry, date(2026, 6, 15));
        let employee = employee(position, date(2026, 1, 1));

        let ledger = AccrualService::seed_ledger(&ctx, &employee).unwrap();
        let next =
            AccrualService::apply_approval(&ctx, &employee, kind, &dates, &ledger).unwrap();

        for (before, after) in ledger.entries.iter().zip(&next.entries) {
            prop_assert_eq!(
                before.remaining + before.approved.total(),
                after.remaining + after.approved.total()
            );
        }
    }

    // Annual pools move only for permanent employees.
    #[test]
    fn prop_pools_only_move_for_permanent_employees(
        position in arb_position(),
        kind in arb_ledger_kind(),
        dates in arb_leave_dates(),
    ) {
        let calendar = calendar();
        let registry = registry();
        let ctx = AccrualContext::new(&calendar, &registry, date(2026, 6, 15));
        let employee = employee(position, date(2026, 1, 1));

        let ledger = AccrualService::seed_ledger(&ctx, &employee).unwrap();
        let next =
            AccrualService::apply_approval(&ctx, &employee, kind, &dates, &ledger).unwrap();

        if position.is_permanent() {
            let spent: LeaveDays = dates.iter().map(LeaveDate::weight).sum();
            let pool_drop = match kind {
                LeaveKind::Sick => ledger.remaining_sick - next.remaining_sick,
                _ => ledger.remaining_casual - next.remaining_casual,
            };
            prop_assert_eq!(pool_drop, spent);
        } else {
            prop_assert_eq!(next.remaining_sick, ledger.remaining_sick);
            prop_assert_eq!(next.remaining_casual, ledger.remaining_casual);
        }
    }

    // Seeding always produces a valid ledger whose join quarter is
    // prorated within the quarter's own month span.
    #[test]
    fn prop_seeded_ledgers_validate(
        join_offset in 0u64..365,
        position in arb_position(),
    ) {
        let calendar = calendar();
        let registry = registry();
        let join = in_year(join_offset);
        let ctx = AccrualContext::new(&calendar, &registry, join);
        let employee = employee(position, join);

        let ledger = AccrualService::seed_ledger(&ctx, &employee).unwrap();
        prop_assert!(validate_ledger(&calendar, &ledger, join).is_ok());

        let join_quarter = calendar.current_quarter(join).unwrap();
        let entry = ledger.entry(join_quarter.id).unwrap();
        prop_assert!(!entry.allocated.is_negative());
        prop_assert!(entry.allocated <= LeaveDays::from_months(join_quarter.span_months()));
    }

    // A second rollover in the same quarter never changes anything.
    #[test]
    fn prop_rollover_is_idempotent(
        today_offset in 0u64..365,
        position in arb_position(),
        first_quarter_remaining in -2i64..=4,
    ) {
        let calendar = calendar();
        let registry = registry();
        let seed_ctx = AccrualContext::new(&calendar, &registry, date(2026, 1, 1));
        let employee = employee(position, date(2026, 1, 1));

        let mut ledger = AccrualService::seed_ledger(&seed_ctx, &employee).unwrap();
        ledger.entry_mut(quarter_id(1)).unwrap().remaining =
            LeaveDays::from_whole(first_quarter_remaining);

        let ctx = AccrualContext::new(&calendar, &registry, in_year(today_offset));
        let first = AccrualService::apply_quarter_rollover(&ctx, &employee, &ledger).unwrap();
        let second =
            AccrualService::apply_quarter_rollover(&ctx, &employee, &first.ledger).unwrap();

        prop_assert_eq!(&second.ledger, &first.ledger);
        prop_assert!(!second.rolled);
        prop_assert!(!second.notify);
    }

    // The permanent-transition recomputation always yields a ledger
    // the validator accepts, and never touches intern ledgers.
    #[test]
    fn prop_status_change_output_validates(
        a in 0u64..365,
        b in 0u64..365,
        position in arb_position(),
    ) {
        let calendar = calendar();
        let registry = registry();
        let join = in_year(a.min(b));
        let today = in_year(a.max(b));

        let seed_ctx = AccrualContext::new(&calendar, &registry, join);
        let seeded_as = employee(position, join);
        let ledger = AccrualService::seed_ledger(&seed_ctx, &seeded_as).unwrap();

        let mut after_change = seeded_as.clone();
        if !position.is_intern() {
            after_change.position = Position::Permanent;
            after_change.status_change_date = Some(today);
        }

        let ctx = AccrualContext::new(&calendar, &registry, today);
        let next = AccrualService::apply_status_change(
            &ctx,
            &after_change,
            &ledger,
            &crate::ledger::types::TakenLeaves::new(),
        )
        .unwrap();

        if position.is_intern() {
            prop_assert_eq!(&next, &ledger);
        }
        prop_assert!(validate_ledger(&calendar, &next, today).is_ok());
    }
}
