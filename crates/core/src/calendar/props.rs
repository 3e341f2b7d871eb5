//! Property-based tests for calendar resolution and proration.

use chrono::{Datelike, Days, NaiveDate};
use proptest::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

use furlough_shared::types::{FiscalYearId, QuarterId};
use furlough_shared::LeaveDays;

use super::proration::{last_working_day, months_between};
use super::types::{Quarter, QuarterCalendar};

fn arb_date() -> impl Strategy<Value = NaiveDate> {
    (0u64..=36500).prop_map(|offset| {
        NaiveDate::from_ymd_opt(1980, 1, 1)
            .unwrap()
            .checked_add_days(Days::new(offset))
            .unwrap()
    })
}

/// Four contiguous calendar quarters for a random year.
fn arb_calendar() -> impl Strategy<Value = QuarterCalendar> {
    (2000i32..2100, 1i64..=10).prop_map(|(year, base)| {
        let quarter = |n: u128, name: &str, fm: u32, fd: u32, tm: u32, td: u32| Quarter {
            id: QuarterId::from_uuid(Uuid::from_u128(n)),
            name: name.to_string(),
            from_date: NaiveDate::from_ymd_opt(year, fm, fd).unwrap(),
            to_date: NaiveDate::from_ymd_opt(year, tm, td).unwrap(),
            base_allocation: LeaveDays(Decimal::from(base)),
            reset_disabled: false,
        };
        QuarterCalendar::new(
            FiscalYearId::from_uuid(Uuid::from_u128(u128::from(year.unsigned_abs()))),
            format!("FY {year}"),
            vec![
                quarter(1, "Q1", 1, 1, 3, 31),
                quarter(2, "Q2", 4, 1, 6, 30),
                quarter(3, "Q3", 7, 1, 9, 30),
                quarter(4, "Q4", 10, 1, 12, 31),
            ],
        )
        .unwrap()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Swapping the arguments negates the result.
    #[test]
    fn prop_months_between_antisymmetric(a in arb_date(), b in arb_date()) {
        prop_assert_eq!(months_between(a, b), -months_between(b, a));
    }

    /// The month distance composes across an intermediate date.
    #[test]
    fn prop_months_between_additive(a in arb_date(), b in arb_date(), c in arb_date()) {
        prop_assert_eq!(
            months_between(a, c),
            months_between(a, b) + months_between(b, c)
        );
    }

    /// Days within a month never change the distance.
    #[test]
    fn prop_months_between_ignores_days(a in arb_date(), b in arb_date()) {
        let a_first = a.with_day(1).unwrap();
        let b_first = b.with_day(1).unwrap();
        prop_assert_eq!(months_between(a, b), months_between(a_first, b_first));
    }

    /// Within a contiguous calendar, every in-span date resolves exactly
    /// one quarter, and that quarter contains the date.
    #[test]
    fn prop_exactly_one_current_quarter(cal in arb_calendar(), offset in 0u64..400) {
        let date = cal.starts_on().checked_add_days(Days::new(offset)).unwrap();
        if date <= cal.ends_on() {
            let containing = cal
                .quarters()
                .iter()
                .filter(|q| q.contains_date(date))
                .count();
            prop_assert_eq!(containing, 1);
            let current = cal.current_quarter(date).unwrap();
            prop_assert!(current.contains_date(date));
        } else {
            prop_assert!(cal.current_quarter(date).is_none());
        }
    }

    /// Future quarters all start strictly after the queried date and never
    /// include the current quarter.
    #[test]
    fn prop_future_quarters_strictly_after(cal in arb_calendar(), offset in 0u64..400) {
        let date = cal.starts_on().checked_add_days(Days::new(offset)).unwrap();
        let current_id = cal.current_quarter(date).map(|q| q.id);
        for quarter in cal.future_quarters(date) {
            prop_assert!(quarter.from_date > date);
            prop_assert!(Some(quarter.id) != current_id);
        }
    }

    /// A found working day is within the lookback window, not after the
    /// start date, and actually a working day.
    #[test]
    fn prop_last_working_day_in_window(date in arb_date(), lookback in 0u32..30) {
        // Weekends are non-working
        let is_non_working = |d: NaiveDate| {
            use chrono::Datelike;
            d.weekday().number_from_monday() > 5
        };
        if let Ok(found) = last_working_day(date, is_non_working, lookback) {
            prop_assert!(found <= date);
            prop_assert!(date.signed_duration_since(found).num_days() <= i64::from(lookback));
            prop_assert!(!is_non_working(found));
        } else {
            // A two-day weekend can never exhaust a window of two or more
            prop_assert!(lookback < 2);
        }
    }
}
