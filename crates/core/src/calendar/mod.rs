//! Fiscal-year quarter calendar.
//!
//! The calendar is an immutable snapshot of a fiscal year's ordered quarters.
//! Every recomputation receives it explicitly; nothing in the engine derives
//! quarter boundaries ad hoc.
//!
//! # Modules
//!
//! - `types` - Quarter, calendar snapshot, structural diff
//! - `proration` - Whole-month proration and working-day helpers

pub mod proration;
pub mod types;

#[cfg(test)]
mod props;

pub use proration::{last_working_day, months_between};
pub use types::{CalendarDiff, CalendarError, Quarter, QuarterCalendar};
