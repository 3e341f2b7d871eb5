//! Common types used across the application.

pub mod days;
pub mod id;

pub use days::LeaveDays;
pub use id::*;
