//! Shared types and configuration for Furlough.
//!
//! This crate provides common types used across all other crates:
//! - Day-count quantities with decimal precision
//! - Typed IDs for type-safe entity references
//! - Engine configuration management

pub mod config;
pub mod types;

pub use config::EngineConfig;
pub use types::LeaveDays;
