//! Core types, traits, and utilities for oakreport
//!
//! This crate provides the foundational types, error handling, timestamp
//! normalization, timezone configuration, date-range filters, the metric
//! map, and the per-account aggregator used by all other oakreport crates.

pub mod aggregation;
pub mod error;
pub mod filters;
pub mod metrics;
pub mod records;
pub mod source;
pub mod timestamp;
pub mod timezone;
pub mod types;

#[cfg(test)]
pub mod test_utils;

// Re-export commonly used types
pub use error::{ReportError, Result};
pub use types::{Account, AccountId, FieldValue, Item, LogKind, LogRecord, RawTimestamp, UsageType};
