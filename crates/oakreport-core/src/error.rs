//! Error types for oakreport
//!
//! This module defines the error types used throughout the oakreport crates.
//! All errors are derived from `thiserror` for convenient error handling
//! and automatic `From` implementations.
//!
//! Per-record failures ([`ReportError::Parse`]) are recovered locally by the
//! filter stage; every other variant aborts the run.
//!
//! # Example
//!
//! ```
//! use oakreport_core::error::{ReportError, Result};
//!
//! fn example_function() -> Result<()> {
//!     // This will automatically convert io::Error to ReportError
//!     let _file = std::fs::read_to_string("nonexistent.txt")?;
//!     Ok(())
//! }
//! ```

use chrono::NaiveDate;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for oakreport operations
#[derive(Error, Debug)]
pub enum ReportError {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid date format
    #[error("Invalid date format: {0}")]
    InvalidDate(String),

    /// Start date after end date
    #[error("Invalid date range: start date {start} is after end date {end}")]
    InvalidRange {
        /// Requested start date
        start: NaiveDate,
        /// Requested end date
        end: NaiveDate,
    },

    /// Invalid timezone
    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    /// A raw timestamp value could not be normalized
    #[error("Unparseable timestamp '{value}': {reason}")]
    Parse {
        /// The raw value as received
        value: String,
        /// Why it was rejected
        reason: String,
    },

    /// A data source failed while reading a table
    #[error("Failed to fetch table '{table}': {message}")]
    Fetch {
        /// The table being read
        table: String,
        /// The underlying failure
        message: String,
    },

    /// Serializing a report into its output format failed
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Writing the report to its destination failed
    #[error("Failed to write report to {}: {message}", path.display())]
    Render {
        /// The attempted output path
        path: PathBuf,
        /// The underlying failure
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ReportError {
    /// Build a fetch error for `table` from any displayable failure
    pub fn fetch(table: impl Into<String>, error: impl std::fmt::Display) -> Self {
        Self::Fetch {
            table: table.into(),
            message: error.to_string(),
        }
    }

    /// Build a parse error for a raw value
    pub fn parse(value: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Parse {
            value: value.into(),
            reason: reason.into(),
        }
    }
}

/// Convenience type alias for Results in oakreport
///
/// # Example
///
/// ```
/// use oakreport_core::Result;
///
/// fn process_data() -> Result<String> {
///     Ok("Processed successfully".to_string())
/// }
/// ```
pub type Result<T> = std::result::Result<T, ReportError>;
