//! oakreport - VTC OAK usage reports from DynamoDB tables
//!
//! This library provides functionality to:
//! - Scan the account, usage-log and AI-assist-log tables (DynamoDB or local JSON dumps)
//! - Normalize mixed `createdAt` values and filter by calendar day
//! - Count usage per account and metric, zero-filling idle accounts
//! - Render the result as an Excel workbook, a Word document, a table, or JSON
//!
//! # Examples
//!
//! ```no_run
//! use oakreport::{
//!     json_source::JsonDirSource,
//!     metrics::MetricsUsageTypeMap,
//!     report::{ReportRequest, build_report},
//! };
//! use chrono::NaiveDate;
//!
//! #[tokio::main]
//! async fn main() -> oakreport::Result<()> {
//!     let source = JsonDirSource::new("./dumps");
//!     let today = NaiveDate::from_ymd_opt(2025, 9, 30).unwrap();
//!     let request = ReportRequest::new(today);
//!
//!     let outcome = build_report(&source, &request, &MetricsUsageTypeMap::default()).await?;
//!     println!("{} accounts", outcome.table.len());
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod json_source;
pub mod report;

// Re-export the core modules under the library root
pub use oakreport_core::{aggregation, error, filters, metrics, records, source, timestamp, timezone, types};

pub use error::{ReportError, Result};
pub use types::{Account, AccountId, LogKind, LogRecord, RawTimestamp, UsageType};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
