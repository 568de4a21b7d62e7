//! Filtering module for log records
//!
//! [`DateRange`] is an inclusive, validated pair of calendar dates.
//! [`RecordFilter`] normalizes each record's `createdAt` and keeps the record
//! only when its calendar date in the reference zone falls inside the range.
//! Records whose timestamp cannot be normalized are dropped, never treated as
//! in range.
//!
//! # Examples
//!
//! ```
//! use oakreport_core::filters::{DateRange, RecordFilter};
//! use chrono::NaiveDate;
//!
//! let range = DateRange::new(
//!     NaiveDate::from_ymd_opt(2025, 9, 1).unwrap(),
//!     NaiveDate::from_ymd_opt(2025, 9, 30).unwrap(),
//! )
//! .unwrap();
//! assert_eq!(range.days(), 30);
//!
//! let filter = RecordFilter::new().with_range(range);
//! ```

use crate::error::{ReportError, Result};
use crate::types::LogRecord;
use chrono::{Duration, NaiveDate};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Length of the default reporting window, today included
pub const DEFAULT_WINDOW_DAYS: i64 = 30;

/// Inclusive calendar date range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// Create a range, rejecting `start > end`
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(ReportError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// The default window ending on `today`: `[today - 29 days, today]`
    pub fn ending_on(today: NaiveDate) -> Self {
        Self {
            start: today - Duration::days(DEFAULT_WINDOW_DAYS - 1),
            end: today,
        }
    }

    /// Resolve optional CLI dates
    ///
    /// A missing end date means `today`; a missing start date means the
    /// default window ending on the (resolved) end date.
    pub fn resolve(
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        today: NaiveDate,
    ) -> Result<Self> {
        let end = end.unwrap_or(today);
        let start = start.unwrap_or_else(|| Self::ending_on(end).start);
        Self::new(start, end)
    }

    /// First day of the range
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// Last day of the range
    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Whether `date` lies within the range, both ends included
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Number of calendar days covered
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// Human-readable form, e.g. `2025-09-01 to 2025-09-30`
    pub fn label(&self) -> String {
        format!(
            "{} to {}",
            self.start.format("%Y-%m-%d"),
            self.end.format("%Y-%m-%d")
        )
    }

    /// Compact form for file names, e.g. `20250901_20250930`
    pub fn file_stem(&self) -> String {
        format!(
            "{}_{}",
            self.start.format("%Y%m%d"),
            self.end.format("%Y%m%d")
        )
    }
}

/// Result of testing a single record against the filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOutcome {
    /// The record counts towards the report
    Included,
    /// The record's date lies outside the range
    OutOfRange,
    /// The record has no usable `createdAt`
    Unparseable,
}

/// Counters collected while filtering
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FilterStats {
    /// Records seen
    pub total: usize,
    /// Records kept
    pub included: usize,
    /// Records dropped for falling outside the range
    pub out_of_range: usize,
    /// Records dropped for an unparseable or missing timestamp
    pub unparseable: usize,
}

/// Filter configuration for log records
///
/// With no range configured every record passes, including those whose
/// timestamp cannot be parsed.
#[derive(Debug, Clone)]
pub struct RecordFilter {
    /// Inclusive date range
    pub range: Option<DateRange>,
    /// Reference zone for calendar-day truncation
    pub tz: Tz,
}

impl Default for RecordFilter {
    fn default() -> Self {
        Self {
            range: None,
            tz: Tz::UTC,
        }
    }
}

impl RecordFilter {
    /// Create a new filter with no restrictions
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the date range
    pub fn with_range(mut self, range: DateRange) -> Self {
        self.range = Some(range);
        self
    }

    /// Set the timezone used for calendar-day truncation
    pub fn with_timezone(mut self, tz: Tz) -> Self {
        self.tz = tz;
        self
    }

    /// Classify a record
    pub fn classify(&self, record: &LogRecord) -> FilterOutcome {
        let Some(range) = &self.range else {
            return FilterOutcome::Included;
        };

        let Some(raw) = &record.created_at else {
            return FilterOutcome::Unparseable;
        };

        match raw.normalize() {
            Ok(ts) if range.contains(ts.date_in(&self.tz)) => FilterOutcome::Included,
            Ok(_) => FilterOutcome::OutOfRange,
            Err(e) => {
                debug!("Dropping {} record for {}: {}", record.kind, record.account, e);
                FilterOutcome::Unparseable
            }
        }
    }

    /// Check if a record passes the filter
    pub fn matches(&self, record: &LogRecord) -> bool {
        self.classify(record) == FilterOutcome::Included
    }

    /// Keep matching records, counting why the others were dropped
    pub fn apply(&self, records: Vec<LogRecord>) -> (Vec<LogRecord>, FilterStats) {
        let mut stats = FilterStats {
            total: records.len(),
            ..FilterStats::default()
        };

        let kept = records
            .into_iter()
            .filter(|record| match self.classify(record) {
                FilterOutcome::Included => {
                    stats.included += 1;
                    true
                }
                FilterOutcome::OutOfRange => {
                    stats.out_of_range += 1;
                    false
                }
                FilterOutcome::Unparseable => {
                    stats.unparseable += 1;
                    false
                }
            })
            .collect();

        (kept, stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{date, usage_log};
    use crate::types::RawTimestamp;

    fn september() -> DateRange {
        DateRange::new(date(2025, 9, 1), date(2025, 9, 30)).unwrap()
    }

    #[test]
    fn test_invalid_range() {
        let err = DateRange::new(date(2025, 9, 30), date(2025, 9, 1)).unwrap_err();
        assert!(matches!(err, ReportError::InvalidRange { .. }));
    }

    #[test]
    fn test_single_day_range() {
        let range = DateRange::new(date(2025, 9, 5), date(2025, 9, 5)).unwrap();
        assert_eq!(range.days(), 1);
        assert!(range.contains(date(2025, 9, 5)));
    }

    #[test]
    fn test_default_window() {
        let range = DateRange::resolve(None, None, date(2025, 9, 30)).unwrap();
        assert_eq!(range.start(), date(2025, 9, 1));
        assert_eq!(range.end(), date(2025, 9, 30));
        assert_eq!(range.days(), DEFAULT_WINDOW_DAYS);
    }

    #[test]
    fn test_resolve_partial() {
        let today = date(2025, 10, 19);

        let range = DateRange::resolve(None, Some(date(2025, 9, 30)), today).unwrap();
        assert_eq!(range.start(), date(2025, 9, 1));

        let range = DateRange::resolve(Some(date(2025, 10, 1)), None, today).unwrap();
        assert_eq!(range.end(), today);

        assert!(DateRange::resolve(Some(date(2025, 11, 1)), None, today).is_err());
    }

    #[test]
    fn test_labels() {
        assert_eq!(september().label(), "2025-09-01 to 2025-09-30");
        assert_eq!(september().file_stem(), "20250901_20250930");
    }

    #[test]
    fn test_boundaries_inclusive() {
        let filter = RecordFilter::new().with_range(september());

        assert!(!filter.matches(&usage_log("a1", "2025-08-31T23:59:59Z", "chat")));
        assert!(filter.matches(&usage_log("a1", "2025-09-01T00:00:00Z", "chat")));
        assert!(filter.matches(&usage_log("a1", "2025-09-30T23:59:59Z", "chat")));
        assert!(!filter.matches(&usage_log("a1", "2025-10-01", "chat")));
    }

    #[test]
    fn test_reference_timezone_shifts_days() {
        let hk = RecordFilter::new()
            .with_range(september())
            .with_timezone(chrono_tz::Asia::Hong_Kong);

        // 20:00 UTC on Aug 31 is already Sep 1 in Hong Kong
        let record = usage_log("a1", "2025-08-31T20:00:00Z", "chat");
        assert!(hk.matches(&record));
        assert!(!RecordFilter::new().with_range(september()).matches(&record));
    }

    #[test]
    fn test_unparseable_excluded() {
        let filter = RecordFilter::new().with_range(september());

        let record = usage_log("a1", "not a date", "chat");
        assert_eq!(filter.classify(&record), FilterOutcome::Unparseable);

        let mut missing = usage_log("a1", "2025-09-05", "chat");
        missing.created_at = None;
        assert_eq!(filter.classify(&missing), FilterOutcome::Unparseable);
    }

    #[test]
    fn test_no_range_keeps_everything() {
        let filter = RecordFilter::new();
        assert!(filter.matches(&usage_log("a1", "not a date", "chat")));
        assert!(filter.matches(&usage_log("a1", "1999-01-01", "chat")));
    }

    #[test]
    fn test_apply_counts() {
        let filter = RecordFilter::new().with_range(september());
        let mut numeric = usage_log("a1", "", "chat");
        numeric.created_at = Some(RawTimestamp::Number(1_757_030_400_000.0));

        let records = vec![
            usage_log("a1", "2025-09-05", "chat"),
            usage_log("a1", "2025-10-05", "chat"),
            usage_log("a1", "garbage", "chat"),
            numeric,
        ];

        let (kept, stats) = filter.apply(records);
        assert_eq!(kept.len(), 2);
        assert_eq!(
            stats,
            FilterStats {
                total: 4,
                included: 2,
                out_of_range: 1,
                unparseable: 1,
            }
        );
    }
}
