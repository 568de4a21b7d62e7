//! Timestamp normalization
//!
//! Log tables store `createdAt` in whatever form the writing service chose:
//! ISO-8601 strings (with or without a time or offset), epoch seconds, epoch
//! milliseconds, or any of those numbers stored as a string. This module turns
//! a [`RawTimestamp`] into a UTC instant or a [`ReportError::Parse`].
//!
//! # Examples
//!
//! ```
//! use oakreport_core::types::RawTimestamp;
//!
//! let secs = RawTimestamp::Number(1_700_000_000.0).normalize().unwrap();
//! let millis = RawTimestamp::Number(1_700_000_000_000.0).normalize().unwrap();
//! assert_eq!(secs, millis);
//!
//! let iso = RawTimestamp::Text("2023-11-14T22:13:20Z".into()).normalize().unwrap();
//! assert_eq!(iso, secs);
//! ```

use crate::error::{ReportError, Result};
use crate::types::{EventTimestamp, RawTimestamp};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Numeric values above this are epoch milliseconds, not seconds.
///
/// `1e12` seconds is roughly the year 33658, so no plausible seconds value
/// reaches it while every millisecond value after 2001-09-09 does.
pub const MILLIS_THRESHOLD: f64 = 1e12;

const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
];

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

impl RawTimestamp {
    /// Normalize to a UTC instant
    pub fn normalize(&self) -> Result<EventTimestamp> {
        match self {
            Self::Number(n) => from_epoch(*n),
            Self::Text(s) => parse_text(s),
        }
        .map(EventTimestamp::new)
    }
}

/// Interpret an epoch number, disambiguating seconds from milliseconds by magnitude
pub fn from_epoch(value: f64) -> Result<DateTime<Utc>> {
    if !value.is_finite() {
        return Err(ReportError::parse(value.to_string(), "not a finite number"));
    }

    let secs = if value.abs() > MILLIS_THRESHOLD {
        value / 1000.0
    } else {
        value
    };

    let whole = secs.floor();
    let nanos = (((secs - whole) * 1e9).round() as u32).min(999_999_999);

    DateTime::from_timestamp(whole as i64, nanos)
        .ok_or_else(|| ReportError::parse(value.to_string(), "epoch value out of range"))
}

/// Parse a string timestamp: ISO-8601 first, then a numeric epoch string
pub fn parse_text(raw: &str) -> Result<DateTime<Utc>> {
    let s = raw.trim();
    if s.is_empty() {
        return Err(ReportError::parse(raw, "empty string"));
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Ok(dt.with_timezone(&Utc));
        }
    }

    // No offset: the value is taken as UTC
    for fmt in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(dt.and_utc());
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(date.and_time(chrono::NaiveTime::MIN).and_utc());
    }

    match s.parse::<f64>() {
        Ok(n) => from_epoch(n),
        Err(_) => Err(ReportError::parse(
            raw,
            "neither ISO-8601 nor a numeric epoch value",
        )),
    }
}
