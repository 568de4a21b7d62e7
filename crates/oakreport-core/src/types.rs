//! Core domain types for oakreport
//!
//! This module contains the fundamental types used throughout the oakreport
//! crates: strongly-typed account identifiers and usage types, the schemaless
//! [`Item`] returned by table sources, and the [`Account`] and [`LogRecord`]
//! values extracted from those items.

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Strongly-typed account identifier
///
/// Identifiers are normalized on construction (surrounding whitespace
/// trimmed, lower-cased) so account rows and log records written with
/// different casing still join.
///
/// # Examples
/// ```
/// use oakreport_core::types::AccountId;
///
/// let id = AccountId::new("  Alice@Example.COM ");
/// assert_eq!(id.as_str(), "alice@example.com");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AccountId(String);

impl AccountId {
    /// Create a new normalized AccountId
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(id.as_ref().trim().to_lowercase())
    }

    /// Get the inner string
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the identifier is an address in `domain`
    pub fn has_domain(&self, domain: &str) -> bool {
        let domain = domain.trim().trim_start_matches('@').to_lowercase();
        self.0
            .rsplit_once('@')
            .is_some_and(|(_, d)| d == domain)
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for AccountId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Raw categorical tag on a log record, e.g. `"transcript"`
///
/// Usage types are compared exactly; no case folding is applied.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UsageType(String);

impl UsageType {
    /// Create a new UsageType
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Get the inner string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UsageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single attribute value of a schemaless table item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    /// String attribute
    Text(String),
    /// Numeric attribute
    Number(f64),
    /// Boolean attribute
    Bool(bool),
    /// Explicit null
    Null,
    /// Lists, maps, sets and binary values; never used as a report column
    Other,
}

impl FieldValue {
    /// Render a scalar value as text
    ///
    /// Integral numbers are printed without a fractional part so numeric
    /// identifiers such as `42` read back as `"42"`.
    pub fn as_text(&self) -> Option<String> {
        match self {
            Self::Text(s) => Some(s.clone()),
            Self::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => Some(format!("{}", *n as i64)),
            Self::Number(n) => Some(n.to_string()),
            Self::Bool(b) => Some(b.to_string()),
            Self::Null | Self::Other => None,
        }
    }

    /// Whether the value carries no usable data
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(s) => s.trim().is_empty(),
            Self::Null | Self::Other => true,
            _ => false,
        }
    }
}

impl From<serde_json::Value> for FieldValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::String(s) => Self::Text(s),
            serde_json::Value::Number(n) => n.as_f64().map_or(Self::Other, Self::Number),
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Array(_) | serde_json::Value::Object(_) => Self::Other,
        }
    }
}

/// One row returned by a table scan
pub type Item = HashMap<String, FieldValue>;

/// Raw `createdAt` value, tagged by the form it was stored in
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RawTimestamp {
    /// String form: ISO-8601 or a numeric epoch string
    Text(String),
    /// Numeric form: epoch seconds or milliseconds
    Number(f64),
}

impl RawTimestamp {
    /// Tag a field value, if it can hold a timestamp at all
    pub fn from_field(value: &FieldValue) -> Option<Self> {
        match value {
            FieldValue::Text(s) => Some(Self::Text(s.clone())),
            FieldValue::Number(n) => Some(Self::Number(*n)),
            _ => None,
        }
    }
}

impl fmt::Display for RawTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => write!(f, "{s}"),
            Self::Number(n) => write!(f, "{n}"),
        }
    }
}

/// A normalized point in time
///
/// # Examples
/// ```
/// use oakreport_core::types::EventTimestamp;
/// use chrono::{TimeZone, Utc};
///
/// let ts = EventTimestamp::new(Utc.with_ymd_and_hms(2025, 9, 5, 23, 30, 0).unwrap());
/// assert_eq!(ts.date_in(&chrono_tz::Tz::UTC).to_string(), "2025-09-05");
/// assert_eq!(ts.date_in(&chrono_tz::Asia::Hong_Kong).to_string(), "2025-09-06");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EventTimestamp(DateTime<Utc>);

impl EventTimestamp {
    /// Create a new EventTimestamp
    pub fn new(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Get the inner DateTime
    pub fn inner(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Calendar date of this instant in the given reference zone
    pub fn date_in(&self, tz: &Tz) -> NaiveDate {
        self.0.with_timezone(tz).date_naive()
    }
}

/// An account row from the account table
///
/// `id` is the normalized join key; `display_id` keeps the identifier as the
/// account table wrote it (trimmed) and is what reports show.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Normalized identifier (usually an email address)
    pub id: AccountId,
    /// Identifier as stored, surrounding whitespace removed
    pub display_id: String,
    /// Display name, when the account table carries one
    pub username: Option<String>,
}

impl Account {
    /// Create an account without a display name
    pub fn new(id: impl AsRef<str>) -> Self {
        let display_id = id.as_ref().trim().to_string();
        Self {
            id: AccountId::new(&display_id),
            display_id,
            username: None,
        }
    }

    /// Attach a display name
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }
}

/// Which log table a record came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LogKind {
    /// Platform usage log
    Usage,
    /// AI-assist question log
    AiAssist,
}

impl fmt::Display for LogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Usage => write!(f, "usage"),
            Self::AiAssist => write!(f, "ai-assist"),
        }
    }
}

/// A single activity record from one of the log tables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    /// Account the activity belongs to; may not exist in the account table
    pub account: AccountId,
    /// Raw creation time, if the record has one
    pub created_at: Option<RawTimestamp>,
    /// Usage type used for metric classification
    pub usage_type: Option<UsageType>,
    /// Source table
    pub kind: LogKind,
}
