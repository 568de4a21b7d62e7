//! Timezone utilities for date handling
//!
//! Records are bucketed into calendar days in a single reference zone. The
//! report has always been produced in UTC, so UTC is the default; `--timezone`
//! selects another IANA zone for cohorts that want local days.

use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;
use std::str::FromStr;
use tracing::debug;

/// Configuration for timezone handling
#[derive(Debug, Clone)]
pub struct TimezoneConfig {
    /// The timezone to use for date operations
    pub tz: Tz,
    /// Whether the timezone is UTC
    pub is_utc: bool,
}

impl Default for TimezoneConfig {
    fn default() -> Self {
        Self {
            tz: Tz::UTC,
            is_utc: true,
        }
    }
}

impl TimezoneConfig {
    /// Create a new timezone configuration from CLI arguments
    pub fn from_cli(timezone_str: Option<&str>, use_utc: bool) -> crate::error::Result<Self> {
        if use_utc {
            return Ok(Self::default());
        }

        match timezone_str {
            Some(tz_str) => {
                let tz = Tz::from_str(tz_str).map_err(|_| {
                    crate::error::ReportError::InvalidTimezone(format!(
                        "'{}'. Use format like 'Asia/Hong_Kong', 'Europe/London', or 'UTC'",
                        tz_str
                    ))
                })?;
                debug!("Using reference timezone {}", tz.name());
                Ok(Self {
                    tz,
                    is_utc: tz == Tz::UTC,
                })
            }
            None => Ok(Self::default()),
        }
    }

    /// Get the display name for the configured timezone
    pub fn display_name(&self) -> &str {
        if self.is_utc { "UTC" } else { self.tz.name() }
    }

    /// Today's date in the reference zone
    pub fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.tz).date_naive()
    }
}
