//! Shared test utilities for unit tests
//!
//! Note: Integration tests (in tests/) cannot access this module because it's
//! marked with #[cfg(test)]. Integration tests have their own builders in
//! tests/common/mod.rs.

use crate::types::{Account, AccountId, LogKind, LogRecord, RawTimestamp, UsageType};
use chrono::NaiveDate;

/// Shorthand for a calendar date
pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Account with no display name
pub fn account(id: &str) -> Account {
    Account::new(id)
}

/// Usage-log record with a string `createdAt`
pub fn usage_log(account: &str, created_at: &str, usage_type: &str) -> LogRecord {
    LogRecord {
        account: AccountId::new(account),
        created_at: Some(RawTimestamp::Text(created_at.to_string())),
        usage_type: Some(UsageType::new(usage_type)),
        kind: LogKind::Usage,
    }
}

/// AI-assist record with a string `createdAt`
pub fn ask_ai_log(account: &str, created_at: &str) -> LogRecord {
    LogRecord {
        account: AccountId::new(account),
        created_at: Some(RawTimestamp::Text(created_at.to_string())),
        usage_type: Some(UsageType::new(crate::metrics::AI_ASSIST_USAGE_TYPE)),
        kind: LogKind::AiAssist,
    }
}
