//! Record extraction from schemaless table items
//!
//! The account and log tables were written by several services over time and
//! do not agree on column names. Each logical field is resolved through a
//! list of aliases; the first alias present with a non-empty value wins.

use crate::metrics::AI_ASSIST_USAGE_TYPE;
use crate::types::{Account, AccountId, FieldValue, Item, LogKind, LogRecord, RawTimestamp, UsageType};
use std::collections::HashSet;
use tracing::{debug, warn};

/// Column names that may hold the account identifier
pub const ACCOUNT_ALIASES: &[&str] = &[
    "account",
    "email",
    "user",
    "user_id",
    "userId",
    "user_email",
    "userEmail",
    "emailAddress",
    "user_email_address",
];

/// Column names that may hold the display name
pub const USERNAME_ALIASES: &[&str] = &["username", "user_name", "name", "displayName"];

/// Column names that may hold the usage type
pub const USAGE_TYPE_ALIASES: &[&str] = &[
    "usage_type",
    "usageType",
    "type",
    "action",
    "event",
    "event_type",
];

/// Column names that may hold the creation time
pub const CREATED_AT_ALIASES: &[&str] = &[
    "createdAt",
    "created_at",
    "timestamp",
    "createdOn",
    "created_at_ms",
    "created_at_iso",
];

/// First non-empty value among `aliases`
pub fn find_field<'a>(item: &'a Item, aliases: &[&str]) -> Option<&'a FieldValue> {
    aliases
        .iter()
        .filter_map(|alias| item.get(*alias))
        .find(|value| !value.is_empty())
}

fn find_text(item: &Item, aliases: &[&str]) -> Option<String> {
    find_field(item, aliases)
        .and_then(FieldValue::as_text)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Extract an account, or `None` when the item has no identifier
pub fn account_from_item(item: &Item) -> Option<Account> {
    let id = find_text(item, ACCOUNT_ALIASES)?;
    let username = find_text(item, USERNAME_ALIASES);
    Some(Account {
        username,
        ..Account::new(id)
    })
}

/// Extract a log record, or `None` when the item has no account identifier
///
/// AI-assist records are always classified as [`AI_ASSIST_USAGE_TYPE`].
pub fn log_record_from_item(item: &Item, kind: LogKind) -> Option<LogRecord> {
    let account = AccountId::new(find_text(item, ACCOUNT_ALIASES)?);
    let usage_type = match kind {
        LogKind::Usage => find_text(item, USAGE_TYPE_ALIASES).map(UsageType::new),
        LogKind::AiAssist => Some(UsageType::new(AI_ASSIST_USAGE_TYPE)),
    };

    Some(LogRecord {
        account,
        created_at: find_field(item, CREATED_AT_ALIASES).and_then(RawTimestamp::from_field),
        usage_type,
        kind,
    })
}

/// Build the cohort's account list
///
/// Keeps table order, drops items without an identifier, keeps the first of
/// any duplicate identifiers, and removes accounts in `excluded_domains`.
pub fn collect_accounts(items: &[Item], excluded_domains: &[String]) -> Vec<Account> {
    let mut seen = HashSet::new();
    let mut accounts = Vec::with_capacity(items.len());
    let mut missing_id = 0usize;

    for item in items {
        let Some(account) = account_from_item(item) else {
            missing_id += 1;
            continue;
        };
        if excluded_domains.iter().any(|d| account.id.has_domain(d)) {
            debug!("Excluding account {}", account.id);
            continue;
        }
        if !seen.insert(account.id.clone()) {
            debug!("Skipping duplicate account {}", account.id);
            continue;
        }
        accounts.push(account);
    }

    if missing_id > 0 {
        warn!("Skipped {} account rows without an identifier", missing_id);
    }

    accounts
}

/// Extract every log record of `kind` from `items`
pub fn collect_log_records(items: &[Item], kind: LogKind) -> Vec<LogRecord> {
    let records: Vec<LogRecord> = items
        .iter()
        .filter_map(|item| log_record_from_item(item, kind))
        .collect();

    let missing = items.len() - records.len();
    if missing > 0 {
        debug!("Skipped {} {} log rows without an account", missing, kind);
    }

    records
}
