//! Common test utilities and helpers for oakreport tests
//!
//! Builders for table items, a fixture writer that lays out JSON table dumps
//! in a temporary directory, and environment-variable helpers.

#![allow(dead_code)]

use chrono::NaiveDate;
use oakreport::{
    metrics::{MetricMapping, MetricsUsageTypeMap},
    source::CohortTables,
};
use once_cell::sync::Lazy;
use serde_json::{Value, json};
use std::env;
use tempfile::TempDir;

// Global mutex to serialize environment variable modifications in tests
pub static ENV_MUTEX: Lazy<tokio::sync::Mutex<()>> = Lazy::new(|| tokio::sync::Mutex::new(()));

/// RAII guard that restores environment variables on drop
pub struct EnvVarGuard {
    vars: Vec<(String, Option<String>)>,
}

impl EnvVarGuard {
    pub fn new() -> Self {
        Self { vars: Vec::new() }
    }

    pub fn set(&mut self, key: &str, value: &str) {
        self.vars.push((key.to_string(), env::var(key).ok()));
        // env mutation is unsafe in edition 2024; callers hold ENV_MUTEX
        unsafe {
            env::set_var(key, value);
        }
    }

    pub fn remove(&mut self, key: &str) {
        self.vars.push((key.to_string(), env::var(key).ok()));
        unsafe {
            env::remove_var(key);
        }
    }
}

impl Drop for EnvVarGuard {
    fn drop(&mut self) {
        for (key, value) in self.vars.iter().rev() {
            unsafe {
                match value {
                    Some(v) => env::set_var(key, v),
                    None => env::remove_var(key),
                }
            }
        }
    }
}

/// Shorthand for a calendar date
pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// `{"Chat Messages": ["chat"]}`
pub fn chat_metrics() -> MetricsUsageTypeMap {
    MetricsUsageTypeMap::new(vec![MetricMapping::new("Chat Messages", ["chat"])]).unwrap()
}

pub fn account_item(id: &str) -> Value {
    json!({ "account": id })
}

pub fn named_account_item(id: &str, username: &str) -> Value {
    json!({ "account": id, "username": username })
}

pub fn usage_item(account: &str, created_at: Value, usage_type: &str) -> Value {
    json!({ "account": account, "createdAt": created_at, "usage_type": usage_type })
}

pub fn ask_ai_item(account: &str, created_at: Value) -> Value {
    json!({ "account": account, "createdAt": created_at, "question": "what is oak?" })
}

/// JSON table dumps in a temporary directory
pub struct TableFixture {
    pub dir: TempDir,
    pub tables: CohortTables,
}

impl TableFixture {
    /// Write the three default tables
    pub fn new(accounts: Vec<Value>, usage: Vec<Value>, ask_ai: Vec<Value>) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let tables = CohortTables::default();
        for (name, rows) in [
            (&tables.accounts, accounts),
            (&tables.usage, usage),
            (&tables.ask_ai, ask_ai),
        ] {
            let path = dir.path().join(format!("{name}.json"));
            std::fs::write(path, serde_json::to_string(&rows).unwrap()).unwrap();
        }
        Self { dir, tables }
    }

    /// Remove one table's dump
    pub fn drop_table(&self, name: &str) {
        std::fs::remove_file(self.dir.path().join(format!("{name}.json"))).unwrap();
    }
}

/// Accounts A1 and A2 with one chat message from A1 on 2025-09-05
pub fn two_account_fixture() -> TableFixture {
    TableFixture::new(
        vec![account_item("A1"), account_item("A2")],
        vec![usage_item("A1", json!("2025-09-05"), "chat")],
        Vec::new(),
    )
}
