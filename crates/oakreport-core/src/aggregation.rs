//! Aggregation module for per-account usage reports
//!
//! The [`Aggregator`] turns the cohort's account list and its already
//! filtered log records into a [`ReportTable`]: one row per account, in
//! account-table order, with one count per configured metric.
//!
//! - Accounts with no activity keep a zero in every metric column.
//! - A usage type mapped to several metrics increments each of them.
//! - Records for accounts missing from the account table are skipped and
//!   counted in [`AggregationStats::orphan_records`]; they never add rows.
//!
//! # Examples
//!
//! ```
//! use oakreport_core::aggregation::Aggregator;
//! use oakreport_core::metrics::{MetricMapping, MetricsUsageTypeMap};
//! use oakreport_core::types::{Account, AccountId, LogKind, LogRecord, RawTimestamp, UsageType};
//!
//! let metrics = MetricsUsageTypeMap::new(vec![MetricMapping::new("Chat Messages", ["chat"])]).unwrap();
//! let accounts = vec![Account::new("A1"), Account::new("A2")];
//! let records = vec![LogRecord {
//!     account: AccountId::new("A1"),
//!     created_at: Some(RawTimestamp::Text("2025-09-05".into())),
//!     usage_type: Some(UsageType::new("chat")),
//!     kind: LogKind::Usage,
//! }];
//!
//! let table = Aggregator::new(&metrics).aggregate(&accounts, &records);
//! assert_eq!(table.rows[0].counts, vec![1]);
//! assert_eq!(table.rows[1].counts, vec![0]);
//! ```

use crate::metrics::MetricsUsageTypeMap;
use crate::types::{Account, AccountId, LogRecord};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// Fixed leading columns of every report
pub const ACCOUNT_COLUMNS: [&str; 2] = ["Account", "Username"];

/// One account's line in the report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRow {
    /// Account identifier as stored in the account table
    pub account: String,
    /// Display name, if known
    pub username: Option<String>,
    /// One count per metric, in the metric map's order
    pub counts: Vec<u64>,
}

impl ReportRow {
    fn zeroed(account: &Account, metrics: usize) -> Self {
        Self {
            account: account.display_id.clone(),
            username: account.username.clone(),
            counts: vec![0; metrics],
        }
    }

    /// Display fields as strings, empty when absent
    pub fn account_cells(&self) -> [String; 2] {
        [
            self.account.clone(),
            self.username.clone().unwrap_or_default(),
        ]
    }
}

/// The aggregated report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportTable {
    /// Metric column names, in order
    pub metric_names: Vec<String>,
    /// One row per account, in account-table order
    pub rows: Vec<ReportRow>,
}

impl ReportTable {
    /// Header row: account columns followed by metric names
    pub fn header(&self) -> Vec<String> {
        ACCOUNT_COLUMNS
            .iter()
            .map(|c| c.to_string())
            .chain(self.metric_names.iter().cloned())
            .collect()
    }

    /// Column-wise metric totals
    pub fn totals(&self) -> Vec<u64> {
        let mut totals = vec![0; self.metric_names.len()];
        for row in &self.rows {
            for (total, count) in totals.iter_mut().zip(&row.counts) {
                *total += count;
            }
        }
        totals
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Counters collected during aggregation
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AggregationStats {
    /// Records that incremented at least one metric
    pub counted_records: usize,
    /// Records whose usage type maps to no metric
    pub unmapped_records: usize,
    /// Records whose account is not in the account table
    pub orphan_records: usize,
}

/// Builds report tables against a fixed metric map
pub struct Aggregator<'a> {
    metrics: &'a MetricsUsageTypeMap,
}

impl<'a> Aggregator<'a> {
    /// Create an aggregator for the given metric map
    pub fn new(metrics: &'a MetricsUsageTypeMap) -> Self {
        Self { metrics }
    }

    /// The metric map in use
    pub fn metrics(&self) -> &MetricsUsageTypeMap {
        self.metrics
    }

    /// Aggregate filtered records into a zero-filled table
    pub fn aggregate<'r, I>(&self, accounts: &[Account], records: I) -> ReportTable
    where
        I: IntoIterator<Item = &'r LogRecord>,
    {
        self.aggregate_with_stats(accounts, records).0
    }

    /// Aggregate and report what happened to each record
    pub fn aggregate_with_stats<'r, I>(
        &self,
        accounts: &[Account],
        records: I,
    ) -> (ReportTable, AggregationStats)
    where
        I: IntoIterator<Item = &'r LogRecord>,
    {
        let mut rows: Vec<ReportRow> = accounts
            .iter()
            .map(|account| ReportRow::zeroed(account, self.metrics.len()))
            .collect();

        let positions: HashMap<&AccountId, usize> = accounts
            .iter()
            .enumerate()
            .map(|(position, account)| (&account.id, position))
            .collect();

        let mut stats = AggregationStats::default();

        for record in records {
            let slots = record
                .usage_type
                .as_ref()
                .map(|usage_type| self.metrics.metrics_for(usage_type))
                .unwrap_or(&[]);

            let Some(&position) = positions.get(&record.account) else {
                stats.orphan_records += 1;
                continue;
            };

            if slots.is_empty() {
                stats.unmapped_records += 1;
                continue;
            }

            let row = &mut rows[position];
            for &slot in slots {
                row.counts[slot] += 1;
            }
            stats.counted_records += 1;
        }

        debug!(
            "Aggregated {} records into {} rows ({} unmapped, {} orphaned)",
            stats.counted_records,
            rows.len(),
            stats.unmapped_records,
            stats.orphan_records
        );

        (
            ReportTable {
                metric_names: self.metrics.metric_names(),
                rows,
            },
            stats,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::MetricMapping;
    use crate::test_utils::{account, ask_ai_log, usage_log};

    fn chat_map() -> MetricsUsageTypeMap {
        MetricsUsageTypeMap::new(vec![MetricMapping::new("Chat Messages", ["chat"])]).unwrap()
    }

    #[test]
    fn test_zero_fill_preserves_account_order() {
        let metrics = chat_map();
        let accounts = vec![account("z@x"), account("a@x"), account("m@x")];

        let no_records: Vec<LogRecord> = Vec::new();

        let table = Aggregator::new(&metrics).aggregate(&accounts, &no_records);

        let ids: Vec<&str> = table.rows.iter().map(|r| r.account.as_str()).collect();
        assert_eq!(ids, vec!["z@x", "a@x", "m@x"]);
        assert!(table.rows.iter().all(|r| r.counts == vec![0]));
    }

    #[test]
    fn test_scenario_two_accounts_one_chat() {
        let metrics = chat_map();
        let accounts = vec![account("A1"), account("A2")];
        let records = vec![usage_log("A1", "2025-09-05", "chat")];

        let table = Aggregator::new(&metrics).aggregate(&accounts, &records);

        assert_eq!(table.header(), vec!["Account", "Username", "Chat Messages"]);
        assert_eq!(table.rows[0].account, "A1");
        assert_eq!(table.rows[0].counts, vec![1]);
        assert_eq!(table.rows[1].account, "A2");
        assert_eq!(table.rows[1].counts, vec![0]);
    }

    #[test]
    fn test_logs_join_case_insensitively_but_keep_stored_id() {
        let metrics = chat_map();
        let accounts = vec![account("Alice@VTC.edu.hk")];
        let records = vec![usage_log(" alice@vtc.EDU.hk ", "2025-09-05", "chat")];

        let table = Aggregator::new(&metrics).aggregate(&accounts, &records);

        assert_eq!(table.rows[0].account, "Alice@VTC.edu.hk");
        assert_eq!(table.rows[0].counts, vec![1]);
    }

    #[test]
    fn test_multi_metric_usage_type_increments_all() {
        let metrics = MetricsUsageTypeMap::new(vec![
            MetricMapping::new("Summaries", ["initial summary", "regenerate summary"]),
            MetricMapping::new("Regenerations", ["regenerate summary"]),
        ])
        .unwrap();
        let accounts = vec![account("a1")];
        let records = vec![
            usage_log("a1", "2025-09-05", "regenerate summary"),
            usage_log("a1", "2025-09-05", "initial summary"),
        ];

        let table = Aggregator::new(&metrics).aggregate(&accounts, &records);
        assert_eq!(table.rows[0].counts, vec![2, 1]);
    }

    #[test]
    fn test_orphans_and_unmapped_are_skipped() {
        let metrics = chat_map();
        let accounts = vec![account("a1")];
        let records = vec![
            usage_log("ghost", "2025-09-05", "chat"),
            usage_log("a1", "2025-09-05", "upload"),
            usage_log("a1", "2025-09-05", "chat"),
        ];

        let (table, stats) = Aggregator::new(&metrics).aggregate_with_stats(&accounts, &records);

        assert_eq!(table.len(), 1);
        assert_eq!(table.rows[0].counts, vec![1]);
        assert_eq!(
            stats,
            AggregationStats {
                counted_records: 1,
                unmapped_records: 1,
                orphan_records: 1,
            }
        );
    }

    #[test]
    fn test_ai_assist_records_use_default_map() {
        let metrics = MetricsUsageTypeMap::default();
        let accounts = vec![account("a1").with_username("Alice")];
        let records = vec![
            ask_ai_log("a1", "2025-09-05"),
            ask_ai_log("a1", "2025-09-06"),
            usage_log("a1", "2025-09-06", "transcript"),
        ];

        let table = Aggregator::new(&metrics).aggregate(&accounts, &records);
        assert_eq!(table.rows[0].counts, vec![0, 0, 1, 0, 0, 0, 0, 2]);
        assert_eq!(
            table.rows[0].account_cells(),
            ["a1".to_string(), "Alice".to_string()]
        );
    }

    #[test]
    fn test_totals_and_idempotence() {
        let metrics = chat_map();
        let accounts = vec![account("a1"), account("a2")];
        let records = vec![
            usage_log("a1", "2025-09-05", "chat"),
            usage_log("a2", "2025-09-05", "chat"),
            usage_log("a2", "2025-09-06", "chat"),
        ];

        let aggregator = Aggregator::new(&metrics);
        let first = aggregator.aggregate(&accounts, &records);
        let second = aggregator.aggregate(&accounts, &records);

        assert_eq!(first, second);
        assert_eq!(first.totals(), vec![3]);
    }
}
