//! Table source trait
//!
//! This module defines the `TableSource` trait that every data backend
//! implements (DynamoDB in production, JSON dumps for offline runs and
//! tests), plus the cohort fetch that reads the three report tables.

use crate::error::Result;
use crate::types::Item;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Default account table for the VTC cohort
pub const DEFAULT_ACCOUNTS_TABLE: &str = "oak-account-vtc";
/// Default usage-log table for the VTC cohort
pub const DEFAULT_USAGE_TABLE: &str = "oak-usage-log-vtc";
/// Default AI-assist-log table for the VTC cohort
pub const DEFAULT_ASKAI_TABLE: &str = "oak-ask-ai-vtc";

/// Trait for table backends.
///
/// A scan returns every item of the table; pagination is the backend's
/// concern. Failures are reported as [`ReportError::Fetch`](crate::ReportError::Fetch)
/// naming the table.
#[async_trait]
pub trait TableSource: Send + Sync {
    /// Short backend name for log messages
    fn name(&self) -> &str;

    /// Read every item of `table`
    async fn scan(&self, table: &str) -> Result<Vec<Item>>;
}

/// The three tables a cohort report reads
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CohortTables {
    /// Account table
    pub accounts: String,
    /// Usage-log table
    pub usage: String,
    /// AI-assist-log table
    pub ask_ai: String,
}

impl Default for CohortTables {
    fn default() -> Self {
        Self {
            accounts: DEFAULT_ACCOUNTS_TABLE.to_string(),
            usage: DEFAULT_USAGE_TABLE.to_string(),
            ask_ai: DEFAULT_ASKAI_TABLE.to_string(),
        }
    }
}

/// Raw items of the three cohort tables
#[derive(Debug, Clone, Default)]
pub struct CohortItems {
    /// Account table items
    pub accounts: Vec<Item>,
    /// Usage-log items
    pub usage: Vec<Item>,
    /// AI-assist-log items
    pub ask_ai: Vec<Item>,
}

/// Scan the three cohort tables concurrently
///
/// Returns only once all three scans have completed; the first failure
/// aborts the fetch.
pub async fn fetch_cohort<S>(source: &S, tables: &CohortTables) -> Result<CohortItems>
where
    S: TableSource + ?Sized,
{
    debug!(
        "Scanning {}, {}, {} via {}",
        tables.accounts,
        tables.usage,
        tables.ask_ai,
        source.name()
    );

    let (accounts, usage, ask_ai) = futures::try_join!(
        source.scan(&tables.accounts),
        source.scan(&tables.usage),
        source.scan(&tables.ask_ai),
    )?;

    debug!(
        "Fetched {} accounts, {} usage rows, {} AI-assist rows",
        accounts.len(),
        usage.len(),
        ask_ai.len()
    );

    Ok(CohortItems {
        accounts,
        usage,
        ask_ai,
    })
}
