//! Report pipeline
//!
//! Resolves and validates the date range, fetches the three cohort tables,
//! extracts accounts and log records, filters by calendar day in the
//! reference zone, and aggregates per-account metric counts. Rendering is
//! left to the caller.

use crate::error::Result;
use chrono::NaiveDate;
use chrono_tz::Tz;
use oakreport_core::aggregation::{AggregationStats, Aggregator, ReportTable};
use oakreport_core::filters::{DateRange, FilterStats, RecordFilter};
use oakreport_core::metrics::MetricsUsageTypeMap;
use oakreport_core::records::{collect_accounts, collect_log_records};
use oakreport_core::source::{CohortTables, TableSource, fetch_cohort};
use oakreport_core::types::LogKind;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, info};

/// What to report on
#[derive(Debug, Clone)]
pub struct ReportRequest {
    /// Requested first day
    pub start: Option<NaiveDate>,
    /// Requested last day
    pub end: Option<NaiveDate>,
    /// Today in the reference zone
    pub today: NaiveDate,
    /// Reference zone for calendar days
    pub timezone: Tz,
    /// Whether records are filtered by date at all
    pub date_filter: bool,
    /// Tables to read
    pub tables: CohortTables,
    /// Account domains to leave out
    pub exclude_domains: Vec<String>,
}

impl ReportRequest {
    /// Request for the default window ending `today`, UTC days
    pub fn new(today: NaiveDate) -> Self {
        Self {
            start: None,
            end: None,
            today,
            timezone: Tz::UTC,
            date_filter: true,
            tables: CohortTables::default(),
            exclude_domains: Vec::new(),
        }
    }

    /// Set explicit start and end dates
    pub fn with_dates(mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        self.start = start;
        self.end = end;
        self
    }

    /// Set the reference zone
    pub fn with_timezone(mut self, tz: Tz) -> Self {
        self.timezone = tz;
        self
    }

    /// Resolve the effective range, rejecting `start > end`
    pub fn resolve_range(&self) -> Result<DateRange> {
        DateRange::resolve(self.start, self.end, self.today)
    }

    fn record_filter(&self, range: DateRange) -> RecordFilter {
        let filter = RecordFilter::new().with_timezone(self.timezone);
        if self.date_filter {
            filter.with_range(range)
        } else {
            filter
        }
    }
}

/// Diagnostics collected along the pipeline
#[derive(Debug, Clone, Default, Serialize)]
pub struct FetchSummary {
    /// Items read from the account table
    pub account_items: usize,
    /// Accounts kept after normalization, dedup and exclusion
    pub accounts: usize,
    /// Usage-log records extracted
    pub usage_records: usize,
    /// AI-assist records extracted
    pub ask_ai_records: usize,
    /// Date filter counters over both logs
    pub filter: FilterStats,
    /// Aggregation counters
    pub aggregation: AggregationStats,
    /// Occurrences of each usage type among the kept records
    pub usage_types: BTreeMap<String, usize>,
}

/// Aggregated report plus the range it covers
#[derive(Debug, Clone)]
pub struct ReportOutcome {
    /// One row per account with its metric counts
    pub table: ReportTable,
    /// Effective date range, also used for labels and file names
    pub range: DateRange,
    /// Counters from extraction, filtering and aggregation
    pub summary: FetchSummary,
}

/// Run the pipeline against `source`
///
/// The range is validated before any table is read, so an invalid range
/// never reaches the backend.
pub async fn build_report<S>(
    source: &S,
    request: &ReportRequest,
    metrics: &MetricsUsageTypeMap,
) -> Result<ReportOutcome>
where
    S: TableSource + ?Sized,
{
    let range = request.resolve_range()?;
    info!("Building report for {}", range.label());

    let items = fetch_cohort(source, &request.tables).await?;

    let accounts = collect_accounts(&items.accounts, &request.exclude_domains);
    let mut records = collect_log_records(&items.usage, LogKind::Usage);
    let usage_records = records.len();
    records.extend(collect_log_records(&items.ask_ai, LogKind::AiAssist));
    let ask_ai_records = records.len() - usage_records;

    let (kept, filter_stats) = request.record_filter(range).apply(records);
    debug!(
        "Date filter kept {} of {} records ({} out of range, {} unparseable)",
        filter_stats.included, filter_stats.total, filter_stats.out_of_range, filter_stats.unparseable
    );

    let mut usage_types = BTreeMap::new();
    for usage_type in kept.iter().filter_map(|r| r.usage_type.as_ref()) {
        *usage_types.entry(usage_type.as_str().to_string()).or_insert(0) += 1;
    }
    debug!("Usage types in range: {:?}", usage_types);

    let (table, aggregation) = Aggregator::new(metrics).aggregate_with_stats(&accounts, &kept);
    info!(
        "Aggregated {} records for {} accounts",
        aggregation.counted_records,
        table.len()
    );

    Ok(ReportOutcome {
        range,
        summary: FetchSummary {
            account_items: items.accounts.len(),
            accounts: accounts.len(),
            usage_records,
            ask_ai_records,
            filter: filter_stats,
            aggregation,
            usage_types,
        },
        table,
    })
}
