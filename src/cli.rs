//! CLI interface for oakreport
//!
//! A single command: every option is a flag, and connection settings fall
//! back to `VTC_*` environment variables (a `.env` file is loaded first).
//!
//! # Example
//!
//! ```bash
//! # September 2025 as an Excel workbook
//! oakreport --start-date 2025-09-01 --end-date 2025-09-30
//!
//! # Last 30 days as a Word document, Hong Kong calendar days
//! oakreport --format docx --timezone Asia/Hong_Kong
//!
//! # Offline run against JSON table dumps, printed to the terminal
//! oakreport --data-dir ./dumps --preview
//! ```

use crate::error::{ReportError, Result};
use chrono::NaiveDate;
use clap::Parser;
use oakreport_core::source::{
    CohortTables, DEFAULT_ACCOUNTS_TABLE, DEFAULT_ASKAI_TABLE, DEFAULT_USAGE_TABLE,
};
use oakreport_dynamodb::DynamoDbConfig;
use oakreport_render::ReportFormat;
use std::path::PathBuf;

/// Generate VTC OAK usage reports from DynamoDB tables
#[derive(Parser, Debug, Clone)]
#[command(name = "oakreport")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// First day of the report (YYYY-MM-DD); defaults to 29 days before the end date
    #[arg(long, value_parser = parse_date_arg)]
    pub start_date: Option<NaiveDate>,

    /// Last day of the report (YYYY-MM-DD); defaults to today
    #[arg(long, value_parser = parse_date_arg)]
    pub end_date: Option<NaiveDate>,

    /// Output format: excel or docx
    #[arg(long, short = 'f', default_value = "excel")]
    pub format: ReportFormat,

    /// Output path (default: vtc_report_<start>_<end>.<ext>)
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Timezone that defines calendar days (e.g. "Asia/Hong_Kong")
    #[arg(long, short = 'z')]
    pub timezone: Option<String>,

    /// Use UTC calendar days (overrides --timezone)
    #[arg(long)]
    pub utc: bool,

    /// Count every record regardless of its timestamp
    #[arg(long)]
    pub no_date_filter: bool,

    /// Drop accounts whose identifier ends with @DOMAIN (repeatable)
    #[arg(long = "exclude-domain", value_name = "DOMAIN")]
    pub exclude_domains: Vec<String>,

    /// JSON file with the metric to usage-type map
    #[arg(long, value_name = "PATH")]
    pub metrics_map: Option<PathBuf>,

    /// Read tables from <DIR>/<table>.json instead of DynamoDB
    #[arg(long, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Logo for the document header (PNG)
    #[arg(long, value_name = "PATH")]
    pub logo: Option<PathBuf>,

    /// Report title
    #[arg(long, default_value = oakreport_render::output::DEFAULT_TITLE)]
    pub title: String,

    /// Print the report as a table instead of writing a file
    #[arg(long, conflicts_with = "json")]
    pub preview: bool,

    /// Print the report as JSON instead of writing a file
    #[arg(long)]
    pub json: bool,

    /// Show debug output
    #[arg(long, short = 'v', conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only show warnings and errors
    #[arg(long, short = 'q')]
    pub quiet: bool,

    #[command(flatten)]
    pub connection: ConnectionArgs,
}

/// DynamoDB connection and table names
#[derive(clap::Args, Debug, Clone)]
pub struct ConnectionArgs {
    /// AWS region
    #[arg(long, env = "VTC_DYNAMODB_REGION")]
    pub region: Option<String>,

    /// AWS access key id
    #[arg(long, env = "VTC_DYNAMODB_ACCESS_KEY_ID", hide_env_values = true)]
    pub access_key_id: Option<String>,

    /// AWS secret access key
    #[arg(long, env = "VTC_DYNAMODB_SECRET_ACCESS_KEY", hide_env_values = true)]
    pub secret_access_key: Option<String>,

    /// Custom DynamoDB endpoint
    #[arg(long, env = "VTC_DYNAMODB_ENDPOINT")]
    pub endpoint_url: Option<String>,

    /// Account table
    #[arg(long, env = "VTC_ACCOUNTS_TABLE", default_value = DEFAULT_ACCOUNTS_TABLE)]
    pub accounts_table: String,

    /// Usage-log table
    #[arg(long, env = "VTC_USAGE_TABLE", default_value = DEFAULT_USAGE_TABLE)]
    pub usage_table: String,

    /// AI-assist-log table
    #[arg(long, env = "VTC_ASKAI_TABLE", default_value = DEFAULT_ASKAI_TABLE)]
    pub askai_table: String,
}

impl ConnectionArgs {
    /// Table names for the cohort fetch
    pub fn tables(&self) -> CohortTables {
        CohortTables {
            accounts: self.accounts_table.clone(),
            usage: self.usage_table.clone(),
            ask_ai: self.askai_table.clone(),
        }
    }

    /// Client settings for the DynamoDB source
    pub fn dynamodb_config(&self) -> DynamoDbConfig {
        DynamoDbConfig {
            region: non_empty(&self.region),
            access_key_id: non_empty(&self.access_key_id),
            secret_access_key: non_empty(&self.secret_access_key),
            endpoint_url: non_empty(&self.endpoint_url),
        }
    }
}

// An empty variable in .env means "not set"
fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Keep only the `.env` failures worth reporting
///
/// A missing file is normal; a file that exists but cannot be read or parsed
/// is returned so the caller can warn about it.
pub fn env_file_error<T>(result: std::result::Result<T, dotenvy::Error>) -> Option<dotenvy::Error> {
    match result {
        Ok(_) => None,
        Err(e) if e.not_found() => None,
        Err(e) => Some(e),
    }
}

/// Parse a strict `YYYY-MM-DD` date
pub fn parse_date_arg(date_str: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d").map_err(|_| {
        ReportError::InvalidDate(format!("'{date_str}', expected YYYY-MM-DD"))
    })
}
