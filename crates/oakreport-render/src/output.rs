//! Output format selection
//!
//! [`ReportRenderer`] is implemented once per file format. Each renderer
//! turns a [`RenderContext`] into the bytes of a complete file; writing those
//! bytes to disk is [`write_report`](crate::writer::write_report)'s job.
//!
//! # Examples
//!
//! ```
//! use oakreport_render::output::{ReportFormat, get_renderer};
//!
//! let format: ReportFormat = "docx".parse().unwrap();
//! assert_eq!(get_renderer(format).extension(), "docx");
//! ```

use crate::branding::BrandingAsset;
use crate::document::DocumentRenderer;
use crate::spreadsheet::SpreadsheetRenderer;
use chrono::{DateTime, Utc};
use oakreport_core::aggregation::ReportTable;
use oakreport_core::error::Result;
use oakreport_core::filters::DateRange;
use std::fmt;

/// Default report title
pub const DEFAULT_TITLE: &str = "VTC OAK Usage Report";

/// Output file format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReportFormat {
    /// Excel workbook (`.xlsx`)
    #[default]
    Excel,
    /// Word document (`.docx`)
    Docx,
}

impl ReportFormat {
    /// Human-readable format name used in messages
    pub fn label(&self) -> &'static str {
        match self {
            Self::Excel => "Excel",
            Self::Docx => "DOCX",
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Excel => write!(f, "excel"),
            Self::Docx => write!(f, "docx"),
        }
    }
}

impl std::str::FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "excel" | "xlsx" => Ok(Self::Excel),
            "docx" | "word" => Ok(Self::Docx),
            _ => Err(format!("Invalid format '{s}', expected 'excel' or 'docx'")),
        }
    }
}

/// Everything a renderer needs to produce a file
pub struct RenderContext<'a> {
    /// Aggregated table
    pub table: &'a ReportTable,
    /// Effective date range
    pub range: &'a DateRange,
    /// Reference zone label shown next to the range
    pub timezone_label: &'a str,
    /// When the report was generated
    pub generated_at: DateTime<Utc>,
    /// Document title
    pub title: &'a str,
    /// Logo for the document header, if one was found
    pub branding: Option<&'a BrandingAsset>,
}

impl<'a> RenderContext<'a> {
    /// Context with the default title and no branding
    pub fn new(table: &'a ReportTable, range: &'a DateRange, generated_at: DateTime<Utc>) -> Self {
        Self {
            table,
            range,
            timezone_label: "UTC",
            generated_at,
            title: DEFAULT_TITLE,
            branding: None,
        }
    }

    /// Set the reference zone label
    pub fn with_timezone_label(mut self, label: &'a str) -> Self {
        self.timezone_label = label;
        self
    }

    /// Set the title
    pub fn with_title(mut self, title: &'a str) -> Self {
        self.title = title;
        self
    }

    /// Attach a logo
    pub fn with_branding(mut self, branding: Option<&'a BrandingAsset>) -> Self {
        self.branding = branding;
        self
    }

    /// Subtitle line: date range and generation time
    pub fn subtitle(&self) -> String {
        format!(
            "Date Range: {} ({})    Generated: {}",
            self.range.label(),
            self.timezone_label,
            self.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
        )
    }
}

/// Trait for file renderers
pub trait ReportRenderer {
    /// File extension without the dot
    fn extension(&self) -> &'static str;

    /// Serialize the report into the bytes of a complete file
    fn render(&self, ctx: &RenderContext<'_>) -> Result<Vec<u8>>;
}

/// Get the renderer for `format`
pub fn get_renderer(format: ReportFormat) -> Box<dyn ReportRenderer> {
    match format {
        ReportFormat::Excel => Box::new(SpreadsheetRenderer),
        ReportFormat::Docx => Box::new(DocumentRenderer),
    }
}

/// Default output file name, e.g. `vtc_report_20250901_20250930.xlsx`
pub fn default_output_name(format: ReportFormat, range: &DateRange) -> String {
    format!(
        "vtc_report_{}.{}",
        range.file_stem(),
        get_renderer(format).extension()
    )
}
