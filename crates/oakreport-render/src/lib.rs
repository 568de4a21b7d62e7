//! Report output for oakreport
//!
//! This crate renders an aggregated report table as an Excel workbook, a
//! Word document, a terminal table, or JSON, and writes files atomically.

pub mod branding;
pub mod document;
pub mod output;
pub mod preview;
pub mod spreadsheet;
pub mod writer;

#[cfg(test)]
mod test_util;

pub use branding::BrandingAsset;
pub use output::{RenderContext, ReportFormat, ReportRenderer, get_renderer};
pub use writer::write_report;
