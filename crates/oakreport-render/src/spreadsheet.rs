//! Excel output
//!
//! One worksheet, a bold header row, then one row per account. No index
//! column and no metadata rows, so the sheet can be filtered and pivoted
//! as-is.

use crate::output::{RenderContext, ReportRenderer};
use oakreport_core::error::{ReportError, Result};
use rust_xlsxwriter::{Format, Workbook, XlsxError};

/// Worksheet name
pub const SHEET_NAME: &str = "VTC Usage Report";

/// Renders `.xlsx` workbooks
pub struct SpreadsheetRenderer;

impl ReportRenderer for SpreadsheetRenderer {
    fn extension(&self) -> &'static str {
        "xlsx"
    }

    fn render(&self, ctx: &RenderContext<'_>) -> Result<Vec<u8>> {
        build_workbook(ctx).map_err(|e| ReportError::Serialization(e.to_string()))
    }
}

fn build_workbook(ctx: &RenderContext<'_>) -> std::result::Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;

    for (col, name) in ctx.table.header().iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, name, &header_format)?;
    }

    for (index, row) in ctx.table.rows.iter().enumerate() {
        let line = index as u32 + 1;
        let [account, username] = row.account_cells();
        worksheet.write_string(line, 0, &account)?;
        worksheet.write_string(line, 1, &username)?;
        for (offset, count) in row.counts.iter().enumerate() {
            worksheet.write_number(line, (offset + 2) as u16, *count as f64)?;
        }
    }

    worksheet.autofit();
    workbook.save_to_buffer()
}
