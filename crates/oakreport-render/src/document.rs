//! Word document output
//!
//! Layout from top to bottom: the optional logo, a bold centred title, the
//! centred subtitle with date range and generation time, a spacer, and the
//! report table with a bold header row.

use crate::branding::BrandingAsset;
use crate::output::{RenderContext, ReportRenderer};
use docx_rs::{AlignmentType, Docx, Paragraph, Pic, Run, Table, TableCell, TableRow};
use oakreport_core::error::{ReportError, Result};
use std::io::Cursor;

/// Logo width in EMU (1.5 inches)
pub const LOGO_WIDTH_EMU: u32 = 1_371_600;

// Half-points
const TITLE_SIZE: usize = 32;
const BODY_SIZE: usize = 20;

/// Renders `.docx` documents
pub struct DocumentRenderer;

impl ReportRenderer for DocumentRenderer {
    fn extension(&self) -> &'static str {
        "docx"
    }

    fn render(&self, ctx: &RenderContext<'_>) -> Result<Vec<u8>> {
        let mut docx = Docx::new();

        if let Some(logo) = ctx.branding {
            docx = docx.add_paragraph(
                Paragraph::new()
                    .add_run(Run::new().add_image(logo_picture(logo)))
                    .align(AlignmentType::Center),
            );
        }

        docx = docx
            .add_paragraph(
                Paragraph::new()
                    .add_run(Run::new().add_text(ctx.title).bold().size(TITLE_SIZE))
                    .align(AlignmentType::Center),
            )
            .add_paragraph(
                Paragraph::new()
                    .add_run(Run::new().add_text(ctx.subtitle()).size(BODY_SIZE))
                    .align(AlignmentType::Center),
            )
            .add_paragraph(Paragraph::new())
            .add_table(report_table(ctx));

        let mut buffer = Cursor::new(Vec::new());
        docx.build()
            .pack(&mut buffer)
            .map_err(|e| ReportError::Serialization(e.to_string()))?;
        Ok(buffer.into_inner())
    }
}

fn logo_picture(logo: &BrandingAsset) -> Pic {
    let (width, height) = logo.scaled_emu(LOGO_WIDTH_EMU);
    Pic::new_with_dimensions(logo.bytes.clone(), logo.width_px, logo.height_px).size(width, height)
}

fn text_cell(text: &str, bold: bool) -> TableCell {
    let mut run = Run::new().add_text(text).size(BODY_SIZE);
    if bold {
        run = run.bold();
    }
    TableCell::new().add_paragraph(Paragraph::new().add_run(run))
}

fn report_table(ctx: &RenderContext<'_>) -> Table {
    let header = TableRow::new(
        ctx.table
            .header()
            .iter()
            .map(|name| text_cell(name, true))
            .collect(),
    );

    let rows = ctx.table.rows.iter().map(|row| {
        let cells = row
            .account_cells()
            .iter()
            .map(|cell| text_cell(cell, false))
            .chain(row.counts.iter().map(|count| text_cell(&count.to_string(), false)))
            .collect();
        TableRow::new(cells)
    });

    Table::new(std::iter::once(header).chain(rows).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::branding::tests::tiny_png;
    use crate::test_util::{element_texts, zip_entry, zip_entry_names};
    use chrono::{NaiveDate, Utc};
    use oakreport_core::aggregation::{ReportRow, ReportTable};
    use oakreport_core::filters::DateRange;

    fn sample() -> (ReportTable, DateRange) {
        let table = ReportTable {
            metric_names: vec!["Chat Messages".into(), "AskAI Questions".into()],
            rows: vec![ReportRow {
                account: "A1".into(),
                username: Some("Alice".into()),
                counts: vec![3, 1],
            }],
        };
        let range = DateRange::new(
            NaiveDate::from_ymd_opt(2025, 9, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 9, 30).unwrap(),
        )
        .unwrap();
        (table, range)
    }

    #[test]
    fn test_title_subtitle_then_table() {
        let (table, range) = sample();
        let ctx = RenderContext::new(&table, &range, Utc::now());

        let bytes = DocumentRenderer.render(&ctx).unwrap();

        assert_eq!(&bytes[..2], b"PK");
        let xml = zip_entry(&bytes, "word/document.xml");
        assert!(!xml.contains("<w:drawing"));
        assert_eq!(
            element_texts(&xml, "w:t"),
            vec![
                "VTC OAK Usage Report".to_string(),
                ctx.subtitle(),
                "Account".into(),
                "Username".into(),
                "Chat Messages".into(),
                "AskAI Questions".into(),
                "A1".into(),
                "Alice".into(),
                "3".into(),
                "1".into(),
            ]
        );
        let subtitle_at = xml.find(&ctx.subtitle()).unwrap();
        let table_at = xml.find("<w:tbl").unwrap();
        assert!(subtitle_at < table_at);
        assert!(table_at < xml.find(">Account<").unwrap());
    }

    #[test]
    fn test_logo_comes_first() {
        let (table, range) = sample();
        let logo = BrandingAsset::from_png_bytes("vtc_logo.png".into(), tiny_png(4, 2)).unwrap();
        let ctx = RenderContext::new(&table, &range, Utc::now()).with_branding(Some(&logo));

        let bytes = DocumentRenderer.render(&ctx).unwrap();

        let xml = zip_entry(&bytes, "word/document.xml");
        let drawing_at = xml.find("<w:drawing").unwrap();
        assert!(drawing_at < xml.find(">VTC OAK Usage Report<").unwrap());
        assert_eq!(element_texts(&xml, "w:t")[0], "VTC OAK Usage Report");
        assert!(
            zip_entry_names(&bytes)
                .iter()
                .any(|name| name.starts_with("word/media/"))
        );
    }
}
