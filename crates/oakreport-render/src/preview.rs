//! Terminal preview and JSON output

use crate::output::RenderContext;
use oakreport_core::aggregation::ReportTable;
use prettytable::{Cell, Row, Table, format};
use serde_json::{Value, json};

/// Render the table for the terminal, with a TOTAL row
pub fn format_preview(table: &ReportTable) -> String {
    let mut out = Table::new();
    out.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);

    out.set_titles(Row::new(
        table
            .header()
            .iter()
            .map(|name| Cell::new(name).style_spec("b"))
            .collect(),
    ));

    for row in &table.rows {
        let cells = row
            .account_cells()
            .iter()
            .map(|text| Cell::new(text))
            .chain(row.counts.iter().map(|c| Cell::new(&c.to_string()).style_spec("r")))
            .collect();
        out.add_row(Row::new(cells));
    }

    if !table.is_empty() {
        let width = table.metric_names.len() + 2;
        out.add_row(Row::new(vec![Cell::new(""); width]));
        let totals = [Cell::new("TOTAL").style_spec("b"), Cell::new("")]
            .into_iter()
            .chain(
                table
                    .totals()
                    .iter()
                    .map(|t| Cell::new(&t.to_string()).style_spec("br")),
            )
            .collect();
        out.add_row(Row::new(totals));
    }

    out.to_string()
}

/// JSON form of the report: range, generation time, columns, and rows
pub fn format_json(ctx: &RenderContext<'_>) -> Value {
    let rows: Vec<Value> = ctx
        .table
        .rows
        .iter()
        .map(|row| {
            let metrics: serde_json::Map<String, Value> = ctx
                .table
                .metric_names
                .iter()
                .cloned()
                .zip(row.counts.iter().map(|c| json!(c)))
                .collect();
            json!({
                "account": row.account,
                "username": row.username,
                "metrics": metrics,
            })
        })
        .collect();

    json!({
        "range": {
            "start": ctx.range.start().to_string(),
            "end": ctx.range.end().to_string(),
            "timezone": ctx.timezone_label,
        },
        "generated_at": ctx.generated_at.to_rfc3339(),
        "columns": ctx.table.header(),
        "rows": rows,
    })
}
