use std::io;

use salescope_core::assemble::format_metric_value;
use salescope_core::types::Metric;
use serde_json::Value;

use super::format::{self, Align, Column};

pub fn render_summary(data: &Value) -> io::Result<String> {
    let rows = data
        .get("rows")
        .and_then(Value::as_array)
        .ok_or_else(|| io::Error::other("summary output requires rows"))?;

    if rows.is_empty() {
        return Ok([
            "No records in the selected range.",
            "",
            "Widen the range with --from/--to, or check that the record file",
            "has rows with valid ISO dates.",
        ]
        .join("\n"));
    }

    let granularity = data
        .get("granularity")
        .and_then(Value::as_str)
        .unwrap_or("monthly");
    let noun = if rows.len() == 1 { "period" } else { "periods" };

    let mut lines = vec![
        format!("Period totals ({granularity}): {} {noun}", rows.len()),
        String::new(),
    ];

    let columns = [
        Column {
            name: "Period",
            align: Align::Left,
        },
        Column {
            name: "Units sold",
            align: Align::Right,
        },
        Column {
            name: "Receipts issued",
            align: Align::Right,
        },
        Column {
            name: "Net sales",
            align: Align::Right,
        },
    ];

    let table_rows = rows
        .iter()
        .map(|row| {
            vec![
                row.get("period")
                    .and_then(Value::as_str)
                    .unwrap_or("?")
                    .to_string(),
                metric_cell(row, "units", Metric::Units),
                metric_cell(row, "unique_receipts", Metric::Receipts),
                metric_cell(row, "net_amount", Metric::NetAmount),
            ]
        })
        .collect::<Vec<Vec<String>>>();

    lines.extend(format::render_table_or_blocks(
        &columns,
        &table_rows,
        format::terminal_width(),
        "Period",
    ));

    let skipped = data
        .get("skipped_undated")
        .and_then(Value::as_u64)
        .unwrap_or(0);
    if skipped > 0 {
        lines.push(String::new());
        lines.push(format!("Skipped {skipped} record(s) without a valid date."));
    }

    Ok(lines.join("\n"))
}

fn metric_cell(row: &Value, field: &str, metric: Metric) -> String {
    match row.get(field).and_then(Value::as_f64) {
        Some(value) => format_metric_value(metric, value),
        None => "-".to_string(),
    }
}
