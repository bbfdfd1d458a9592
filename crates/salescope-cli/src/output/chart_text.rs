use std::io;

use salescope_core::assemble::format_metric_value;
use salescope_core::types::Metric;
use serde_json::Value;

use super::format::{self, Align, Column};

pub fn render_chart(data: &Value) -> io::Result<String> {
    let chart = data
        .get("chart")
        .ok_or_else(|| io::Error::other("chart output requires a chart payload"))?;
    let labels = chart
        .get("labels")
        .and_then(Value::as_array)
        .ok_or_else(|| io::Error::other("chart output requires labels"))?;

    if labels.is_empty() {
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
        .unwrap_or("weekly");
    let series = visible_series(chart);

    let mut lines = vec![chart_heading(granularity, labels.len(), data)];
    lines.extend(scope_rows(data));
    lines.push(String::new());

    let mut columns = vec![Column {
        name: "Period",
        align: Align::Left,
    }];
    for entry in &series {
        columns.push(Column {
            name: entry.name.as_str(),
            align: Align::Right,
        });
    }

    let table_rows = labels
        .iter()
        .enumerate()
        .map(|(index, label)| {
            let mut row = vec![label.as_str().unwrap_or("?").to_string()];
            for entry in &series {
                row.push(cell_for(entry, index));
            }
            row
        })
        .collect::<Vec<Vec<String>>>();

    lines.extend(format::render_table_or_blocks(
        &columns,
        &table_rows,
        format::terminal_width(),
        "Period",
    ));

    lines.extend(year_marker_rows(chart));
    lines.extend(footer_rows(data, chart));

    Ok(lines.join("\n"))
}

struct VisibleSeries {
    name: String,
    metric: Metric,
    values: Vec<Option<f64>>,
}

fn visible_series(chart: &Value) -> Vec<VisibleSeries> {
    let Some(series) = chart.get("series").and_then(Value::as_array) else {
        return Vec::new();
    };

    series
        .iter()
        .filter(|entry| !entry.get("hidden").and_then(Value::as_bool).unwrap_or(false))
        .filter_map(|entry| {
            let name = entry.get("name").and_then(Value::as_str)?.to_string();
            let metric = Metric::parse(entry.get("metric").and_then(Value::as_str)?)?;
            let values = entry
                .get("values")
                .and_then(Value::as_array)?
                .iter()
                .map(Value::as_f64)
                .collect::<Vec<Option<f64>>>();
            Some(VisibleSeries {
                name,
                metric,
                values,
            })
        })
        .collect()
}

fn cell_for(series: &VisibleSeries, index: usize) -> String {
    match series.values.get(index).copied().flatten() {
        Some(value) => format_metric_value(series.metric, value),
        None => "-".to_string(),
    }
}

fn chart_heading(granularity: &str, period_count: usize, data: &Value) -> String {
    let noun = if period_count == 1 {
        "period"
    } else {
        "periods"
    };
    let projection = data
        .get("projection")
        .and_then(Value::as_bool)
        .unwrap_or(false);
    if projection {
        format!("Sales chart ({granularity}, with projection): {period_count} {noun}")
    } else {
        format!("Sales chart ({granularity}): {period_count} {noun}")
    }
}

fn scope_rows(data: &Value) -> Vec<String> {
    let mut entries = Vec::new();

    let from = data.get("from").and_then(Value::as_str);
    let to = data.get("to").and_then(Value::as_str);
    if let (Some(from), Some(to)) = (from, to) {
        entries.push(("Range:", format!("{from} to {to}")));
    }
    if let Some(category) = data.get("category").and_then(Value::as_str) {
        entries.push(("Category:", category.to_string()));
    }
    if let Some(article) = data.get("article").and_then(Value::as_str) {
        entries.push(("Article:", article.to_string()));
    }
    if let Some(count) = data.get("record_count").and_then(Value::as_u64) {
        entries.push(("Records read:", count.to_string()));
    }

    format::key_value_rows(&entries, 2)
}

fn year_marker_rows(chart: &Value) -> Vec<String> {
    let Some(markers) = chart.get("year_markers").and_then(Value::as_array) else {
        return Vec::new();
    };
    if markers.is_empty() {
        return Vec::new();
    }

    let mut lines = vec![String::new(), "Year boundaries:".to_string()];
    for marker in markers {
        let year = marker.get("year").and_then(Value::as_i64).unwrap_or(0);
        let label = marker.get("label").and_then(Value::as_str).unwrap_or("?");
        lines.push(format!("  {year} starts at {label}"));
    }

    lines
}

fn footer_rows(data: &Value, chart: &Value) -> Vec<String> {
    let mut lines = Vec::new();

    let skipped = chart
        .get("skipped_undated")
        .and_then(Value::as_u64)
        .unwrap_or(0);
    if skipped > 0 {
        lines.push(String::new());
        lines.push(format!("Skipped {skipped} record(s) without a valid date."));
    }

    let projection = data
        .get("projection")
        .and_then(Value::as_bool)
        .unwrap_or(false);
    if projection && let Some(policy) = chart.get("policy_version").and_then(Value::as_str) {
        lines.push(String::new());
        lines.push(format!(
            "Projection uses last year's seasonal shape ({policy})."
        ));
    }

    lines
}
