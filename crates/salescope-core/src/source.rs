use std::collections::HashMap;

use chrono::NaiveDate;
use serde_json::Value;

use crate::error::{EngineError, EngineResult};
use crate::types::SaleRecord;

/// Normalized record schema. Names must match exactly; the reader does
/// no delimiter sniffing, header renaming, or date-format guessing.
/// That belongs to the upstream ingestion collaborator.
pub const RECORD_FIELDS: [&str; 7] = [
    "date",
    "receipt_number",
    "receipt_type",
    "category",
    "article",
    "quantity",
    "net_amount",
];

/// Parses a normalized record source: a JSON top-level array or a CSV
/// with a header row.
///
/// Per-field failures are local recovery, not errors: an unparseable or
/// blank date becomes `None` (the record is kept and later counted as
/// undated), a non-numeric quantity or amount becomes zero.
pub fn parse_records(content: &str) -> EngineResult<Vec<SaleRecord>> {
    let trimmed = content.trim_start_matches('\u{feff}').trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }

    if trimmed.starts_with('[') {
        return parse_json_array(trimmed);
    }

    if serde_json::from_str::<Value>(trimmed).is_ok() {
        return Err(EngineError::invalid_source_format(
            "JSON input must be a top-level array of record objects.",
        ));
    }

    parse_csv(trimmed)
}

fn parse_json_array(content: &str) -> EngineResult<Vec<SaleRecord>> {
    let parsed = serde_json::from_str::<Value>(content).map_err(|_| {
        EngineError::invalid_source_format("Invalid JSON input. Provide a valid JSON array.")
    })?;

    let Some(items) = parsed.as_array() else {
        return Err(EngineError::invalid_source_format(
            "JSON input must be a top-level array of record objects.",
        ));
    };

    let mut records = Vec::new();
    for item in items {
        let Some(object) = item.as_object() else {
            return Err(EngineError::invalid_source_format(
                "JSON array entries must all be objects with record fields.",
            ));
        };

        records.push(SaleRecord {
            date: object
                .get("date")
                .and_then(Value::as_str)
                .and_then(parse_record_date),
            receipt_number: read_string(object.get("receipt_number")),
            receipt_type: read_string(object.get("receipt_type")),
            category: read_string(object.get("category")),
            article: read_string(object.get("article")),
            quantity: read_number(object.get("quantity")),
            net_amount: read_number(object.get("net_amount")),
        });
    }
    Ok(records)
}

fn parse_csv(content: &str) -> EngineResult<Vec<SaleRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(content.as_bytes());

    let headers = reader
        .headers()
        .map_err(|_| EngineError::invalid_source_format("CSV header row is missing or unreadable."))?
        .iter()
        .map(|value| value.trim().to_string())
        .collect::<Vec<String>>();

    if !headers_match_schema(&headers) {
        return Err(EngineError::source_schema_mismatch(&RECORD_FIELDS, headers));
    }

    let index_by_name = headers
        .iter()
        .enumerate()
        .map(|(index, name)| (name.as_str().to_string(), index))
        .collect::<HashMap<String, usize>>();

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row
            .map_err(|_| EngineError::invalid_source_format("CSV rows are malformed or not UTF-8."))?;
        let field = |name: &str| -> &str {
            index_by_name
                .get(name)
                .and_then(|index| row.get(*index))
                .unwrap_or("")
                .trim()
        };

        records.push(SaleRecord {
            date: parse_record_date(field("date")),
            receipt_number: field("receipt_number").to_string(),
            receipt_type: field("receipt_type").to_string(),
            category: field("category").to_string(),
            article: field("article").to_string(),
            quantity: field("quantity").parse::<f64>().unwrap_or(0.0),
            net_amount: field("net_amount").parse::<f64>().unwrap_or(0.0),
        });
    }
    Ok(records)
}

fn headers_match_schema(headers: &[String]) -> bool {
    if headers.len() != RECORD_FIELDS.len() {
        return false;
    }
    RECORD_FIELDS
        .iter()
        .all(|field| headers.iter().any(|header| header == field))
}

fn parse_record_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()
}

fn read_string(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(text)) => text.trim().to_string(),
        _ => String::new(),
    }
}

fn read_number(value: Option<&Value>) -> f64 {
    match value {
        Some(Value::Number(number)) => number.as_f64().unwrap_or(0.0),
        Some(Value::String(text)) => text.trim().parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::parse_records;

    const CSV_HEADER: &str = "date,receipt_number,receipt_type,category,article,quantity,net_amount";

    #[test]
    fn csv_rows_become_normalized_records() {
        let content = format!(
            "{CSV_HEADER}\n2023-01-10,A1,Venta,Alimentos,Frutas,2,500\n2023-01-12,A1,Venta,Alimentos,Frutas,1,100\n"
        );
        let records = parse_records(&content);
        assert!(records.is_ok());
        if let Ok(records) = records {
            assert_eq!(records.len(), 2);
            assert_eq!(records[0].quantity, 2.0);
            assert_eq!(records[0].net_amount, 500.0);
            assert!(records[0].date.is_some());
        }
    }

    #[test]
    fn bad_dates_and_numbers_recover_locally() {
        let content = format!("{CSV_HEADER}\n10/01/2023,A1,Venta,Alimentos,Frutas,two,n/a\n");
        let records = parse_records(&content);
        assert!(records.is_ok());
        if let Ok(records) = records {
            assert_eq!(records[0].date, None);
            assert_eq!(records[0].quantity, 0.0);
            assert_eq!(records[0].net_amount, 0.0);
        }
    }

    #[test]
    fn unknown_headers_are_a_schema_mismatch() {
        let content = "fecha,recibo,tipo,categoria,articulo,cantidad,neto\n2023-01-10,A1,Venta,Alimentos,Frutas,2,500\n";
        let result = parse_records(content);
        assert!(result.is_err());
        if let Err(error) = result {
            assert_eq!(error.code, "source_schema_mismatch");
        }
    }

    #[test]
    fn json_array_input_is_accepted() {
        let content = r#"[
            {"date": "2023-01-10", "receipt_number": "A1", "receipt_type": "Venta",
             "category": "Alimentos", "article": "Frutas", "quantity": 2, "net_amount": 500.5},
            {"date": null, "receipt_number": "", "receipt_type": "Venta",
             "category": "Alimentos", "article": "Frutas", "quantity": "3", "net_amount": "abc"}
        ]"#;
        let records = parse_records(content);
        assert!(records.is_ok());
        if let Ok(records) = records {
            assert_eq!(records.len(), 2);
            assert_eq!(records[0].net_amount, 500.5);
            assert_eq!(records[1].date, None);
            assert_eq!(records[1].quantity, 3.0);
            assert_eq!(records[1].net_amount, 0.0);
        }
    }

    #[test]
    fn non_array_json_is_rejected() {
        let result = parse_records(r#"{"date": "2023-01-10"}"#);
        assert!(result.is_err());
        if let Err(error) = result {
            assert_eq!(error.code, "invalid_source_format");
        }
    }

    #[test]
    fn empty_input_yields_no_records() {
        let records = parse_records("   \n ");
        assert!(records.is_ok());
        if let Ok(records) = records {
            assert!(records.is_empty());
        }
    }
}
