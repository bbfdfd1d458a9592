use std::io::Write;
use std::path::PathBuf;

use salescope_core::commands::chart::{self, ChartRunOptions};
use salescope_core::commands::summary::{self, SummaryRunOptions};
use serde_json::Value;

const CSV_HEADER: &str = "date,receipt_number,receipt_type,category,article,quantity,net_amount";

fn write_source(name: &str, content: &str) -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::Builder::new().prefix(name).tempdir();
    assert!(dir.is_ok());
    let dir = dir.unwrap_or_else(|_| panic!("tempdir for {name}"));
    let path = dir.path().join("records.csv");
    let file = std::fs::File::create(&path);
    assert!(file.is_ok());
    if let Ok(mut file) = file {
        assert!(file.write_all(content.as_bytes()).is_ok());
    }
    (dir, path)
}

fn chart_options(path: PathBuf) -> ChartRunOptions {
    ChartRunOptions {
        path,
        granularity: "monthly".to_string(),
        from: None,
        to: None,
        category: None,
        article: None,
        metrics: vec!["units".to_string(), "receipts".to_string()],
        projection: false,
    }
}

#[test]
fn chart_command_builds_a_payload_from_a_csv_file() {
    let content = format!(
        "{CSV_HEADER}\n\
         2023-01-10,A1,Venta,Alimentos,Frutas,2,500\n\
         2023-01-12,A1,Venta,Alimentos,Frutas,1,100\n"
    );
    let (_dir, path) = write_source("salescope-chart", &content);

    let result = chart::run(chart_options(path));
    assert!(result.is_ok());
    if let Ok(envelope) = result {
        assert!(envelope.ok);
        assert_eq!(envelope.command, "chart");

        let labels = envelope.data["chart"]["labels"].as_array().cloned();
        assert_eq!(labels, Some(vec![Value::from("2023-01")]));
        assert_eq!(envelope.data["record_count"], Value::from(2));

        let series = envelope.data["chart"]["series"].as_array().cloned();
        assert!(series.is_some());
        if let Some(series) = series {
            let units = series
                .iter()
                .find(|entry| entry["metric"] == "units" && entry["kind"] == "bar");
            assert!(units.is_some());
            if let Some(units) = units {
                assert_eq!(units["values"][0], Value::from(3.0));
                assert_eq!(units["hidden"], Value::from(false));
            }
            let receipts = series
                .iter()
                .find(|entry| entry["metric"] == "receipts" && entry["kind"] == "bar");
            assert!(receipts.is_some());
            if let Some(receipts) = receipts {
                assert_eq!(receipts["values"][0], Value::from(1.0));
            }
        }
    }
}

#[test]
fn chart_command_rejects_unknown_granularity() {
    let (_dir, path) = write_source("salescope-gran", &format!("{CSV_HEADER}\n"));
    let mut options = chart_options(path);
    options.granularity = "hourly".to_string();

    let result = chart::run(options);
    assert!(result.is_err());
    if let Err(error) = result {
        assert_eq!(error.code, "invalid_argument");
        assert!(error.recovery_steps[0].contains("salescope chart --help"));
    }
}

#[test]
fn chart_command_surfaces_schema_mismatches_from_the_source() {
    let (_dir, path) = write_source(
        "salescope-schema",
        "fecha,recibo,tipo,categoria,articulo,cantidad,neto\n2023-01-10,A1,Venta,x,y,1,1\n",
    );
    let result = chart::run(chart_options(path));
    assert!(result.is_err());
    if let Err(error) = result {
        assert_eq!(error.code, "source_schema_mismatch");
    }
}

#[test]
fn chart_command_reports_missing_files_with_recovery_steps() {
    let result = chart::run(chart_options(PathBuf::from("/nonexistent/records.csv")));
    assert!(result.is_err());
    if let Err(error) = result {
        assert_eq!(error.code, "source_read_failed");
        assert!(!error.recovery_steps.is_empty());
    }
}

#[test]
fn chart_command_with_undated_records_only_yields_an_empty_chart() {
    let content = format!(
        "{CSV_HEADER}\n\
         not-a-date,A1,Venta,Alimentos,Frutas,2,500\n\
         also-bogus,B1,Venta,Alimentos,Frutas,1,100\n"
    );
    let (_dir, path) = write_source("salescope-undated", &content);

    let result = chart::run(chart_options(path));
    assert!(result.is_ok());
    if let Ok(envelope) = result {
        let labels = envelope.data["chart"]["labels"].as_array().cloned();
        assert_eq!(labels, Some(Vec::new()));
        // The rows never reach a bucket but are still counted.
        assert_eq!(envelope.data["chart"]["skipped_undated"], Value::from(2));
    }
}

#[test]
fn summary_command_tabulates_buckets_and_undated_diagnostics() {
    let content = format!(
        "{CSV_HEADER}\n\
         2023-01-10,A1,Venta,Alimentos,Frutas,2,500\n\
         2023-02-03,B1,Venta,Alimentos,Frutas,1,100\n\
         bogus,C1,Venta,Alimentos,Frutas,9,900\n"
    );
    let (_dir, path) = write_source("salescope-summary", &content);

    let result = summary::run(SummaryRunOptions {
        path,
        granularity: "monthly".to_string(),
        from: None,
        to: None,
        category: None,
        article: None,
    });
    assert!(result.is_ok());
    if let Ok(envelope) = result {
        assert_eq!(envelope.command, "summary");
        assert_eq!(envelope.data["skipped_undated"], Value::from(1));

        let rows = envelope.data["rows"].as_array().cloned();
        assert!(rows.is_some());
        if let Some(rows) = rows {
            assert_eq!(rows.len(), 2);
            assert_eq!(rows[0]["period"], Value::from("2023-01"));
            assert_eq!(rows[0]["unique_receipts"], Value::from(1));
            assert_eq!(rows[1]["period"], Value::from("2023-02"));
        }
    }
}

#[test]
fn summary_command_filters_by_category_scope() {
    let content = format!(
        "{CSV_HEADER}\n\
         2023-01-10,A1,Venta,Alimentos,Frutas,2,500\n\
         2023-01-11,B1,Venta,Ropa,Camiseta,5,900\n"
    );
    let (_dir, path) = write_source("salescope-scope", &content);

    let result = summary::run(SummaryRunOptions {
        path,
        granularity: "monthly".to_string(),
        from: None,
        to: None,
        category: Some("Ropa".to_string()),
        article: None,
    });
    assert!(result.is_ok());
    if let Ok(envelope) = result {
        let rows = envelope.data["rows"].as_array().cloned();
        assert!(rows.is_some());
        if let Some(rows) = rows {
            assert_eq!(rows.len(), 1);
            assert_eq!(rows[0]["units"], Value::from(5.0));
        }
    }
}
