use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use salescope_core::calendar::Granularity;
use salescope_core::types::Metric;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IsoDate(pub String);

impl IsoDate {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

pub fn parse_iso_date(value: &str) -> Result<IsoDate, String> {
    if NaiveDate::parse_from_str(value, "%Y-%m-%d").is_err() {
        return Err("date must use YYYY-MM-DD format with a real calendar date".to_string());
    }
    Ok(IsoDate(value.to_string()))
}

pub fn parse_granularity(value: &str) -> Result<String, String> {
    match Granularity::parse(value) {
        Some(granularity) => Ok(granularity.as_str().to_string()),
        None => Err("granularity must be one of: daily, weekly, monthly".to_string()),
    }
}

pub fn parse_metric(value: &str) -> Result<String, String> {
    match Metric::parse(value) {
        Some(metric) => Ok(metric.as_str().to_string()),
        None => Err("metric must be one of: units, receipts, net_amount".to_string()),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "salescope",
    version,
    about = "Salescope - seasonal sales aggregation and projection"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Build a chart-ready payload (labels, series, year markers)
    Chart {
        /// Normalized record file (CSV or JSON array), or `-` for stdin
        path: PathBuf,
        /// Bucketing granularity: daily, weekly, monthly
        #[arg(long, default_value = "weekly", value_parser = parse_granularity)]
        granularity: String,
        /// Range start (YYYY-MM-DD); defaults to the earliest record
        #[arg(long, value_parser = parse_iso_date)]
        from: Option<IsoDate>,
        /// Range end (YYYY-MM-DD); defaults to the latest record
        #[arg(long, value_parser = parse_iso_date)]
        to: Option<IsoDate>,
        /// Restrict to one category
        #[arg(long)]
        category: Option<String>,
        /// Restrict to one article
        #[arg(long)]
        article: Option<String>,
        /// Metrics to chart (repeat or comma-separate): units, receipts, net_amount
        #[arg(long, value_delimiter = ',', value_parser = parse_metric)]
        metrics: Vec<String>,
        /// Extend the range and add the seasonal projection series
        #[arg(long)]
        project: bool,
        /// Emit the payload as JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Print per-period totals for a record file
    Summary {
        /// Normalized record file (CSV or JSON array), or `-` for stdin
        path: PathBuf,
        /// Bucketing granularity: daily, weekly, monthly
        #[arg(long, default_value = "monthly", value_parser = parse_granularity)]
        granularity: String,
        /// Range start (YYYY-MM-DD)
        #[arg(long, value_parser = parse_iso_date)]
        from: Option<IsoDate>,
        /// Range end (YYYY-MM-DD)
        #[arg(long, value_parser = parse_iso_date)]
        to: Option<IsoDate>,
        /// Restrict to one category
        #[arg(long)]
        category: Option<String>,
        /// Restrict to one article
        #[arg(long)]
        article: Option<String>,
        /// Emit the table as JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

pub fn parse_from<I, T>(args: I) -> Result<Cli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    Cli::try_parse_from(args)
}
