use std::path::PathBuf;

use crate::aggregate::aggregate_by_period;
use crate::calendar::Granularity;
use crate::commands::common::{non_blank, parse_date_arg, read_source, resolve_range};
use crate::contracts::{SuccessEnvelope, SummaryData, SummaryRow, success};
use crate::error::{EngineError, EngineResult};
use crate::source::parse_records;
use crate::types::RecordScope;

#[derive(Debug, Clone)]
pub struct SummaryRunOptions {
    pub path: PathBuf,
    pub granularity: String,
    pub from: Option<String>,
    pub to: Option<String>,
    pub category: Option<String>,
    pub article: Option<String>,
}

/// Per-period bucket table for quick inspection, without the chart
/// scaffolding: only buckets that actually hold records appear.
pub fn run(options: SummaryRunOptions) -> EngineResult<SuccessEnvelope> {
    let granularity = Granularity::parse(&options.granularity).ok_or_else(|| {
        EngineError::invalid_argument_for_command(
            "`granularity` must be one of: daily, weekly, monthly.",
            Some("summary"),
        )
    })?;

    let from = options
        .from
        .as_deref()
        .map(|value| parse_date_arg(value, "from", "summary"))
        .transpose()?;
    let to = options
        .to
        .as_deref()
        .map(|value| parse_date_arg(value, "to", "summary"))
        .transpose()?;

    let content = read_source(&options.path)?;
    let records = parse_records(&content)?;

    let scope = RecordScope {
        category: non_blank(options.category.as_deref()),
        article: non_blank(options.article.as_deref()),
    };

    let range = resolve_range(&records, from, to);
    let filtered: Vec<_> = records
        .into_iter()
        .filter(|record| scope.matches(record))
        .filter(|record| match (record.date, range) {
            (Some(date), Some((from, to))) => date >= from && date <= to,
            (None, _) => true,
            (Some(_), None) => false,
        })
        .collect();

    let outcome = aggregate_by_period(&filtered, granularity);
    let rows = outcome
        .buckets
        .iter()
        .map(|(period, bucket)| SummaryRow {
            period: period.clone(),
            units: bucket.units,
            net_amount: bucket.net_amount,
            unique_receipts: bucket.unique_receipts,
        })
        .collect();

    let data = SummaryData {
        granularity: granularity.as_str().to_string(),
        rows,
        skipped_undated: outcome.skipped_undated,
    };
    success("summary", data)
}
