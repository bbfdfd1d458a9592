use std::path::PathBuf;

use crate::assemble::{ChartRequest, build_chart};
use crate::calendar::Granularity;
use crate::commands::common::{non_blank, parse_date_arg, read_source, resolve_range};
use crate::contracts::{ChartData, SuccessEnvelope, success};
use crate::error::{EngineError, EngineResult};
use crate::inflation::default_monthly_rates;
use crate::projection::PROJECTION_POLICY_V1;
use crate::source::parse_records;
use crate::types::{Metric, RecordScope};

#[derive(Debug, Clone)]
pub struct ChartRunOptions {
    pub path: PathBuf,
    pub granularity: String,
    pub from: Option<String>,
    pub to: Option<String>,
    pub category: Option<String>,
    pub article: Option<String>,
    pub metrics: Vec<String>,
    pub projection: bool,
}

pub fn run(options: ChartRunOptions) -> EngineResult<SuccessEnvelope> {
    let granularity = Granularity::parse(&options.granularity).ok_or_else(|| {
        EngineError::invalid_argument_for_command(
            "`granularity` must be one of: daily, weekly, monthly.",
            Some("chart"),
        )
    })?;

    let metrics = parse_metrics(&options.metrics)?;

    let from = options
        .from
        .as_deref()
        .map(|value| parse_date_arg(value, "from", "chart"))
        .transpose()?;
    let to = options
        .to
        .as_deref()
        .map(|value| parse_date_arg(value, "to", "chart"))
        .transpose()?;

    let content = read_source(&options.path)?;
    let records = parse_records(&content)?;

    let scope = RecordScope {
        category: non_blank(options.category.as_deref()),
        article: non_blank(options.article.as_deref()),
    };

    let payload = match resolve_range(&records, from, to) {
        Some((from, to)) => {
            let request = ChartRequest {
                granularity,
                from,
                to,
                scope: scope.clone(),
                metrics: metrics.clone(),
                include_projection: options.projection,
            };
            build_chart(&records, &request, &default_monthly_rates(), PROJECTION_POLICY_V1)
        }
        None => {
            // No dated record anywhere: an empty chart, but the undated
            // rows still show up in the diagnostics.
            let mut payload = build_chart(
                &[],
                &ChartRequest {
                    granularity,
                    from: chrono::NaiveDate::MIN,
                    to: chrono::NaiveDate::MIN,
                    scope: scope.clone(),
                    metrics: metrics.clone(),
                    include_projection: false,
                },
                &default_monthly_rates(),
                PROJECTION_POLICY_V1,
            );
            payload.skipped_undated = records
                .iter()
                .filter(|record| scope.matches(record) && record.date.is_none())
                .count();
            payload
        }
    };

    let data = ChartData {
        granularity: granularity.as_str().to_string(),
        from: from.map(|value| value.format("%Y-%m-%d").to_string()),
        to: to.map(|value| value.format("%Y-%m-%d").to_string()),
        category: scope.category,
        article: scope.article,
        metrics: metrics.iter().map(|metric| metric.as_str().to_string()).collect(),
        projection: options.projection,
        record_count: records.len(),
        chart: payload,
    };
    success("chart", data)
}

fn parse_metrics(names: &[String]) -> EngineResult<Vec<Metric>> {
    if names.is_empty() {
        return Ok(vec![Metric::Receipts]);
    }
    let mut metrics = Vec::new();
    for name in names {
        let Some(metric) = Metric::parse(name) else {
            return Err(EngineError::invalid_argument_for_command(
                &format!("Unknown metric `{name}`. Use: units, receipts, net_amount."),
                Some("chart"),
            ));
        };
        if !metrics.contains(&metric) {
            metrics.push(metric);
        }
    }
    Ok(metrics)
}

#[cfg(test)]
mod tests {
    use super::parse_metrics;
    use crate::types::Metric;

    #[test]
    fn metrics_default_to_receipts() {
        let metrics = parse_metrics(&[]);
        assert!(metrics.is_ok());
        if let Ok(metrics) = metrics {
            assert_eq!(metrics, vec![Metric::Receipts]);
        }
    }

    #[test]
    fn duplicate_metric_names_collapse() {
        let metrics = parse_metrics(&["units".to_string(), "units".to_string()]);
        assert!(metrics.is_ok());
        if let Ok(metrics) = metrics {
            assert_eq!(metrics, vec![Metric::Units]);
        }
    }

    #[test]
    fn unknown_metric_names_are_invalid_arguments() {
        let result = parse_metrics(&["margin".to_string()]);
        assert!(result.is_err());
        if let Err(error) = result {
            assert_eq!(error.code, "invalid_argument");
            assert!(error.message.contains("margin"));
        }
    }
}
