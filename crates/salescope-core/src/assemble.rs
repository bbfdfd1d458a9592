use chrono::NaiveDate;
use serde::Serialize;

use crate::aggregate::aggregate_by_period;
use crate::calendar::{Granularity, key_year, period_end_date, period_sequence, period_start_date};
use crate::inflation::InflationTable;
use crate::projection::{
    PROJECTION_POLICY_VERSION, ProjectionPolicy, mask_real_positions, project_raw, smooth,
    sub_period_history,
};
use crate::types::{Metric, RecordScope, SaleRecord};

/// One chart build request. The whole pipeline is a pure function of
/// `(records, request)`; rebuilding with the same inputs yields the same
/// payload.
#[derive(Debug, Clone)]
pub struct ChartRequest {
    pub granularity: Granularity,
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub scope: RecordScope,
    pub metrics: Vec<Metric>,
    pub include_projection: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesKind {
    Bar,
    ProjectedBar,
    ProjectedLine,
}

/// A named numeric series aligned to the payload's label sequence.
/// `None` is a rendering gap; real series are zero-filled instead.
#[derive(Debug, Clone, Serialize)]
pub struct Series {
    pub name: String,
    pub metric: Metric,
    pub kind: SeriesKind,
    pub hidden: bool,
    pub values: Vec<Option<f64>>,
}

/// Annotation pinned to the first key of a new calendar year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct YearMarker {
    pub label: String,
    pub year: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct TooltipSpec {
    pub granularity: &'static str,
    pub date_format: &'static str,
    pub currency_metric: Metric,
}

impl TooltipSpec {
    pub fn for_granularity(granularity: Granularity) -> Self {
        Self {
            granularity: granularity.as_str(),
            date_format: "%d/%m/%Y",
            currency_metric: Metric::NetAmount,
        }
    }
}

/// Human date range for one period key: Monday to Sunday for weeks, first
/// to last calendar day for months, the day itself otherwise.
pub fn tooltip_title(granularity: Granularity, key: &str) -> Option<String> {
    let start = period_start_date(granularity, key)?;
    let end = period_end_date(granularity, key)?;
    let title = match granularity {
        Granularity::Daily => format!("Day {}", start.format("%d/%m/%Y")),
        Granularity::Weekly => format!(
            "Week of {} to {}",
            start.format("%d/%m/%Y"),
            end.format("%d/%m/%Y")
        ),
        Granularity::Monthly => format!(
            "Month of {} to {}",
            start.format("%d/%m/%Y"),
            end.format("%d/%m/%Y")
        ),
    };
    Some(title)
}

/// Metric-dependent value rendering: currency gets a `$` prefix, both
/// get thousands grouping.
pub fn format_metric_value(metric: Metric, value: f64) -> String {
    let grouped = group_thousands(value);
    if metric.is_currency() {
        return format!("${grouped}");
    }
    grouped
}

fn group_thousands(value: f64) -> String {
    let rounded = value.round();
    let negative = rounded < 0.0;
    let digits = format!("{}", rounded.abs() as i64);
    let mut grouped = String::new();
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index).is_multiple_of(3) {
            grouped.push('.');
        }
        grouped.push(ch);
    }
    if negative {
        return format!("-{grouped}");
    }
    grouped
}

/// Chart-ready output: ordered unique labels, equal-length series,
/// year-boundary markers, and the tooltip rules.
#[derive(Debug, Clone, Serialize)]
pub struct ChartPayload {
    pub labels: Vec<String>,
    pub series: Vec<Series>,
    pub year_markers: Vec<YearMarker>,
    pub tooltip: TooltipSpec,
    pub skipped_undated: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub policy_version: Option<&'static str>,
}

impl ChartPayload {
    fn empty(granularity: Granularity) -> Self {
        Self {
            labels: Vec::new(),
            series: Vec::new(),
            year_markers: Vec::new(),
            tooltip: TooltipSpec::for_granularity(granularity),
            skipped_undated: 0,
            policy_version: None,
        }
    }
}

/// Builds the full chart payload for one request.
///
/// Real aggregation runs over range-filtered records; the projector's
/// sub-period history runs over the full scope-filtered record set, so
/// forecasts see years outside the visible range. When projection is on
/// the label sequence is regenerated over the extended span from the
/// original start, never appended to, so boundary keys stay aligned.
pub fn build_chart(
    records: &[SaleRecord],
    request: &ChartRequest,
    inflation: &InflationTable,
    policy: ProjectionPolicy,
) -> ChartPayload {
    let granularity = request.granularity;
    if records.is_empty() {
        return ChartPayload::empty(granularity);
    }

    let real_labels = period_sequence(granularity, request.from, request.to);
    if real_labels.is_empty() {
        return ChartPayload::empty(granularity);
    }

    let extended_end = if request.include_projection {
        policy.extended_end(granularity, request.to)
    } else {
        request.to
    };
    let labels = if request.include_projection {
        period_sequence(granularity, request.from, extended_end)
    } else {
        real_labels.clone()
    };

    let in_scope: Vec<SaleRecord> = records
        .iter()
        .filter(|record| request.scope.matches(record))
        .cloned()
        .collect();

    // Undated rows stay in the range set so the aggregator can count
    // them; they never reach a bucket.
    let range_records: Vec<SaleRecord> = in_scope
        .iter()
        .filter(|record| match record.date {
            Some(date) => date >= request.from && date <= extended_end,
            None => true,
        })
        .cloned()
        .collect();
    let history_records: Vec<SaleRecord> = in_scope
        .iter()
        .filter(|record| record.date.is_some())
        .cloned()
        .collect();

    let range_aggregates = aggregate_by_period(&range_records, granularity);
    let history_aggregates = aggregate_by_period(&history_records, granularity);

    let mut series = Vec::new();
    for metric in Metric::ALL {
        let values = labels
            .iter()
            .map(|label| {
                let value = range_aggregates
                    .buckets
                    .get(label)
                    .map(|bucket| bucket.metric_value(metric))
                    .unwrap_or(0.0);
                Some(value)
            })
            .collect();
        series.push(Series {
            name: series_name(metric, &request.scope),
            metric,
            kind: SeriesKind::Bar,
            hidden: !request.metrics.contains(&metric),
            values,
        });
    }

    if request.include_projection {
        for metric in &request.metrics {
            let history = sub_period_history(&history_aggregates.buckets, granularity, *metric);
            let raw = project_raw(&labels, granularity, *metric, &history, policy, inflation);
            let smoothed = smooth(&raw, policy.smoothing_window);
            let visible = mask_real_positions(&smoothed, real_labels.len());

            series.push(Series {
                name: format!("Projected bars - {}", metric.label()),
                metric: *metric,
                kind: SeriesKind::ProjectedBar,
                hidden: false,
                values: visible.clone(),
            });
            series.push(Series {
                name: format!("Seasonal projection - {}", metric.label()),
                metric: *metric,
                kind: SeriesKind::ProjectedLine,
                hidden: false,
                values: visible,
            });
        }
    }

    ChartPayload {
        year_markers: year_markers(&labels),
        tooltip: TooltipSpec::for_granularity(granularity),
        skipped_undated: range_aggregates.skipped_undated,
        policy_version: request
            .include_projection
            .then_some(PROJECTION_POLICY_VERSION),
        labels,
        series,
    }
}

fn series_name(metric: Metric, scope: &RecordScope) -> String {
    match &scope.category {
        Some(category) => format!("{} - {category}", metric.label()),
        None => metric.label().to_string(),
    }
}

fn year_markers(labels: &[String]) -> Vec<YearMarker> {
    let mut markers = Vec::new();
    let mut last_year: Option<i32> = None;
    for label in labels {
        let Some(year) = key_year(label) else {
            continue;
        };
        if let Some(previous) = last_year
            && previous != year
        {
            markers.push(YearMarker {
                label: label.clone(),
                year,
            });
        }
        last_year = Some(year);
    }
    markers
}
