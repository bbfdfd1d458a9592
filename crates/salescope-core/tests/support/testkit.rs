use chrono::NaiveDate;
use salescope_core::assemble::{ChartPayload, ChartRequest, Series, SeriesKind, build_chart};
use salescope_core::calendar::Granularity;
use salescope_core::inflation::default_monthly_rates;
use salescope_core::projection::PROJECTION_POLICY_V1;
use salescope_core::types::{Metric, RecordScope, SaleRecord};

pub fn sale(date: &str, receipt: &str, receipt_type: &str, qty: f64, net: f64) -> SaleRecord {
    SaleRecord {
        date: NaiveDate::parse_from_str(date, "%Y-%m-%d").ok(),
        receipt_number: receipt.to_string(),
        receipt_type: receipt_type.to_string(),
        category: "Alimentos".to_string(),
        article: "Frutas".to_string(),
        quantity: qty,
        net_amount: net,
    }
}

pub fn date(value: &str) -> NaiveDate {
    let parsed = NaiveDate::parse_from_str(value, "%Y-%m-%d");
    assert!(parsed.is_ok());
    parsed.unwrap_or(NaiveDate::MIN)
}

pub fn run_chart(
    records: &[SaleRecord],
    granularity: Granularity,
    from: &str,
    to: &str,
    metrics: Vec<Metric>,
    projection: bool,
) -> ChartPayload {
    let request = ChartRequest {
        granularity,
        from: date(from),
        to: date(to),
        scope: RecordScope::default(),
        metrics,
        include_projection: projection,
    };
    build_chart(records, &request, &default_monthly_rates(), PROJECTION_POLICY_V1)
}

pub fn find_series(payload: &ChartPayload, metric: Metric, kind: SeriesKind) -> Option<&Series> {
    payload
        .series
        .iter()
        .find(|series| series.metric == metric && series.kind == kind)
}
