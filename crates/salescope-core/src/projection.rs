use std::collections::BTreeMap;

use chrono::{Datelike, Duration, NaiveDate};

use crate::aggregate::PeriodBucket;
use crate::calendar::{Granularity, add_months_clamped, period_start_date, sub_period};
use crate::inflation::{InflationTable, YearMonth};
use crate::types::Metric;

/// Deterministic projection-policy identifier, emitted with chart
/// payloads so tuning changes stay auditable across versions.
pub const PROJECTION_POLICY_VERSION: &str = "projection/v1";

/// v1 seasonal projection policy.
///
/// The growth cap and default are heuristic knobs, not fitted values:
/// no sub-period may be projected past 30% over its prior-year baseline,
/// and sub-periods without two years of history grow by 10%.
#[derive(Debug, Clone, Copy)]
pub struct ProjectionPolicy {
    pub max_growth: f64,
    pub default_growth: f64,
    pub smoothing_window: usize,
    pub weekly_extension_weeks: i64,
    pub monthly_extension_months: i32,
    pub daily_extension_days: i64,
}

impl ProjectionPolicy {
    /// Year-over-year ratio from a prior-year observation, capped at
    /// `max_growth`. A zero or NaN quotient saturates at the cap rather
    /// than erroring.
    pub fn capped_ratio(self, base: f64, prior: f64) -> f64 {
        (base / prior).min(self.max_growth)
    }

    /// How far past the requested range the label sequence extends when
    /// projection is on: 52 weeks, 12 months, or 90 days.
    pub fn extended_end(self, granularity: Granularity, end: NaiveDate) -> NaiveDate {
        match granularity {
            Granularity::Weekly => end + Duration::weeks(self.weekly_extension_weeks),
            Granularity::Monthly => add_months_clamped(end, self.monthly_extension_months),
            Granularity::Daily => end + Duration::days(self.daily_extension_days),
        }
    }
}

pub const PROJECTION_POLICY_V1: ProjectionPolicy = ProjectionPolicy {
    max_growth: 1.3,
    default_growth: 1.1,
    smoothing_window: 3,
    weekly_extension_weeks: 52,
    monthly_extension_months: 12,
    daily_extension_days: 90,
};

/// Observed metric totals keyed by sub-period, then by calendar year.
/// Built from the full historical aggregates, not the visible range.
pub type SubPeriodHistory = BTreeMap<u32, BTreeMap<i32, f64>>;

pub fn sub_period_history(
    buckets: &BTreeMap<String, PeriodBucket>,
    granularity: Granularity,
    metric: Metric,
) -> SubPeriodHistory {
    let mut history: SubPeriodHistory = BTreeMap::new();
    for (key, bucket) in buckets {
        let Some((sub, year)) = sub_period_and_year(granularity, key) else {
            continue;
        };
        history
            .entry(sub)
            .or_default()
            .insert(year, bucket.metric_value(metric));
    }
    history
}

/// Splits a period key into its within-year position and its year (the
/// ISO week-year for weekly keys).
pub fn sub_period_and_year(granularity: Granularity, key: &str) -> Option<(u32, i32)> {
    let start = period_start_date(granularity, key)?;
    let sub = sub_period(granularity, start);
    let year = match granularity {
        Granularity::Weekly => start.iso_week().year(),
        Granularity::Monthly | Granularity::Daily => start.year(),
    };
    Some((sub, year))
}

/// Projects one value per label from prior-year observations.
///
/// For the bucket at year `Y`: `base` is the same sub-period's total in
/// `Y-1`; absent `base` propagates as `None` so the chart can render a
/// gap instead of a drop to zero. With a `Y-2` observation the ratio is
/// `base / prior` capped by policy, otherwise the policy default. The
/// monetary metric is additionally inflation-normalized from the
/// prior-year month through the bucket's month. Values are rounded to
/// the nearest integer.
pub fn project_raw(
    labels: &[String],
    granularity: Granularity,
    metric: Metric,
    history: &SubPeriodHistory,
    policy: ProjectionPolicy,
    inflation: &InflationTable,
) -> Vec<Option<f64>> {
    labels
        .iter()
        .map(|label| {
            let (sub, year) = sub_period_and_year(granularity, label)?;
            let by_year = history.get(&sub)?;
            let base = by_year.get(&(year - 1)).copied()?;
            let prior = by_year.get(&(year - 2)).copied();

            let ratio = match prior {
                Some(prior) => policy.capped_ratio(base, prior),
                None => policy.default_growth,
            };
            let mut value = base * ratio;

            if metric.is_currency() {
                let bucket_start = period_start_date(granularity, label)?;
                let target = YearMonth::of(bucket_start);
                let anchor = YearMonth {
                    year: target.year - 1,
                    month: target.month,
                };
                value = inflation.adjust(value, anchor, target);
            }

            Some(value.round())
        })
        .collect()
}

/// Centered moving average over the projected sequence, re-rounded.
///
/// Interior points average the point and one neighbor on each side; at
/// the sequence boundaries the window shrinks to whatever neighbors
/// exist. Nulls are excluded from the average and a window of only
/// nulls stays null.
pub fn smooth(values: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    let len = values.len();
    let mut result = Vec::with_capacity(len);
    for index in 0..len {
        let start = index.saturating_sub(window / 2);
        let end = (index + window.div_ceil(2)).min(len);
        let present: Vec<f64> = values[start..end].iter().flatten().copied().collect();
        if present.is_empty() {
            result.push(None);
        } else {
            let mean = present.iter().sum::<f64>() / present.len() as f64;
            result.push(Some(mean.round()));
        }
    }
    result
}

/// Nulls out every position at or before the last real period key so
/// real and projected values never render over the same bucket.
pub fn mask_real_positions(values: &[Option<f64>], real_len: usize) -> Vec<Option<f64>> {
    values
        .iter()
        .enumerate()
        .map(|(index, value)| if index < real_len { None } else { *value })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use crate::calendar::Granularity;
    use crate::inflation::{InflationTable, YearMonth, default_monthly_rates};
    use crate::types::Metric;

    use super::{
        PROJECTION_POLICY_V1, SubPeriodHistory, mask_real_positions, project_raw, smooth,
        sub_period_and_year,
    };

    fn history_for(sub: u32, observations: &[(i32, f64)]) -> SubPeriodHistory {
        let mut by_year = BTreeMap::new();
        for (year, value) in observations {
            by_year.insert(*year, *value);
        }
        let mut history = SubPeriodHistory::new();
        history.insert(sub, by_year);
        history
    }

    fn project_units(labels: &[&str], granularity: Granularity, history: &SubPeriodHistory) -> Vec<Option<f64>> {
        let owned: Vec<String> = labels.iter().map(|label| (*label).to_string()).collect();
        project_raw(
            &owned,
            granularity,
            Metric::Units,
            history,
            PROJECTION_POLICY_V1,
            &InflationTable::default(),
        )
    }

    #[test]
    fn growth_ratio_is_capped_at_thirty_percent() {
        let history = history_for(7, &[(2022, 100.0), (2023, 500.0)]);
        let projected = project_units(&["2024-07"], Granularity::Monthly, &history);
        // Raw ratio would be 5.0; the cap holds it to 1.3.
        assert_eq!(projected, vec![Some(650.0)]);
    }

    #[test]
    fn missing_base_year_propagates_null_not_zero() {
        let history = history_for(7, &[(2021, 100.0)]);
        let projected = project_units(&["2024-07"], Granularity::Monthly, &history);
        assert_eq!(projected, vec![None]);
    }

    #[test]
    fn single_year_history_uses_the_default_growth_assumption() {
        let history = history_for(28, &[(2023, 200.0)]);
        let projected = project_units(&["2024-W28"], Granularity::Weekly, &history);
        assert_eq!(projected, vec![Some(220.0)]);
    }

    #[test]
    fn zero_prior_year_saturates_at_the_cap() {
        let history = history_for(7, &[(2022, 0.0), (2023, 400.0)]);
        let projected = project_units(&["2024-07"], Granularity::Monthly, &history);
        assert_eq!(projected, vec![Some(520.0)]);
    }

    #[test]
    fn monetary_projection_is_inflation_adjusted_before_rounding() {
        let history = history_for(7, &[(2023, 1000.0)]);
        let table = InflationTable::from_rates([(
            YearMonth { year: 2024, month: 1 },
            10.0,
        )]);
        let projected = project_raw(
            &["2024-07".to_string()],
            Granularity::Monthly,
            Metric::NetAmount,
            &history,
            PROJECTION_POLICY_V1,
            &table,
        );
        // 1000 * 1.1 default growth, then *1.10 for the one table month
        // between 2023-07 and 2024-07.
        assert_eq!(projected, vec![Some(1210.0)]);
    }

    #[test]
    fn unit_projection_ignores_the_inflation_table() {
        let history = history_for(7, &[(2023, 1000.0)]);
        let projected = project_raw(
            &["2024-07".to_string()],
            Granularity::Monthly,
            Metric::Units,
            &history,
            PROJECTION_POLICY_V1,
            &default_monthly_rates(),
        );
        assert_eq!(projected, vec![Some(1100.0)]);
    }

    #[test]
    fn weekly_sub_periods_use_the_iso_week_year() {
        assert_eq!(
            sub_period_and_year(Granularity::Weekly, "2025-W01"),
            Some((1, 2025))
        );
        assert_eq!(
            sub_period_and_year(Granularity::Daily, "2024-02-01"),
            Some((32, 2024))
        );
        assert_eq!(sub_period_and_year(Granularity::Monthly, "junk"), None);
    }

    #[test]
    fn smoothing_shrinks_the_window_at_the_boundaries() {
        let smoothed = smooth(&[Some(10.0), Some(20.0), Some(40.0)], 3);
        assert_eq!(smoothed, vec![Some(15.0), Some(23.0), Some(30.0)]);
    }

    #[test]
    fn smoothing_skips_nulls_and_keeps_all_null_windows_null() {
        let smoothed = smooth(&[None, Some(12.0), None, None, None], 3);
        assert_eq!(smoothed, vec![Some(12.0), Some(12.0), Some(12.0), None, None]);
    }

    #[test]
    fn masking_nulls_everything_through_the_last_real_bucket() {
        let masked = mask_real_positions(&[Some(1.0), Some(2.0), Some(3.0)], 2);
        assert_eq!(masked, vec![None, None, Some(3.0)]);
    }
}
