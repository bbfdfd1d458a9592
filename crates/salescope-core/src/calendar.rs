use chrono::{Datelike, Duration, NaiveDate, Weekday};

/// Bucketing granularity for the whole pipeline.
///
/// Carried explicitly through every calendar function; nothing in this
/// module keeps process-wide state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Granularity {
    Daily,
    Weekly,
    Monthly,
}

impl Granularity {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "daily" => Some(Self::Daily),
            "weekly" => Some(Self::Weekly),
            "monthly" => Some(Self::Monthly),
            _ => None,
        }
    }
}

/// Formats the period key of the bucket containing `date`.
///
/// Monthly keys are `YYYY-MM`, daily keys `YYYY-MM-DD`. Weekly keys are
/// `YYYY-Www` where the year is the ISO week-year, which can differ from
/// the calendar year around January 1st.
pub fn period_key(granularity: Granularity, date: NaiveDate) -> String {
    match granularity {
        Granularity::Monthly => date.format("%Y-%m").to_string(),
        Granularity::Daily => date.format("%Y-%m-%d").to_string(),
        Granularity::Weekly => {
            let week = date.iso_week();
            format!("{}-W{:02}", week.year(), week.week())
        }
    }
}

/// Generates the ordered, contiguous, duplicate-free key sequence
/// covering `start..=end` at the given granularity.
///
/// The span is aligned outward: the first key is the period containing
/// `start`, the last the period containing `end`. A reversed span yields
/// an empty sequence, not an error. Extending a span for projections must
/// re-invoke this with the later end rather than appending to a cached
/// sequence, so boundary keys stay aligned.
pub fn period_sequence(granularity: Granularity, start: NaiveDate, end: NaiveDate) -> Vec<String> {
    if start > end {
        return Vec::new();
    }

    let mut keys = Vec::new();
    match granularity {
        Granularity::Daily => {
            let mut cursor = start;
            while cursor <= end {
                keys.push(period_key(granularity, cursor));
                cursor += Duration::days(1);
            }
        }
        Granularity::Weekly => {
            let mut cursor = monday_of_iso_week(start);
            let final_sunday = monday_of_iso_week(end) + Duration::days(6);
            while cursor <= final_sunday {
                keys.push(period_key(granularity, cursor));
                cursor += Duration::days(7);
            }
        }
        Granularity::Monthly => {
            let mut cursor = first_of_month(start);
            let last = first_of_month(end);
            while cursor <= last {
                keys.push(period_key(granularity, cursor));
                cursor = add_months_clamped(cursor, 1);
            }
        }
    }
    keys
}

/// Parses a period key back into the first date of its bucket: the day
/// itself, the ISO week's Monday, or the first of the month.
pub fn period_start_date(granularity: Granularity, key: &str) -> Option<NaiveDate> {
    match granularity {
        Granularity::Daily => NaiveDate::parse_from_str(key, "%Y-%m-%d").ok(),
        Granularity::Monthly => {
            let (year_part, month_part) = key.split_once('-')?;
            let year = year_part.parse::<i32>().ok()?;
            let month = month_part.parse::<u32>().ok()?;
            NaiveDate::from_ymd_opt(year, month, 1)
        }
        Granularity::Weekly => {
            let (year_part, week_part) = key.split_once("-W")?;
            let year = year_part.parse::<i32>().ok()?;
            let week = week_part.parse::<u32>().ok()?;
            NaiveDate::from_isoywd_opt(year, week, Weekday::Mon)
        }
    }
}

/// Last date of the bucket identified by `key` (Sunday, last calendar
/// day of the month, or the day itself).
pub fn period_end_date(granularity: Granularity, key: &str) -> Option<NaiveDate> {
    let start = period_start_date(granularity, key)?;
    match granularity {
        Granularity::Daily => Some(start),
        Granularity::Weekly => Some(start + Duration::days(6)),
        Granularity::Monthly => Some(add_months_clamped(start, 1) - Duration::days(1)),
    }
}

/// The within-year cyclical position used to align values across years:
/// ISO week number, calendar month number, or day-of-year.
pub fn sub_period(granularity: Granularity, date: NaiveDate) -> u32 {
    match granularity {
        Granularity::Weekly => date.iso_week().week(),
        Granularity::Monthly => date.month(),
        Granularity::Daily => date.ordinal(),
    }
}

/// Calendar year implied by a period key (the ISO week-year for weekly
/// keys). Used for year-boundary markers and sub-period alignment.
pub fn key_year(key: &str) -> Option<i32> {
    let year_part = key.split('-').next()?;
    year_part.parse::<i32>().ok()
}

pub fn monday_of_iso_week(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year(), date.month(), 1).unwrap_or(date)
}

/// Month stepping that clamps the day to the target month's length, so
/// Jan 31 + 1 month is Feb 28/29 rather than an invalid date.
pub fn add_months_clamped(date: NaiveDate, months: i32) -> NaiveDate {
    let current_month = i32::try_from(date.month()).unwrap_or(1);
    let mut raw_month = current_month + months;
    let mut year = date.year();

    while raw_month > 12 {
        raw_month -= 12;
        year += 1;
    }
    while raw_month < 1 {
        raw_month += 12;
        year -= 1;
    }

    let month = u32::try_from(raw_month).unwrap_or(1);
    let day = date.day().min(days_in_month(year, month));
    if let Some(result) = NaiveDate::from_ymd_opt(year, month, day) {
        return result;
    }
    date
}

fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
        _ => 31,
    }
}

fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}
