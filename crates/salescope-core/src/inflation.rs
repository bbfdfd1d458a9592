use std::collections::BTreeMap;
use std::fmt;

use chrono::{Datelike, NaiveDate};

/// A calendar month, the resolution of the inflation table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        if (1..=12).contains(&month) {
            return Some(Self { year, month });
        }
        None
    }

    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let (year_part, month_part) = value.split_once('-')?;
        let year = year_part.parse::<i32>().ok()?;
        let month = month_part.parse::<u32>().ok()?;
        Self::new(year, month)
    }

    pub fn next(self) -> Self {
        if self.month == 12 {
            return Self {
                year: self.year + 1,
                month: 1,
            };
        }
        Self {
            year: self.year,
            month: self.month + 1,
        }
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{:04}-{:02}", self.year, self.month)
    }
}

/// Fixed monthly inflation rates, in percent per month.
///
/// Immutable and passed explicitly wherever a monetary projection needs
/// normalizing; months absent from the table contribute a factor of 1.
#[derive(Debug, Clone, Default)]
pub struct InflationTable {
    rates: BTreeMap<YearMonth, f64>,
}

impl InflationTable {
    pub fn from_rates<I>(rates: I) -> Self
    where
        I: IntoIterator<Item = (YearMonth, f64)>,
    {
        Self {
            rates: rates.into_iter().collect(),
        }
    }

    pub fn rate_for(&self, month: YearMonth) -> Option<f64> {
        self.rates.get(&month).copied()
    }

    pub fn first_month(&self) -> Option<YearMonth> {
        self.rates.keys().next().copied()
    }

    /// Compounded factor of `(1 + rate/100)` over every table month from
    /// `from` through `to`, both inclusive. An anchor after the target is
    /// not negative time; the factor is simply 1.
    pub fn factor_between(&self, from: YearMonth, to: YearMonth) -> f64 {
        let mut factor = 1.0;
        let mut cursor = from;
        while cursor <= to {
            if let Some(rate) = self.rate_for(cursor) {
                factor *= 1.0 + rate / 100.0;
            }
            cursor = cursor.next();
        }
        factor
    }

    pub fn adjust(&self, value: f64, from: YearMonth, to: YearMonth) -> f64 {
        value * self.factor_between(from, to)
    }
}

/// The monthly rate table shipped with the engine (Feb 2022 through
/// Mar 2026; later months are projections frozen at publication time).
pub fn default_monthly_rates() -> InflationTable {
    const RATES: [(i32, u32, f64); 50] = [
        (2022, 2, 3.8),
        (2022, 3, 6.7),
        (2022, 4, 6.0),
        (2022, 5, 5.1),
        (2022, 6, 5.3),
        (2022, 7, 7.4),
        (2022, 8, 7.0),
        (2022, 9, 6.2),
        (2022, 10, 6.3),
        (2022, 11, 4.9),
        (2022, 12, 5.1),
        (2023, 1, 6.0),
        (2023, 2, 6.6),
        (2023, 3, 7.7),
        (2023, 4, 8.4),
        (2023, 5, 7.8),
        (2023, 6, 6.0),
        (2023, 7, 6.3),
        (2023, 8, 6.9),
        (2023, 9, 7.0),
        (2023, 10, 8.3),
        (2023, 11, 12.9),
        (2023, 12, 25.5),
        (2024, 1, 20.6),
        (2024, 2, 13.2),
        (2024, 3, 10.9),
        (2024, 4, 8.8),
        (2024, 5, 4.2),
        (2024, 6, 4.6),
        (2024, 7, 4.0),
        (2024, 8, 4.2),
        (2024, 9, 3.5),
        (2024, 10, 2.7),
        (2024, 11, 2.4),
        (2024, 12, 2.7),
        (2025, 1, 2.2),
        (2025, 2, 2.4),
        (2025, 3, 2.5),
        (2025, 4, 2.3),
        (2025, 5, 2.3),
        (2025, 6, 2.3),
        (2025, 7, 2.3),
        (2025, 8, 2.3),
        (2025, 9, 2.3),
        (2025, 10, 2.3),
        (2025, 11, 2.3),
        (2025, 12, 2.3),
        (2026, 1, 1.5),
        (2026, 2, 1.5),
        (2026, 3, 1.5),
    ];

    InflationTable::from_rates(RATES.iter().filter_map(|(year, month, rate)| {
        YearMonth::new(*year, *month).map(|key| (key, *rate))
    }))
}
