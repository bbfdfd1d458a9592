use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;

use crate::error::{EngineError, EngineResult};
use crate::types::SaleRecord;

/// Reads a record source from a file path, or stdin when the path is `-`.
pub fn read_source(path: &Path) -> EngineResult<String> {
    if path.as_os_str() == "-" {
        let mut content = String::new();
        std::io::stdin()
            .read_to_string(&mut content)
            .map_err(|err| EngineError::source_read_failed("-", &err.to_string()))?;
        return Ok(content);
    }
    std::fs::read_to_string(path)
        .map_err(|err| EngineError::source_read_failed(&path.display().to_string(), &err.to_string()))
}

pub fn parse_date_arg(value: &str, field_name: &str, command: &str) -> EngineResult<NaiveDate> {
    if !looks_like_iso_date(value) {
        return Err(EngineError::invalid_argument_for_command(
            &format!("`{field_name}` must use YYYY-MM-DD format."),
            Some(command),
        ));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
        EngineError::invalid_argument_for_command(
            &format!("`{field_name}` must use YYYY-MM-DD format with valid calendar values."),
            Some(command),
        )
    })
}

/// Resolves the effective date range: explicit bounds win, otherwise the
/// span of the dated records. `None` when nothing carries a date; the
/// caller emits an empty payload rather than inventing a range.
///
/// A reversed explicit range is deliberately not an argument error; the
/// pipeline renders it as an empty chart.
pub fn resolve_range(
    records: &[SaleRecord],
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> Option<(NaiveDate, NaiveDate)> {
    let dates = records.iter().filter_map(|record| record.date);
    let earliest = dates.clone().min();
    let latest = dates.max();
    let from = from.or(earliest)?;
    let to = to.or(latest)?;
    Some((from, to))
}

pub fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

fn looks_like_iso_date(value: &str) -> bool {
    if value.len() != 10 {
        return false;
    }
    let bytes = value.as_bytes();
    if bytes[4] != b'-' || bytes[7] != b'-' {
        return false;
    }
    for index in [0usize, 1, 2, 3, 5, 6, 8, 9] {
        if !bytes[index].is_ascii_digit() {
            return false;
        }
    }
    true
}
