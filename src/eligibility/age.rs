use chrono::{Datelike, NaiveDate};

use super::clock::parse_optional_date;

/// Whole years completed between `birth` and `today`.
///
/// A birth date in the future yields 0.
pub fn age_on(birth: NaiveDate, today: NaiveDate) -> u32 {
    let mut years = today.year() - birth.year();
    if (today.month(), today.day()) < (birth.month(), birth.day()) {
        years -= 1;
    }
    years.max(0) as u32
}

/// Age in completed years of an ISO birth date, as of `today`.
///
/// Missing or unparseable dates give 0.
pub fn years_diff(iso_date: Option<&str>, today: NaiveDate) -> u32 {
    parse_optional_date(iso_date)
        .map(|birth| age_on(birth, today))
        .unwrap_or(0)
}
