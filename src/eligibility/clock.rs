use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};

/// Source of "today" for age and permit-expiry rules.
#[cfg_attr(test, mockall::automock)]
pub trait Clock {
    /// Current calendar date, already truncated to midnight.
    fn today(&self) -> NaiveDate;
}

/// Local calendar date of the host.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Clock pinned to a single date, for tests and reproducible reports.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

impl<C: Clock + ?Sized> Clock for Box<C> {
    fn today(&self) -> NaiveDate {
        (**self).today()
    }
}

/// Parse a calendar date leniently.
///
/// Accepts `YYYY-MM-DD`, RFC 3339 timestamps and naive ISO date-times. The
/// date part is taken as written, without converting between time zones.
/// Anything else is `None`.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|dt| dt.date())
}

/// `parse_date` over an optional input.
pub fn parse_optional_date(raw: Option<&str>) -> Option<NaiveDate> {
    raw.and_then(parse_date)
}
