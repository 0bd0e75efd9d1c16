//! Calendar date helpers.
//!
//! Calendar dates are stored as canonical `yyyy-MM-dd` strings, whose lexical
//! order matches chronological order. Range filters rely on that.

use crate::error::{CoreError, Result};
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, Month, OffsetDateTime, UtcOffset};

pub const MONTH_ABBREVIATIONS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Current calendar date in UTC.
pub fn today_utc() -> Date {
    OffsetDateTime::now_utc().date()
}

/// Parses a calendar date.
///
/// Accepts `yyyy-MM-dd` and, for clients that send full timestamps, an RFC 3339
/// date-time, which is converted to UTC before its date is taken.
pub fn parse_date(raw: &str) -> Result<Date> {
    if let Ok(date) = Date::parse(raw, format_description!("[year]-[month]-[day]")) {
        return Ok(date);
    }
    OffsetDateTime::parse(raw, &Rfc3339)
        .map(|dt| dt.to_offset(UtcOffset::UTC).date())
        .map_err(|_| CoreError::validation(format!("invalid date '{raw}', expected yyyy-MM-dd")))
}

/// Formats a date as `yyyy-MM-dd`.
pub fn format_date(date: Date) -> Result<String> {
    date.format(format_description!("[year]-[month]-[day]"))
        .map_err(|e| CoreError::internal(format!("failed to format date: {e}")))
}

/// First and last day of the month containing `date`.
pub fn month_bounds(date: Date) -> Result<(Date, Date)> {
    let (year, month) = (date.year(), date.month());
    let start = calendar_date(year, month, 1)?;
    let next_start = if month == Month::December {
        calendar_date(year + 1, Month::January, 1)?
    } else {
        calendar_date(year, month.next(), 1)?
    };
    let end = next_start
        .previous_day()
        .ok_or_else(|| CoreError::internal("date out of range"))?;
    Ok((start, end))
}

/// First and last day of `year`.
pub fn year_bounds(year: i32) -> Result<(Date, Date)> {
    Ok((
        calendar_date(year, Month::January, 1)?,
        calendar_date(year, Month::December, 31)?,
    ))
}

fn calendar_date(year: i32, month: Month, day: u8) -> Result<Date> {
    Date::from_calendar_date(year, month, day).map_err(|e| CoreError::internal(e.to_string()))
}

/// Serde adapter for `yyyy-MM-dd` dates.
pub mod iso_date {
    use serde::{Deserialize, Deserializer, Serializer};
    use time::Date;

    pub fn serialize<S>(date: &Date, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let formatted = super::format_date(*date).map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&formatted)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> std::result::Result<Date, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        super::parse_date(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn test_parse_date_formats() {
        assert_eq!(parse_date("2026-10-03").unwrap(), date!(2026 - 10 - 03));
        assert_eq!(
            parse_date("2026-10-03T22:00:00+02:00").unwrap(),
            date!(2026 - 10 - 03)
        );
        assert_eq!(
            parse_date("2026-10-31T23:30:00-05:00").unwrap(),
            date!(2026 - 11 - 01)
        );
        assert_eq!(
            parse_date("2026-11-01T01:00:00+03:00").unwrap(),
            date!(2026 - 10 - 31)
        );
        assert!(parse_date("03/10/2026").is_err());
        assert!(parse_date("2026-02-30").is_err());
    }

    #[test]
    fn test_format_date_is_zero_padded() {
        assert_eq!(format_date(date!(2026 - 01 - 05)).unwrap(), "2026-01-05");
    }

    #[test]
    fn test_month_bounds() {
        assert_eq!(
            month_bounds(date!(2024 - 02 - 14)).unwrap(),
            (date!(2024 - 02 - 01), date!(2024 - 02 - 29))
        );
        assert_eq!(
            month_bounds(date!(2025 - 02 - 01)).unwrap(),
            (date!(2025 - 02 - 01), date!(2025 - 02 - 28))
        );
        assert_eq!(
            month_bounds(date!(2026 - 12 - 31)).unwrap(),
            (date!(2026 - 12 - 01), date!(2026 - 12 - 31))
        );
        assert_eq!(
            month_bounds(date!(2026 - 04 - 30)).unwrap().1,
            date!(2026 - 04 - 30)
        );
    }

    #[test]
    fn test_year_bounds() {
        assert_eq!(
            year_bounds(2026).unwrap(),
            (date!(2026 - 01 - 01), date!(2026 - 12 - 31))
        );
    }
}
