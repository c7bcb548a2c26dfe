//! Calendar date parsing and formatting at the system boundary.

use crate::error::{ParkError, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Wire format used when sending calendar dates to the visit store.
pub const WIRE_DATE_FORMAT: &str = "%Y-%m-%d";

const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parses a serialized calendar date.
///
/// Accepts plain `YYYY-MM-DD`, a local date-time (`YYYY-MM-DDTHH:MM:SS[.fff]`,
/// as emitted by the visit store) or an RFC 3339 timestamp. Any time-of-day
/// component is dropped. `field` names the offending input in the error.
pub fn parse_calendar_date(input: &str, field: &str) -> Result<NaiveDate> {
    let trimmed = input.trim();

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, WIRE_DATE_FORMAT) {
        return Ok(date);
    }
    for format in DATETIME_FORMATS {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(datetime.date());
        }
    }
    if let Ok(datetime) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(datetime.date_naive());
    }

    Err(ParkError::validation_field(
        format!("malformed date '{input}'"),
        field,
    ))
}

/// Formats a date for the visit store wire protocol.
pub fn format_wire_date(date: NaiveDate) -> String {
    date.format(WIRE_DATE_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_plain_date() {
        assert_eq!(parse_calendar_date("2024-01-03", "date").unwrap(), ymd(2024, 1, 3));
        assert_eq!(parse_calendar_date(" 2024-01-03 ", "date").unwrap(), ymd(2024, 1, 3));
    }

    #[test]
    fn test_parse_store_datetime() {
        assert_eq!(
            parse_calendar_date("2024-01-03T00:00:00", "date").unwrap(),
            ymd(2024, 1, 3)
        );
        assert_eq!(
            parse_calendar_date("2024-01-03T13:45:10.123", "date").unwrap(),
            ymd(2024, 1, 3)
        );
        assert_eq!(
            parse_calendar_date("2024-01-03T23:00:00+02:00", "date").unwrap(),
            ymd(2024, 1, 3)
        );
    }

    #[test]
    fn test_malformed_dates_are_validation_errors() {
        for input in ["", "yesterday", "2024-13-01", "2024-02-30", "01/03/2024"] {
            let err = parse_calendar_date(input, "startDate").unwrap_err();
            assert!(err.is_validation(), "{input} should fail validation");
            match err {
                ParkError::Validation { field, .. } => assert_eq!(field.as_deref(), Some("startDate")),
                other => panic!("unexpected error {other:?}"),
            }
        }
    }

    #[test]
    fn test_format_wire_date() {
        assert_eq!(format_wire_date(ymd(2024, 3, 9)), "2024-03-09");
    }
}
