use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Calendar-date layout used on the wire.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, thiserror::Error)]
pub enum DateError {
    #[error("invalid date {value:?}, expected YYYY-MM-DD")]
    Invalid {
        value: String,
        #[source]
        source: chrono::ParseError,
    },
}

/// Renders a stored timestamp as a calendar date, dropping time of day.
pub fn format_date(ts: NaiveDateTime) -> String {
    ts.format(DATE_FORMAT).to_string()
}

/// Parses a `YYYY-MM-DD` string into a timestamp at midnight UTC.
pub fn parse_date(value: &str) -> Result<NaiveDateTime, DateError> {
    let trimmed = value.trim();
    NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
        .map(|d| d.and_time(chrono::NaiveTime::MIN))
        .map_err(|source| DateError::Invalid {
            value: value.to_string(),
            source,
        })
}

/// Renders a stored timestamp as RFC 3339 in UTC.
pub fn format_rfc3339(ts: NaiveDateTime) -> String {
    DateTime::<Utc>::from_naive_utc_and_offset(ts, Utc).to_rfc3339()
}

pub fn now_utc() -> NaiveDateTime {
    Utc::now().naive_utc()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_drops_time_of_day() {
        let ts = NaiveDate::from_ymd_opt(2025, 3, 9)
            .unwrap()
            .and_hms_opt(17, 45, 12)
            .unwrap();
        assert_eq!(format_date(ts), "2025-03-09");
    }

    #[test]
    fn parse_yields_midnight() {
        let ts = parse_date(" 2025-12-31 ").unwrap();
        assert_eq!(ts.to_string(), "2025-12-31 00:00:00");
    }

    #[test]
    fn parse_rejects_other_layouts() {
        for bad in ["31/12/2025", "2025-13-01", "", "next week"] {
            let err = parse_date(bad).unwrap_err();
            assert!(err.to_string().contains("YYYY-MM-DD"), "{bad}: {err}");
        }
    }

    #[test]
    fn rfc3339_is_utc() {
        let ts = NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(3, 4, 5)
            .unwrap();
        assert_eq!(format_rfc3339(ts), "2024-01-02T03:04:05+00:00");
    }
}
