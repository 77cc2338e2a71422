//! Timestamp normalization to UTC.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};

use crate::reading::RawValue;

/// Offset-carrying layouts tried after RFC 3339.
const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%d %H:%M%:z",
];

/// Layouts without an offset; interpreted as UTC.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Normalize a payload timestamp to UTC.
///
/// Only text values are considered; anything else yields `None`.
pub fn parse_iso(value: &RawValue) -> Option<DateTime<Utc>> {
    match value {
        RawValue::Text(s) => parse_iso_str(s),
        _ => None,
    }
}

/// Parse an ISO-8601 timestamp, treating a trailing `Z` as `+00:00` and
/// naive timestamps as UTC. Returns `None` on any parse failure.
pub fn parse_iso_str(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    let normalized = match s.strip_suffix('Z').or_else(|| s.strip_suffix('z')) {
        Some(head) => format!("{}+00:00", head),
        None => s.to_string(),
    };

    if let Ok(dt) = DateTime::parse_from_rfc3339(&normalized) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(&normalized, format) {
            return Some(dt.with_timezone(&Utc));
        }
    }
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(&normalized, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(&normalized, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Render an instant with seconds precision and an explicit `+00:00` offset.
pub fn format_iso(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Secs, false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    #[test]
    fn trailing_z_means_utc() {
        assert_eq!(
            parse_iso_str("2024-01-02T12:34:56Z"),
            Some(utc(2024, 1, 2, 12, 34, 56))
        );
    }

    #[test]
    fn offsets_are_converted() {
        assert_eq!(
            parse_iso_str("2024-01-02T14:34:56+02:00"),
            Some(utc(2024, 1, 2, 12, 34, 56))
        );
        assert_eq!(
            parse_iso_str("2024-01-02T07:34:56-0500"),
            Some(utc(2024, 1, 2, 12, 34, 56))
        );
        assert_eq!(
            parse_iso_str("2024-01-02 14:34+02:00"),
            Some(utc(2024, 1, 2, 12, 34, 0))
        );
    }

    #[test]
    fn naive_forms_are_utc() {
        assert_eq!(
            parse_iso_str("2024-01-02T12:34:56"),
            Some(utc(2024, 1, 2, 12, 34, 56))
        );
        assert_eq!(
            parse_iso_str("2024-01-02 12:34"),
            Some(utc(2024, 1, 2, 12, 34, 0))
        );
        assert_eq!(parse_iso_str("2024-01-02"), Some(utc(2024, 1, 2, 0, 0, 0)));

        let fractional = parse_iso_str("2024-01-02T12:34:56.250").unwrap();
        assert_eq!(fractional.timestamp_subsec_millis(), 250);
    }

    #[test]
    fn garbage_and_non_text_are_absent() {
        assert_eq!(parse_iso_str("not-a-timestamp"), None);
        assert_eq!(parse_iso_str(""), None);
        assert_eq!(parse_iso_str("2024-13-40T00:00:00Z"), None);
        assert_eq!(parse_iso(&RawValue::Absent), None);
        assert_eq!(parse_iso(&RawValue::Number(12345.0)), None);
        assert_eq!(parse_iso(&RawValue::Other("[]".into())), None);
    }

    #[test]
    fn normalization_is_idempotent() {
        for input in [
            "2024-01-02T12:34:56Z",
            "2024-06-30T23:59:59+05:30",
            "2024-01-02 00:00:00",
        ] {
            let once = parse_iso_str(input).unwrap();
            let twice = parse_iso_str(&format_iso(once)).unwrap();
            assert_eq!(once, twice, "{}", input);
        }
    }

    #[test]
    fn format_uses_explicit_offset() {
        assert_eq!(
            format_iso(utc(2024, 1, 2, 12, 34, 56)),
            "2024-01-02T12:34:56+00:00"
        );
    }
}
