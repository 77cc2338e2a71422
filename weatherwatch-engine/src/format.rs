//! Display formatting for snapshot fields.

use chrono::{DateTime, Utc};

use crate::reading::RawValue;
use crate::timestamp::format_iso;

/// Placeholder for a missing value.
pub const NOT_AVAILABLE: &str = "n/a";

pub const TEMPERATURE_UNIT: &str = "°C";
pub const HUMIDITY_UNIT: &str = "%";

/// Format a raw measurement: one decimal and the unit when it coerces to a
/// number, verbatim text otherwise, `n/a` when absent.
pub fn measurement(value: &RawValue, unit: &str) -> String {
    match value.as_number() {
        Some(n) => format!("{:.1} {}", n, unit),
        None => value.to_string(),
    }
}

/// Format a rolling average with one decimal, or `n/a`.
pub fn average(value: Option<f64>) -> String {
    value.map_or_else(|| NOT_AVAILABLE.to_string(), |v| format!("{:.1}", v))
}

pub fn instant(value: Option<DateTime<Utc>>) -> String {
    value.map_or_else(|| NOT_AVAILABLE.to_string(), format_iso)
}
