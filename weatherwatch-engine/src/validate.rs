//! Reading validation.

use crate::reading::RawValue;

/// Dead-sensor marker reported by some stations.
pub const TEMPERATURE_SENTINEL: f64 = -999.0;
pub const TEMPERATURE_MIN: f64 = -50.0;
pub const TEMPERATURE_MAX: f64 = 60.0;
pub const HUMIDITY_MIN: f64 = 0.0;
pub const HUMIDITY_MAX: f64 = 100.0;

/// Outcome of validating one reading.
///
/// A reading is valid exactly when no problems were found.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[must_use]
pub struct Validation {
    problems: Vec<String>,
}

impl Validation {
    pub fn is_ok(&self) -> bool {
        self.problems.is_empty()
    }

    /// Problems in the order they were found: temperature first, then humidity.
    pub fn problems(&self) -> &[String] {
        &self.problems
    }

    pub fn into_problems(self) -> Vec<String> {
        self.problems
    }
}

/// Validate a temperature/humidity pair.
///
/// Both fields are checked independently, so a reading can carry one problem
/// per field. Never fails: coercion failures are reported as problems.
pub fn validate(temperature: &RawValue, humidity: &RawValue) -> Validation {
    let mut problems = Vec::new();

    match temperature.as_number() {
        None => problems.push(format!(
            "temperature not a number: {}",
            temperature.quoted()
        )),
        Some(t) if !temperature_in_range(t) => {
            problems.push(format!("invalid temperature {:?}", t))
        }
        Some(_) => {}
    }

    match humidity.as_number() {
        None => problems.push(format!("humidity not a number: {}", humidity.quoted())),
        Some(h) if !humidity_in_range(h) => {
            problems.push(format!("invalid humidity {:?}", h))
        }
        Some(_) => {}
    }

    Validation { problems }
}

fn temperature_in_range(t: f64) -> bool {
    // NaN fails both comparisons and is rejected.
    t != TEMPERATURE_SENTINEL && (TEMPERATURE_MIN..=TEMPERATURE_MAX).contains(&t)
}

fn humidity_in_range(h: f64) -> bool {
    (HUMIDITY_MIN..=HUMIDITY_MAX).contains(&h)
}
