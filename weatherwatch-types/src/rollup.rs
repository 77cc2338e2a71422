//! Calendar-aligned rollups: running extrema per day, count/sum/extrema per hour.

use core::fmt;

use chrono::{NaiveDate, NaiveDateTime, Timelike};

/// Closed interval of observed values.
///
/// Both ends are always present and `min <= max`; the only way to obtain a
/// `Range` is from finite observations.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RangeRepr"))]
pub struct Range {
    min: f64,
    max: f64,
}

impl Range {
    /// A range covering a single value. Returns `None` for NaN or infinities.
    pub fn point(value: f64) -> Option<Self> {
        value.is_finite().then_some(Self {
            min: value,
            max: value,
        })
    }

    /// Build a range from explicit bounds.
    ///
    /// Returns `None` if either bound is non-finite or `min > max`.
    pub fn new(min: f64, max: f64) -> Option<Self> {
        (min.is_finite() && max.is_finite() && min <= max).then_some(Self { min, max })
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    /// Widen the range to include `value`. Non-finite values are ignored.
    pub fn include(&mut self, value: f64) {
        if !value.is_finite() {
            return;
        }
        self.min = self.min.min(value);
        self.max = self.max.max(value);
    }

    /// Fold a value into an optional range, creating it on first observation.
    pub fn extend(range: &mut Option<Range>, value: f64) {
        match range {
            Some(r) => r.include(value),
            None => *range = Range::point(value),
        }
    }
}

#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct RangeRepr {
    min: f64,
    max: f64,
}

#[cfg(feature = "serde")]
impl TryFrom<RangeRepr> for Range {
    type Error = String;

    fn try_from(repr: RangeRepr) -> Result<Self, Self::Error> {
        Range::new(repr.min, repr.max)
            .ok_or_else(|| format!("invalid range: min {} max {}", repr.min, repr.max))
    }
}

/// Count, sum and extrema of one metric inside a bucket.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Aggregate {
    /// Number of finite samples folded in.
    pub samples: u64,
    /// Sum of those samples.
    pub sum: f64,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub range: Option<Range>,
}

impl Aggregate {
    pub fn observe(&mut self, value: f64) {
        if !value.is_finite() {
            return;
        }
        self.samples += 1;
        self.sum += value;
        Range::extend(&mut self.range, value);
    }

    /// Arithmetic mean of the folded samples, if any.
    pub fn mean(&self) -> Option<f64> {
        (self.samples > 0).then(|| self.sum / self.samples as f64)
    }
}

/// Running extrema for the current local calendar day.
///
/// Only one day is tracked; when the local date changes the owner replaces
/// the rollup with [`DailyRollup::new`], which starts with no extrema.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DailyRollup {
    pub date: NaiveDate,
    pub temperature: Option<Range>,
    pub humidity: Option<Range>,
}

impl DailyRollup {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            temperature: None,
            humidity: None,
        }
    }

    pub fn observe(&mut self, temperature: Option<f64>, humidity: Option<f64>) {
        if let Some(t) = temperature {
            Range::extend(&mut self.temperature, t);
        }
        if let Some(h) = humidity {
            Range::extend(&mut self.humidity, h);
        }
    }
}

/// Local date plus hour of day, ordered chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HourBucket {
    pub date: NaiveDate,
    pub hour: u32,
}

impl HourBucket {
    pub fn new(date: NaiveDate, hour: u32) -> Self {
        Self { date, hour }
    }

    /// Bucket containing a local wall-clock time.
    pub fn containing(local: NaiveDateTime) -> Self {
        Self {
            date: local.date(),
            hour: local.hour(),
        }
    }
}

impl fmt::Display for HourBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:02}:00", self.date.format("%Y-%m-%d"), self.hour)
    }
}

/// Per-hour accumulation of every reading received in that local hour.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HourlyRollup {
    pub bucket: HourBucket,
    /// Messages received in the hour, numeric or not.
    pub count: u64,
    pub temperature: Aggregate,
    pub humidity: Aggregate,
}

impl HourlyRollup {
    pub fn new(bucket: HourBucket) -> Self {
        Self {
            bucket,
            count: 0,
            temperature: Aggregate::default(),
            humidity: Aggregate::default(),
        }
    }

    pub fn observe(&mut self, temperature: Option<f64>, humidity: Option<f64>) {
        self.count += 1;
        if let Some(t) = temperature {
            self.temperature.observe(t);
        }
        if let Some(h) = humidity {
            self.humidity.observe(h);
        }
    }
}
