//! Station liveness status.

use core::fmt;

/// Liveness of a station at snapshot time.
///
/// Variants are declared from healthiest to least healthy, so sorting by
/// status puts working stations first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum StationStatus {
    /// Recent message, last reading passed validation.
    Ok,
    /// Recent message, last reading failed validation.
    Invalid,
    /// Last message is older than the staleness threshold.
    Stale,
    /// No message has ever been received.
    Offline,
}

impl StationStatus {
    pub const ALL: [StationStatus; 4] = [
        StationStatus::Ok,
        StationStatus::Invalid,
        StationStatus::Stale,
        StationStatus::Offline,
    ];

    /// Display label used in tables and exports.
    pub fn label(&self) -> &'static str {
        match self {
            StationStatus::Ok => "OK",
            StationStatus::Invalid => "INVALID",
            StationStatus::Stale => "STALE",
            StationStatus::Offline => "OFFLINE",
        }
    }

    /// Whether the station needs operator attention.
    pub fn needs_attention(&self) -> bool {
        !matches!(self, StationStatus::Ok)
    }
}

impl fmt::Display for StationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
