//! # weatherwatch-types
//!
//! Core types shared between the weatherwatch aggregation engine and anything
//! that displays its output. The engine owns the mutable station state; these
//! types are the read-only copies handed out in snapshots.
//!
//! ## Design Goals
//!
//! - **Invariants by construction**: a [`Range`] can never hold `min > max`,
//!   rollups only ever fold finite numbers
//! - **Optional serialization**: enable the `serde` feature to export snapshots
//!   as JSON (keys follow the `camelCase` renderer contract)
//! - **No engine logic**: locking, validation and timestamp handling live in
//!   `weatherwatch-engine`
//!
//! ## Features
//!
//! - `serde`: JSON/etc. serialization via serde (also enables `chrono/serde`)
//!
//! ## Example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use weatherwatch_types::{DailyRollup, HourBucket, HourlyRollup};
//!
//! let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
//! let mut daily = DailyRollup::new(date);
//! daily.observe(Some(20.5), Some(50.0));
//! daily.observe(Some(18.0), None);
//!
//! let t = daily.temperature.unwrap();
//! assert_eq!((t.min(), t.max()), (18.0, 20.5));
//!
//! let mut hourly = HourlyRollup::new(HourBucket::new(date, 12));
//! hourly.observe(Some(20.0), Some(40.0));
//! hourly.observe(Some(22.0), None);
//! assert_eq!(hourly.count, 2);
//! assert_eq!(hourly.temperature.mean(), Some(21.0));
//! ```

mod rollup;
mod snapshot;
mod status;

pub use rollup::*;
pub use snapshot::*;
pub use status::*;
