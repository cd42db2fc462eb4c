//! Wall-clock timestamps.
//!
//! Timer deadlines are expressed as [`Duration`](std::time::Duration)s and
//! never go through this module; timestamps only record when a cached
//! attribute was last written.

use chrono::{DateTime, Utc};

/// UTC timestamp attached to cached attribute values.
pub type Timestamp = DateTime<Utc>;

/// Return the current UTC time.
#[must_use]
pub fn now() -> Timestamp {
    Utc::now()
}
