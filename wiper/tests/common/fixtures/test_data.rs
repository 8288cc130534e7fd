//! Common test data and constants

use chrono::{DateTime, TimeZone, Utc};
use std::time::Duration;
use wiper::lifecycle::LifecyclePolicy;
use wiper::wipe::WipeTimings;

pub const API_KEY: &str = "test-api-key";

/// Common test server ids
pub mod servers {
    pub const SERVER_1: &str = "1a2b3c4d";
    pub const SERVER_2: &str = "5e6f7a8b";
    pub const SERVER_3: &str = "9c0d1e2f";
}

/// Thursday 2024-03-07, the first Thursday of March 2024
pub fn anchor_day_noon() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 7, 12, 0, 0).unwrap()
}

/// One week after the anchor day
pub fn week_after_anchor_noon() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 14, 12, 0, 0).unwrap()
}

/// Lifecycle policy with a negligible poll interval
pub fn fast_policy(max_retries: u32) -> LifecyclePolicy {
    LifecyclePolicy {
        poll_interval: Duration::from_millis(1),
        max_retries,
    }
}

/// Run timings that make a whole wipe take milliseconds
pub fn fast_timings() -> WipeTimings {
    WipeTimings {
        stop: fast_policy(3),
        start: fast_policy(3),
        countdown_tick: Duration::ZERO,
    }
}
