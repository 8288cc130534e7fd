//! Application-wide constants for intervals, retry bounds, and fixed paths
//!
//! This module organizes constants by category to keep every timing and
//! retry bound of the wipe workflow in one place.

use std::time::Duration;

/// Remote panel constants
pub mod panel {
    /// Accept header the panel client API expects
    pub const ACCEPT_HEADER: &str = "Application/vnd.pterodactyl.v1+json";

    /// Startup variable holding the procedural map seed
    pub const WORLD_SEED_VARIABLE: &str = "WORLD_SEED";

    /// Startup variable holding a custom map download URL
    pub const MAP_URL_VARIABLE: &str = "MAP_URL";

    /// Root passed to the batched delete call (matched paths are absolute)
    pub const DELETE_ROOT: &str = "/";
}

/// Lifecycle polling constants
pub mod lifecycle {
    use super::Duration;

    /// Interval between status polls while waiting for a stop
    pub const STOP_POLL_INTERVAL: Duration = Duration::from_secs(10);

    /// Status polls allowed before a stop is declared failed
    pub const STOP_MAX_RETRIES: u32 = 10;

    /// Interval between status polls while waiting for a start (world load is slow)
    pub const START_POLL_INTERVAL: Duration = Duration::from_secs(60);

    /// Status polls allowed before a start is declared failed
    pub const START_MAX_RETRIES: u32 = 20;
}

/// In-game countdown constants
pub mod countdown {
    /// Shortest countdown a server can be configured with
    pub const MIN_SECONDS: u64 = 30;

    /// Second marks announced after the initial wait
    pub const MARKS: [u64; 12] = [30, 15, 10, 9, 8, 7, 6, 5, 4, 3, 2, 1];
}

/// Map seed constants
pub mod seeds {
    /// Lowest generated seed (inclusive)
    pub const MIN_GENERATED: u64 = 1000;

    /// Highest generated seed (inclusive)
    pub const MAX_GENERATED: u64 = 1_000_999;
}

/// Blueprint data that every blueprint wipe removes
pub mod blueprints {
    /// Directory holding per-player blueprint databases
    pub const ROOT: &str = "/server/rust";

    /// Glob matching per-player blueprint databases and their journals
    pub const GLOB: &str = "player.blueprints.*.db*";
}

/// Release feed constants
pub mod release_feed {
    use super::Duration;

    /// Latest release of the modding framework that gates force wipes
    pub const DEFAULT_URL: &str = "https://api.github.com/repos/OxideMod/Oxide.Rust/releases/latest";

    /// Accept header for the GitHub releases API
    pub const ACCEPT_HEADER: &str = "application/vnd.github+json";

    /// GitHub rejects requests without a user agent
    pub const USER_AGENT: &str = concat!("wiper/", env!("CARGO_PKG_VERSION"));

    /// Per-request timeout
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

    /// Interval between release checks on a force wipe day
    pub const POLL_INTERVAL: Duration = Duration::from_secs(120);

    /// Release checks before the force wipe is abandoned for the day
    pub const MAX_ATTEMPTS: u32 = 120;
}

/// Default configuration values
pub mod defaults {
    /// Default directory for per-run log files
    pub const LOG_ROOT: &str = "./logs";

    /// Days a run log directory is kept
    pub const LOG_RETENTION_DAYS: i64 = 90;

    /// Daily at midnight (6-field cron)
    pub const LOG_SWEEP_CRON: &str = "0 0 0 * * *";

    /// Default configuration directory
    pub const CONFIG_DIR: &str = "config";

    pub const FORCE_WIPE_MESSAGE: &str = "Force wipe detected! Server is wiping soon.";
    pub const WIPE_START_MESSAGE: &str = "Server wipe in {0} minutes!";
    pub const WIPE_COUNTDOWN_MESSAGE: &str = "Server wipe in {0} seconds!";
}
