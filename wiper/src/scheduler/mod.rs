//! Cron-based triggers for wipes
//!
//! This module registers three kinds of jobs:
//! - one scheduled wipe job per enabled server, in the server's timezone
//! - one force wipe job, in the global force wipe timezone
//! - one daily run log retention sweep
//!
//! # Features
//!
//! - **Cron-based scheduling**: Uses 6-field cron expressions (sec min hour day month dow)
//! - **Timezone-aware**: Each job fires in the timezone it is configured with
//! - **Calendar gate**: A fired server job only wipes if the wipe-day table matches today
//! - **Conflict prevention**: A server already being wiped is skipped
//!
//! # Configuration
//!
//! ```toml
//! # config/main.toml
//! [force_wipe]
//! cron = "0 0 18 * * Thu"
//! timezone = "America/New_York"
//!
//! # config/main-server.toml
//! server_id = "1a2b3c4d"
//! enabled = true
//! timezone = "America/New_York"
//! cron = "0 0 18 * * *"
//!
//! [[wipe_schedule]]
//! days_since_force_wipe = 7
//! ```

pub mod operations;
pub use operations::WipeScheduler;

use anyhow::{anyhow, Result};
use tracing::debug;

use crate::schedule::WipeDecision;

/// Whether a fired server job should start a regular run
pub fn should_start_scheduled(decision: &WipeDecision, defer_to_force_wipe: bool) -> bool {
    if !decision.is_wipe_day() {
        return false;
    }
    !(defer_to_force_wipe && decision.is_anchor_day)
}

pub fn validate_6_field_cron(schedule: &str) -> Result<()> {
    let parts: Vec<&str> = schedule.split_whitespace().collect();

    if parts.len() != 6 {
        return Err(anyhow!("tokio-cron-scheduler requires exactly 6 fields: second minute hour day month dayofweek. Got {} fields: '{}'", parts.len(), schedule));
    }

    validate_cron_field(parts[0], "second", 0, 59)?;
    validate_cron_field(parts[1], "minute", 0, 59)?;
    validate_cron_field(parts[2], "hour", 0, 23)?;
    validate_cron_field(parts[3], "day", 1, 31)?;
    validate_cron_field(parts[4], "month", 1, 12)?;
    validate_cron_field(parts[5], "dayofweek", 0, 7)?;

    debug!("Validated 6-field cron: '{}' → sec:{} min:{} hour:{} day:{} month:{} dow:{}",
          schedule, parts[0], parts[1], parts[2], parts[3], parts[4], parts[5]);

    Ok(())
}

/// Checks a field made of comma-separated items: `*`, `?`, `n`, `a-b`, each optionally followed by `/step`
fn validate_cron_field(field: &str, name: &str, min: u32, max: u32) -> Result<()> {
    for item in field.split(',') {
        validate_cron_item(item, name, min, max)?;
    }
    Ok(())
}

fn validate_cron_item(item: &str, name: &str, min: u32, max: u32) -> Result<()> {
    if item.is_empty() {
        return Err(anyhow!("Empty {} item in list", name));
    }

    // Named days and months are left to the cron parser
    if item.chars().any(|c| c.is_ascii_alphabetic()) {
        return Ok(());
    }

    let (base, step) = match item.split_once('/') {
        Some((base, step_str)) => {
            let step = step_str.parse::<u32>()
                .map_err(|_| anyhow!("Invalid {} step value: {}", name, step_str))?;
            (base, Some(step))
        }
        None => (item, None),
    };

    if step == Some(0) {
        return Err(anyhow!("{} step value cannot be 0", name));
    }

    if base == "*" || base == "?" {
        return Ok(());
    }

    if let Some((start_str, end_str)) = base.split_once('-') {
        let start = start_str.parse::<u32>()
            .map_err(|_| anyhow!("Invalid {} range start: {}", name, start_str))?;
        let end = end_str.parse::<u32>()
            .map_err(|_| anyhow!("Invalid {} range end: {}", name, end_str))?;

        if start < min || start > max || end < min || end > max {
            return Err(anyhow!("{} range {}-{} is outside valid range {}-{}", name, start, end, min, max));
        }
        if start > end {
            return Err(anyhow!("{} range {}-{} runs backwards", name, start, end));
        }
        return Ok(());
    }

    let value = base.parse::<u32>()
        .map_err(|_| anyhow!("Invalid {} value: {}", name, base))?;

    if value < min || value > max {
        return Err(anyhow!("{} value {} is outside valid range {}-{}", name, value, min, max));
    }

    Ok(())
}
