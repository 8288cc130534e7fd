//! Retention sweep for run log directories
//!
//! Run logs live in one `YYYY-MM-DD` directory per day. Directories dated at or
//! before `today - retention_days` are removed; anything else under the log root
//! is left alone.

use chrono::{Duration, NaiveDate};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, warn};

pub async fn sweep_expired(log_root: &Path, today: NaiveDate, retention_days: i64) -> std::io::Result<Vec<PathBuf>> {
    let mut removed = Vec::new();

    let mut entries = match fs::read_dir(log_root).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(removed),
        Err(e) => return Err(e),
    };

    let cutoff = today - Duration::days(retention_days);

    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name();
        let Some(date) = name
            .to_str()
            .and_then(|name| NaiveDate::parse_from_str(name, "%Y-%m-%d").ok())
        else {
            continue;
        };

        if date > cutoff || !entry.file_type().await?.is_dir() {
            continue;
        }

        let path = entry.path();
        info!("removing logs older than {} days ({})", retention_days, path.display());
        match fs::remove_dir_all(&path).await {
            Ok(()) => removed.push(path),
            Err(e) => warn!("Failed to remove {}: {}", path.display(), e),
        }
    }

    Ok(removed)
}
