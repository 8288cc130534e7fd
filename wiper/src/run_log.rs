//! Per-run log files
//!
//! Each wipe run appends human-readable lines to
//! `<log_root>/<YYYY-MM-DD>/<server_id>-<hh-mm-am|pm>-log.txt`, dated in the
//! server's own timezone. Every line is mirrored to `tracing` so the process
//! log shows the same progress.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use std::path::{Path, PathBuf};
use tokio::fs::{self, File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

pub struct RunLog {
    server_id: String,
    path: PathBuf,
    file: Mutex<File>,
}

impl RunLog {
    pub async fn create(log_root: &Path, server_id: &str, started_at: &DateTime<Tz>) -> std::io::Result<Self> {
        let dir = log_root.join(started_at.format("%Y-%m-%d").to_string());
        fs::create_dir_all(&dir).await?;

        let path = dir.join(format!("{}-{}-log.txt", server_id, started_at.format("%I-%M-%P")));
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;

        Ok(Self {
            server_id: server_id.to_string(),
            path,
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn line(&self, message: impl AsRef<str>) {
        let message = message.as_ref();
        info!(server_id = %self.server_id, "{}", message);
        self.write(message).await;
    }

    pub async fn warn(&self, message: impl AsRef<str>) {
        let message = message.as_ref();
        warn!(server_id = %self.server_id, "{}", message);
        self.write(&format!("WARN: {}", message)).await;
    }

    pub async fn error(&self, message: impl AsRef<str>) {
        let message = message.as_ref();
        error!(server_id = %self.server_id, "{}", message);
        self.write(&format!("ERROR: {}", message)).await;
    }

    // A failing log write never fails the run
    async fn write(&self, message: &str) {
        let line = format!("[{}] {}\n", Utc::now().format("%Y-%m-%d %H:%M:%S"), message);
        let mut file = self.file.lock().await;
        if let Err(e) = file.write_all(line.as_bytes()).await {
            warn!("Failed to write run log {}: {}", self.path.display(), e);
            return;
        }
        if let Err(e) = file.flush().await {
            warn!("Failed to flush run log {}: {}", self.path.display(), e);
        }
    }
}
