//! Registry of in-flight wipe runs
//!
//! Each run owns one log sink, registered under its server id for the lifetime
//! of the run. A server id present in the registry is busy: a second run for the
//! same server is rejected until the first one releases its slot.
//!
//! # Usage
//!
//! ```ignore
//! let log = registry.try_acquire(&server_id, true, log_root, &started_at).await?;
//! // run the workflow, writing to `log`...
//! registry.release(&server_id).await;
//! ```

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::errors::WipeError;
use crate::run_log::RunLog;

#[derive(Clone)]
pub struct ActiveRun {
    pub run_id: Uuid,
    pub server_id: String,
    pub is_force_wipe: bool,
    pub started_at: DateTime<Utc>,
    pub log: Arc<RunLog>,
}

pub struct RunRegistry {
    active_runs: Arc<RwLock<HashMap<String, ActiveRun>>>, // server_id -> run
}

impl RunRegistry {
    pub fn new() -> Self {
        Self {
            active_runs: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Claim the server and open its run log
    /// Returns `WipeError::Busy` if a run for this server is still in flight
    #[instrument(skip(self, log_root, started_at), fields(server = %server_id))]
    pub async fn try_acquire(
        &self,
        server_id: &str,
        is_force_wipe: bool,
        log_root: &Path,
        started_at: &DateTime<Tz>,
    ) -> Result<ActiveRun, WipeError> {
        let mut active = self.active_runs.write().await;

        if let Some(current) = active.get(server_id) {
            let duration = Utc::now().signed_duration_since(current.started_at);
            warn!(
                "Server {} already has {} run {} in flight (started {}m ago)",
                server_id,
                if current.is_force_wipe { "forced" } else { "scheduled" },
                current.run_id,
                duration.num_minutes()
            );
            return Err(WipeError::Busy {
                server_id: server_id.to_string(),
            });
        }

        let log = RunLog::create(log_root, server_id, started_at).await?;
        let run = ActiveRun {
            run_id: Uuid::new_v4(),
            server_id: server_id.to_string(),
            is_force_wipe,
            started_at: started_at.with_timezone(&Utc),
            log: Arc::new(log),
        };

        active.insert(server_id.to_string(), run.clone());
        info!(
            "Started {} run {} on {}",
            if is_force_wipe { "forced" } else { "scheduled" },
            run.run_id,
            server_id
        );
        Ok(run)
    }

    /// Drop the server's slot and its log sink
    #[instrument(skip(self), fields(server = %server_id))]
    pub async fn release(&self, server_id: &str) {
        let mut active = self.active_runs.write().await;
        if let Some(run) = active.remove(server_id) {
            let duration = Utc::now().signed_duration_since(run.started_at);
            info!(
                "Finished run {} on {} (took {}m)",
                run.run_id,
                server_id,
                duration.num_minutes()
            );
        }
    }

    pub async fn is_active(&self, server_id: &str) -> bool {
        let active = self.active_runs.read().await;
        active.contains_key(server_id)
    }

    pub async fn active_count(&self) -> usize {
        let active = self.active_runs.read().await;
        active.len()
    }
}

impl Default for RunRegistry {
    fn default() -> Self {
        Self::new()
    }
}
