//! Wipe workflow for a single server
//!
//! A run walks strictly in order:
//!
//! 1. claim the server in the run registry and open its log
//! 2. fetch panel metadata
//! 3. announce the force wipe (forced runs only) and count down in chat
//! 4. stop the server and wait for `offline`
//! 5. purge matched files in one batched delete
//! 6. clear the seed and map URL startup variables
//! 7. set a new map URL or world seed
//! 8. start the server and wait for `running`
//!
//! Any failure ends the run at the run boundary: it is written to the run log,
//! returned as `RunOutcome::Failed`, and never reaches other servers' runs.
//! The registry slot is released on every exit path, panics included.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{error, instrument, warn};

use crate::config::{MessageTemplates, ServerWipeConfig};
use crate::constants::panel::{DELETE_ROOT, MAP_URL_VARIABLE, WORLD_SEED_VARIABLE};
use crate::countdown::CountdownPlan;
use crate::errors::{FileOperationError, WipeError};
use crate::files;
use crate::lifecycle::{start_server, stop_server, LifecyclePolicy};
use crate::panel::{PanelClient, ServerMetadata};
use crate::reseed::{choose_map, MapChoice, MapSelector, RandomSelector};
use crate::run_log::RunLog;
use crate::run_registry::RunRegistry;
use crate::schedule::WipeDecision;

const DISPLAY_FORMAT: &str = "%a %b %-d %Y @ %I:%M %P";

/// Poll and sleep durations of one run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WipeTimings {
    pub stop: LifecyclePolicy,
    pub start: LifecyclePolicy,
    /// Length of one countdown second
    pub countdown_tick: Duration,
}

impl Default for WipeTimings {
    fn default() -> Self {
        Self {
            stop: LifecyclePolicy::stop(),
            start: LifecyclePolicy::start(),
            countdown_tick: Duration::from_secs(1),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Completed,
    Failed(String),
    Skipped(String),
}

/// Ephemeral context of one run
struct WipeRun<'a> {
    config: &'a ServerWipeConfig,
    decision: WipeDecision,
    is_force_wipe: bool,
    log: Arc<RunLog>,
    files: Vec<String>,
}

pub struct WipeOrchestrator {
    panel: Arc<PanelClient>,
    registry: Arc<RunRegistry>,
    selector: Arc<dyn MapSelector>,
    messages: MessageTemplates,
    log_root: PathBuf,
    timings: WipeTimings,
}

impl WipeOrchestrator {
    pub fn new(
        panel: Arc<PanelClient>,
        registry: Arc<RunRegistry>,
        messages: MessageTemplates,
        log_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            panel,
            registry,
            selector: Arc::new(RandomSelector),
            messages,
            log_root: log_root.into(),
            timings: WipeTimings::default(),
        }
    }

    pub fn with_selector(mut self, selector: Arc<dyn MapSelector>) -> Self {
        self.selector = selector;
        self
    }

    pub fn with_timings(mut self, timings: WipeTimings) -> Self {
        self.timings = timings;
        self
    }

    pub fn registry(&self) -> &Arc<RunRegistry> {
        &self.registry
    }

    /// Run the whole workflow for one server; never returns an error
    #[instrument(skip_all, fields(server = %config.server_id, force = is_force_wipe))]
    pub async fn start_wipe(
        &self,
        config: &ServerWipeConfig,
        decision: WipeDecision,
        is_force_wipe: bool,
    ) -> RunOutcome {
        if !config.enabled {
            return RunOutcome::Skipped(format!("server {} is disabled", config.server_id));
        }

        let started_at = Utc::now().with_timezone(&config.timezone);
        let active = match self
            .registry
            .try_acquire(&config.server_id, is_force_wipe, &self.log_root, &started_at)
            .await
        {
            Ok(active) => active,
            Err(e @ WipeError::Busy { .. }) => {
                warn!("Skipping wipe: {}", e);
                return RunOutcome::Skipped(e.to_string());
            }
            Err(e) => {
                error!("Could not open run log for {}: {}", config.server_id, e);
                return RunOutcome::Failed(e.to_string());
            }
        };

        let mut run = WipeRun {
            config,
            decision,
            is_force_wipe,
            log: active.log.clone(),
            files: Vec::new(),
        };

        // A panic inside the workflow must not leave the slot claimed
        let result = AssertUnwindSafe(self.execute(&mut run, &started_at))
            .catch_unwind()
            .await;

        let outcome = match result {
            Ok(Ok(())) => {
                run.log.line("wipe complete").await;
                RunOutcome::Completed
            }
            Ok(Err(e)) => {
                run.log
                    .error(format!("error wiping server {}: {}", config.server_id, e))
                    .await;
                RunOutcome::Failed(e.to_string())
            }
            Err(_) => {
                run.log
                    .error(format!("wipe of server {} panicked", config.server_id))
                    .await;
                RunOutcome::Failed("wipe panicked".to_string())
            }
        };

        self.registry.release(&config.server_id).await;
        outcome
    }

    async fn execute(&self, run: &mut WipeRun<'_>, started_at: &DateTime<Tz>) -> Result<(), WipeError> {
        let config = run.config;
        let server_id = config.server_id.as_str();

        let metadata = self.panel.get_metadata(server_id).await?;
        self.log_header(run, &metadata, started_at).await;

        if run.is_force_wipe {
            self.announce(run, &self.messages.force_wipe).await;
        }
        self.countdown(run).await;

        stop_server(&self.panel, &run.log, server_id, self.timings.stop).await?;

        self.purge_files(run).await;

        run.log.line("removing old seed and custom map url").await;
        self.set_variable(run, WORLD_SEED_VARIABLE, "").await?;
        self.set_variable(run, MAP_URL_VARIABLE, "").await?;

        match choose_map(config, self.selector.as_ref()) {
            MapChoice::MapUrl(url) => {
                run.log.line(format!("using custom map list {:?}", config.maps)).await;
                self.set_variable(run, MAP_URL_VARIABLE, &url).await?;
            }
            MapChoice::ListedSeed(seed) => {
                run.log.line(format!("using map seed list {:?}", config.seeds)).await;
                self.set_variable(run, WORLD_SEED_VARIABLE, &seed.to_string()).await?;
            }
            MapChoice::GeneratedSeed(seed) => {
                run.log.line("generating random map seed").await;
                self.set_variable(run, WORLD_SEED_VARIABLE, &seed.to_string()).await?;
            }
        }

        start_server(&self.panel, &run.log, server_id, self.timings.start).await?;

        Ok(())
    }

    async fn log_header(&self, run: &WipeRun<'_>, metadata: &ServerMetadata, started_at: &DateTime<Tz>) {
        let config = run.config;
        let decision = &run.decision;

        run.log.line(format!("{} ({})", metadata.name, config.server_id)).await;
        if let Some(node) = &metadata.node {
            run.log.line(format!("node: {}", node)).await;
        }
        run.log
            .line(format!(
                "wipe started on {} ({})",
                started_at.format(DISPLAY_FORMAT),
                config.timezone.name()
            ))
            .await;
        run.log.line(format!("wipe schedule {:?}", decision.matched_rules)).await;
        run.log
            .line(format!(
                "\tisForceWipe: {}\n\tisBPWipe: {}\n\tisAnchorDay: {}\n\tanchorDate: {}\n\ttoday: {}\n\tdaysSinceAnchor: {}",
                run.is_force_wipe,
                decision.is_blueprint_wipe,
                decision.is_anchor_day,
                decision.anchor_date.format("%a %b %-d %Y"),
                decision.current_date.format("%a %b %-d %Y"),
                decision.days_since_anchor
            ))
            .await;
    }

    // Chat messages are best effort
    async fn announce(&self, run: &WipeRun<'_>, text: &str) {
        let server_id = &run.config.server_id;
        run.log.line(format!("server {} SEND MESSAGE: {}", server_id, text)).await;
        if let Err(e) = self.panel.send_message(server_id, text).await {
            run.log
                .warn(format!("error sending message for server {}: {}", server_id, e))
                .await;
        }
    }

    async fn countdown(&self, run: &WipeRun<'_>) {
        let plan = CountdownPlan::new(run.config.wipe_countdown_seconds);

        let opening = MessageTemplates::render(&self.messages.wipe_start, plan.total_minutes());
        self.announce(run, &opening).await;
        self.wait_seconds(plan.initial_wait).await;

        for step in &plan.steps {
            let text = MessageTemplates::render(&self.messages.wipe_countdown, step.announce);
            self.announce(run, &text).await;
            self.wait_seconds(step.wait_after).await;
        }
    }

    async fn wait_seconds(&self, seconds: u64) {
        let ticks = u32::try_from(seconds).unwrap_or(u32::MAX);
        sleep(self.timings.countdown_tick.saturating_mul(ticks)).await;
    }

    // Listing and delete failures are logged and skipped
    async fn purge_files(&self, run: &mut WipeRun<'_>) {
        let server_id = run.config.server_id.as_str();
        let groups = files::plan(run.config, run.is_force_wipe, run.decision.is_blueprint_wipe);
        let resolved = files::resolve(&self.panel, server_id, &groups, &run.log).await;

        if !resolved.failures.is_empty() {
            run.log
                .warn(format!(
                    "{} of {} file groups could not be resolved",
                    resolved.failures.len(),
                    groups.len()
                ))
                .await;
        }

        run.files = resolved.paths;
        if run.files.is_empty() {
            run.log.line("no files matched").await;
            return;
        }

        run.log.line(format!("deleting {} files", run.files.len())).await;
        run.log.line(format!("{:?}", run.files)).await;

        match self.panel.delete_files(server_id, DELETE_ROOT, &run.files).await {
            Ok(()) => {
                run.log
                    .line(format!("successfully deleted {} files", run.files.len()))
                    .await;
            }
            Err(source) => {
                let e = FileOperationError::DeleteFailed {
                    count: run.files.len(),
                    source,
                };
                run.log
                    .warn(format!("error deleting files for server {}: {}", server_id, e))
                    .await;
            }
        }
    }

    async fn set_variable(&self, run: &WipeRun<'_>, key: &str, value: &str) -> Result<(), WipeError> {
        let server_id = &run.config.server_id;
        run.log
            .line(format!("change server {} {} to '{}'", server_id, key, value))
            .await;
        self.panel.set_startup_variable(server_id, key, value).await?;
        Ok(())
    }
}
