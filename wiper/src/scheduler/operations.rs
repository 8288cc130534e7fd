// File: wiper/src/scheduler/operations.rs
use crate::config::{Config, ServerWipeConfig};
use crate::force_wipe::{CycleOutcome, ForceWipeCoordinator};
use crate::log_sweep::sweep_expired;
use crate::panel::PanelClient;
use crate::schedule::{resolve, today_in};
use crate::wipe::{RunOutcome, WipeOrchestrator};
use super::{should_start_scheduled, validate_6_field_cron};
use anyhow::{anyhow, Result};
use chrono::Utc;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info, instrument, warn};

pub struct WipeScheduler {
    config: Arc<Config>,
    panel: Arc<PanelClient>,
    orchestrator: Arc<WipeOrchestrator>,
    coordinator: Arc<ForceWipeCoordinator>,
    scheduler: JobScheduler,
}

impl WipeScheduler {
    pub async fn new(
        config: Arc<Config>,
        panel: Arc<PanelClient>,
        orchestrator: Arc<WipeOrchestrator>,
        coordinator: Arc<ForceWipeCoordinator>,
    ) -> Result<Self> {
        let scheduler = JobScheduler::new().await
            .map_err(|e| anyhow!("Failed to create JobScheduler: {}", e))?;

        Ok(Self {
            config,
            panel,
            orchestrator,
            coordinator,
            scheduler,
        })
    }

    #[instrument(skip(self))]
    pub async fn start(&self) -> Result<usize> {
        info!("Starting wipe scheduler with 6-field cron format (sec min hour day month dow)");
        let mut scheduled_count = 0;

        for (label, server) in &self.config.servers {
            if !server.enabled {
                info!("Wipes disabled for {}, skipping schedule", label);
                continue;
            }

            // A server the panel cannot resolve is never scheduled
            let metadata = match self.panel.get_metadata(&server.server_id).await {
                Ok(metadata) => metadata,
                Err(e) => {
                    error!("✗ error retrieving server details for {} ({}): {}", label, server.server_id, e);
                    continue;
                }
            };

            info!(
                "starting schedule for {} ({}) - cron: '{}' ({})",
                metadata.name, server.server_id, server.cron, server.timezone.name()
            );
            match self.schedule_wipe_job(server.clone()).await {
                Ok(_) => {
                    scheduled_count += 1;
                    info!("✓ Scheduled wipes for {}: {}", label, server.cron);
                }
                Err(e) => {
                    error!("✗ Failed to schedule wipes for {}: {} (schedule: {})", label, e, server.cron);
                }
            }
        }

        let force_wipe = &self.config.force_wipe;
        info!("starting force wipe schedule - cron: '{}' ({})", force_wipe.cron, force_wipe.timezone.name());
        self.schedule_force_wipe_job().await?;
        scheduled_count += 1;

        info!("starting log purge schedule - cron: '{}' ({})", self.config.log_sweep_cron, force_wipe.timezone.name());
        self.schedule_log_sweep_job().await?;
        scheduled_count += 1;

        self.scheduler.start().await
            .map_err(|e| anyhow!("Failed to start scheduler: {}", e))?;
        info!("✓ Wipe scheduler started successfully with {} jobs", scheduled_count);

        Ok(scheduled_count)
    }

    pub async fn shutdown(&self) -> Result<()> {
        let mut scheduler = self.scheduler.clone();
        scheduler.shutdown().await
            .map_err(|e| anyhow!("Failed to stop scheduler: {}", e))?;
        info!("Wipe scheduler stopped");
        Ok(())
    }

    async fn schedule_wipe_job(&self, server: ServerWipeConfig) -> Result<()> {
        validate_6_field_cron(&server.cron)
            .map_err(|e| anyhow!("Invalid 6-field cron schedule '{}': {}", server.cron, e))?;

        let orchestrator = self.orchestrator.clone();
        let defer_to_force_wipe = self.config.force_wipe.defer_scheduled_wipes;
        let server = Arc::new(server);
        let schedule = server.cron.clone();
        let timezone = server.timezone;

        let job = Job::new_async_tz(schedule.as_str(), timezone, move |_uuid, _scheduler| {
            let orchestrator = orchestrator.clone();
            let server = server.clone();

            Box::pin(async move {
                let decision = resolve(Utc::now(), server.timezone, &server.wipe_schedule);
                if !should_start_scheduled(&decision, defer_to_force_wipe) {
                    info!(
                        "No wipe for {} today ({} days since force wipe)",
                        server.label, decision.days_since_anchor
                    );
                    return;
                }

                info!("🧹 Executing scheduled wipe for {}", server.label);
                match orchestrator.start_wipe(&server, decision, false).await {
                    RunOutcome::Completed => info!("✓ Scheduled wipe completed for {}", server.label),
                    RunOutcome::Failed(e) => error!("✗ Scheduled wipe failed for {}: {}", server.label, e),
                    RunOutcome::Skipped(reason) => warn!("Scheduled wipe skipped for {}: {}", server.label, reason),
                }
            })
        })
        .map_err(|e| anyhow!("Failed to create wipe job for '{}': {}", schedule, e))?;

        self.scheduler.add(job).await
            .map_err(|e| anyhow!("Failed to add wipe job to scheduler: {}", e))?;

        Ok(())
    }

    async fn schedule_force_wipe_job(&self) -> Result<()> {
        let schedule = self.config.force_wipe.cron.clone();
        validate_6_field_cron(&schedule)
            .map_err(|e| anyhow!("Invalid 6-field cron schedule '{}': {}", schedule, e))?;

        let coordinator = self.coordinator.clone();

        let job = Job::new_async_tz(schedule.as_str(), self.config.force_wipe.timezone, move |_uuid, _scheduler| {
            let coordinator = coordinator.clone();

            Box::pin(async move {
                match coordinator.run_cycle(Utc::now()).await {
                    CycleOutcome::NotAnchorDay { today } => {
                        info!("{} is not a force wipe day", today);
                    }
                    CycleOutcome::ReleaseNotFound { attempts } => {
                        error!("✗ Force wipe abandoned after {} release checks", attempts);
                    }
                    CycleOutcome::Dispatched { published_at, runs } => {
                        let completed = runs.iter()
                            .filter(|(_, outcome)| *outcome == RunOutcome::Completed)
                            .count();
                        info!(
                            "✓ Force wipe for release {} finished: {}/{} servers completed",
                            published_at, completed, runs.len()
                        );
                    }
                }
            })
        })
        .map_err(|e| anyhow!("Failed to create force wipe job for '{}': {}", schedule, e))?;

        self.scheduler.add(job).await
            .map_err(|e| anyhow!("Failed to add force wipe job to scheduler: {}", e))?;

        Ok(())
    }

    async fn schedule_log_sweep_job(&self) -> Result<()> {
        let schedule = self.config.log_sweep_cron.clone();
        validate_6_field_cron(&schedule)
            .map_err(|e| anyhow!("Invalid 6-field cron schedule '{}': {}", schedule, e))?;

        let log_root = PathBuf::from(&self.config.log_root);
        let retention_days = self.config.log_retention_days;
        let timezone = self.config.force_wipe.timezone;

        let job = Job::new_async_tz(schedule.as_str(), timezone, move |_uuid, _scheduler| {
            let log_root = log_root.clone();

            Box::pin(async move {
                let today = today_in(Utc::now(), timezone);
                match sweep_expired(&log_root, today, retention_days).await {
                    Ok(removed) if !removed.is_empty() => {
                        info!("Removed {} log directories older than {} days", removed.len(), retention_days);
                    }
                    Ok(_) => {}
                    Err(e) => error!("Log sweep failed for {}: {}", log_root.display(), e),
                }
            })
        })
        .map_err(|e| anyhow!("Failed to create log sweep job for '{}': {}", schedule, e))?;

        self.scheduler.add(job).await
            .map_err(|e| anyhow!("Failed to add log sweep job to scheduler: {}", e))?;

        Ok(())
    }
}
