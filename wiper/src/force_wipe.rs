//! Synchronized force wipe on anchor day
//!
//! On the first Thursday of the month (in the global force wipe timezone) the
//! coordinator polls the release feed until a release published that same day
//! shows up, then force wipes every enabled server whose own schedule, resolved
//! in its own timezone, has an anchor-day wipe. If no release appears within
//! the attempt bound, nobody is force wiped that cycle.

use chrono::{DateTime, NaiveDate, Utc};
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::{debug, error, info, instrument, warn};

use crate::config::Config;
use crate::constants::release_feed::{MAX_ATTEMPTS, POLL_INTERVAL};
use crate::release_feed::ReleaseFeed;
use crate::schedule::{self, anchor_for, today_in};
use crate::wipe::{RunOutcome, WipeOrchestrator};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReleaseWatchPolicy {
    pub poll_interval: Duration,
    pub max_attempts: u32,
}

impl Default for ReleaseWatchPolicy {
    fn default() -> Self {
        Self {
            poll_interval: POLL_INTERVAL,
            max_attempts: MAX_ATTEMPTS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Today is not the anchor day in the force wipe timezone
    NotAnchorDay { today: NaiveDate },
    /// No same-day release within the attempt bound
    ReleaseNotFound { attempts: u32 },
    /// Release found; one entry per force wiped server
    Dispatched {
        published_at: DateTime<Utc>,
        runs: Vec<(String, RunOutcome)>,
    },
}

pub struct ForceWipeCoordinator {
    config: Arc<Config>,
    feed: ReleaseFeed,
    orchestrator: Arc<WipeOrchestrator>,
    policy: ReleaseWatchPolicy,
}

impl ForceWipeCoordinator {
    pub fn new(config: Arc<Config>, feed: ReleaseFeed, orchestrator: Arc<WipeOrchestrator>) -> Self {
        Self {
            config,
            feed,
            orchestrator,
            policy: ReleaseWatchPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: ReleaseWatchPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// One trigger of the force wipe job, evaluated as of `now`
    #[instrument(skip(self))]
    pub async fn run_cycle(&self, now: DateTime<Utc>) -> CycleOutcome {
        let timezone = self.config.force_wipe.timezone;
        let today = today_in(now, timezone);

        if anchor_for(today) != today {
            debug!("{} is not a force wipe day ({})", today, timezone.name());
            return CycleOutcome::NotAnchorDay { today };
        }

        info!("Force wipe day {} ({}), watching {}", today, timezone.name(), self.feed.url());
        let watch_started = Instant::now();

        let published_at = match self.wait_for_release(today).await {
            Ok(published_at) => published_at,
            Err(attempts) => {
                error!("failed to find latest release after {} tries, no force wipe this cycle", attempts);
                return CycleOutcome::ReleaseNotFound { attempts };
            }
        };

        // Server schedules are resolved at detection time, not trigger time
        let elapsed = chrono::Duration::from_std(watch_started.elapsed())
            .unwrap_or_else(|_| chrono::Duration::zero());
        let runs = self.dispatch(now + elapsed).await;

        info!("Force wipe dispatched to {} servers", runs.len());
        CycleOutcome::Dispatched { published_at, runs }
    }

    /// Poll the feed until a release published on `today` appears; `Err` carries the attempts made
    async fn wait_for_release(&self, today: NaiveDate) -> Result<DateTime<Utc>, u32> {
        let timezone = self.config.force_wipe.timezone;

        for attempt in 1..=self.policy.max_attempts {
            if attempt > 1 {
                sleep(self.policy.poll_interval).await;
            }

            match self.feed.latest_published_at().await {
                Ok(published_at) if today_in(published_at, timezone) == today => {
                    info!("Release published at {} found on try #{}", published_at, attempt);
                    return Ok(published_at);
                }
                Ok(published_at) => {
                    debug!("Latest release is from {}, waiting (try #{})", published_at, attempt);
                }
                Err(e) => {
                    warn!("error finding latest release (try #{}): {}", attempt, e);
                }
            }
        }

        Err(self.policy.max_attempts)
    }

    /// Force wipe every enabled server with an anchor-day wipe as of `now`
    pub async fn dispatch(&self, now: DateTime<Utc>) -> Vec<(String, RunOutcome)> {
        let runs = self
            .config
            .servers
            .values()
            .filter(|server| server.enabled)
            .filter_map(|server| {
                let decision = schedule::resolve(now, server.timezone, &server.wipe_schedule);
                decision.is_force_wipe_day().then_some((server, decision))
            })
            .map(|(server, decision)| async move {
                info!("Force wiping {} ({})", server.label, server.server_id);
                let outcome = self.orchestrator.start_wipe(server, decision, true).await;
                (server.server_id.clone(), outcome)
            });

        join_all(runs).await
    }
}
