//! Stop/start confirmation for a remote server process
//!
//! A transition sends the power signal, then polls the panel on a fixed
//! interval until the server reports the target state:
//!
//! ```text
//! Idle → Transitioning → Confirmed
//!                      ↘ Failed (retry bound exceeded, signal rejected, poll error)
//! ```
//!
//! Stopping is quick and polled every 10s for up to 10 retries. Starting loads
//! the world and is polled every 60s for up to 20 retries. A failed poll ends
//! the transition at once instead of polling blind.

use std::time::Duration;
use tokio::time::sleep;
use tracing::debug;

use crate::constants::lifecycle::{
    START_MAX_RETRIES, START_POLL_INTERVAL, STOP_MAX_RETRIES, STOP_POLL_INTERVAL,
};
use crate::errors::LifecycleError;
use crate::panel::{PanelClient, PowerSignal, ServerState};
use crate::run_log::RunLog;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerTarget {
    Offline,
    Running,
}

impl PowerTarget {
    pub fn signal(self) -> PowerSignal {
        match self {
            PowerTarget::Offline => PowerSignal::Stop,
            PowerTarget::Running => PowerSignal::Start,
        }
    }

    pub fn state(self) -> ServerState {
        match self {
            PowerTarget::Offline => ServerState::Offline,
            PowerTarget::Running => ServerState::Running,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LifecyclePolicy {
    pub poll_interval: Duration,
    pub max_retries: u32,
}

impl LifecyclePolicy {
    pub fn stop() -> Self {
        Self {
            poll_interval: STOP_POLL_INTERVAL,
            max_retries: STOP_MAX_RETRIES,
        }
    }

    pub fn start() -> Self {
        Self {
            poll_interval: START_POLL_INTERVAL,
            max_retries: START_MAX_RETRIES,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionPhase {
    Idle,
    Transitioning { attempts: u32 },
    Confirmed { attempts: u32 },
    Failed,
}

pub struct PowerTransition<'a> {
    panel: &'a PanelClient,
    log: &'a RunLog,
    server_id: &'a str,
    target: PowerTarget,
    policy: LifecyclePolicy,
    phase: TransitionPhase,
}

impl<'a> PowerTransition<'a> {
    pub fn new(
        panel: &'a PanelClient,
        log: &'a RunLog,
        server_id: &'a str,
        target: PowerTarget,
        policy: LifecyclePolicy,
    ) -> Self {
        Self {
            panel,
            log,
            server_id,
            target,
            policy,
            phase: TransitionPhase::Idle,
        }
    }

    pub fn phase(&self) -> &TransitionPhase {
        &self.phase
    }

    /// Drive the server to the target state; returns the number of polls it took
    pub async fn execute(&mut self) -> Result<u32, LifecycleError> {
        let signal = self.target.signal();
        let target_state = self.target.state();

        if let Err(source) = self.panel.set_power(self.server_id, signal).await {
            self.phase = TransitionPhase::Failed;
            return Err(LifecycleError::SignalFailed {
                server_id: self.server_id.to_string(),
                signal: signal.to_string(),
                source,
            });
        }

        let verb = match self.target {
            PowerTarget::Offline => "stopping",
            PowerTarget::Running => "starting",
        };
        self.log.line(format!("{} server {}", verb, self.server_id)).await;

        let mut attempt = 1;
        loop {
            self.phase = TransitionPhase::Transitioning { attempts: attempt };
            sleep(self.policy.poll_interval).await;

            self.log
                .line(format!("checking server {} status (try #{})", self.server_id, attempt))
                .await;

            let state = match self.panel.get_resource_state(self.server_id).await {
                Ok(state) => state,
                Err(source) => {
                    self.phase = TransitionPhase::Failed;
                    return Err(LifecycleError::PollFailed {
                        server_id: self.server_id.to_string(),
                        attempt,
                        source,
                    });
                }
            };

            if state == target_state {
                self.phase = TransitionPhase::Confirmed { attempts: attempt };
                self.log.line(format!("server {} {}", self.server_id, target_state)).await;
                return Ok(attempt);
            }

            debug!("Server {} is {}, waiting for {}", self.server_id, state, target_state);

            if attempt > self.policy.max_retries {
                self.phase = TransitionPhase::Failed;
                return Err(LifecycleError::Timeout {
                    server_id: self.server_id.to_string(),
                    target: target_state.to_string(),
                    attempts: attempt,
                    last_state: Some(state.to_string()),
                });
            }

            attempt += 1;
        }
    }
}

/// Stop the server and wait until the panel reports it offline
pub async fn stop_server(
    panel: &PanelClient,
    log: &RunLog,
    server_id: &str,
    policy: LifecyclePolicy,
) -> Result<u32, LifecycleError> {
    PowerTransition::new(panel, log, server_id, PowerTarget::Offline, policy)
        .execute()
        .await
}

/// Start the server and wait until the panel reports it running
pub async fn start_server(
    panel: &PanelClient,
    log: &RunLog,
    server_id: &str,
    policy: LifecyclePolicy,
) -> Result<u32, LifecycleError> {
    PowerTransition::new(panel, log, server_id, PowerTarget::Running, policy)
        .execute()
        .await
}
