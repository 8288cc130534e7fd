// File: wiper/src/main.rs
use anyhow::Result;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use wiper::constants::defaults;
use wiper::{
    ConfigManager, ForceWipeCoordinator, PanelClient, ReleaseFeed, RunRegistry, WipeOrchestrator,
    WipeScheduler,
};

#[tokio::main]
async fn main() -> Result<()> {
    let env_filter = EnvFilter::from_default_env()
        .add_directive("wiper=info".parse()?)
        .add_directive("tokio_cron_scheduler=warn".parse()?)
        .add_directive("hyper=warn".parse()?)
        .add_directive("reqwest=warn".parse()?);

    fmt().with_env_filter(env_filter).init();

    info!("Starting server wiper");

    let config_dir = std::env::args()
        .nth(1)
        .unwrap_or_else(|| defaults::CONFIG_DIR.to_string());

    // Load configuration
    let config_manager = ConfigManager::new(config_dir.clone()).await?;
    let config = config_manager.get_current_config();
    info!(
        "Configuration loaded from {}: {} servers, log root {}",
        config_dir,
        config.servers.len(),
        config.log_root
    );

    let panel = Arc::new(PanelClient::new(&config.panel_url, &config.panel_api_key));
    info!("Panel client initialized for {}", panel.base_url());

    let registry = Arc::new(RunRegistry::new());

    let orchestrator = Arc::new(WipeOrchestrator::new(
        panel.clone(),
        registry.clone(),
        config.messages.clone(),
        config.log_root.clone(),
    ));

    let feed = ReleaseFeed::new(&config.force_wipe.release_feed_url)?;
    let coordinator = Arc::new(ForceWipeCoordinator::new(
        config.clone(),
        feed,
        orchestrator.clone(),
    ));
    info!("Force wipe coordinator watching {}", config.force_wipe.release_feed_url);

    let scheduler = WipeScheduler::new(config.clone(), panel, orchestrator, coordinator).await?;
    let job_count = scheduler.start().await?;
    info!("Scheduler running with {} jobs", job_count);

    tokio::signal::ctrl_c().await?;
    info!("Shutdown requested");

    let in_flight = registry.active_count().await;
    if in_flight > 0 {
        warn!("Stopping with {} wipes still in flight", in_flight);
    }

    scheduler.shutdown().await?;
    info!("Server wiper stopped");

    Ok(())
}
