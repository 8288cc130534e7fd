pub mod config;
pub mod constants;
pub mod countdown;
pub mod errors;
pub mod files;
pub mod force_wipe;
pub mod lifecycle;
pub mod log_sweep;
pub mod panel;
pub mod release_feed;
pub mod reseed;
pub mod run_log;
pub mod run_registry;
pub mod schedule;
pub mod scheduler;
pub mod wipe;

// Re-export commonly used types
pub use config::{Config, ConfigManager, ServerWipeConfig};
pub use errors::WipeError;
pub use force_wipe::ForceWipeCoordinator;
pub use panel::PanelClient;
pub use release_feed::ReleaseFeed;
pub use run_registry::RunRegistry;
pub use scheduler::WipeScheduler;
pub use wipe::{RunOutcome, WipeOrchestrator};
