// File: wiper/src/config/mod.rs
pub mod manager;
use crate::constants::{defaults, release_feed};
use chrono_tz::Tz;
use serde::{Deserialize, Deserializer};
use std::collections::HashMap;
pub use manager::ConfigManager;

/// Global settings from `main.toml`
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub panel_url: String,
    pub panel_api_key: String,
    #[serde(default = "default_log_root")]
    pub log_root: String,
    #[serde(default = "default_log_retention_days")]
    pub log_retention_days: i64,
    #[serde(default = "default_log_sweep_cron")]
    pub log_sweep_cron: String,
    pub force_wipe: ForceWipeConfig,
    #[serde(default)]
    pub messages: MessageTemplates,
    // Populated from individual server config files, keyed by file stem
    #[serde(skip)]
    pub servers: HashMap<String, ServerWipeConfig>,
}

fn default_log_root() -> String {
    defaults::LOG_ROOT.to_string()
}

fn default_log_retention_days() -> i64 {
    defaults::LOG_RETENTION_DAYS
}

fn default_log_sweep_cron() -> String {
    defaults::LOG_SWEEP_CRON.to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct ForceWipeConfig {
    pub cron: String,
    #[serde(deserialize_with = "deserialize_timezone")]
    pub timezone: Tz,
    #[serde(default = "default_release_feed_url")]
    pub release_feed_url: String,
    // Scheduled (non-forced) runs skip the anchor day; the forced run owns it
    #[serde(default = "default_defer_scheduled_wipes")]
    pub defer_scheduled_wipes: bool,
}

fn default_defer_scheduled_wipes() -> bool {
    true
}

fn default_release_feed_url() -> String {
    release_feed::DEFAULT_URL.to_string()
}

/// In-game chat templates; `{0}` is replaced with the number of minutes or seconds
#[derive(Debug, Clone, Deserialize)]
pub struct MessageTemplates {
    #[serde(default = "default_force_wipe_message")]
    pub force_wipe: String,
    #[serde(default = "default_wipe_start_message")]
    pub wipe_start: String,
    #[serde(default = "default_wipe_countdown_message")]
    pub wipe_countdown: String,
}

fn default_force_wipe_message() -> String {
    defaults::FORCE_WIPE_MESSAGE.to_string()
}

fn default_wipe_start_message() -> String {
    defaults::WIPE_START_MESSAGE.to_string()
}

fn default_wipe_countdown_message() -> String {
    defaults::WIPE_COUNTDOWN_MESSAGE.to_string()
}

impl Default for MessageTemplates {
    fn default() -> Self {
        Self {
            force_wipe: default_force_wipe_message(),
            wipe_start: default_wipe_start_message(),
            wipe_countdown: default_wipe_countdown_message(),
        }
    }
}

impl MessageTemplates {
    pub fn render(template: &str, value: impl std::fmt::Display) -> String {
        template.replace("{0}", &value.to_string())
    }
}

/// One game server, loaded from `<config_dir>/<label>.toml`
#[derive(Debug, Clone, Deserialize)]
pub struct ServerWipeConfig {
    #[serde(skip)]
    pub label: String,
    pub server_id: String,
    pub enabled: bool,
    #[serde(deserialize_with = "deserialize_timezone")]
    pub timezone: Tz,
    pub cron: String,
    #[serde(default = "default_wipe_countdown_seconds")]
    pub wipe_countdown_seconds: u64,
    #[serde(default)]
    pub wipe_schedule: Vec<WipeDay>,
    #[serde(default)]
    pub files_on_wipe: Vec<FileGroup>,
    #[serde(default)]
    pub files_on_force_wipe: Vec<FileGroup>,
    #[serde(default)]
    pub files_on_blueprint_wipe: Vec<FileGroup>,
    pub seeds: Option<Vec<u64>>,
    pub maps: Option<Vec<String>>,
}

fn default_wipe_countdown_seconds() -> u64 {
    crate::constants::countdown::MIN_SECONDS
}

/// An entry of the wipe-day table: wipe `days_since_force_wipe` days after the anchor day
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WipeDay {
    pub days_since_force_wipe: i64,
    #[serde(default)]
    pub blueprint_wipe: bool,
}

/// A remote directory and the globs of file names to purge inside it
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FileGroup {
    pub root: String,
    pub files: Vec<String>,
}

fn deserialize_timezone<'de, D>(deserializer: D) -> Result<Tz, D::Error>
where
    D: Deserializer<'de>,
{
    let name = String::deserialize(deserializer)?;
    name.parse::<Tz>()
        .map_err(|e| serde::de::Error::custom(format!("unknown timezone '{}': {}", name, e)))
}
