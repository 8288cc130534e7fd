//! Unit tests for configuration parsing and validation
//!
//! These tests verify that configuration files are parsed correctly
//! and validation rules are enforced.

mod common;

use common::fixtures::*;
use std::fs;
use tempfile::TempDir;
use chrono::NaiveDate;
use wiper::config::{Config, ConfigManager, ServerWipeConfig, WipeDay};
use wiper::schedule::resolve_date;
use wiper::scheduler::should_start_scheduled;

#[test]
fn test_parse_main_config() {
    let main_toml = r#"
panel_url = "https://panel.example.com/api/client"
panel_api_key = "ptlc_abc"
log_root = "/var/log/wiper"
log_retention_days = 30

[force_wipe]
cron = "0 0 18 * * Thu"
timezone = "America/New_York"
defer_scheduled_wipes = false

[messages]
wipe_start = "Wiping in {0} minutes"
    "#;

    let config: Config = toml::from_str(main_toml).unwrap();

    assert_eq!(config.panel_url, "https://panel.example.com/api/client");
    assert_eq!(config.panel_api_key, "ptlc_abc");
    assert_eq!(config.log_root, "/var/log/wiper");
    assert_eq!(config.log_retention_days, 30);
    assert_eq!(config.log_sweep_cron, "0 0 0 * * *");
    assert_eq!(config.force_wipe.timezone, chrono_tz::America::New_York);
    assert!(!config.force_wipe.defer_scheduled_wipes);
    assert!(config.force_wipe.release_feed_url.contains("Oxide.Rust"));
    assert_eq!(config.messages.wipe_start, "Wiping in {0} minutes");
    assert_eq!(config.messages.wipe_countdown, "Server wipe in {0} seconds!");
}

#[test]
fn test_scheduled_wipes_defer_to_force_wipe_by_default() {
    let main_toml = r#"
panel_url = "https://panel.example.com/api/client"
panel_api_key = "ptlc_abc"

[force_wipe]
cron = "0 0 18 * * Thu"
timezone = "America/New_York"
    "#;

    let config: Config = toml::from_str(main_toml).unwrap();
    assert!(config.force_wipe.defer_scheduled_wipes);

    // A table that wipes on the anchor day leaves that day to the forced run
    let table = [WipeDay {
        days_since_force_wipe: 0,
        blueprint_wipe: false,
    }];
    let anchor_day = resolve_date(NaiveDate::from_ymd_opt(2024, 3, 7).unwrap(), &table);
    assert!(anchor_day.is_wipe_day());
    assert!(!should_start_scheduled(&anchor_day, config.force_wipe.defer_scheduled_wipes));
}

#[test]
fn test_parse_server_config() {
    let server_toml = r#"
server_id = "1a2b3c4d"
enabled = true
timezone = "Europe/Berlin"
cron = "0 0 19 * * *"
wipe_countdown_seconds = 300
seeds = [1234, 5678]

[[wipe_schedule]]
days_since_force_wipe = 0
blueprint_wipe = true

[[wipe_schedule]]
days_since_force_wipe = 14

[[files_on_wipe]]
root = "/server/rust/server/rust"
files = ["proceduralmap.*"]

[[files_on_force_wipe]]
root = "/server/rust/oxide/data"
files = ["*.json"]
    "#;

    let server: ServerWipeConfig = toml::from_str(server_toml).unwrap();

    assert_eq!(server.server_id, "1a2b3c4d");
    assert_eq!(server.timezone, chrono_tz::Europe::Berlin);
    assert_eq!(server.wipe_countdown_seconds, 300);
    assert_eq!(server.wipe_schedule.len(), 2);
    assert!(server.wipe_schedule[0].blueprint_wipe);
    assert!(!server.wipe_schedule[1].blueprint_wipe);
    assert_eq!(server.files_on_force_wipe[0].files, vec!["*.json".to_string()]);
    assert!(server.files_on_blueprint_wipe.is_empty());
    assert_eq!(server.seeds, Some(vec![1234, 5678]));
    assert_eq!(server.maps, None);
}

#[test]
fn test_unknown_timezone_is_rejected() {
    let server_toml = r#"
server_id = "1a2b3c4d"
enabled = true
timezone = "Mars/Olympus_Mons"
cron = "0 0 19 * * *"
    "#;

    let result: Result<ServerWipeConfig, _> = toml::from_str(server_toml);
    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("unknown timezone"));
}

#[tokio::test]
async fn test_load_config_directory() {
    let test_config = TestConfigBuilder::new()
        .with_server("main-server", servers::SERVER_1, |s| s.wipe_day(7, false))
        .with_server("event-server", servers::SERVER_2, |s| s.enabled(false))
        .build();

    let manager = ConfigManager::new(test_config.config_dir_str()).await.unwrap();
    let config = manager.get_current_config();

    assert_eq!(config.servers.len(), 2);
    let main = &config.servers["main-server"];
    assert_eq!(main.label, "main-server");
    assert_eq!(main.server_id, servers::SERVER_1);
    assert_eq!(main.wipe_schedule.len(), 2);
    assert!(!config.servers["event-server"].enabled);
}

#[tokio::test]
async fn test_missing_main_config_fails() {
    let temp_dir = TempDir::new().unwrap();

    let result = ConfigManager::new(temp_dir.path().to_string_lossy().to_string()).await;

    assert!(result.is_err());
    assert!(result.err().map(|e| e.to_string()).unwrap_or_default().contains("main.toml"));
}

#[tokio::test]
async fn test_no_servers_fails_validation() {
    let test_config = TestConfigBuilder::new().build();

    let result = ConfigManager::new(test_config.config_dir_str()).await;

    assert!(result.err().map(|e| e.to_string()).unwrap_or_default().contains("servers"));
}

#[tokio::test]
async fn test_five_field_cron_fails_validation() {
    let test_config = TestConfigBuilder::new()
        .with_server("main-server", servers::SERVER_1, |s| s.cron("0 18 * * *"))
        .build();

    let result = ConfigManager::new(test_config.config_dir_str()).await;

    let message = result.err().map(|e| e.to_string()).unwrap_or_default();
    assert!(message.contains("main-server.cron"), "{}", message);
}

#[tokio::test]
async fn test_duplicate_server_id_fails_validation() {
    let test_config = TestConfigBuilder::new()
        .with_server("first", servers::SERVER_1, |s| s)
        .with_server("second", servers::SERVER_1, |s| s)
        .build();

    let result = ConfigManager::new(test_config.config_dir_str()).await;

    let message = result.err().map(|e| e.to_string()).unwrap_or_default();
    assert!(message.contains("configured more than once"), "{}", message);
}

#[tokio::test]
async fn test_zero_retention_fails_validation() {
    let test_config = TestConfigBuilder::new()
        .with_main_config(|m| m.log_retention_days(0))
        .with_server("main-server", servers::SERVER_1, |s| s)
        .build();

    let result = ConfigManager::new(test_config.config_dir_str()).await;

    let message = result.err().map(|e| e.to_string()).unwrap_or_default();
    assert!(message.contains("log_retention_days"), "{}", message);
}

#[tokio::test]
async fn test_non_toml_files_are_ignored() {
    let test_config = TestConfigBuilder::new()
        .with_server("main-server", servers::SERVER_1, |s| s)
        .build();
    fs::write(test_config.config_dir.join("README.md"), "not config").unwrap();

    let manager = ConfigManager::new(test_config.config_dir_str()).await.unwrap();

    assert_eq!(manager.get_current_config().servers.len(), 1);
}
