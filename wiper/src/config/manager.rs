// File: wiper/src/config/manager.rs
use super::{Config, ServerWipeConfig};
use crate::errors::ConfigError;
use crate::scheduler::validate_6_field_cron;
use anyhow::{anyhow, Result};
use glob::glob;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::fs;
use tracing::{debug, info};

pub struct ConfigManager {
    current_config: Arc<Config>,
}

impl ConfigManager {
    pub async fn new(config_dir: String) -> Result<Self> {
        let config = Self::load_configuration(&config_dir).await?;
        validate(&config)?;
        Ok(Self {
            current_config: Arc::new(config),
        })
    }

    pub fn get_current_config(&self) -> Arc<Config> {
        self.current_config.clone()
    }

    async fn load_configuration(config_dir: &str) -> Result<Config> {
        let main_config_path = format!("{}/main.toml", config_dir);
        let main_config_content = fs::read_to_string(&main_config_path).await
            .map_err(|e| ConfigError::LoadFailed {
                path: main_config_path.clone(),
                reason: e.to_string(),
            })?;

        let mut config: Config = toml::from_str(&main_config_content)
            .map_err(|e| ConfigError::ParseError {
                reason: format!("{}: {}", main_config_path, e),
            })?;

        // Every other file describes one game server
        let pattern = format!("{}/*.toml", config_dir);
        let mut servers = HashMap::new();

        for entry in glob(&pattern).map_err(|e| anyhow!("Glob pattern error: {}", e))? {
            let path = entry.map_err(|e| anyhow!("Glob entry error: {}", e))?;
            let filename = path.file_name()
                .and_then(|name| name.to_str())
                .ok_or_else(|| anyhow!("Invalid filename"))?;

            if filename == "main.toml" {
                continue;
            }

            let label = filename.strip_suffix(".toml")
                .ok_or_else(|| anyhow!("Invalid config filename: {}", filename))?;

            debug!("Loading server config: {}", path.display());

            let content = fs::read_to_string(&path).await
                .map_err(|e| ConfigError::LoadFailed {
                    path: path.display().to_string(),
                    reason: e.to_string(),
                })?;

            let mut server: ServerWipeConfig = toml::from_str(&content)
                .map_err(|e| ConfigError::ParseError {
                    reason: format!("{}: {}", path.display(), e),
                })?;
            server.label = label.to_string();

            servers.insert(label.to_string(), server);
        }

        config.servers = servers;

        info!(
            "Loaded {} servers ({} enabled)",
            config.servers.len(),
            config.servers.values().filter(|s| s.enabled).count()
        );

        Ok(config)
    }
}

/// Reject configurations the process cannot run with
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.panel_url.trim().is_empty() {
        return Err(ConfigError::MissingRequired {
            field: "panel_url".to_string(),
        });
    }
    if config.panel_api_key.trim().is_empty() {
        return Err(ConfigError::MissingRequired {
            field: "panel_api_key".to_string(),
        });
    }
    if config.servers.is_empty() {
        return Err(ConfigError::MissingRequired {
            field: "servers (no server config files found)".to_string(),
        });
    }
    if config.log_retention_days < 1 {
        return Err(ConfigError::InvalidValue {
            field: "log_retention_days".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }

    validate_6_field_cron(&config.force_wipe.cron).map_err(|e| ConfigError::InvalidValue {
        field: "force_wipe.cron".to_string(),
        reason: e.to_string(),
    })?;
    validate_6_field_cron(&config.log_sweep_cron).map_err(|e| ConfigError::InvalidValue {
        field: "log_sweep_cron".to_string(),
        reason: e.to_string(),
    })?;

    let mut seen_ids = HashSet::new();
    for (label, server) in &config.servers {
        if server.server_id.trim().is_empty() {
            return Err(ConfigError::MissingRequired {
                field: format!("{}.server_id", label),
            });
        }
        if !seen_ids.insert(server.server_id.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: format!("{}.server_id", label),
                reason: format!("server {} is configured more than once", server.server_id),
            });
        }
        validate_6_field_cron(&server.cron).map_err(|e| ConfigError::InvalidValue {
            field: format!("{}.cron", label),
            reason: e.to_string(),
        })?;
        if server.files_on_wipe.iter()
            .chain(&server.files_on_force_wipe)
            .chain(&server.files_on_blueprint_wipe)
            .any(|group| group.root.trim().is_empty())
        {
            return Err(ConfigError::InvalidValue {
                field: format!("{}.files", label),
                reason: "file group root cannot be empty".to_string(),
            });
        }
    }

    Ok(())
}
