//! Test configuration builder for creating test configs programmatically

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;
use wiper::config::ServerWipeConfig;

/// Builder for creating test configurations
pub struct TestConfigBuilder {
    temp_dir: TempDir,
    main_config: MainConfigBuilder,
    server_configs: HashMap<String, ServerConfigBuilder>,
}

impl TestConfigBuilder {
    /// Create a new test config builder
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        Self {
            temp_dir,
            main_config: MainConfigBuilder::default(),
            server_configs: HashMap::new(),
        }
    }

    /// Configure main settings
    pub fn with_main_config<F>(mut self, f: F) -> Self
    where
        F: FnOnce(MainConfigBuilder) -> MainConfigBuilder,
    {
        self.main_config = f(self.main_config);
        self
    }

    /// Add a server configuration, written to `<label>.toml`
    pub fn with_server<F>(mut self, label: &str, server_id: &str, f: F) -> Self
    where
        F: FnOnce(ServerConfigBuilder) -> ServerConfigBuilder,
    {
        let builder = f(ServerConfigBuilder::new(server_id));
        self.server_configs.insert(label.to_string(), builder);
        self
    }

    /// Build and write config files to temp directory
    pub fn build(self) -> TestConfig {
        let config_dir = self.temp_dir.path().join("config");
        fs::create_dir_all(&config_dir).expect("Failed to create config dir");

        fs::write(config_dir.join("main.toml"), self.main_config.to_toml())
            .expect("Failed to write main.toml");

        for (label, builder) in self.server_configs {
            fs::write(config_dir.join(format!("{}.toml", label)), builder.to_toml())
                .expect("Failed to write server config");
        }

        TestConfig {
            _temp_dir: self.temp_dir,
            config_dir,
        }
    }
}

impl Default for TestConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Main configuration builder
#[derive(Clone)]
pub struct MainConfigBuilder {
    panel_url: String,
    panel_api_key: String,
    force_wipe_cron: String,
    force_wipe_timezone: String,
    log_retention_days: i64,
}

impl MainConfigBuilder {
    pub fn panel_url(mut self, url: &str) -> Self {
        self.panel_url = url.to_string();
        self
    }

    pub fn panel_api_key(mut self, key: &str) -> Self {
        self.panel_api_key = key.to_string();
        self
    }

    pub fn force_wipe_cron(mut self, cron: &str) -> Self {
        self.force_wipe_cron = cron.to_string();
        self
    }

    pub fn force_wipe_timezone(mut self, timezone: &str) -> Self {
        self.force_wipe_timezone = timezone.to_string();
        self
    }

    pub fn log_retention_days(mut self, days: i64) -> Self {
        self.log_retention_days = days;
        self
    }

    fn to_toml(&self) -> String {
        format!(
            r#"
panel_url = "{}"
panel_api_key = "{}"
log_retention_days = {}

[force_wipe]
cron = "{}"
timezone = "{}"
"#,
            self.panel_url,
            self.panel_api_key,
            self.log_retention_days,
            self.force_wipe_cron,
            self.force_wipe_timezone
        )
    }
}

impl Default for MainConfigBuilder {
    fn default() -> Self {
        Self {
            panel_url: "https://panel.example.com/api/client".to_string(),
            panel_api_key: "test-api-key".to_string(),
            force_wipe_cron: "0 0 18 * * Thu".to_string(),
            force_wipe_timezone: "America/New_York".to_string(),
            log_retention_days: 90,
        }
    }
}

/// Server configuration builder
pub struct ServerConfigBuilder {
    server_id: String,
    enabled: bool,
    timezone: String,
    cron: String,
    wipe_days: Vec<(i64, bool)>,
}

impl ServerConfigBuilder {
    pub fn new(server_id: &str) -> Self {
        Self {
            server_id: server_id.to_string(),
            enabled: true,
            timezone: "America/New_York".to_string(),
            cron: "0 0 18 * * *".to_string(),
            wipe_days: vec![(0, true)],
        }
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn timezone(mut self, timezone: &str) -> Self {
        self.timezone = timezone.to_string();
        self
    }

    pub fn cron(mut self, cron: &str) -> Self {
        self.cron = cron.to_string();
        self
    }

    pub fn wipe_day(mut self, days_since_force_wipe: i64, blueprint_wipe: bool) -> Self {
        self.wipe_days.push((days_since_force_wipe, blueprint_wipe));
        self
    }

    fn to_toml(&self) -> String {
        let mut toml = format!(
            r#"
server_id = "{}"
enabled = {}
timezone = "{}"
cron = "{}"
"#,
            self.server_id, self.enabled, self.timezone, self.cron
        );

        for (days, blueprint) in &self.wipe_days {
            toml.push_str(&format!(
                "\n[[wipe_schedule]]\ndays_since_force_wipe = {}\nblueprint_wipe = {}\n",
                days, blueprint
            ));
        }

        toml
    }
}

/// Built test configuration
pub struct TestConfig {
    _temp_dir: TempDir,
    pub config_dir: PathBuf,
}

impl TestConfig {
    pub fn config_dir_str(&self) -> String {
        self.config_dir.to_string_lossy().to_string()
    }
}

/// Minimal server config in UTC that wipes on the anchor day and a week later
pub fn server_config(server_id: &str) -> ServerWipeConfig {
    let mut config: ServerWipeConfig = toml::from_str(&format!(
        r#"
server_id = "{}"
enabled = true
timezone = "UTC"
cron = "0 0 18 * * *"
wipe_countdown_seconds = 30

[[wipe_schedule]]
days_since_force_wipe = 0
blueprint_wipe = true

[[wipe_schedule]]
days_since_force_wipe = 7

[[files_on_wipe]]
root = "/server/rust/server/rust"
files = ["proceduralmap.*.map", "proceduralmap.*.sav*"]
"#,
        server_id
    ))
    .expect("valid server config");
    config.label = format!("server-{}", server_id);
    config
}
