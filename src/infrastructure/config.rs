use crate::application::data_fetcher::DEFAULT_CYCLE_TIMEOUT;
use crate::application::scheduler::DEFAULT_REFRESH_INTERVAL;
use crate::domain::site::{ParseTimeRangeError, SiteInfo, TimeRange};
use config::builder::DefaultState;
use config::ConfigBuilder;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Deserialize, Clone)]
pub struct DashboardConfig {
    pub api: ApiSettings,
    #[serde(default)]
    pub refresh: RefreshSettings,
    #[serde(default)]
    pub dashboard: DashboardSettings,
    #[serde(default)]
    pub server: ServerSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiSettings {
    pub base_url: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RefreshSettings {
    pub interval_secs: u64,
    pub cycle_timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DashboardSettings {
    pub default_site: String,
    pub default_range: String,
    pub sites: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub bind: String,
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("refresh.interval_secs must be greater than zero")]
    ZeroInterval,
    #[error("refresh.cycle_timeout_secs must be greater than zero")]
    ZeroCycleTimeout,
    #[error("default site '{0}' is not in dashboard.sites")]
    UnknownDefaultSite(String),
    #[error(transparent)]
    InvalidRange(#[from] ParseTimeRangeError),
}

fn default_request_timeout_secs() -> u64 {
    10
}

impl Default for RefreshSettings {
    fn default() -> Self {
        Self {
            interval_secs: DEFAULT_REFRESH_INTERVAL.as_secs(),
            cycle_timeout_secs: DEFAULT_CYCLE_TIMEOUT.as_secs(),
        }
    }
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            default_site: "germany".to_string(),
            default_range: TimeRange::default().as_str().to_string(),
            sites: vec!["germany".to_string(), "uk".to_string()],
        }
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8080".to_string(),
        }
    }
}

impl ApiSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl RefreshSettings {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn cycle_timeout(&self) -> Duration {
        Duration::from_secs(self.cycle_timeout_secs)
    }
}

impl DashboardSettings {
    pub fn site_list(&self) -> Vec<SiteInfo> {
        self.sites.iter().cloned().map(SiteInfo::new).collect()
    }

    pub fn time_range(&self) -> Result<TimeRange, ParseTimeRangeError> {
        self.default_range.parse()
    }
}

impl DashboardConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.refresh.interval_secs == 0 {
            return Err(ConfigError::ZeroInterval);
        }
        if self.refresh.cycle_timeout_secs == 0 {
            return Err(ConfigError::ZeroCycleTimeout);
        }
        if !self.dashboard.sites.contains(&self.dashboard.default_site) {
            return Err(ConfigError::UnknownDefaultSite(
                self.dashboard.default_site.clone(),
            ));
        }
        self.dashboard.time_range()?;
        Ok(())
    }
}

/// Load `config/dashboard.*`, overridden by `DASHBOARD__SECTION__KEY` variables
pub fn load_dashboard_config() -> anyhow::Result<DashboardConfig> {
    let builder = config::Config::builder()
        .add_source(config::File::with_name("config/dashboard").required(false))
        .add_source(
            config::Environment::with_prefix("DASHBOARD")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("dashboard.sites"),
        );

    build_config(builder)
}

fn build_config(builder: ConfigBuilder<DefaultState>) -> anyhow::Result<DashboardConfig> {
    let config: DashboardConfig = builder.build()?.try_deserialize()?;
    config.validate()?;
    Ok(config)
}
