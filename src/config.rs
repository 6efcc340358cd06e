use crate::errors::AppResult;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "dashboard.yaml";
const DEFAULT_HOME_DIR: &str = ".project-dashboard";
const DEFAULT_DATA_FILE: &str = "projects.json";
const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DashboardConfig {
    /// Holds the preference database, logs and the optional config file.
    #[serde(skip)]
    pub home: PathBuf,
    pub data_path: PathBuf,
    pub log_filter: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            home: PathBuf::from(DEFAULT_HOME_DIR),
            data_path: PathBuf::from(DEFAULT_DATA_FILE),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub data_path: Option<PathBuf>,
    pub log_filter: Option<String>,
}

impl ConfigOverrides {
    pub fn from_env() -> Self {
        Self {
            data_path: std::env::var_os("DASHBOARD_DATA").map(PathBuf::from),
            log_filter: std::env::var("DASHBOARD_LOG").ok().filter(|value| !value.trim().is_empty()),
        }
    }
}

impl DashboardConfig {
    /// `DASHBOARD_HOME` or `./.project-dashboard`, then `dashboard.yaml`, then
    /// the remaining environment overrides.
    pub fn from_env() -> AppResult<Self> {
        let home = match std::env::var_os("DASHBOARD_HOME") {
            Some(home) => PathBuf::from(home),
            None => std::env::current_dir()?.join(DEFAULT_HOME_DIR),
        };
        Self::load(&home, ConfigOverrides::from_env())
    }

    pub fn load(home: &Path, overrides: ConfigOverrides) -> AppResult<Self> {
        let path = home.join(CONFIG_FILE_NAME);
        let mut config = if path.is_file() {
            let raw = fs::read_to_string(&path)?;
            serde_yaml::from_str::<DashboardConfig>(&raw)?
        } else {
            DashboardConfig::default()
        };
        config.home = home.to_path_buf();

        if let Some(data_path) = overrides.data_path {
            config.data_path = data_path;
        } else if config.data_path.is_relative() {
            config.data_path = home.join(&config.data_path);
        }
        if let Some(log_filter) = overrides.log_filter {
            config.log_filter = log_filter;
        }
        Ok(config)
    }

    pub fn database_path(&self) -> PathBuf {
        self.home.join("state.sqlite")
    }

    pub fn log_dir(&self) -> PathBuf {
        self.home.join("logs")
    }
}
