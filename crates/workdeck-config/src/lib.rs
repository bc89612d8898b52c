//! TOML configuration for the workdeck client layer.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const ENV_WORKDECK_CONFIG: &str = "WORKDECK_CONFIG";

const DEFAULT_CONFIG_PATH: &str = "./workdeck.toml";
const DEFAULT_ENVIRONMENT: &str = "native";
const DEFAULT_AUTH_STALE_SECS: u64 = 30;
const DEFAULT_HIERARCHY_STALE_SECS: u64 = 300;
const DEFAULT_TASK_STALE_SECS: u64 = 30;
const DEFAULT_ISSUE_STALE_SECS: u64 = 30;
const DEFAULT_GC_SECS: u64 = 300;
const DEFAULT_LIST_RETRY: u32 = 1;
const DEFAULT_DEBOUNCE_MS: u64 = 300;
const DEFAULT_RECENT_TASK_WINDOW_HOURS: u64 = 24;
const DEFAULT_CLICKUP_ENABLED: bool = true;
const DEFAULT_GITHUB_ENABLED: bool = false;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file '{path}': {message}")]
    Io { path: String, message: String },
    #[error("could not parse config file '{path}': {message}")]
    Parse { path: String, message: String },
    #[error("invalid config value for '{field}': {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WorkdeckConfig {
    /// "native" when the shell bridge is available, "browser" otherwise.
    #[serde(default = "default_environment")]
    pub environment: String,
    #[serde(default)]
    pub clickup: ClickUpConfigToml,
    #[serde(default)]
    pub github: GithubConfigToml,
    #[serde(default)]
    pub query: QueryConfigToml,
    #[serde(default)]
    pub ui: UiConfigToml,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClickUpConfigToml {
    #[serde(default = "default_clickup_enabled")]
    pub enabled: bool,
    /// Workspace preselected at startup; empty means "ask".
    #[serde(default)]
    pub default_workspace: String,
}

impl Default for ClickUpConfigToml {
    fn default() -> Self {
        Self {
            enabled: DEFAULT_CLICKUP_ENABLED,
            default_workspace: String::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GithubConfigToml {
    #[serde(default = "default_github_enabled")]
    pub enabled: bool,
    /// Linked repository as `owner/name`; empty disables issue views.
    #[serde(default)]
    pub repository: String,
}

impl Default for GithubConfigToml {
    fn default() -> Self {
        Self {
            enabled: DEFAULT_GITHUB_ENABLED,
            repository: String::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QueryConfigToml {
    #[serde(default = "default_auth_stale_secs")]
    pub auth_stale_secs: u64,
    #[serde(default = "default_hierarchy_stale_secs")]
    pub hierarchy_stale_secs: u64,
    #[serde(default = "default_task_stale_secs")]
    pub task_stale_secs: u64,
    #[serde(default = "default_issue_stale_secs")]
    pub issue_stale_secs: u64,
    #[serde(default = "default_gc_secs")]
    pub gc_secs: u64,
    #[serde(default = "default_list_retry")]
    pub list_retry: u32,
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

impl Default for QueryConfigToml {
    fn default() -> Self {
        Self {
            auth_stale_secs: DEFAULT_AUTH_STALE_SECS,
            hierarchy_stale_secs: DEFAULT_HIERARCHY_STALE_SECS,
            task_stale_secs: DEFAULT_TASK_STALE_SECS,
            issue_stale_secs: DEFAULT_ISSUE_STALE_SECS,
            gc_secs: DEFAULT_GC_SECS,
            list_retry: DEFAULT_LIST_RETRY,
            debounce_ms: DEFAULT_DEBOUNCE_MS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UiConfigToml {
    #[serde(default = "default_recent_task_window_hours")]
    pub recent_task_window_hours: u64,
}

impl Default for UiConfigToml {
    fn default() -> Self {
        Self {
            recent_task_window_hours: DEFAULT_RECENT_TASK_WINDOW_HOURS,
        }
    }
}

impl Default for WorkdeckConfig {
    fn default() -> Self {
        Self {
            environment: default_environment(),
            clickup: ClickUpConfigToml::default(),
            github: GithubConfigToml::default(),
            query: QueryConfigToml::default(),
            ui: UiConfigToml::default(),
        }
    }
}

impl WorkdeckConfig {
    /// Load from `WORKDECK_CONFIG` if set, from `./workdeck.toml` if that
    /// exists, and fall back to pure defaults otherwise.
    pub fn load() -> Result<Self, ConfigError> {
        match std::env::var(ENV_WORKDECK_CONFIG) {
            Ok(path) => Self::from_path(Path::new(&path)),
            Err(_) => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_PATH);
                if default_path.exists() {
                    Self::from_path(&default_path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|error| ConfigError::Io {
            path: path.display().to_string(),
            message: error.to_string(),
        })?;
        let config: Self = toml::from_str(&text).map_err(|error| ConfigError::Parse {
            path: path.display().to_string(),
            message: error.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.environment != "native" && self.environment != "browser" {
            return Err(ConfigError::Invalid {
                field: "environment",
                reason: format!(
                    "expected 'native' or 'browser', got '{}'",
                    self.environment
                ),
            });
        }
        if self.query.list_retry > 1 {
            return Err(ConfigError::Invalid {
                field: "query.list_retry",
                reason: format!(
                    "retries are bounded to 0 or 1, got {}",
                    self.query.list_retry
                ),
            });
        }
        if self.query.debounce_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "query.debounce_ms",
                reason: "must be greater than 0".to_owned(),
            });
        }
        if self.github.enabled && !self.github.repository.contains('/') {
            return Err(ConfigError::Invalid {
                field: "github.repository",
                reason: format!(
                    "expected 'owner/name', got '{}'",
                    self.github.repository
                ),
            });
        }
        Ok(())
    }

    pub fn is_native(&self) -> bool {
        self.environment == "native"
    }

    pub fn auth_stale_time(&self) -> Duration {
        Duration::from_secs(self.query.auth_stale_secs)
    }

    pub fn hierarchy_stale_time(&self) -> Duration {
        Duration::from_secs(self.query.hierarchy_stale_secs)
    }

    pub fn task_stale_time(&self) -> Duration {
        Duration::from_secs(self.query.task_stale_secs)
    }

    pub fn issue_stale_time(&self) -> Duration {
        Duration::from_secs(self.query.issue_stale_secs)
    }

    pub fn gc_time(&self) -> Duration {
        Duration::from_secs(self.query.gc_secs)
    }

    pub fn debounce_delay(&self) -> Duration {
        Duration::from_millis(self.query.debounce_ms)
    }

    pub fn recent_task_window_ms(&self) -> u64 {
        self.ui.recent_task_window_hours * 60 * 60 * 1000
    }
}

fn default_environment() -> String {
    DEFAULT_ENVIRONMENT.to_owned()
}

fn default_clickup_enabled() -> bool {
    DEFAULT_CLICKUP_ENABLED
}

fn default_github_enabled() -> bool {
    DEFAULT_GITHUB_ENABLED
}

fn default_auth_stale_secs() -> u64 {
    DEFAULT_AUTH_STALE_SECS
}

fn default_hierarchy_stale_secs() -> u64 {
    DEFAULT_HIERARCHY_STALE_SECS
}

fn default_task_stale_secs() -> u64 {
    DEFAULT_TASK_STALE_SECS
}

fn default_issue_stale_secs() -> u64 {
    DEFAULT_ISSUE_STALE_SECS
}

fn default_gc_secs() -> u64 {
    DEFAULT_GC_SECS
}

fn default_list_retry() -> u32 {
    DEFAULT_LIST_RETRY
}

fn default_debounce_ms() -> u64 {
    DEFAULT_DEBOUNCE_MS
}

fn default_recent_task_window_hours() -> u64 {
    DEFAULT_RECENT_TASK_WINDOW_HOURS
}
