use crate::error::{RemedyError, Result};
use crate::paths;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable that overrides `notify.slack_webhook_url`.
pub const WEBHOOK_ENV: &str = "SLACK_WEBHOOK_URL";

/// Upper bound for the notification timeout; slower webhooks are recorded as faults.
pub const MAX_NOTIFY_TIMEOUT_SECS: u64 = 5;

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// AuditConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Path of the redb audit database, relative to the project root.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,
    #[serde(default = "default_max_history_limit")]
    pub max_history_limit: usize,
    #[serde(default = "default_history_limit")]
    pub default_history_limit: usize,
}

fn default_db_path() -> PathBuf {
    PathBuf::from(paths::AUDIT_DB_FILE)
}

fn default_max_history_limit() -> usize {
    500
}

fn default_history_limit() -> usize {
    50
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            max_history_limit: default_max_history_limit(),
            default_history_limit: default_history_limit(),
        }
    }
}

// ---------------------------------------------------------------------------
// NotifyConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifyConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slack_webhook_url: Option<String>,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

fn default_timeout_seconds() -> u64 {
    MAX_NOTIFY_TIMEOUT_SECS
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            slack_webhook_url: None,
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

// ---------------------------------------------------------------------------
// ServerConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_port() -> u16 {
    3142
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub audit: AuditConfig,
    #[serde(default)]
    pub notify: NotifyConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

impl Config {
    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Err(RemedyError::NotInitialized);
        }
        let data = std::fs::read_to_string(&path)?;
        let cfg: Config = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    /// Like [`Config::load`], but a missing file yields the defaults.
    pub fn load_or_default(root: &Path) -> Result<Self> {
        match Self::load(root) {
            Err(RemedyError::NotInitialized) => Ok(Self::default()),
            other => other,
        }
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::config_path(root);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }

    /// Write the default config unless one exists. Returns `true` if created.
    pub fn write_default(root: &Path) -> Result<bool> {
        let data = serde_yaml::to_string(&Self::default())?;
        crate::io::write_if_missing(&paths::config_path(root), data.as_bytes())
    }

    /// Apply `SLACK_WEBHOOK_URL` from the process environment.
    pub fn with_env_overrides(self) -> Self {
        self.with_webhook_override(std::env::var(WEBHOOK_ENV).ok())
    }

    pub fn with_webhook_override(mut self, url: Option<String>) -> Self {
        if let Some(url) = url.filter(|u| !u.trim().is_empty()) {
            self.notify.slack_webhook_url = Some(url);
        }
        self
    }

    pub fn audit_db_path(&self, root: &Path) -> PathBuf {
        paths::resolve(root, &self.audit.db_path)
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if self.notify.timeout_seconds == 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "notify.timeout_seconds must be greater than 0".to_string(),
            });
        } else if self.notify.timeout_seconds > MAX_NOTIFY_TIMEOUT_SECS {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: format!(
                    "notify.timeout_seconds={} exceeds {MAX_NOTIFY_TIMEOUT_SECS}s and will be capped",
                    self.notify.timeout_seconds
                ),
            });
        }

        if let Some(url) = &self.notify.slack_webhook_url {
            if !(url.starts_with("https://") || url.starts_with("http://")) {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Error,
                    message: format!("notify.slack_webhook_url '{url}' is not an http(s) URL"),
                });
            }
        }

        if self.audit.max_history_limit == 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "audit.max_history_limit must be at least 1".to_string(),
            });
        } else if self.audit.default_history_limit > self.audit.max_history_limit {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: format!(
                    "audit.default_history_limit={} exceeds audit.max_history_limit={}",
                    self.audit.default_history_limit, self.audit.max_history_limit
                ),
            });
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
