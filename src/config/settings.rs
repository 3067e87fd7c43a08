use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::fetcher::RetryPolicy;
use crate::fetcher::http::{DEFAULT_API_BASE, DEFAULT_MESSAGE_FIELDS};
use crate::fetcher::page_fetcher::{DEFAULT_PAGE_SIZE, DEFAULT_REQUEST_TIMEOUT};
use crate::models::SortOrder;

const APP_DIR_NAME: &str = "ig-message-explorer";
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Contents of `config.toml`. Every key is optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub access_token: Option<String>,
    /// Graph API base including the version segment
    pub api_base: String,
    /// Comma-separated message fields to request
    pub fields: String,
    pub page_size: u32,
    pub order: SortOrder,
    /// Maximum page fetches per conversation; 0 means unlimited
    pub page_limit: u32,
    pub concurrency: usize,
    pub request_timeout_secs: u64,
    pub retry: RetrySettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    pub max_attempts: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            access_token: None,
            api_base: DEFAULT_API_BASE.to_string(),
            fields: DEFAULT_MESSAGE_FIELDS.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            order: SortOrder::Ascending,
            page_limit: 0,
            concurrency: 1,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT.as_secs(),
            retry: RetrySettings::default(),
        }
    }
}

impl Default for RetrySettings {
    fn default() -> Self {
        let policy = RetryPolicy::default();
        Self {
            max_attempts: policy.max_attempts,
            initial_backoff_ms: policy.initial_backoff.as_millis() as u64,
            max_backoff_ms: policy.max_backoff.as_millis() as u64,
        }
    }
}

impl Settings {
    /// Load from `explicit`, or from the default location.
    ///
    /// A missing default file yields defaults; a missing explicit file is an error.
    pub fn load_with(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => {
                if !path.exists() {
                    anyhow::bail!("Config file not found: {}", path.display());
                }
                path.to_path_buf()
            }
            None => match config_file_path() {
                Some(path) if path.exists() => path,
                _ => return Ok(Self::default()),
            },
        };

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config at {}", path.display()))?;
        let settings: Self = toml::from_str(&content)
            .with_context(|| format!("Invalid config TOML at {}", path.display()))?;
        settings
            .validate()
            .with_context(|| format!("Invalid config values at {}", path.display()))?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            anyhow::bail!("page_size must be at least 1");
        }
        if self.concurrency == 0 {
            anyhow::bail!("concurrency must be at least 1");
        }
        if self.retry.max_attempts == 0 {
            anyhow::bail!("retry.max_attempts must be at least 1");
        }
        if self.request_timeout_secs == 0 {
            anyhow::bail!("request_timeout_secs must be at least 1");
        }
        if self.fields.trim().is_empty() {
            anyhow::bail!("fields must not be empty");
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        let initial = Duration::from_millis(self.retry.initial_backoff_ms);
        RetryPolicy {
            max_attempts: self.retry.max_attempts.max(1),
            initial_backoff: initial,
            max_backoff: Duration::from_millis(self.retry.max_backoff_ms).max(initial),
            ..RetryPolicy::default()
        }
    }
}

/// `<config dir>/ig-message-explorer/config.toml`, if the platform has a config dir.
pub fn config_file_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR_NAME).join(CONFIG_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let file = write_config("page_limit = 4\norder = \"desc\"\n");
        let settings = Settings::load_with(Some(file.path())).unwrap();
        assert_eq!(settings.page_limit, 4);
        assert_eq!(settings.order, SortOrder::Descending);
        assert_eq!(settings.api_base, DEFAULT_API_BASE);
        assert_eq!(settings.retry, RetrySettings::default());
    }

    #[test]
    fn test_retry_table() {
        let file = write_config(
            "[retry]\nmax_attempts = 5\ninitial_backoff_ms = 100\nmax_backoff_ms = 1000\n",
        );
        let policy = Settings::load_with(Some(file.path())).unwrap().retry_policy();
        assert_eq!(policy.max_attempts, 5);
        assert_eq!(policy.initial_backoff, Duration::from_millis(100));
        assert_eq!(policy.max_backoff, Duration::from_secs(1));
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let temp = tempfile::TempDir::new().unwrap();
        let err = Settings::load_with(Some(&temp.path().join("nope.toml"))).unwrap_err();
        assert!(err.to_string().contains("Config file not found"));
    }

    #[test]
    fn test_invalid_toml_is_error() {
        let file = write_config("page_limit = \"many\"");
        let err = Settings::load_with(Some(file.path())).unwrap_err();
        assert!(err.to_string().contains("Invalid config TOML"));
    }

    #[test]
    fn test_validation_rejects_zero_values() {
        let file = write_config("concurrency = 0");
        let err = Settings::load_with(Some(file.path())).unwrap_err();
        assert!(format!("{:#}", err).contains("concurrency must be at least 1"));

        let settings = Settings { page_size: 0, ..Settings::default() };
        assert!(settings.validate().is_err());
    }
}
