//! Configuration loading for the back-office desk.
//!
//! The canonical configuration lives in `oasis-desk.yaml`. Every field has a
//! default, so an empty file (or no file) yields a working in-memory setup.
//!
//! ```yaml
//! store:
//!   url: "https://abc.supabase.co"
//!   api_key: "..."
//!   timeout_ms: 10000
//! paging:
//!   page_size: 10
//! logging:
//!   level: "info"
//!   json: false
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use oasis_store::StoreConfig;
use serde::Deserialize;

use crate::pager::DEFAULT_PAGE_SIZE;

/// Why `oasis-desk.yaml` could not be turned into a [`DeskConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The desk file exists but could not be read.
    #[error("cannot read desk config {}: {source}", path.display())]
    Io {
        /// File that was being read.
        path: PathBuf,
        /// Read failure.
        source: std::io::Error,
    },

    /// The desk file is not a valid YAML mapping of the desk sections.
    #[error("invalid desk config: {0}")]
    Yaml(#[from] serde_yml::Error),
}

/// Top-level desk configuration. Mirrors `oasis-desk.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DeskConfig {
    /// Remote store connection.
    #[serde(default)]
    pub store: StoreSection,

    /// Booking list paging.
    #[serde(default)]
    pub paging: PagingConfig,

    /// Log output.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl DeskConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override YAML values:
    /// - `SUPABASE_URL` overrides `store.url`
    /// - `SUPABASE_KEY` overrides `store.api_key`
    /// - `OASIS_PAGE_SIZE` overrides `paging.page_size`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string, then apply environment
    /// overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yml::from_str(yaml)?
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Override values from the process environment.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    /// Override values from `lookup`, which maps a variable name to its value.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("SUPABASE_URL") {
            self.store.url = val;
        }
        if let Some(val) = lookup("SUPABASE_KEY") {
            self.store.api_key = val;
        }
        if let Some(val) = lookup("OASIS_PAGE_SIZE") {
            match val.trim().parse::<u32>() {
                Ok(size) if size > 0 => self.paging.page_size = size,
                _ => tracing::warn!(value = %val, "ignoring invalid OASIS_PAGE_SIZE"),
            }
        }
    }

    /// Store client configuration derived from the `store` section.
    pub fn store_config(&self) -> StoreConfig {
        StoreConfig::new(&self.store.url, &self.store.api_key)
            .with_timeout(Duration::from_millis(self.store.timeout_ms))
    }
}

/// Remote store connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StoreSection {
    /// Project base URL.
    #[serde(default)]
    pub url: String,

    /// Anonymous or service API key.
    #[serde(default)]
    pub api_key: String,

    /// Per-request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for StoreSection {
    fn default() -> Self {
        Self {
            url: String::new(),
            api_key: String::new(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

/// Booking list paging.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PagingConfig {
    /// Rows per page.
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

impl Default for PagingConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

const fn default_timeout_ms() -> u64 {
    10_000
}

const fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

fn default_log_level() -> String {
    "info".to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn defaults_are_usable() {
        let config = DeskConfig::default();
        assert_eq!(config.paging.page_size, 10);
        assert_eq!(config.store.timeout_ms, 10_000);
        assert_eq!(config.logging.level, "info");
        assert!(!config.logging.json);
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r#"
store:
  url: "https://abc.supabase.co/"
  api_key: "anon"
  timeout_ms: 2500
paging:
  page_size: 25
logging:
  level: "debug"
  json: true
"#;
        let mut config: DeskConfig = serde_yml::from_str(yaml).unwrap_or_default();
        config.apply_overrides(no_env);

        assert_eq!(config.store.api_key, "anon");
        assert_eq!(config.paging.page_size, 25);
        assert!(config.logging.json);

        let store = config.store_config();
        assert_eq!(store.url, "https://abc.supabase.co");
        assert_eq!(store.timeout, Duration::from_millis(2500));
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let config: DeskConfig = serde_yml::from_str("paging:\n  page_size: 5\n").unwrap_or_default();
        assert_eq!(config.paging.page_size, 5);
        assert_eq!(config.store.timeout_ms, 10_000);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn overrides_replace_yaml_values() {
        let mut config = DeskConfig::default();
        config.apply_overrides(|name| match name {
            "SUPABASE_URL" => Some("https://env.example".to_owned()),
            "SUPABASE_KEY" => Some("secret".to_owned()),
            "OASIS_PAGE_SIZE" => Some("20".to_owned()),
            _ => None,
        });
        assert_eq!(config.store.url, "https://env.example");
        assert_eq!(config.store.api_key, "secret");
        assert_eq!(config.paging.page_size, 20);
    }

    #[test]
    fn invalid_page_size_override_is_ignored() {
        let mut config = DeskConfig::default();
        config.apply_overrides(|name| (name == "OASIS_PAGE_SIZE").then(|| "0".to_owned()));
        assert_eq!(config.paging.page_size, 10);
    }

    #[test]
    fn invalid_yaml_is_an_error() {
        assert!(matches!(
            DeskConfig::parse("paging: [unclosed"),
            Err(ConfigError::Yaml(_))
        ));
    }

    #[test]
    fn unreadable_file_names_the_path() {
        let path = Path::new("/nonexistent/oasis-desk.yaml");
        let err = DeskConfig::from_file(path);
        assert!(matches!(
            &err,
            Err(ConfigError::Io { path: p, .. }) if p == path
        ));
        assert!(
            err.err()
                .is_some_and(|e| e.to_string().contains("/nonexistent/oasis-desk.yaml"))
        );
    }
}
