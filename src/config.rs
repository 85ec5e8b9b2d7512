//! Configuration loading and validation.
//!
//! Pushcart reads a single YAML file (`pushcart.yml` in the working
//! directory unless `--config` points elsewhere). Secrets are never
//! required in the file; the record-store token and storefront cookie can
//! come from `PUSHCART_RECORDS_TOKEN` and `PUSHCART_SESSION_COOKIE`.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{PushcartError, Result};

/// Default config file name, resolved against the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "pushcart.yml";

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Root for task records and fetched images. Default `./cache`.
    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,

    pub storefront: StorefrontConfig,

    pub records: RecordsConfig,

    /// Per-phase retry budgets.
    #[serde(default)]
    pub retries: RetryConfig,

    /// Source-language → listing-language term table used by the translate
    /// step (titles and color names).
    #[serde(default)]
    pub glossary: HashMap<String, String>,
}

/// Storefront seller-console connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorefrontConfig {
    pub base_url: String,

    /// Authenticated session cookie. Overridable via
    /// `PUSHCART_SESSION_COOKIE`.
    #[serde(default)]
    pub session_cookie: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Remote record table connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordsConfig {
    pub base_url: String,

    /// Table holding one row per product.
    pub table: String,

    /// Bearer token. Overridable via `PUSHCART_RECORDS_TOKEN`.
    #[serde(default)]
    pub token: String,

    /// Status values that mark a record as awaiting publication.
    #[serde(default = "default_pending_statuses")]
    pub pending_statuses: Vec<String>,

    /// Status written after a successful submit.
    #[serde(default = "default_published_status")]
    pub published_status: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Retry budget per phase. A budget of N means up to N re-runs after the
/// first attempt.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RetryConfig {
    #[serde(default = "default_setup_retries")]
    pub setup: u32,
    #[serde(default = "default_publish_retries")]
    pub publish: u32,
    #[serde(default)]
    pub report: u32,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            setup: default_setup_retries(),
            publish: default_publish_retries(),
            report: 0,
        }
    }
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from("cache")
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_pending_statuses() -> Vec<String> {
    vec!["pending".to_string(), "checking".to_string()]
}

fn default_published_status() -> String {
    "published".to_string()
}

fn default_setup_retries() -> u32 {
    1
}

fn default_publish_retries() -> u32 {
    2
}

impl Config {
    /// Load configuration from the given path, or `pushcart.yml` in the
    /// working directory.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

        if !path.exists() {
            return Err(PushcartError::ConfigNotFound { path });
        }

        let content = fs::read_to_string(&path)?;
        let mut config: Config =
            serde_yaml::from_str(&content).map_err(|e| PushcartError::ConfigParseError {
                path: path.clone(),
                message: e.to_string(),
            })?;

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Folder for fetched main images, one subfolder per task.
    pub fn image_dir(&self) -> PathBuf {
        self.cache_dir.join("images")
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(token) = std::env::var("PUSHCART_RECORDS_TOKEN") {
            self.records.token = token;
        }
        if let Ok(cookie) = std::env::var("PUSHCART_SESSION_COOKIE") {
            self.storefront.session_cookie = cookie;
        }
    }

    fn validate(&self) -> Result<()> {
        if self.storefront.base_url.is_empty() {
            return Err(PushcartError::ConfigValidationError {
                message: "storefront.base_url must not be empty".to_string(),
            });
        }
        if self.records.base_url.is_empty() {
            return Err(PushcartError::ConfigValidationError {
                message: "records.base_url must not be empty".to_string(),
            });
        }
        if self.records.table.is_empty() {
            return Err(PushcartError::ConfigValidationError {
                message: "records.table must not be empty".to_string(),
            });
        }
        if self.records.pending_statuses.is_empty() {
            return Err(PushcartError::ConfigValidationError {
                message: "records.pending_statuses must name at least one status".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const MINIMAL: &str = r#"
storefront:
  base_url: https://seller.example.com
records:
  base_url: https://records.example.com
  table: products
"#;

    fn write_config(content: &str) -> (TempDir, PathBuf) {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("pushcart.yml");
        fs::write(&path, content).unwrap();
        (temp, path)
    }

    #[test]
    fn minimal_config_gets_defaults() {
        let (_temp, path) = write_config(MINIMAL);
        let config = Config::load(Some(&path)).unwrap();

        assert_eq!(config.cache_dir, PathBuf::from("cache"));
        assert_eq!(config.retries.setup, 1);
        assert_eq!(config.retries.publish, 2);
        assert_eq!(config.retries.report, 0);
        assert_eq!(config.records.published_status, "published");
        assert!(config
            .records
            .pending_statuses
            .contains(&"pending".to_string()));
    }

    #[test]
    fn missing_file_is_config_not_found() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("absent.yml");
        let err = Config::load(Some(&path)).unwrap_err();
        assert!(matches!(err, PushcartError::ConfigNotFound { .. }));
    }

    #[test]
    fn invalid_yaml_is_parse_error() {
        let (_temp, path) = write_config("storefront: [not a map");
        let err = Config::load(Some(&path)).unwrap_err();
        assert!(matches!(err, PushcartError::ConfigParseError { .. }));
    }

    #[test]
    fn empty_base_url_fails_validation() {
        let (_temp, path) = write_config(
            r#"
storefront:
  base_url: ""
records:
  base_url: https://records.example.com
  table: products
"#,
        );
        let err = Config::load(Some(&path)).unwrap_err();
        assert!(matches!(err, PushcartError::ConfigValidationError { .. }));
    }

    #[test]
    fn retry_budgets_can_be_overridden() {
        let (_temp, path) = write_config(
            r#"
storefront:
  base_url: https://seller.example.com
records:
  base_url: https://records.example.com
  table: products
retries:
  setup: 0
  publish: 5
"#,
        );
        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.retries.setup, 0);
        assert_eq!(config.retries.publish, 5);
    }
}
