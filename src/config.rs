//! Configuration loader and validator for the Retail→Zone sync daemon.
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::model::{ProductFilter, SyncSettings};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(&'static str),
}

/// Root configuration struct mirroring the YAML schema exactly.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    pub app: App,
    pub retail: Retail,
    pub zone: Zone,
    pub sync: SyncSettings,
    /// Optional source-catalog filter; absent means "export everything".
    pub filter: Option<ProductFilter>,
}

/// App-level settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct App {
    pub data_dir: String,
}

/// Source CRM credentials.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Retail {
    pub address: String,
    pub api_key: String,
}

/// Destination marketplace account credentials.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Zone {
    pub email: String,
    pub password: String,
}

impl Config {
    /// Ensure required directories exist (creates `app.data_dir` if missing).
    pub fn ensure_dirs(&self) -> Result<(), std::io::Error> {
        if self.app.data_dir.trim().is_empty() {
            return Ok(());
        }
        fs::create_dir_all(&self.app.data_dir)
    }
}

/// Load configuration from a YAML file and validate it.
/// - If `path` is None, uses `config.yaml` in the current working directory.
pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
    let path = path.unwrap_or_else(|| Path::new("config.yaml"));
    let content = fs::read_to_string(path)?;
    let cfg: Config = serde_yaml::from_str(&content)?;
    validate(&cfg)?;
    Ok(cfg)
}

/// Validate a configuration instance.
fn validate(cfg: &Config) -> Result<(), ConfigError> {
    if cfg.app.data_dir.trim().is_empty() {
        return Err(ConfigError::Invalid("app.data_dir must be non-empty"));
    }

    if cfg.retail.address.trim().is_empty() {
        return Err(ConfigError::Invalid("retail.address must be non-empty"));
    }
    if cfg.retail.api_key.trim().is_empty() {
        return Err(ConfigError::Invalid("retail.api_key must be non-empty"));
    }

    if cfg.zone.email.trim().is_empty() {
        return Err(ConfigError::Invalid("zone.email must be non-empty"));
    }
    if cfg.zone.password.trim().is_empty() {
        return Err(ConfigError::Invalid("zone.password must be non-empty"));
    }

    cfg.sync.validate().map_err(ConfigError::Invalid)?;
    if let Some(filter) = &cfg.filter {
        filter.validate().map_err(ConfigError::Invalid)?;
    }

    Ok(())
}

/// Example configuration document.
pub fn example() -> &'static str {
    r#"app:
  data_dir: "./data"

retail:
  address: "https://demo.retailcrm.ru"
  api_key: "YOUR_RETAIL_API_KEY"

zone:
  email: "shop@example.com"
  password: "YOUR_ZONE_PASSWORD"

sync:
  quantity_sync: true
  price_sync: true
  quantity_sync_interval: "5m"
  price_sync_interval: "1h"

filter:
  active: 1
  min_quantity: 1
"#
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SyncInterval;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn parse_example_ok() {
        let cfg: Config = serde_yaml::from_str(example()).unwrap();
        validate(&cfg).unwrap();
        assert_eq!(cfg.sync.quantity_sync_interval, Some(SyncInterval::FiveMinutes));
        assert_eq!(cfg.filter.as_ref().unwrap().active, Some(1));
    }

    #[test]
    fn invalid_retail_credentials() {
        let mut cfg: Config = serde_yaml::from_str(example()).unwrap();
        cfg.retail.api_key = "".into();
        let err = validate(&cfg).unwrap_err();
        match err {
            ConfigError::Invalid(msg) => assert!(msg.contains("retail.api_key")),
            _ => panic!("wrong error"),
        }
    }

    #[test]
    fn invalid_zone_credentials() {
        let mut cfg: Config = serde_yaml::from_str(example()).unwrap();
        cfg.zone.email = "".into();
        let err = validate(&cfg).unwrap_err();
        match err {
            ConfigError::Invalid(msg) => assert!(msg.contains("zone.email")),
            _ => panic!("wrong error"),
        }
    }

    #[test]
    fn enabled_sync_without_interval_is_invalid() {
        let mut cfg: Config = serde_yaml::from_str(example()).unwrap();
        cfg.sync.quantity_sync_interval = None;
        assert!(matches!(validate(&cfg), Err(ConfigError::Invalid(_))));

        let mut cfg: Config = serde_yaml::from_str(example()).unwrap();
        cfg.sync.price_sync_interval = None;
        assert!(matches!(validate(&cfg), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn out_of_range_filter_is_invalid() {
        let mut cfg: Config = serde_yaml::from_str(example()).unwrap();
        cfg.filter.as_mut().unwrap().active = Some(2);
        assert!(matches!(validate(&cfg), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn ensure_dirs_creates_data_dir() {
        let td = tempdir().unwrap();
        let data_path = td.path().join("data");
        let mut cfg: Config = serde_yaml::from_str(example()).unwrap();
        cfg.app.data_dir = data_path.to_string_lossy().to_string();
        cfg.ensure_dirs().unwrap();
        assert!(data_path.exists());
    }

    #[test]
    fn load_from_file_ok() {
        let td = tempdir().unwrap();
        let p = td.path().join("config.yaml");
        let mut f = fs::File::create(&p).unwrap();
        f.write_all(example().as_bytes()).unwrap();
        let cfg = load(Some(&p)).unwrap();
        assert_eq!(cfg.retail.address, "https://demo.retailcrm.ru");
    }
}
