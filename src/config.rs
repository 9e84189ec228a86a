use crate::error::ExchangeError;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::debug;

use crate::core::setting::normalize_code;

/// The store's default currency. Injected wherever the base currency is
/// needed (setting transitions, sync pipeline) so a fake can stand in
/// during tests.
pub trait DefaultCurrencySource: Send + Sync {
    /// Lowercase base currency code; fails with
    /// [`ExchangeError::BaseCurrencyNotFound`] when none is configured.
    fn default_currency(&self) -> Result<String>;
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProviderConfig {
    pub base_url: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        ProviderConfig {
            base_url: "https://api.frankfurter.dev".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    /// Base currency all other prices derive from. Optional in the file;
    /// operations that need it fail until one is set.
    #[serde(default)]
    pub default_currency: Option<String>,
    #[serde(default)]
    pub provider: ProviderConfig,
    /// JSON catalog document holding the variants and their prices.
    pub catalog_path: PathBuf,
    /// Directory for the persistent setting store; defaults next to the
    /// config file.
    #[serde(default)]
    pub data_path: Option<PathBuf>,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("io", "fxsync", "fxsync")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn default_data_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("io", "fxsync", "fxsync")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.data_dir().to_path_buf())
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    /// Directory for the setting store, configured or derived.
    pub fn store_path(&self) -> Result<PathBuf> {
        match &self.data_path {
            Some(path) => Ok(path.clone()),
            None => Ok(Self::default_data_path()?.join("settings")),
        }
    }
}

impl DefaultCurrencySource for AppConfig {
    fn default_currency(&self) -> Result<String> {
        match self.default_currency.as_deref() {
            Some(code) if !code.trim().is_empty() => Ok(normalize_code(code)),
            _ => Err(ExchangeError::BaseCurrencyNotFound.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_deserialization() {
        let yaml_str = r#"
default_currency: "USD"
provider:
  base_url: "http://example.com/rates"
catalog_path: "/tmp/catalog.json"
"#;

        let config: AppConfig = serde_yaml::from_str(yaml_str).expect("Failed to deserialize");
        assert_eq!(config.default_currency.as_deref(), Some("USD"));
        assert_eq!(config.provider.base_url, "http://example.com/rates");
        assert_eq!(config.catalog_path, PathBuf::from("/tmp/catalog.json"));
        assert!(config.data_path.is_none());

        // Provider defaults apply when the section is absent
        let minimal: AppConfig =
            serde_yaml::from_str(r#"catalog_path: "catalog.json""#).unwrap();
        assert_eq!(minimal.provider.base_url, "https://api.frankfurter.dev");
        assert!(minimal.default_currency.is_none());
    }

    #[test]
    fn test_default_currency_is_normalized() {
        let config: AppConfig = serde_yaml::from_str(
            r#"
default_currency: " USD "
catalog_path: "catalog.json"
"#,
        )
        .unwrap();
        assert_eq!(config.default_currency().unwrap(), "usd");
    }

    #[test]
    fn test_missing_default_currency_is_typed_error() {
        use crate::error::ExchangeError;

        let config: AppConfig = serde_yaml::from_str(r#"catalog_path: "catalog.json""#).unwrap();
        let err = config.default_currency().unwrap_err();
        assert_eq!(
            err.downcast_ref::<ExchangeError>(),
            Some(&ExchangeError::BaseCurrencyNotFound)
        );
    }
}
