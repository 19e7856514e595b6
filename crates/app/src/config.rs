//! CLI configuration
//!
//! A small TOML file with fallbacks for flags that rarely change
//! between invocations. No key material ever lands here - the config
//! holds an account *name* and a tier, nothing secret.
//!
//! Default location: `<platform config dir>/argus/config.toml`,
//! overridable per invocation with `--config-path`. A missing file is
//! not an error; every field has a flag that overrides it.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("no config directory available on this platform")]
    NoConfigDir,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Account id used when `--account` is not passed
    pub account_id: Option<String>,
    /// Tier used when `--tier` is not passed
    pub default_tier: Option<String>,
}

impl Config {
    /// The default config file location for this platform.
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        dirs::config_dir()
            .map(|dir| dir.join("argus").join("config.toml"))
            .ok_or(ConfigError::NoConfigDir)
    }

    /// Load the config from `path`, or the default location.
    ///
    /// A missing file yields the default config.
    pub fn load(path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let path = match path {
            Some(path) => path,
            None => Self::default_path()?,
        };
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let config = toml::from_str(&std::fs::read_to_string(&path)?)?;
        tracing::debug!(path = %path.display(), "config loaded");
        Ok(config)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(Some(dir.path().join("nope.toml"))).unwrap();
        assert!(config.account_id.is_none());
        assert!(config.default_tier.is_none());
    }

    #[test]
    fn test_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "account_id = \"alice.near\"").unwrap();
        writeln!(file, "default_tier = \"press\"").unwrap();

        let config = Config::load(Some(path)).unwrap();
        assert_eq!(config.account_id.as_deref(), Some("alice.near"));
        assert_eq!(config.default_tier.as_deref(), Some("press"));
    }

    #[test]
    fn test_partial_config_allowed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "default_tier = \"vip\"\n").unwrap();

        let config = Config::load(Some(path)).unwrap();
        assert!(config.account_id.is_none());
        assert_eq!(config.default_tier.as_deref(), Some("vip"));
    }

    #[test]
    fn test_malformed_config_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "account_id = [not toml").unwrap();

        assert!(matches!(Config::load(Some(path)), Err(ConfigError::Parse(_))));
    }
}
