use std::path::PathBuf;

use crate::config::{Config, ConfigError};

/// Shared context handed to every operation
pub struct OpContext {
    pub config: Config,
}

impl OpContext {
    pub fn new(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let config = Config::load(config_path)?;
        Ok(Self { config })
    }

    /// Account id from an explicit flag, falling back to the config.
    pub fn account<'a>(&'a self, explicit: Option<&'a str>) -> Option<&'a str> {
        explicit.or(self.config.account_id.as_deref())
    }
}

/// A single CLI operation
///
/// Each subcommand implements this with its own error type; `main`
/// prints the output on success and the error chain on failure.
pub trait Op {
    type Error: std::error::Error + Send + Sync + 'static;
    type Output: std::fmt::Display;

    fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error>;
}
