use std::path::Path;

use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;

use crate::feed::replay::PAST_DIFF_WINDOW_SIZE;

pub const DEFAULT_SYMBOL: &str = "BTC-USD";
pub const DEFAULT_DEPTH: usize = 5;
pub const DEFAULT_LOG_FILTER: &str = "info";
pub const ENV_PREFIX: &str = "UNCROSS";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to load settings: {0}")]
    Load(#[from] config::ConfigError),

    #[error("depth must be at least 1")]
    ZeroDepth,
}

/// Runtime settings. Sources, lowest priority first: built-in defaults,
/// the optional config file, then `UNCROSS_*` environment variables.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Settings {
    pub symbol: String,
    pub depth: usize,
    pub log_filter: String,
    /// Diffs remembered for re-application after a late snapshot.
    pub diff_window: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            symbol: DEFAULT_SYMBOL.to_string(),
            depth: DEFAULT_DEPTH,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            diff_window: PAST_DIFF_WINDOW_SIZE,
        }
    }
}

impl Settings {
    pub fn load(path: Option<&Path>) -> Result<Self, SettingsError> {
        Self::load_with_env(path, Environment::with_prefix(ENV_PREFIX))
    }

    fn load_with_env(path: Option<&Path>, env: Environment) -> Result<Self, SettingsError> {
        let mut builder = Config::builder()
            .set_default("symbol", DEFAULT_SYMBOL)?
            .set_default("depth", DEFAULT_DEPTH as u64)?
            .set_default("log_filter", DEFAULT_LOG_FILTER)?
            .set_default("diff_window", PAST_DIFF_WINDOW_SIZE as u64)?;

        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(true));
        }

        let settings: Settings = builder.add_source(env).build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Checks invariants that hold no matter where the values came from.
    /// Call again after applying command-line overrides.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.depth == 0 {
            return Err(SettingsError::ZeroDepth);
        }
        Ok(())
    }
}
