use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;

pub const DEFAULT_ROOT: &str = "../temp";
pub const DEFAULT_THRESHOLD_HOURS: f64 = 12.0;

/// Where to sweep and how old a file must be before it goes.
///
/// Loaded from an optional TOML file:
///
/// ```toml
/// root_path = "../temp"
/// threshold_hours = 12
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SweepConfig {
    pub root_path: PathBuf,
    pub threshold_hours: f64,
}

impl Default for SweepConfig {
    fn default() -> Self {
        SweepConfig {
            root_path: PathBuf::from(DEFAULT_ROOT),
            threshold_hours: DEFAULT_THRESHOLD_HOURS,
        }
    }
}

impl SweepConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Values given on the command line win over the file.
    pub fn with_overrides(mut self, root_path: Option<PathBuf>, threshold_hours: Option<f64>) -> Self {
        if let Some(root_path) = root_path {
            self.root_path = root_path;
        }
        if let Some(hours) = threshold_hours {
            self.threshold_hours = hours;
        }
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.threshold().map(|_| ())
    }

    pub fn threshold(&self) -> Result<Duration, ConfigError> {
        let hours = self.threshold_hours;
        if !hours.is_finite() || hours < 0.0 {
            return Err(ConfigError::InvalidThreshold(hours));
        }
        Duration::try_from_secs_f64(hours * 3600.0).map_err(|_| ConfigError::InvalidThreshold(hours))
    }
}
