use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors that abort a sweep.
#[derive(Debug, Error)]
pub enum SweepError {
    #[error("could not read metadata for {}: {source}", path.display())]
    Metadata {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("could not delete {}: {source}", path.display())]
    Remove {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl SweepError {
    pub fn path(&self) -> &Path {
        match self {
            SweepError::Metadata { path, .. } | SweepError::Remove { path, .. } => path,
        }
    }

    pub fn io_error(&self) -> &io::Error {
        match self {
            SweepError::Metadata { source, .. } | SweepError::Remove { source, .. } => source,
        }
    }

    /// True when the file disappeared between being listed and being touched.
    pub fn is_vanished(&self) -> bool {
        self.io_error().kind() == io::ErrorKind::NotFound
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("could not parse config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("threshold must be a finite, non-negative number of hours (got {0})")]
    InvalidThreshold(f64),
}
