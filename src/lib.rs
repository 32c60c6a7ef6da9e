//! Deletes files older than a retention threshold from a scratch directory.
//!
//! ```no_run
//! use std::time::Duration;
//!
//! let report = rust_sweep::sweep("../temp", Duration::from_secs(12 * 3600))?;
//! println!("removed {} file(s)", report.deleted_count());
//! # Ok::<(), rust_sweep::SweepError>(())
//! ```

pub mod config;
pub mod error;
pub mod format;
pub mod reporter;
pub mod scanner;
pub mod sweeper;

pub use config::SweepConfig;
pub use error::{ConfigError, SweepError};
pub use sweeper::{DeletedFile, ErrorPolicy, SweepReport, Sweeper, file_age, sweep};
