use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use rust_sweep::{ErrorPolicy, SweepConfig};

#[derive(Parser, Debug)]
#[command(
    name = "rust-sweep",
    about = "Delete files older than a retention threshold from a temp directory"
)]
pub struct Args {
    /// Directory to sweep [default: ../temp]
    pub path: Option<PathBuf>,

    /// Delete files at least this many hours old [default: 12]
    #[arg(short, long, allow_negative_numbers = true)]
    pub threshold_hours: Option<f64>,

    /// TOML file providing root_path and threshold_hours
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Only report what would be deleted
    #[arg(short = 'n', long, default_value = "false")]
    pub dry_run: bool,

    /// Log per-file failures and carry on instead of aborting (still exits non-zero)
    #[arg(short, long, default_value = "false")]
    pub keep_going: bool,

    /// Descend into symlinked directories
    #[arg(short = 'L', long, default_value = "false")]
    pub follow_links: bool,

    /// Skip the summary; errors are still printed
    #[arg(short, long, default_value = "false")]
    pub quiet: bool,

    /// Enable debug logging
    #[arg(short, long, default_value = "false")]
    pub verbose: bool,
}

impl Args {
    /// Config file (if any), then command-line overrides, validated.
    pub fn resolve_config(&self) -> Result<SweepConfig> {
        let base = match &self.config {
            Some(path) => SweepConfig::load(path)?,
            None => SweepConfig::default(),
        };
        let config = base.with_overrides(self.path.clone(), self.threshold_hours);
        config.validate().context("invalid configuration")?;
        Ok(config)
    }

    pub fn error_policy(&self) -> ErrorPolicy {
        if self.keep_going {
            ErrorPolicy::Continue
        } else {
            ErrorPolicy::Abort
        }
    }
}
