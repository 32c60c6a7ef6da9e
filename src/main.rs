mod cli;

use anyhow::{Context, Result, bail};
use clap::Parser;
use colored::Colorize;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use cli::Args;
use rust_sweep::{SweepReport, Sweeper};
use rust_sweep::reporter::{print_failures, print_report};

fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose { Level::DEBUG } else { Level::WARN };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("setting default subscriber failed")?;

    let config = args.resolve_config()?;
    let sweeper = Sweeper::new(config.threshold()?)
        .dry_run(args.dry_run)
        .error_policy(args.error_policy())
        .follow_links(args.follow_links);

    if !args.quiet {
        println!(
            "{} Sweeping {} (threshold: {}h){}",
            "=>".blue().bold(),
            config.root_path.display().to_string().bold(),
            config.threshold_hours,
            if args.dry_run { " [dry run]" } else { "" }
        );
    }

    let report = sweeper
        .sweep(&config.root_path)
        .with_context(|| format!("sweep of {} aborted", config.root_path.display()))?;

    if !args.quiet {
        print_report(&report);
    }
    print_failures(&report);

    ensure_clean(&report)
}

/// A sweep that skipped files under `--keep-going` still fails the process.
fn ensure_clean(report: &SweepReport) -> Result<()> {
    if !report.is_clean() {
        bail!("{} file(s) could not be processed", report.failures.len());
    }
    Ok(())
}
