use colored::Colorize;

use crate::format::{format_age, format_size};
use crate::sweeper::SweepReport;

pub fn print_report(report: &SweepReport) {
    println!(
        "  Scanned {} file(s) under {}",
        report.scanned.to_string().cyan(),
        report.root.display().to_string().bold()
    );

    if report.dry_run {
        for file in &report.deleted {
            println!(
                "  {} {} ({} old, {})",
                "[would delete]".yellow(),
                file.path.display(),
                format_age(file.age),
                format_size(file.size)
            );
        }
    }

    if report.deleted.is_empty() {
        println!(
            "{} {} ({} kept)",
            "=>".green().bold(),
            "Nothing to clean up!".green().bold(),
            report.kept
        );
        return;
    }

    let verb = if report.dry_run { "Would delete" } else { "Deleted" };
    let freed = if report.dry_run { "would free" } else { "freed" };
    println!(
        "{} {} {} file(s), kept {}, {} {}",
        "=>".green().bold(),
        verb,
        report.deleted_count().to_string().cyan(),
        report.kept.to_string().cyan(),
        freed,
        format_size(report.bytes_freed()).green().bold()
    );
}

/// Failures tolerated under `--keep-going`. Printed even in quiet mode.
pub fn print_failures(report: &SweepReport) {
    for failure in &report.failures {
        eprintln!("  {} {}", "Error:".red().bold(), failure);
    }
}
