//! Age-based deletion of files below a root directory.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use tracing::{debug, info, warn};

use crate::error::SweepError;
use crate::scanner::{FileEntry, scan_files};

/// What to do when a single file cannot be statted or deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorPolicy {
    /// Stop the sweep and return the error. Remaining files are left for the next run.
    #[default]
    Abort,
    /// Log the failure, record it in the report and move on.
    Continue,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletedFile {
    pub path: PathBuf,
    pub size: u64,
    pub age: Duration,
}

/// Outcome of one sweep.
#[derive(Debug)]
pub struct SweepReport {
    pub root: PathBuf,
    pub dry_run: bool,
    pub scanned: usize,
    pub kept: usize,
    /// Deleted files, or the files that would have been deleted in a dry run.
    pub deleted: Vec<DeletedFile>,
    /// Failures tolerated under [`ErrorPolicy::Continue`].
    pub failures: Vec<SweepError>,
}

impl SweepReport {
    fn new(root: &Path, dry_run: bool) -> Self {
        SweepReport {
            root: root.to_path_buf(),
            dry_run,
            scanned: 0,
            kept: 0,
            deleted: Vec::new(),
            failures: Vec::new(),
        }
    }

    pub fn deleted_count(&self) -> usize {
        self.deleted.len()
    }

    pub fn bytes_freed(&self) -> u64 {
        self.deleted.iter().map(|f| f.size).sum()
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Deletes files whose age (time since last modification) is at least
/// `threshold`. Directories are never removed.
#[derive(Debug, Clone)]
pub struct Sweeper {
    threshold: Duration,
    dry_run: bool,
    error_policy: ErrorPolicy,
    follow_links: bool,
    now: Option<SystemTime>,
}

impl Sweeper {
    pub fn new(threshold: Duration) -> Self {
        Sweeper {
            threshold,
            dry_run: false,
            error_policy: ErrorPolicy::Abort,
            follow_links: false,
            now: None,
        }
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn error_policy(mut self, policy: ErrorPolicy) -> Self {
        self.error_policy = policy;
        self
    }

    /// Descend into symlinked directories. Off by default.
    pub fn follow_links(mut self, follow: bool) -> Self {
        self.follow_links = follow;
        self
    }

    /// Measure ages against a fixed instant instead of the clock at sweep start.
    pub fn now(mut self, now: SystemTime) -> Self {
        self.now = Some(now);
        self
    }

    pub fn sweep(&self, root: &Path) -> Result<SweepReport, SweepError> {
        let now = self.now.unwrap_or_else(SystemTime::now);
        let mut report = SweepReport::new(root, self.dry_run);

        for entry in scan_files(root, self.follow_links) {
            self.process(&entry, now, &mut report)?;
        }

        info!(
            root = %root.display(),
            scanned = report.scanned,
            deleted = report.deleted_count(),
            kept = report.kept,
            failed = report.failures.len(),
            dry_run = self.dry_run,
            "sweep finished"
        );
        Ok(report)
    }

    /// Visits one file and applies the error policy to whatever went wrong.
    pub(crate) fn process(
        &self,
        entry: &FileEntry,
        now: SystemTime,
        report: &mut SweepReport,
    ) -> Result<(), SweepError> {
        let Err(err) = self.visit(entry, now, report) else {
            return Ok(());
        };
        match self.error_policy {
            ErrorPolicy::Abort => return Err(err),
            ErrorPolicy::Continue if err.is_vanished() && !entry.is_symlink() => {
                debug!(path = %entry.path().display(), "file already gone");
            }
            ErrorPolicy::Continue => {
                warn!(error = %err, "skipping file");
                report.failures.push(err);
            }
        }
        Ok(())
    }

    fn visit(
        &self,
        entry: &FileEntry,
        now: SystemTime,
        report: &mut SweepReport,
    ) -> Result<(), SweepError> {
        report.scanned += 1;
        let path = entry.path();

        let metadata_error = |source| SweepError::Metadata {
            path: path.to_path_buf(),
            source,
        };
        let meta = entry.metadata().map_err(metadata_error)?;
        let modified = meta.modified().map_err(metadata_error)?;

        let age = file_age(now, modified);
        if age < self.threshold {
            report.kept += 1;
            return Ok(());
        }

        if !self.dry_run {
            fs::remove_file(path).map_err(|source| SweepError::Remove {
                path: path.to_path_buf(),
                source,
            })?;
            debug!(path = %path.display(), age_secs = age.as_secs(), "deleted");
        }

        // Removing a link frees the link, not its target.
        let size = if entry.is_symlink() { 0 } else { meta.len() };
        report.deleted.push(DeletedFile {
            path: path.to_path_buf(),
            size,
            age,
        });
        Ok(())
    }
}

/// Time elapsed since `modified`. Timestamps in the future count as age zero.
pub fn file_age(now: SystemTime, modified: SystemTime) -> Duration {
    now.duration_since(modified).unwrap_or(Duration::ZERO)
}

/// Runs a sweep with default options: abort on the first error, no dry run,
/// symlinked directories not followed.
pub fn sweep(root: impl AsRef<Path>, threshold: Duration) -> Result<SweepReport, SweepError> {
    Sweeper::new(threshold).sweep(root.as_ref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    const HOUR: Duration = Duration::from_secs(60 * 60);

    fn write_aged(path: &Path, now: SystemTime, age: Duration, bytes: &[u8]) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        let mut file = File::create(path).unwrap();
        file.write_all(bytes).unwrap();
        file.set_modified(now - age).unwrap();
    }

    #[test]
    fn file_age_saturates_for_future_timestamps() {
        let now = SystemTime::now();
        assert_eq!(file_age(now, now + HOUR), Duration::ZERO);
        assert_eq!(file_age(now, now - HOUR), HOUR);
    }

    #[test]
    fn deletes_only_files_at_or_past_threshold() {
        let dir = tempdir().unwrap();
        let now = SystemTime::now();
        write_aged(&dir.path().join("exact.png"), now, 12 * HOUR, b"x");
        write_aged(&dir.path().join("young.png"), now, 12 * HOUR - Duration::from_secs(1), b"x");

        let report = Sweeper::new(12 * HOUR).now(now).sweep(dir.path()).unwrap();

        assert!(!dir.path().join("exact.png").exists());
        assert!(dir.path().join("young.png").exists());
        assert_eq!(report.scanned, 2);
        assert_eq!(report.kept, 1);
        assert_eq!(report.deleted_count(), 1);
    }

    #[test]
    fn report_counts_freed_bytes() {
        let dir = tempdir().unwrap();
        let now = SystemTime::now();
        write_aged(&dir.path().join("a.png"), now, 20 * HOUR, &[0u8; 100]);
        write_aged(&dir.path().join("b/c.png"), now, 30 * HOUR, &[0u8; 28]);

        let report = Sweeper::new(HOUR).now(now).sweep(dir.path()).unwrap();

        assert_eq!(report.bytes_freed(), 128);
        assert!(report.is_clean());
        assert!(dir.path().join("b").is_dir());
    }

    #[test]
    fn dry_run_leaves_files_in_place() {
        let dir = tempdir().unwrap();
        let now = SystemTime::now();
        write_aged(&dir.path().join("old.png"), now, 48 * HOUR, b"x");
        write_aged(&dir.path().join("new.png"), now, HOUR, b"x");

        let report = Sweeper::new(12 * HOUR)
            .now(now)
            .dry_run(true)
            .sweep(dir.path())
            .unwrap();

        assert!(report.dry_run);
        assert_eq!(report.deleted.len(), 1);
        assert_eq!(report.deleted[0].path, dir.path().join("old.png"));
        assert!(report.deleted[0].age >= 48 * HOUR);
        assert!(dir.path().join("old.png").exists());
    }

    #[test]
    fn missing_root_is_a_no_op() {
        let dir = tempdir().unwrap();
        let report = sweep(dir.path().join("missing"), Duration::ZERO).unwrap();
        assert_eq!(report.scanned, 0);
        assert_eq!(report.deleted_count(), 0);
    }

    #[test]
    fn vanished_file_is_neither_deleted_nor_failed_when_continuing() {
        let dir = tempdir().unwrap();
        let now = SystemTime::now();
        let path = dir.path().join("raced.png");
        write_aged(&path, now, 24 * HOUR, b"x");
        let entry = FileEntry::new(path.clone(), false);
        fs::remove_file(&path).unwrap();

        let sweeper = Sweeper::new(12 * HOUR)
            .now(now)
            .error_policy(ErrorPolicy::Continue);
        let mut report = SweepReport::new(dir.path(), false);
        sweeper.process(&entry, now, &mut report).unwrap();

        assert_eq!(report.scanned, 1);
        assert_eq!(report.deleted_count(), 0);
        assert!(report.failures.is_empty());

        let err = Sweeper::new(12 * HOUR)
            .now(now)
            .process(&entry, now, &mut SweepReport::new(dir.path(), false))
            .unwrap_err();
        assert!(err.is_vanished());
    }

    #[cfg(unix)]
    #[test]
    fn dangling_link_aborts_by_default() {
        use std::os::unix::fs::symlink;

        let dir = tempdir().unwrap();
        symlink(dir.path().join("nowhere"), dir.path().join("broken.png")).unwrap();

        for follow_links in [false, true] {
            let err = Sweeper::new(Duration::ZERO)
                .follow_links(follow_links)
                .sweep(dir.path())
                .unwrap_err();
            assert!(matches!(err, SweepError::Metadata { .. }));
            assert_eq!(err.path(), dir.path().join("broken.png"));
        }
    }

    #[cfg(unix)]
    #[test]
    fn continue_policy_records_failure_and_keeps_going() {
        use std::os::unix::fs::symlink;

        let dir = tempdir().unwrap();
        let now = SystemTime::now();
        symlink(dir.path().join("nowhere"), dir.path().join("broken.png")).unwrap();
        write_aged(&dir.path().join("old.png"), now, 24 * HOUR, b"x");

        let report = Sweeper::new(12 * HOUR)
            .now(now)
            .error_policy(ErrorPolicy::Continue)
            .sweep(dir.path())
            .unwrap();

        assert_eq!(report.failures.len(), 1);
        assert!(!report.is_clean());
        assert!(!dir.path().join("old.png").exists());
    }

    #[cfg(unix)]
    #[test]
    fn old_file_symlink_removes_link_not_target() {
        use std::os::unix::fs::symlink;

        let root = tempdir().unwrap();
        let outside = tempdir().unwrap();
        let now = SystemTime::now();
        let target = outside.path().join("target.png");
        write_aged(&target, now, 24 * HOUR, b"keep me");
        symlink(&target, root.path().join("link.png")).unwrap();

        let report = Sweeper::new(12 * HOUR).now(now).sweep(root.path()).unwrap();

        assert_eq!(report.deleted_count(), 1);
        assert_eq!(report.bytes_freed(), 0);
        assert!(fs::symlink_metadata(root.path().join("link.png")).is_err());
        assert!(target.exists());
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_directory_contents_survive_by_default() {
        use std::os::unix::fs::symlink;

        let root = tempdir().unwrap();
        let outside = tempdir().unwrap();
        let now = SystemTime::now();
        write_aged(&outside.path().join("far.png"), now, 24 * HOUR, b"x");
        symlink(outside.path(), root.path().join("linked")).unwrap();

        sweep(root.path(), Duration::ZERO).unwrap();
        assert!(outside.path().join("far.png").exists());

        Sweeper::new(Duration::ZERO)
            .follow_links(true)
            .sweep(root.path())
            .unwrap();
        assert!(!outside.path().join("far.png").exists());
        assert!(outside.path().is_dir());
    }
}
