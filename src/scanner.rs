use std::fs::{self, Metadata};
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

/// A file found under the sweep root. Metadata is read on demand so the
/// file is statted at the moment it is visited.
#[derive(Debug, Clone)]
pub struct FileEntry {
    path: PathBuf,
    is_symlink: bool,
}

impl FileEntry {
    pub(crate) fn new(path: PathBuf, is_symlink: bool) -> Self {
        FileEntry { path, is_symlink }
    }

    fn from_dir_entry(entry: DirEntry) -> Option<Self> {
        let is_symlink = entry.path_is_symlink();
        let file_type = entry.file_type();

        if file_type.is_file() {
            return Some(FileEntry::new(entry.into_path(), is_symlink));
        }

        // Only seen when links are not followed. Links to directories are
        // left alone; anything else, dangling links included, is a file.
        if file_type.is_symlink() {
            return match fs::metadata(entry.path()) {
                Ok(meta) if meta.is_dir() => None,
                _ => Some(FileEntry::new(entry.into_path(), true)),
            };
        }

        None
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_symlink(&self) -> bool {
        self.is_symlink
    }

    /// Metadata of the file, following a symlink to its target.
    pub fn metadata(&self) -> io::Result<Metadata> {
        fs::metadata(&self.path)
    }
}

/// Iterator over every file below a root directory.
pub struct Scan {
    walker: Option<walkdir::IntoIter>,
}

impl Iterator for Scan {
    type Item = FileEntry;

    fn next(&mut self) -> Option<FileEntry> {
        let walker = self.walker.as_mut()?;
        loop {
            let entry = match walker.next()? {
                Ok(entry) => entry,
                Err(e) => {
                    if let Some(link) = dangling_link(&e) {
                        return Some(link);
                    }
                    warn!(path = ?e.path(), error = %e, "skipping unreadable entry");
                    continue;
                }
            };
            if let Some(file) = FileEntry::from_dir_entry(entry) {
                return Some(file);
            }
        }
    }
}

/// When following links, walkdir reports a broken link as a walk error.
/// Hand it on as a file so the sweeper fails on it the same way it does
/// when links are not followed.
fn dangling_link(err: &walkdir::Error) -> Option<FileEntry> {
    if err.loop_ancestor().is_some() {
        return None;
    }
    let path = err.path()?;
    let meta = fs::symlink_metadata(path).ok()?;
    if !meta.file_type().is_symlink() || fs::metadata(path).is_ok() {
        return None;
    }
    Some(FileEntry::new(path.to_path_buf(), true))
}

/// Walks `root` recursively. A missing or unreadable root yields nothing.
pub fn scan_files(root: &Path, follow_links: bool) -> Scan {
    let walker = match fs::metadata(root) {
        Ok(meta) if meta.is_dir() => Some(WalkDir::new(root).follow_links(follow_links).into_iter()),
        Ok(_) => {
            debug!(root = %root.display(), "root is not a directory, nothing to scan");
            None
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!(root = %root.display(), "root does not exist, nothing to scan");
            None
        }
        Err(e) => {
            warn!(root = %root.display(), error = %e, "cannot read root, nothing to scan");
            None
        }
    };

    Scan { walker }
}
