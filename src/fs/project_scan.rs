//! Ignore-aware walk over the whole project tree.
//!
//! Hidden directories are never entered. Paths matched by the project's
//! `.sishoignore` (gitignore syntax) are skipped. Every visited or skipped path
//! is reported to the caller relative to the project root.

use anyhow::{Context, Result};
use ignore::gitignore::{Gitignore, GitignoreBuilder};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::config::IGNORE_FILE_NAME;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanEvent {
    SkipDir,
    SkipIgnoredDir,
    SkipIgnoredFile,
    EnterDir,
    ScanFile,
}

impl ScanEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScanEvent::SkipDir => "skip_dir",
            ScanEvent::SkipIgnoredDir => "skip_ignored_dir",
            ScanEvent::SkipIgnoredFile => "skip_ignored_file",
            ScanEvent::EnterDir => "enter_dir",
            ScanEvent::ScanFile => "scan_file",
        }
    }

    /// True for events that exclude a path from the walk
    pub fn is_skip(&self) -> bool {
        matches!(
            self,
            ScanEvent::SkipDir | ScanEvent::SkipIgnoredDir | ScanEvent::SkipIgnoredFile
        )
    }
}

pub struct ProjectScanner {
    root: PathBuf,
    ignore: Gitignore,
}

impl ProjectScanner {
    /// Create a scanner for `root`, loading `.sishoignore` when present
    pub fn new(root: &Path) -> Result<Self> {
        let ignore_path = root.join(IGNORE_FILE_NAME);
        let ignore = if ignore_path.is_file() {
            let mut builder = GitignoreBuilder::new(root);
            if let Some(err) = builder.add(&ignore_path) {
                return Err(err)
                    .with_context(|| format!("Failed to read {}", ignore_path.display()));
            }
            builder
                .build()
                .with_context(|| format!("Invalid patterns in {}", ignore_path.display()))?
        } else {
            Gitignore::empty()
        };

        Ok(Self {
            root: root.to_path_buf(),
            ignore,
        })
    }

    /// Walk the project in file-name order, calling `visit` for every entry.
    ///
    /// The project root itself is not reported. An error returned by `visit`
    /// aborts the walk.
    pub fn scan<F>(&self, mut visit: F) -> Result<()>
    where
        F: FnMut(ScanEvent, &Path) -> Result<()>,
    {
        self.walk_dir(&self.root, &mut visit)
    }

    fn walk_dir<F>(&self, dir: &Path, visit: &mut F) -> Result<()>
    where
        F: FnMut(ScanEvent, &Path) -> Result<()>,
    {
        let mut entries = fs::read_dir(dir)
            .with_context(|| format!("Failed to read directory: {}", dir.display()))?
            .collect::<std::io::Result<Vec<_>>>()
            .with_context(|| format!("Failed to read directory entry in {}", dir.display()))?;
        entries.sort_by_key(|e| e.file_name());

        for entry in entries {
            let path = entry.path();
            let file_type = entry
                .file_type()
                .with_context(|| format!("Failed to stat {}", path.display()))?;
            let is_dir = file_type.is_dir();
            let rel = path.strip_prefix(&self.root).unwrap_or(&path);

            let event = if is_dir && is_hidden(&path) {
                ScanEvent::SkipDir
            } else if self.ignore.matched(rel, is_dir).is_ignore() {
                if is_dir {
                    ScanEvent::SkipIgnoredDir
                } else {
                    ScanEvent::SkipIgnoredFile
                }
            } else if is_dir {
                ScanEvent::EnterDir
            } else {
                ScanEvent::ScanFile
            };

            debug!("{}: {}", event.as_str(), rel.display());
            visit(event, rel)?;

            if event == ScanEvent::EnterDir {
                self.walk_dir(&path, visit)?;
            }
        }

        Ok(())
    }
}

pub fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .map(|n| n.to_string_lossy().starts_with('.'))
        .unwrap_or(false)
}
