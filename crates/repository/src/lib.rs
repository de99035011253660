//! Repository content infrastructure adapter.
//!
//! Implements the [`pipeline::RepositorySource`] trait by walking a directory
//! tree with `walkdir` and reading every file as UTF-8 text.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** Traversal rules live here: the `.git` directory is
//! never entered, files that are not valid UTF-8 are skipped, and entries are
//! sorted by forward-slash relative path so the output does not depend on the
//! platform's directory ordering.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use pipeline::{FileEntry, RepositoryError, RepositorySource};
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

/// Directory names that are never descended into.
const SKIPPED_DIRS: &[&str] = &[".git"];

/// Lists files below a root directory on the local filesystem.
#[derive(Debug, Clone)]
pub struct FsRepositorySource {
    root: PathBuf,
}

impl FsRepositorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Blocking walk; see [`RepositorySource::list_files`].
    pub fn collect_files(&self) -> Result<Vec<FileEntry>, RepositoryError> {
        let mut files = Vec::new();

        let walker = WalkDir::new(&self.root)
            .follow_links(false)
            .into_iter()
            .filter_entry(|entry| !is_skipped_dir(entry));

        for entry in walker {
            let entry = entry.map_err(|e| RepositoryError::Walk {
                path: e
                    .path()
                    .unwrap_or(&self.root)
                    .display()
                    .to_string(),
                message: e.to_string(),
            })?;
            if !entry.file_type().is_file() {
                continue;
            }

            let relative = relative_path(&self.root, entry.path());
            let bytes = std::fs::read(entry.path()).map_err(|e| RepositoryError::Read {
                path: relative.clone(),
                message: e.to_string(),
            })?;
            match String::from_utf8(bytes) {
                Ok(contents) => files.push(FileEntry::new(relative, contents)),
                Err(_) => debug!(path = %relative, "Skipping non-UTF-8 file"),
            }
        }

        files.sort_by(|a, b| a.path.cmp(&b.path));
        debug!(root = %self.root.display(), files = files.len(), "Collected repository files");
        Ok(files)
    }
}

fn is_skipped_dir(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| SKIPPED_DIRS.contains(&name))
}

fn relative_path(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[async_trait]
impl RepositorySource for FsRepositorySource {
    async fn list_files(&self) -> Result<Vec<FileEntry>, RepositoryError> {
        let source = self.clone();
        tokio::task::spawn_blocking(move || source.collect_files())
            .await
            .map_err(|e| RepositoryError::Walk {
                path: self.root.display().to_string(),
                message: format!("walker task failed: {e}"),
            })?
    }
}
