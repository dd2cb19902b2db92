//! Scoped staging area for trailer downloads.

use crate::{Error, Result};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Temporary directory that holds a trailer while it downloads.
///
/// One workspace is created per directory attempt. Downloads are written
/// into it, the winning file is moved next to the movie with
/// [`DownloadWorkspace::finalize`], and the directory itself is removed when
/// the workspace is dropped or closed, whatever the outcome.
///
/// # Example
///
/// ```no_run
/// use trailer_av::DownloadWorkspace;
///
/// let workspace = DownloadWorkspace::new()?;
/// let staged = workspace.staging_path("Heat (1995)-trailer.mp4");
/// // ... download into `staged` ...
/// workspace.finalize(&staged, "/movies/Heat (1995)/Heat (1995)-trailer.mp4".as_ref())?;
/// # Ok::<(), trailer_av::Error>(())
/// ```
pub struct DownloadWorkspace {
    temp_dir: TempDir,
}

impl DownloadWorkspace {
    /// Create a new workspace under the system temp directory.
    pub fn new() -> Result<Self> {
        let temp_dir = tempfile::Builder::new()
            .prefix("trailer-technician-")
            .tempdir()
            .map_err(|e| Error::Staging(e.to_string()))?;
        Ok(Self { temp_dir })
    }

    /// Create a new workspace under `parent`.
    pub fn new_in<P: AsRef<Path>>(parent: P) -> Result<Self> {
        let temp_dir = tempfile::Builder::new()
            .prefix("trailer-technician-")
            .tempdir_in(parent)
            .map_err(|e| Error::Staging(e.to_string()))?;
        Ok(Self { temp_dir })
    }

    /// Get the workspace directory.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Path inside the workspace for a file with the given name.
    pub fn staging_path(&self, name: &str) -> PathBuf {
        self.temp_dir.path().join(name)
    }

    /// First regular file currently staged, in name order.
    ///
    /// Downloaders that pick their own extension leave exactly one file
    /// behind; this finds it without guessing the name.
    pub fn staged_file(&self) -> Option<PathBuf> {
        let mut files: Vec<PathBuf> = std::fs::read_dir(self.temp_dir.path())
            .ok()?
            .flatten()
            .map(|e| e.path())
            .filter(|p| p.is_file())
            .collect();
        files.sort();
        files.into_iter().next()
    }

    /// Remove everything inside the workspace, keeping the directory.
    ///
    /// Failures are logged per entry and do not stop the purge. Returns the
    /// number of entries that could not be removed.
    pub fn purge(&self) -> usize {
        let entries = match std::fs::read_dir(self.temp_dir.path()) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(
                    path = %self.temp_dir.path().display(),
                    error = %e,
                    "Could not list download workspace"
                );
                return 1;
            }
        };

        let mut failures = 0;
        for entry in entries.flatten() {
            let path = entry.path();
            let result = if path.is_dir() {
                std::fs::remove_dir_all(&path)
            } else {
                std::fs::remove_file(&path)
            };
            if let Err(e) = result {
                failures += 1;
                tracing::warn!(path = %path.display(), error = %e, "Failed to remove staged item");
            }
        }
        failures
    }

    /// Move a staged file to `destination` and dispose of the workspace.
    ///
    /// A plain rename is tried first; when the workspace lives on another
    /// filesystem the file is copied next to `destination` under a temporary
    /// name and renamed into place, so a failed copy never leaves a partial
    /// trailer behind.
    pub fn finalize(self, staged: &Path, destination: &Path) -> Result<PathBuf> {
        if !staged.starts_with(self.temp_dir.path()) {
            return Err(Error::OutsideWorkspace(staged.to_path_buf()));
        }
        if !staged.is_file() {
            return Err(Error::Staging(format!(
                "staged file {} does not exist",
                staged.display()
            )));
        }

        if std::fs::rename(staged, destination).is_err() {
            copy_into_place(staged, destination)?;
            let _ = std::fs::remove_file(staged);
        }

        self.close();
        Ok(destination.to_path_buf())
    }

    /// Remove the workspace, logging instead of failing.
    pub fn close(self) {
        let path = self.temp_dir.path().to_path_buf();
        if let Err(e) = self.temp_dir.close() {
            tracing::warn!(path = %path.display(), error = %e, "Failed to remove download workspace");
        }
    }
}

/// Copy `staged` to a hidden sibling of `destination`, then rename it over.
///
/// The sibling is deleted on every error path.
fn copy_into_place(staged: &Path, destination: &Path) -> Result<()> {
    let parent = destination
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut partial = tempfile::Builder::new()
        .prefix(".trailer-technician-")
        .suffix(".part")
        .tempfile_in(parent)
        .map_err(|e| Error::Staging(format!("Cannot write into {}: {}", parent.display(), e)))?;

    let mut source = std::fs::File::open(staged)?;
    std::io::copy(&mut source, partial.as_file_mut())
        .map_err(|e| Error::Staging(format!("Failed to copy trailer: {}", e)))?;
    partial.as_file().sync_all()?;

    partial.persist(destination).map_err(|e| {
        Error::Staging(format!("Failed to move trailer to destination: {}", e.error))
    })?;
    Ok(())
}
