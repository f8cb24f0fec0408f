//! Process-scoped scratch space and atomic file writes

use crate::error::{MammareaError, Result};
use log::{debug, warn};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::{Builder, TempDir};

/// Temporary directory owned by one process
///
/// Created at start-up and removed when dropped. Every caller gets its own
/// uniquely named subdirectory, so concurrent uses never collide.
#[derive(Debug)]
pub struct ScratchDir {
    root: TempDir,
    counter: AtomicUsize,
}

impl ScratchDir {
    /// Creates a scratch directory under the system temp location
    pub fn new() -> Result<Self> {
        let root = Builder::new().prefix("mammarea-").tempdir()?;
        debug!("Scratch directory at {}", root.path().display());
        Ok(Self {
            root,
            counter: AtomicUsize::new(0),
        })
    }

    /// Creates a scratch directory inside `parent`
    pub fn new_in<P: AsRef<Path>>(parent: P) -> Result<Self> {
        let root = Builder::new().prefix("mammarea-").tempdir_in(parent)?;
        Ok(Self {
            root,
            counter: AtomicUsize::new(0),
        })
    }

    pub fn path(&self) -> &Path {
        self.root.path()
    }

    /// Creates a fresh, empty subdirectory such as `staging-3`
    pub fn unique_dir(&self, label: &str) -> Result<PathBuf> {
        let n = self.counter.fetch_add(1, Ordering::Relaxed);
        let dir = self.root.path().join(format!("{}-{}", label, n));
        fs::create_dir(&dir)?;
        Ok(dir)
    }

    /// Stops cleanup and returns the directory path
    ///
    /// Used when results could not be moved out and must survive exit.
    pub fn keep(self) -> PathBuf {
        self.root.keep()
    }
}

/// Writes `path` through a temporary sibling file
///
/// `write` receives the temporary path, whose name ends with `suffix` so
/// extension-sensitive encoders behave. The destination only appears once
/// writing succeeded; the temporary file is removed on every error path.
pub fn write_atomically<F>(path: &Path, suffix: &str, write: F) -> Result<()>
where
    F: FnOnce(&Path) -> Result<()>,
{
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let temp = Builder::new()
        .prefix(".mammarea-")
        .suffix(suffix)
        .tempfile_in(parent)?;

    write(temp.path())?;

    if let Err(err) = temp.persist(path) {
        warn!(
            "Rename into {} failed ({}), copying instead",
            path.display(),
            err.error
        );
        fs::copy(err.file.path(), path).map_err(|e| {
            MammareaError::ExportError(format!("could not write {}: {}", path.display(), e))
        })?;
    }
    Ok(())
}
