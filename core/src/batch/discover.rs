use crate::error::{MammareaError, Result};
use crate::types::BatchConfig;
use log::{debug, warn};
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Recursively lists files under `root` whose extension is accepted
///
/// Entries are visited sorted by file name within each directory, so the
/// order is stable across runs and platforms. Unreadable subdirectories
/// are logged and skipped.
pub fn discover(root: &Path, config: &BatchConfig) -> Result<Vec<PathBuf>> {
    if !root.is_dir() {
        return Err(MammareaError::IoError(io::Error::new(
            io::ErrorKind::NotFound,
            format!("{} is not a directory", root.display()),
        )));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable entry: {}", e);
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let accepted = entry
            .path()
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| config.accepts_extension(ext));
        if accepted {
            files.push(entry.into_path());
        }
    }

    debug!("Discovered {} candidate files under {}", files.len(), root.display());
    Ok(files)
}
