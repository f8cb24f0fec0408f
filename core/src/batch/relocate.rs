use crate::error::{MammareaError, Result};
use log::{info, warn};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// First `results_<n>` under `dest` that does not exist yet
pub fn next_results_dir(dest: &Path) -> PathBuf {
    (1..)
        .map(|n| dest.join(format!("results_{}", n)))
        .find(|candidate| !candidate.exists())
        .unwrap_or_else(|| dest.join("results"))
}

/// Moves a finished staging directory to `dest/results_<n>`
///
/// Tries a rename first and falls back to copy + delete when staging and
/// destination are on different filesystems. On failure the staging
/// directory is left as it was and `RelocationFailed` names both paths.
pub fn relocate(staging: &Path, dest: &Path) -> Result<PathBuf> {
    let fail = |reason: String| MammareaError::RelocationFailed {
        staging: staging.to_path_buf(),
        destination: dest.to_path_buf(),
        reason,
    };

    fs::create_dir_all(dest).map_err(|e| fail(e.to_string()))?;
    let target = next_results_dir(dest);

    if fs::rename(staging, &target).is_ok() {
        info!("Results moved to {}", target.display());
        return Ok(target);
    }

    if let Err(e) = copy_tree(staging, &target) {
        // Drop the partial copy; staging still holds everything
        let _ = fs::remove_dir_all(&target);
        return Err(fail(e.to_string()));
    }
    if let Err(e) = fs::remove_dir_all(staging) {
        warn!(
            "Results copied to {} but staging {} could not be removed: {}",
            target.display(),
            staging.display(),
            e
        );
    }

    info!("Results copied to {}", target.display());
    Ok(target)
}

fn copy_tree(from: &Path, to: &Path) -> Result<()> {
    for entry in WalkDir::new(from) {
        let entry = entry?;
        let relative = entry.path().strip_prefix(from).map_err(|e| {
            MammareaError::ExportError(format!("{}: {}", entry.path().display(), e))
        })?;
        let target = to.join(relative);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}
