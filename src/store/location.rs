//! Store path resolution
//!
//! Hosted deployments can mount the working directory read-only, and the
//! permissions can differ between invocations, so the writable location is
//! probed on every store access rather than cached.

use std::ffi::OsStr;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use tracing::debug;

/// Resolve the writable path for the persisted collection.
///
/// Probes the preferred path by opening it for appending (which creates an
/// empty file if none exists). Any failure (permission denied, read-only
/// filesystem, missing directory) falls back to the OS temp directory under
/// the same file name. Resolution always succeeds with some path.
pub fn resolve(preferred: &Path) -> PathBuf {
    match OpenOptions::new().append(true).create(true).open(preferred) {
        Ok(_) => preferred.to_path_buf(),
        Err(e) => {
            let file_name = preferred
                .file_name()
                .unwrap_or_else(|| OsStr::new("essays.json"));
            let fallback = std::env::temp_dir().join(file_name);
            debug!(
                preferred = %preferred.display(),
                fallback = %fallback.display(),
                error = %e,
                "Preferred store path not writable, using fallback"
            );
            fallback
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_resolve_prefers_writable_path() {
        let dir = TempDir::new().unwrap();
        let preferred = dir.path().join("essays.json");

        let resolved = resolve(&preferred);

        assert_eq!(resolved, preferred);
        // The probe leaves an empty file behind.
        assert!(preferred.exists());
    }

    #[test]
    fn test_resolve_falls_back_on_missing_directory() {
        let dir = TempDir::new().unwrap();
        let preferred = dir.path().join("no_such_dir").join("essays.json");

        let resolved = resolve(&preferred);

        assert_eq!(resolved, std::env::temp_dir().join("essays.json"));
    }

    #[test]
    fn test_resolve_is_reevaluated_per_call() {
        let dir = TempDir::new().unwrap();
        let preferred = dir.path().join("essays.json");

        assert_eq!(resolve(&preferred), preferred);

        // Once the directory disappears the next call must fall back.
        drop(dir);
        assert_eq!(resolve(&preferred), std::env::temp_dir().join("essays.json"));
    }
}
