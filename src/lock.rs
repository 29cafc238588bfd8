//! Cross-process exclusion for a migration pass.
//!
//! The lock is an advisory `fs2` lock on `.<file name>.lock` next to the
//! settings file. It is released when the guard is dropped.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use fs2::FileExt;

use crate::error::MigrateError;

#[derive(Debug)]
pub struct MigrationLock {
    file: File,
    path: PathBuf,
}

impl MigrationLock {
    pub fn lock_path(settings_path: &Path) -> PathBuf {
        let name = settings_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "settings".to_string());
        settings_path.with_file_name(format!(".{name}.lock"))
    }

    /// Take the lock without blocking; fails if another process holds it.
    pub fn acquire(settings_path: &Path) -> Result<Self, MigrateError> {
        let path = Self::lock_path(settings_path);
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| MigrateError::IoError {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&path)
            .map_err(|e| MigrateError::IoError {
                path: path.clone(),
                source: e,
            })?;
        file.try_lock_exclusive()
            .map_err(|e| MigrateError::LockFailed {
                path: path.clone(),
                source: e,
            })?;
        tracing::trace!("Acquired migration lock {}", path.display());
        Ok(Self { file, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for MigrationLock {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.file) {
            tracing::warn!("Failed to release {}: {e}", self.path.display());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn lock_file_sits_next_to_settings() {
        let path = MigrationLock::lock_path(Path::new("/data/config.toml"));
        assert_eq!(path, PathBuf::from("/data/.config.toml.lock"));
    }

    #[test]
    fn second_acquire_fails_while_held() {
        let dir = TempDir::new().unwrap();
        let settings = dir.path().join("config.toml");
        let held = MigrationLock::acquire(&settings).unwrap();
        let err = MigrationLock::acquire(&settings).unwrap_err();
        assert!(matches!(err, MigrateError::LockFailed { .. }));
        drop(held);
        assert!(MigrationLock::acquire(&settings).is_ok());
    }
}
