//! Numbered copies of the settings file, taken before each migration step.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Serialize;

/// What a backup attempt did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "path", rename_all = "snake_case")]
pub enum BackupOutcome {
    Created(PathBuf),
    /// A backup for this version already exists and is left untouched.
    AlreadyPresent(PathBuf),
    /// The source file does not exist yet, so there is nothing to copy.
    NoSource,
}

/// Produces a copy of a file tagged with a config version.
pub trait Backup {
    fn backup(&self, path: &Path, version: u32) -> std::io::Result<BackupOutcome>;
}

/// Copies `<file>` to `<file>.v<version>`, making up to `attempts` copies
/// before giving up.
#[derive(Debug, Clone)]
pub struct VersionedFileBackup {
    attempts: u32,
    retry_delay: Duration,
}

impl VersionedFileBackup {
    /// `attempts` counts every copy, the first included. Zero is treated as one.
    pub fn new(attempts: u32, retry_delay: Duration) -> Self {
        Self {
            attempts: attempts.max(1),
            retry_delay,
        }
    }

    pub fn target_path(path: &Path, version: u32) -> PathBuf {
        let mut name = path.as_os_str().to_os_string();
        name.push(format!(".v{version}"));
        PathBuf::from(name)
    }
}

impl Default for VersionedFileBackup {
    fn default() -> Self {
        Self::new(10, Duration::from_secs(1))
    }
}

impl Backup for VersionedFileBackup {
    fn backup(&self, path: &Path, version: u32) -> std::io::Result<BackupOutcome> {
        let target = Self::target_path(path, version);
        if target.is_file() {
            tracing::debug!("Backup {} already exists", target.display());
            return Ok(BackupOutcome::AlreadyPresent(target));
        }
        if !path.is_file() {
            tracing::debug!("Not creating backup, {} doesn't exist", path.display());
            return Ok(BackupOutcome::NoSource);
        }

        let mut attempt = 1;
        loop {
            tracing::debug!("Trying to back up {} to {}", path.display(), target.display());
            match std::fs::copy(path, &target) {
                Ok(_) => {
                    tracing::debug!("Backup done");
                    return Ok(BackupOutcome::Created(target));
                }
                Err(e) if attempt < self.attempts => {
                    attempt += 1;
                    tracing::warn!(
                        "Error while trying to back up {} to {}: {e}, trying again",
                        path.display(),
                        target.display()
                    );
                    std::thread::sleep(self.retry_delay);
                }
                Err(e) => {
                    tracing::error!(
                        "Unable to back up {} to {}, please do it manually",
                        path.display(),
                        target.display()
                    );
                    return Err(e);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::Instant;
    use tempfile::TempDir;

    fn quick() -> VersionedFileBackup {
        VersionedFileBackup::new(2, Duration::ZERO)
    }

    fn blocked_target(dir: &TempDir, version: u32) -> PathBuf {
        let path = dir.path().join("config.toml");
        fs::write(&path, "x").unwrap();
        // A directory squatting on the target name cannot be overwritten by a copy.
        fs::create_dir(dir.path().join(format!("config.toml.v{version}"))).unwrap();
        path
    }

    #[test]
    fn target_appends_version_suffix() {
        let target = VersionedFileBackup::target_path(Path::new("/data/config.toml"), 3);
        assert_eq!(target, PathBuf::from("/data/config.toml.v3"));
    }

    #[test]
    fn copies_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[General]\n").unwrap();

        let outcome = quick().backup(&path, 0).unwrap();
        let expected = dir.path().join("config.toml.v0");
        assert_eq!(outcome, BackupOutcome::Created(expected.clone()));
        assert_eq!(fs::read_to_string(expected).unwrap(), "[General]\n");
    }

    #[test]
    fn existing_backup_is_kept() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        let old = dir.path().join("config.toml.v1");
        fs::write(&path, "new").unwrap();
        fs::write(&old, "old").unwrap();

        let outcome = quick().backup(&path, 1).unwrap();
        assert_eq!(outcome, BackupOutcome::AlreadyPresent(old.clone()));
        assert_eq!(fs::read_to_string(old).unwrap(), "old");
    }

    #[test]
    fn missing_source_is_skipped() {
        let dir = TempDir::new().unwrap();
        let outcome = quick().backup(&dir.path().join("absent.toml"), 0).unwrap();
        assert_eq!(outcome, BackupOutcome::NoSource);
    }

    #[test]
    fn unwritable_target_fails_after_retries() {
        let dir = TempDir::new().unwrap();
        let path = blocked_target(&dir, 2);
        assert!(quick().backup(&path, 2).is_err());
    }

    #[test]
    fn attempts_count_the_first_copy() {
        let dir = TempDir::new().unwrap();
        let path = blocked_target(&dir, 0);

        // One attempt never sleeps.
        let started = Instant::now();
        assert!(VersionedFileBackup::new(1, Duration::from_secs(5)).backup(&path, 0).is_err());
        assert!(started.elapsed() < Duration::from_secs(5));

        // Three attempts sleep twice.
        let started = Instant::now();
        assert!(VersionedFileBackup::new(3, Duration::from_millis(50)).backup(&path, 0).is_err());
        assert!(started.elapsed() >= Duration::from_millis(100));
    }
}
