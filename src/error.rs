use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MigrateError {
    #[error(
        "Your config version ({found}) has been incremented past what this version supports ({supported}). \
         If you have used other forks or a newer version, your config file may be unusable due to their modifications."
    )]
    UnsupportedVersion { found: u64, supported: u32 },

    #[error("Config version {found} is not a valid version")]
    InvalidVersion { found: i64 },

    #[error("Config backup of {path} failed, abort upgrading config: {source}")]
    BackupFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("No migration step registered for config version {version}")]
    MissingStep { version: u32 },

    #[error("Failed to read {path}: {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml_edit::TomlError,
    },

    #[error("Show database error: {0}")]
    ShowStore(#[from] rusqlite::Error),

    #[error("Failed to parse options file {path}: {source}")]
    OptionsParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Options error: {0}")]
    OptionsError(#[from] confique::Error),

    #[error("Unknown option keys in {path}: {}", keys.join(", "))]
    UnknownOptions { path: PathBuf, keys: Vec<String> },

    #[error("Another migration holds the lock on {path}: {source}")]
    LockFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid value for '{key}': {reason}")]
    InvalidValue { key: String, reason: String },
}

impl MigrateError {
    /// Whether the error must stop the whole program rather than just the
    /// current operation.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            MigrateError::UnsupportedVersion { .. }
                | MigrateError::InvalidVersion { .. }
                | MigrateError::BackupFailed { .. }
                | MigrateError::MissingStep { .. }
        )
    }
}
