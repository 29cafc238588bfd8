//! Options for the migrator itself: where the settings live, how backups
//! retry, how secrets are encoded, and how logging is set up.
//!
//! # Layer precedence
//!
//! ```text
//! Compiled defaults     #[config(default = ...)]
//!        ↑ overridden by
//! Options file          --options PATH, or <platform config dir>/confmigrate.toml
//!        ↑ overridden by
//! Environment vars      CONFMIGRATE__KEY, CONFMIGRATE__SECTION__KEY
//!        ↑ overridden by
//! Overrides             --config, --show-db, ...
//! ```
//!
//! Resolution in [`resolve`] does no I/O. [`read_options_file`] and the
//! [`Migrator`](crate::Migrator) builder gather the inputs.

use std::path::{Path, PathBuf};
use std::time::Duration;

use confique::Config;
use serde::{Deserialize, Serialize};
use toml::{Table, Value};

use crate::backup::VersionedFileBackup;
use crate::error::MigrateError;
use crate::layers::{deep_merge, env_table, overrides_table, unknown_keys};
use crate::secret::{PLAIN_TEXT, SecretCodec, XOR_BASE64};

pub const APP_NAME: &str = "confmigrate";
pub const ENV_PREFIX: &str = "CONFMIGRATE";

#[derive(Config, Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct MigratorOptions {
    /// Settings file to migrate.
    #[config(default = "config.toml")]
    pub config_file: PathBuf,

    /// SQLite database holding the `tv_shows` table.
    #[config(default = "sickbeard.db")]
    pub show_db: PathBuf,

    /// How password settings are stored: 0 is plain text, 1 is XOR with
    /// `encryption_key` and base64.
    #[config(default = 0)]
    pub encryption_version: u8,

    /// Key for encryption version 1.
    pub encryption_key: Option<String>,

    /// Backups taken before every migration step.
    #[config(nested)]
    pub backup: BackupOptions,

    /// Log output.
    #[config(nested)]
    pub log: LogOptions,
}

#[derive(Config, Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct BackupOptions {
    /// Copy attempts, the first included, before a backup counts as failed.
    #[config(default = 10)]
    pub attempts: u32,

    /// Pause between copy attempts, in milliseconds.
    #[config(default = 1000)]
    pub retry_delay_ms: u64,
}

#[derive(Config, Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct LogOptions {
    /// tracing filter directive, e.g. "info" or "confmigrate=debug".
    /// RUST_LOG takes precedence when set.
    #[config(default = "info")]
    pub filter: String,

    /// Emit JSON lines instead of human-readable text.
    #[config(default = false)]
    pub json: bool,
}

impl MigratorOptions {
    pub fn backup_strategy(&self) -> VersionedFileBackup {
        VersionedFileBackup::new(
            self.backup.attempts,
            Duration::from_millis(self.backup.retry_delay_ms),
        )
    }

    pub fn secret_codec(&self) -> Result<SecretCodec, MigrateError> {
        match (self.encryption_version, self.encryption_key.as_deref()) {
            (PLAIN_TEXT, _) => Ok(SecretCodec::plain()),
            (XOR_BASE64, Some(key)) if !key.is_empty() => Ok(SecretCodec::new(XOR_BASE64, key)),
            (XOR_BASE64, _) => Err(MigrateError::InvalidValue {
                key: "encryption_key".into(),
                reason: "required when encryption_version is 1".into(),
            }),
            (other, _) => Err(MigrateError::InvalidValue {
                key: "encryption_version".into(),
                reason: format!("unsupported version {other}, expected 0 or 1"),
            }),
        }
    }
}

/// Everything [`resolve`] needs, already read from disk and the environment.
#[derive(Debug, Default)]
pub struct OptionSources {
    /// Options file path and contents, if one was found.
    pub file: Option<(PathBuf, String)>,
    pub env_vars: Vec<(String, String)>,
    /// `None` disables the environment layer.
    pub env_prefix: Option<String>,
    /// Dotted-key overrides, applied last.
    pub overrides: Vec<(String, Value)>,
    /// Reject keys in the options file that no option declares.
    pub strict: bool,
}

/// Stack the layers and let confique fill in defaults.
pub fn resolve(sources: OptionSources) -> Result<MigratorOptions, MigrateError> {
    let mut merged = Table::new();

    if let Some((path, content)) = &sources.file {
        if sources.strict {
            let unknown = unknown_keys::<MigratorOptions>(content, path)?;
            if !unknown.is_empty() {
                return Err(MigrateError::UnknownOptions {
                    path: path.clone(),
                    keys: unknown,
                });
            }
        }
        let table: Table = toml::from_str(content).map_err(|e| MigrateError::OptionsParse {
            path: path.clone(),
            source: e,
        })?;
        merged = deep_merge(merged, table);
    }

    if let Some(prefix) = &sources.env_prefix {
        merged = deep_merge(merged, env_table(prefix, sources.env_vars));
    }

    if !sources.overrides.is_empty() {
        merged = deep_merge(merged, overrides_table(&sources.overrides)?);
    }

    let layer: <MigratorOptions as Config>::Layer =
        Value::Table(merged)
            .try_into()
            .map_err(|e: toml::de::Error| MigrateError::InvalidValue {
                key: "<options>".into(),
                reason: e.to_string(),
            })?;

    Ok(MigratorOptions::builder().preloaded(layer).load()?)
}

/// `<platform config dir>/confmigrate.toml`, if the platform has one.
pub fn default_options_path() -> Option<PathBuf> {
    let dirs = directories::ProjectDirs::from("", "", APP_NAME)?;
    Some(dirs.config_dir().join(format!("{APP_NAME}.toml")))
}

/// Read the options file. An explicit path must exist; the platform
/// default is skipped when missing.
pub fn read_options_file(explicit: Option<&Path>) -> Result<Option<(PathBuf, String)>, MigrateError> {
    let (path, required) = match explicit {
        Some(p) => (p.to_path_buf(), true),
        None => match default_options_path() {
            Some(p) => (p, false),
            None => return Ok(None),
        },
    };

    match std::fs::read_to_string(&path) {
        Ok(content) => {
            tracing::debug!("Loaded options from {}", path.display());
            Ok(Some((path, content)))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound && !required => Ok(None),
        Err(e) => Err(MigrateError::IoError { path, source: e }),
    }
}

/// Commented TOML listing every option with its default.
pub fn template() -> String {
    confique::toml::template::<MigratorOptions>(confique::toml::FormatOptions::default())
}
