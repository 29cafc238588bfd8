//! Read-only operations and the result type every action returns.
//!
//! Provides the logic behind `status` and `pattern`, plus the
//! `MigrateResult` enum that callers display or serialize.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

use crate::backup::BackupOutcome;
use crate::error::MigrateError;
use crate::migrate::{ConfigMigrator, MigrationReport};
use crate::naming::requires_season_folders;
use crate::settings::read_version;
use crate::steps::read_legacy_naming;
use crate::store::SettingsStore;

/// A step that has not run yet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PendingStep {
    pub version: u32,
    pub name: &'static str,
}

/// Result of a migrator operation. Returned to the caller for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "result", content = "data", rename_all = "snake_case")]
pub enum MigrateResult {
    /// A migration pass finished.
    Migrated(MigrationReport),
    /// Stored version and outstanding steps.
    Status {
        path: PathBuf,
        current: u32,
        expected: u32,
        pending: Vec<PendingStep>,
    },
    /// Pattern translated from the legacy naming toggles.
    Pattern { pattern: String, force_folders: bool },
    /// A generated options template.
    Template(String),
    /// Confirmation that a template was written to a file.
    TemplateWritten { path: PathBuf },
}

impl fmt::Display for MigrateResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MigrateResult::Migrated(report) if report.is_noop() => {
                write!(f, "Config is at version {}, nothing to migrate", report.to)
            }
            MigrateResult::Migrated(report) => {
                write!(f, "Migrated config from version {} to {}", report.from, report.to)?;
                for step in &report.applied {
                    write!(f, "\n  v{}: {} (backup: ", step.version, step.name)?;
                    match &step.backup {
                        BackupOutcome::Created(path) => write!(f, "{})", path.display())?,
                        BackupOutcome::AlreadyPresent(path) => {
                            write!(f, "{}, kept existing)", path.display())?
                        }
                        BackupOutcome::NoSource => write!(f, "none, no file on disk)")?,
                    }
                }
                Ok(())
            }
            MigrateResult::Status {
                path,
                current,
                expected,
                pending,
            } => {
                write!(f, "{}: version {current}, supported {expected}", path.display())?;
                if current > expected {
                    write!(f, "\nConfig is newer than this build supports")
                } else if pending.is_empty() {
                    write!(f, "\nUp to date")
                } else {
                    for step in pending {
                        write!(f, "\n  pending v{}: {}", step.version, step.name)?;
                    }
                    Ok(())
                }
            }
            MigrateResult::Pattern {
                pattern,
                force_folders,
            } => {
                write!(f, "{pattern}")?;
                if *force_folders {
                    write!(f, "\n(season folders required)")?;
                }
                Ok(())
            }
            MigrateResult::Template(t) => write!(f, "{t}"),
            MigrateResult::TemplateWritten { path } => {
                write!(f, "Options template written to {}", path.display())
            }
        }
    }
}

/// Current version of `store` and the steps a migration would run.
pub fn status(
    store: &mut SettingsStore,
    migrator: &ConfigMigrator<'_>,
) -> Result<MigrateResult, MigrateError> {
    let expected = migrator.expected_version();
    let current = read_version(store, expected)?;
    let pending = if current > expected {
        Vec::new()
    } else {
        migrator
            .pending(current)?
            .into_iter()
            .map(|step| PendingStep {
                version: step.version,
                name: step.display_name(),
            })
            .collect()
    };

    Ok(MigrateResult::Status {
        path: store.path().to_path_buf(),
        current,
        expected,
        pending,
    })
}

/// Translate the legacy toggles in `store` without migrating anything.
pub fn legacy_pattern(store: &mut SettingsStore, air_by_date: bool) -> MigrateResult {
    let pattern = read_legacy_naming(store).to_pattern(air_by_date);
    MigrateResult::Pattern {
        force_folders: requires_season_folders(&pattern),
        pattern,
    }
}
