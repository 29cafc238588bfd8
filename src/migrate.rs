//! The version walk: back up, transform, advance, persist, repeat.
//!
//! Versions form a straight line `current -> current + 1 -> ... -> expected`.
//! Every transition follows the same protocol:
//!
//! 1. Copy the settings file as it is on disk, tagged with the current
//!    version. If that fails nothing is changed and the walk stops.
//! 2. Run the step producing `current + 1`.
//! 3. Bump the version, write all [`Settings`] into the store, flush the
//!    store to disk.
//!
//! A stored version newer than the engine supports is refused before any
//! step runs. The whole walk holds a [`MigrationLock`].

use serde::Serialize;

use crate::backup::{Backup, BackupOutcome};
use crate::error::MigrateError;
use crate::lock::MigrationLock;
use crate::settings::{Settings, read_version};
use crate::shows::ShowStore;
use crate::steps::{CONFIG_VERSION, MigrationContext, MigrationStep, STEPS};
use crate::store::SettingsStore;

/// A step that ran during a migration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppliedStep {
    pub version: u32,
    pub name: &'static str,
    pub backup: BackupOutcome,
}

/// What a migration pass did.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MigrationReport {
    pub from: u32,
    pub to: u32,
    pub applied: Vec<AppliedStep>,
}

impl MigrationReport {
    pub fn is_noop(&self) -> bool {
        self.applied.is_empty()
    }
}

/// Walks a settings store from its stored version up to `expected`.
pub struct ConfigMigrator<'s> {
    steps: &'s [MigrationStep],
    expected: u32,
    backup: Box<dyn Backup>,
}

impl ConfigMigrator<'static> {
    /// The built-in step table at [`CONFIG_VERSION`].
    pub fn new(backup: impl Backup + 'static) -> Self {
        Self {
            steps: &STEPS,
            expected: CONFIG_VERSION,
            backup: Box::new(backup),
        }
    }
}

impl<'s> ConfigMigrator<'s> {
    /// Use a custom step table. Every version from 1 to `expected` must
    /// have a step, or [`MigrateError::MissingStep`] names the first gap.
    pub fn with_steps(
        steps: &'s [MigrationStep],
        expected: u32,
        backup: impl Backup + 'static,
    ) -> Result<Self, MigrateError> {
        let migrator = Self {
            steps,
            expected,
            backup: Box::new(backup),
        };
        for version in 1..=expected {
            migrator.step(version)?;
        }
        Ok(migrator)
    }

    pub fn expected_version(&self) -> u32 {
        self.expected
    }

    /// Steps that would run for a document at `current`.
    pub fn pending(&self, current: u32) -> Result<Vec<&'s MigrationStep>, MigrateError> {
        if current > self.expected {
            return Err(MigrateError::UnsupportedVersion {
                found: u64::from(current),
                supported: self.expected,
            });
        }
        (current + 1..=self.expected)
            .map(|version| self.step(version))
            .collect()
    }

    fn step(&self, version: u32) -> Result<&'s MigrationStep, MigrateError> {
        self.steps
            .iter()
            .find(|s| s.version == version)
            .ok_or(MigrateError::MissingStep { version })
    }

    /// Bring `store` and `settings` up to the expected version.
    pub fn migrate(
        &self,
        store: &mut SettingsStore,
        settings: &mut Settings,
        shows: &dyn ShowStore,
    ) -> Result<MigrationReport, MigrateError> {
        let _lock = MigrationLock::acquire(store.path())?;

        let from = read_version(store, self.expected)?;
        if from > self.expected {
            return Err(MigrateError::UnsupportedVersion {
                found: u64::from(from),
                supported: self.expected,
            });
        }

        let mut current = from;
        settings.config_version = current;
        let mut applied = Vec::new();

        while current < self.expected {
            let next = current + 1;
            let step = self.step(next)?;

            tracing::info!("Backing up config before upgrade");
            let backup = self
                .backup
                .backup(store.path(), current)
                .map_err(|e| MigrateError::BackupFailed {
                    path: store.path().to_path_buf(),
                    source: e,
                })?;
            tracing::info!("Proceeding with upgrade");

            tracing::info!(
                "Migrating config up to version {next}: {}",
                step.display_name()
            );
            let mut ctx = MigrationContext {
                store: &mut *store,
                settings: &mut *settings,
                shows,
            };
            (step.apply)(&mut ctx)?;

            current = next;
            settings.config_version = current;
            settings.save(store);
            tracing::info!("Saving config file to disk");
            store.save()?;

            applied.push(AppliedStep {
                version: next,
                name: step.display_name(),
                backup,
            });
        }

        if applied.is_empty() {
            tracing::debug!("Config already at version {current}, nothing to migrate");
        }

        Ok(MigrationReport {
            from,
            to: current,
            applied,
        })
    }
}
