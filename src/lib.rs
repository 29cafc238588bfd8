//! Versioned, backup-first migration of on-disk settings files.
//!
//! A settings file carries a schema version in `General.config_version`.
//! Each release that changes the meaning of a setting adds one migration
//! step; on startup the file is walked forward one version at a time until
//! it matches [`CONFIG_VERSION`]. Before every step the file is copied to
//! `<file>.v<version>`, so each intermediate state can be restored by hand.
//!
//! ```ignore
//! let mut store = SettingsStore::open("config.toml", SecretCodec::plain())?;
//! let mut settings = Settings::load(&mut store, CONFIG_VERSION);
//! let shows = SqliteShowStore::open(Path::new("sickbeard.db"))?;
//!
//! let report = ConfigMigrator::new(VersionedFileBackup::default())
//!     .migrate(&mut store, &mut settings, &shows)?;
//! ```
//!
//! # Version walk
//!
//! ```text
//! stored version      read from the file, defaults to CONFIG_VERSION
//!        │
//!        ├─ newer than CONFIG_VERSION ──► UnsupportedVersion, nothing changed
//!        │
//!        ▼
//! for v in stored..CONFIG_VERSION:
//!     backup  <file>.v{v}          (failure aborts before the step runs)
//!     apply   step v + 1
//!     save    version = v + 1, all settings, flush to disk
//! ```
//!
//! The step table lives in [`steps::STEPS`] and is checked at compile time
//! to hold exactly one step per version, in order. A file already at the
//! current version is left byte for byte untouched.
//!
//! # Tolerant settings
//!
//! [`SettingsStore`] never fails a read. A missing or malformed value yields
//! the caller's default, which is written back into the document, and the
//! caller can tell the two apart through [`Lookup`]. Comments and unrelated
//! keys survive a load/save cycle because the file is edited with
//! `toml_edit`.
//!
//! Keys whose name contains `password` are encoded at rest according to the
//! configured [`SecretCodec`] version.
//!
//! # Options
//!
//! The migrator's own options ([`MigratorOptions`]) are layered: compiled
//! defaults, then an options file, then `CONFMIGRATE__*` environment
//! variables, then overrides. See the [`options`] module.
//!
//! # Front end
//!
//! [`MigrateAction`] describes what to do without reference to any CLI
//! framework; [`Migrator::handle`] runs it and returns a [`MigrateResult`]
//! that implements `Display` and `Serialize`. The `cli` module (behind the
//! `clap` feature, on by default) parses command lines into actions.
//!
//! # Errors
//!
//! All fallible operations return [`MigrateError`]. Errors for which
//! [`MigrateError::is_fatal`] is true mean the settings cannot be used by
//! this build; the binary passes them to [`fatal::halt`].

pub mod error;
pub mod types;

pub mod backup;
mod builder;
#[cfg(feature = "clap")]
pub mod cli;
pub mod document;
pub mod fatal;
mod layers;
pub mod lock;
pub mod logging;
pub mod migrate;
pub mod naming;
mod ops;
pub mod options;
pub mod secret;
pub mod settings;
pub mod shows;
pub mod steps;
pub mod store;

#[cfg(test)]
mod fixtures;

pub use backup::{Backup, BackupOutcome, VersionedFileBackup};
pub use builder::{Migrator, MigratorBuilder};
#[cfg(feature = "clap")]
pub use cli::Cli;
pub use document::ConfigDocument;
pub use error::MigrateError;
pub use migrate::{AppliedStep, ConfigMigrator, MigrationReport};
pub use ops::{MigrateResult, PendingStep};
pub use options::MigratorOptions;
pub use secret::SecretCodec;
pub use settings::Settings;
pub use shows::{ShowRecord, ShowStore, SqliteShowStore};
pub use steps::{CONFIG_VERSION, MigrationContext, MigrationStep};
pub use store::{Lookup, SettingsStore};
pub use types::MigrateAction;
