use std::path::PathBuf;

use crate::error::MigrateError;
use crate::migrate::ConfigMigrator;
use crate::ops::{self, MigrateResult};
use crate::options::{self, ENV_PREFIX, MigratorOptions, OptionSources};
use crate::settings::{Settings, read_version};
use crate::shows::SqliteShowStore;
use crate::steps::CONFIG_VERSION;
use crate::store::SettingsStore;
use crate::types::MigrateAction;

/// Where the options file comes from.
#[derive(Debug, Clone, PartialEq)]
enum OptionsFile {
    /// `<platform config dir>/confmigrate.toml`, skipped when missing.
    Platform,
    /// A path that must exist.
    Explicit(PathBuf),
    None,
}

/// Runs [`MigrateAction`]s against resolved [`MigratorOptions`].
#[derive(Debug, Clone)]
pub struct Migrator {
    options: MigratorOptions,
}

impl Migrator {
    pub fn builder() -> MigratorBuilder {
        MigratorBuilder::new()
    }

    pub fn new(options: MigratorOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &MigratorOptions {
        &self.options
    }

    fn open_store(&self) -> Result<SettingsStore, MigrateError> {
        SettingsStore::open(&self.options.config_file, self.options.secret_codec()?)
    }

    /// Handle a `MigrateAction` (migrate / status / pattern / options).
    pub fn handle(&self, action: &MigrateAction) -> Result<MigrateResult, MigrateError> {
        match action {
            MigrateAction::Migrate => {
                let migrator = ConfigMigrator::new(self.options.backup_strategy());
                let mut store = self.open_store()?;
                let mut settings = Settings::load(&mut store, CONFIG_VERSION);

                let pending = migrator.pending(read_version(&mut store, CONFIG_VERSION)?)?;
                // Only touch the show database when a step may need it.
                let shows = if pending.is_empty() {
                    SqliteShowStore::open_in_memory()?
                } else {
                    SqliteShowStore::open(&self.options.show_db)?
                };

                let report = migrator.migrate(&mut store, &mut settings, &shows)?;
                Ok(MigrateResult::Migrated(report))
            }
            MigrateAction::Status => {
                let migrator = ConfigMigrator::new(self.options.backup_strategy());
                let mut store = self.open_store()?;
                ops::status(&mut store, &migrator)
            }
            MigrateAction::Pattern { air_by_date } => {
                let mut store = self.open_store()?;
                Ok(ops::legacy_pattern(&mut store, *air_by_date))
            }
            MigrateAction::Options { output } => {
                let template = options::template();
                match output {
                    Some(path) => {
                        if let Some(parent) = path.parent()
                            && !parent.as_os_str().is_empty()
                        {
                            std::fs::create_dir_all(parent).map_err(|e| MigrateError::IoError {
                                path: parent.to_path_buf(),
                                source: e,
                            })?;
                        }
                        std::fs::write(path, &template).map_err(|e| MigrateError::IoError {
                            path: path.clone(),
                            source: e,
                        })?;
                        Ok(MigrateResult::TemplateWritten { path: path.clone() })
                    }
                    None => Ok(MigrateResult::Template(template)),
                }
            }
        }
    }
}

/// Builder for resolving migrator options from their layers.
pub struct MigratorBuilder {
    options_file: OptionsFile,
    env_prefix: Option<String>,
    env_vars: Option<Vec<(String, String)>>,
    strict: bool,
    overrides: Vec<(String, toml::Value)>,
}

impl MigratorBuilder {
    fn new() -> Self {
        Self {
            options_file: OptionsFile::Platform,
            env_prefix: Some(ENV_PREFIX.to_string()),
            env_vars: None,
            strict: true,
            overrides: Vec::new(),
        }
    }

    /// Read options from `path` instead of the platform config directory.
    pub fn options_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.options_file = OptionsFile::Explicit(path.into());
        self
    }

    /// Skip the options file layer.
    pub fn no_options_file(mut self) -> Self {
        self.options_file = OptionsFile::None;
        self
    }

    /// Override the environment variable prefix (default: `CONFMIGRATE`).
    pub fn env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_string());
        self
    }

    /// Disable environment variable loading entirely.
    pub fn no_env(mut self) -> Self {
        self.env_prefix = None;
        self
    }

    /// Use these variables instead of the process environment.
    pub fn env_vars(mut self, vars: Vec<(String, String)>) -> Self {
        self.env_vars = Some(vars);
        self
    }

    /// In strict mode (the default) unknown keys in the options file are errors.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Add an override by dotted key. `None` values are ignored.
    pub fn cli_override<V: Into<toml::Value>>(mut self, key: &str, value: Option<V>) -> Self {
        if let Some(v) = value {
            self.overrides.push((key.to_string(), v.into()));
        }
        self
    }

    /// Resolve every layer into options.
    pub fn load_options(self) -> Result<MigratorOptions, MigrateError> {
        let file = match &self.options_file {
            OptionsFile::Platform => options::read_options_file(None)?,
            OptionsFile::Explicit(path) => options::read_options_file(Some(path))?,
            OptionsFile::None => None,
        };
        let env_vars = match (&self.env_prefix, self.env_vars) {
            (None, _) => Vec::new(),
            (Some(_), Some(vars)) => vars,
            (Some(_), None) => std::env::vars().collect(),
        };

        options::resolve(OptionSources {
            file,
            env_vars,
            env_prefix: self.env_prefix,
            overrides: self.overrides,
            strict: self.strict,
        })
    }

    pub fn build(self) -> Result<Migrator, MigrateError> {
        Ok(Migrator::new(self.load_options()?))
    }
}
