use std::path::PathBuf;

/// A migrator operation, independent of any CLI framework.
/// The CLI layer converts parsed clap args into this.
#[derive(Debug, Clone, PartialEq)]
pub enum MigrateAction {
    /// Bring the settings file up to the current version.
    Migrate,
    /// Report the stored version and the steps that would run.
    Status,
    /// Show the naming pattern the legacy toggles translate to.
    Pattern { air_by_date: bool },
    /// Generate a commented options file.
    Options { output: Option<PathBuf> },
}
