//! Clap adapter for the migrator.
//!
//! Compiled only with the `clap` Cargo feature (on by default). [`Cli`]
//! parses the command line; [`Cli::into_action`] converts it into a
//! framework-agnostic [`MigrateAction`](crate::MigrateAction), and
//! [`Cli::builder`] carries the global flags into a
//! [`MigratorBuilder`](crate::MigratorBuilder) as overrides.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::builder::{Migrator, MigratorBuilder};
use crate::types::MigrateAction;

/// Upgrade a settings file to the current config version, backing it up
/// before every step.
#[derive(Debug, Parser)]
#[command(name = "confmigrate", version)]
pub struct Cli {
    /// Options file (default: <platform config dir>/confmigrate.toml).
    #[arg(long, global = true, value_name = "FILE")]
    pub options: Option<PathBuf>,

    /// Settings file to migrate.
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// SQLite database with the show table.
    #[arg(long, global = true, value_name = "FILE")]
    pub show_db: Option<PathBuf>,

    /// Print results as JSON.
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available subcommands. Bare `confmigrate` runs `migrate`.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Back up and upgrade the settings file.
    Migrate,
    /// Show the stored version and pending steps.
    Status,
    /// Print the naming pattern the legacy settings translate to.
    Pattern {
        /// Translate for air-by-date shows.
        #[arg(long)]
        air_by_date: bool,
    },
    /// Generate a commented options file.
    Options {
        /// Write to a file instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

impl Cli {
    /// Convert clap-parsed args into a framework-agnostic `MigrateAction`.
    pub fn into_action(self) -> MigrateAction {
        match self.command {
            None | Some(Command::Migrate) => MigrateAction::Migrate,
            Some(Command::Status) => MigrateAction::Status,
            Some(Command::Pattern { air_by_date }) => MigrateAction::Pattern { air_by_date },
            Some(Command::Options { output }) => MigrateAction::Options { output },
        }
    }

    /// A builder with the global flags applied as overrides.
    pub fn builder(&self) -> MigratorBuilder {
        let builder = match &self.options {
            Some(path) => Migrator::builder().options_file(path),
            None => Migrator::builder(),
        };
        builder
            .cli_override("config_file", path_value(&self.config))
            .cli_override("show_db", path_value(&self.show_db))
    }
}

fn path_value(path: &Option<PathBuf>) -> Option<String> {
    path.as_ref().map(|p| p.display().to_string())
}
