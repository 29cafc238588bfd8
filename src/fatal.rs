//! Process termination for errors the program cannot continue past.

use crate::error::MigrateError;

/// Exit code used when a migration cannot proceed.
pub const EXIT_FATAL: i32 = 1;

/// Log `err` and terminate the process.
pub fn halt(err: &MigrateError) -> ! {
    tracing::error!("{err}");
    if err.is_fatal() {
        tracing::error!("Refusing to start with an unusable config, exiting");
    }
    std::process::exit(EXIT_FATAL)
}
