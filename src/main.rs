use clap::Parser;

use confmigrate::cli::Cli;
use confmigrate::{fatal, logging};

fn main() {
    let cli = Cli::parse();
    let json = cli.json;

    // Logging is configured by the options, so option errors go straight to stderr.
    let migrator = match cli.builder().build() {
        Ok(m) => m,
        Err(e) => {
            eprintln!("confmigrate: {e}");
            std::process::exit(fatal::EXIT_FATAL);
        }
    };
    if let Err(e) = logging::init_logging(&migrator.options().log) {
        eprintln!("confmigrate: {e}");
        std::process::exit(fatal::EXIT_FATAL);
    }

    let action = cli.into_action();
    match migrator.handle(&action) {
        Ok(result) if json => match serde_json::to_string_pretty(&result) {
            Ok(out) => println!("{out}"),
            Err(e) => {
                tracing::error!("Failed to serialize result: {e}");
                std::process::exit(fatal::EXIT_FATAL);
            }
        },
        Ok(result) => println!("{result}"),
        Err(e) => fatal::halt(&e),
    }
}
