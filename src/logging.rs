//! tracing subscriber setup for the command-line front end.
//!
//! Logs go to stderr so stdout only carries command results.

use tracing_subscriber::{EnvFilter, Layer, Registry, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::error::MigrateError;
use crate::options::LogOptions;

/// Install the global subscriber. `RUST_LOG` wins over `log.filter`.
pub fn init_logging(options: &LogOptions) -> Result<(), MigrateError> {
    let filter = build_filter(options)?;
    let output = if options.json {
        fmt::layer().json().with_writer(std::io::stderr).boxed()
    } else {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .boxed()
    };

    Registry::default()
        .with(filter)
        .with(output)
        .try_init()
        .map_err(|e| MigrateError::InvalidValue {
            key: "log".into(),
            reason: e.to_string(),
        })?;

    tracing::debug!(filter = %options.filter, json = options.json, "Logging initialised");
    Ok(())
}

fn build_filter(options: &LogOptions) -> Result<EnvFilter, MigrateError> {
    if let Ok(from_env) = EnvFilter::try_from_default_env() {
        return Ok(from_env);
    }
    EnvFilter::try_new(&options.filter).map_err(|e| MigrateError::InvalidValue {
        key: "log.filter".into(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts(filter: &str) -> LogOptions {
        LogOptions {
            filter: filter.into(),
            json: false,
        }
    }

    #[test]
    fn directive_filters_parse() {
        assert!(build_filter(&opts("info")).is_ok());
        assert!(build_filter(&opts("confmigrate=debug,rusqlite=warn")).is_ok());
    }

    #[test]
    fn bad_filter_is_invalid_value() {
        if std::env::var_os("RUST_LOG").is_some() {
            return;
        }
        let err = build_filter(&opts("confmigrate=loud")).unwrap_err();
        assert!(err.to_string().contains("log.filter"));
    }
}
