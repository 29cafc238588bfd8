//! Building blocks for the option layers: env vars, dotted overrides, and
//! the deep merge that stacks them.
//!
//! Each source is turned into a sparse `toml::Table`. Tables are merged in
//! precedence order and the result is handed to confique, which fills in
//! the compiled defaults.

use std::path::Path;

use confique::Config;
use serde::Deserialize;
use toml::{Table, Value};

use crate::error::MigrateError;

/// Collect `{prefix}__SECTION__KEY=value` variables into a table.
///
/// `__` separates nesting levels, a single `_` stays part of the name, and
/// names are lowercased. Values become bool, integer, float (only with a
/// `.`), or string, in that order of preference.
pub fn env_table(prefix: &str, vars: impl IntoIterator<Item = (String, String)>) -> Table {
    let needle = format!("{prefix}__");
    let mut table = Table::new();

    for (name, raw) in vars {
        let Some(rest) = name.strip_prefix(&needle).filter(|r| !r.is_empty()) else {
            continue;
        };
        let path: Vec<String> = rest.split("__").map(str::to_lowercase).collect();
        if let Err(key) = insert_path(&mut table, &path, env_value(&raw)) {
            tracing::warn!("Ignoring {name}: {key} is not a section");
        }
    }

    table
}

fn env_value(raw: &str) -> Value {
    if raw.eq_ignore_ascii_case("true") {
        Value::Boolean(true)
    } else if raw.eq_ignore_ascii_case("false") {
        Value::Boolean(false)
    } else if let Ok(i) = raw.parse::<i64>() {
        Value::Integer(i)
    } else if let Some(f) = raw.contains('.').then(|| raw.parse::<f64>().ok()).flatten() {
        Value::Float(f)
    } else {
        Value::String(raw.to_string())
    }
}

/// Expand `("backup.attempts", 3)` style pairs into nested tables. Later
/// entries win.
pub fn overrides_table(entries: &[(String, Value)]) -> Result<Table, MigrateError> {
    let mut table = Table::new();
    for (dotted, value) in entries {
        let path: Vec<String> = dotted.split('.').map(str::to_string).collect();
        insert_path(&mut table, &path, value.clone()).map_err(|key| {
            MigrateError::InvalidValue {
                key: dotted.clone(),
                reason: format!("'{key}' is a value, not a section"),
            }
        })?;
    }
    Ok(table)
}

/// Insert `value` at `path`, creating intermediate tables. Fails with the
/// offending segment when a non-table sits in the way.
fn insert_path(table: &mut Table, path: &[String], value: Value) -> Result<(), String> {
    let Some((leaf, parents)) = path.split_last() else {
        return Ok(());
    };
    let mut current = table;
    for segment in parents {
        current = current
            .entry(segment.as_str())
            .or_insert_with(|| Value::Table(Table::new()))
            .as_table_mut()
            .ok_or_else(|| segment.clone())?;
    }
    current.insert(leaf.clone(), value);
    Ok(())
}

/// Stack `overlay` on `base`. Tables on both sides merge key by key, any
/// other overlay value replaces what was there.
pub fn deep_merge(mut base: Table, overlay: Table) -> Table {
    for (key, top) in overlay {
        let merged = match (base.remove(&key), top) {
            (Some(Value::Table(under)), Value::Table(over)) => Value::Table(deep_merge(under, over)),
            (_, top) => top,
        };
        base.insert(key, merged);
    }
    base
}

/// Keys in `content` that `C` does not declare, as dotted paths.
pub fn unknown_keys<C: Config>(content: &str, path: &Path) -> Result<Vec<String>, MigrateError>
where
    C::Layer: for<'de> Deserialize<'de>,
{
    let mut unknown = Vec::new();
    let deserializer = toml::Deserializer::new(content);
    let _: C::Layer = serde_ignored::deserialize(deserializer, |ignored| {
        unknown.push(ignored.to_string());
    })
    .map_err(|e| MigrateError::OptionsParse {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(unknown)
}
