//! On-disk settings document: `[Section]` tables of string values.
//!
//! Uses `toml_edit` so that comments, ordering, and keys this crate knows
//! nothing about survive a load/save cycle. Values are always written as
//! TOML strings; integers, floats, and booleans found in hand-edited files
//! are read back as their textual form (booleans as `1`/`0`, matching how
//! flags are stored).

use std::path::Path;

use toml_edit::{DocumentMut, Item, Table};

use crate::error::MigrateError;

/// An ordered mapping of section name to key/value strings.
#[derive(Debug, Clone, Default)]
pub struct ConfigDocument {
    doc: DocumentMut,
}

impl ConfigDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse document text. `path` is only used for error reporting.
    pub fn parse(content: &str, path: &Path) -> Result<Self, MigrateError> {
        let doc = content
            .parse::<DocumentMut>()
            .map_err(|e| MigrateError::ParseError {
                path: path.to_path_buf(),
                source: e,
            })?;
        Ok(Self { doc })
    }

    /// Read a document from disk. A missing file yields an empty document.
    pub fn load(path: &Path) -> Result<Self, MigrateError> {
        match std::fs::read_to_string(path) {
            Ok(content) => Self::parse(&content, path),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::new()),
            Err(e) => Err(MigrateError::IoError {
                path: path.to_path_buf(),
                source: e,
            }),
        }
    }

    /// Write the document to disk, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> Result<(), MigrateError> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| MigrateError::IoError {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
        std::fs::write(path, self.doc.to_string()).map_err(|e| MigrateError::IoError {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Look up a raw value. Arrays and tables are not settings values and
    /// read as absent.
    pub fn get(&self, section: &str, key: &str) -> Option<String> {
        let value = self
            .doc
            .get(section)?
            .as_table_like()?
            .get(key)?
            .as_value()?;
        match value {
            toml_edit::Value::String(s) => Some(s.value().clone()),
            toml_edit::Value::Integer(i) => Some(i.value().to_string()),
            toml_edit::Value::Float(f) => Some(f.value().to_string()),
            toml_edit::Value::Boolean(b) => Some(if *b.value() { "1" } else { "0" }.to_string()),
            _ => None,
        }
    }

    pub fn contains(&self, section: &str, key: &str) -> bool {
        self.doc
            .get(section)
            .and_then(Item::as_table_like)
            .is_some_and(|t| t.contains_key(key))
    }

    /// Set `section.key` to a string value, creating the section if needed.
    /// The decor of an existing key is kept.
    pub fn set(&mut self, section: &str, key: &str, value: &str) {
        let table = self.section_mut(section);
        match table.get_mut(key).and_then(Item::as_value_mut) {
            Some(existing) => {
                let decor = existing.decor().clone();
                *existing = toml_edit::Value::from(value);
                *existing.decor_mut() = decor;
            }
            None => {
                table.insert(key, toml_edit::value(value));
            }
        }
    }

    /// Remove a key, returning its previous textual value.
    pub fn remove(&mut self, section: &str, key: &str) -> Option<String> {
        let previous = self.get(section, key);
        let table = self.doc.get_mut(section)?.as_table_like_mut()?;
        table.remove(key)?;
        previous
    }

    pub fn section_names(&self) -> Vec<String> {
        self.doc
            .iter()
            .filter(|(_, item)| item.is_table_like())
            .map(|(name, _)| name.to_string())
            .collect()
    }

    fn section_mut(&mut self, section: &str) -> &mut Table {
        let item = self.doc.entry(section).or_insert(Item::Table(Table::new()));
        let replacement = match item {
            Item::Table(_) => None,
            Item::Value(toml_edit::Value::InlineTable(inline)) => {
                Some(Item::Table(inline.clone().into_table()))
            }
            _ => Some(Item::Table(Table::new())),
        };
        if let Some(table) = replacement {
            *item = table;
        }
        match item {
            Item::Table(table) => table,
            _ => unreachable!("section item was just normalized to a table"),
        }
    }
}

impl std::fmt::Display for ConfigDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn doc(content: &str) -> ConfigDocument {
        ConfigDocument::parse(content, Path::new("test.toml")).unwrap()
    }

    #[test]
    fn reads_string_values() {
        let d = doc("[General]\nnaming_pattern = \"%SN - %Sx%0E\"\n");
        assert_eq!(
            d.get("General", "naming_pattern").as_deref(),
            Some("%SN - %Sx%0E")
        );
    }

    #[test]
    fn reads_scalars_as_text() {
        let d = doc("[General]\nversion = 3\nratio = 1.5\nflag = true\n");
        assert_eq!(d.get("General", "version").as_deref(), Some("3"));
        assert_eq!(d.get("General", "ratio").as_deref(), Some("1.5"));
        assert_eq!(d.get("General", "flag").as_deref(), Some("1"));
    }

    #[test]
    fn lookups_are_case_sensitive() {
        let d = doc("[General]\nkey = \"v\"\n");
        assert!(d.get("general", "key").is_none());
        assert!(d.get("General", "Key").is_none());
    }

    #[test]
    fn arrays_read_as_absent() {
        let d = doc("[General]\nlist = [1, 2]\n");
        assert!(d.get("General", "list").is_none());
        assert!(d.contains("General", "list"));
    }

    #[test]
    fn set_creates_section() {
        let mut d = ConfigDocument::new();
        d.set("Newznab", "newznab_data", "a|b|c|1");
        assert_eq!(d.get("Newznab", "newznab_data").as_deref(), Some("a|b|c|1"));
        assert!(d.to_string().contains("[Newznab]"));
    }

    #[test]
    fn set_replaces_non_table_section() {
        let mut d = doc("General = 5\n");
        d.set("General", "k", "v");
        assert_eq!(d.get("General", "k").as_deref(), Some("v"));
    }

    #[test]
    fn set_expands_inline_table() {
        let mut d = doc("General = { a = \"1\" }\n");
        d.set("General", "b", "2");
        assert_eq!(d.get("General", "a").as_deref(), Some("1"));
        assert_eq!(d.get("General", "b").as_deref(), Some("2"));
    }

    #[test]
    fn set_preserves_comments() {
        let mut d = doc("# my settings\n[General]\n# the version\nconfig_version = \"1\"\n");
        d.set("General", "config_version", "2");
        let out = d.to_string();
        assert!(out.contains("# my settings"));
        assert!(out.contains("# the version"));
        assert!(out.contains("config_version = \"2\""));
    }

    #[test]
    fn remove_returns_previous() {
        let mut d = doc("[omgwtfnzbs]\nomgwtfnzbs_uid = \"joe\"\n");
        assert_eq!(d.remove("omgwtfnzbs", "omgwtfnzbs_uid").as_deref(), Some("joe"));
        assert!(!d.contains("omgwtfnzbs", "omgwtfnzbs_uid"));
        assert!(d.remove("omgwtfnzbs", "omgwtfnzbs_uid").is_none());
    }

    #[test]
    fn section_names_in_order() {
        let d = doc("top = 1\n[General]\n[Newznab]\n");
        assert_eq!(d.section_names(), vec!["General", "Newznab"]);
    }

    #[test]
    fn load_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let d = ConfigDocument::load(&dir.path().join("nope.toml")).unwrap();
        assert!(d.section_names().is_empty());
    }

    #[test]
    fn load_reports_parse_errors_with_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.toml");
        fs::write(&path, "[General\n").unwrap();
        let err = ConfigDocument::load(&path).unwrap_err();
        assert!(matches!(err, MigrateError::ParseError { .. }));
        assert!(err.to_string().contains("bad.toml"));
    }

    #[test]
    fn save_creates_parent_dirs() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sub").join("config.toml");
        let mut d = ConfigDocument::new();
        d.set("General", "config_version", "4");
        d.save(&path).unwrap();
        let reloaded = ConfigDocument::load(&path).unwrap();
        assert_eq!(reloaded.get("General", "config_version").as_deref(), Some("4"));
    }
}
