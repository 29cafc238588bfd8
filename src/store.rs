//! Typed, self-repairing access to a [`ConfigDocument`] on disk.
//!
//! Every accessor takes a default. When the key is absent or its value does
//! not parse, the default is written back into the document and the caller
//! receives [`Lookup::Defaulted`]; nothing is raised. Changes stay in memory
//! until [`SettingsStore::save`].

use std::fmt;
use std::path::{Path, PathBuf};

use crate::document::ConfigDocument;
use crate::error::MigrateError;
use crate::secret::SecretCodec;

/// Outcome of a tolerant settings read.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup<T> {
    /// The stored value parsed successfully.
    Stored(T),
    /// The key was absent or malformed; the default was used and written back.
    Defaulted(T),
}

impl<T> Lookup<T> {
    pub fn value(self) -> T {
        match self {
            Lookup::Stored(v) | Lookup::Defaulted(v) => v,
        }
    }

    pub fn get(&self) -> &T {
        match self {
            Lookup::Stored(v) | Lookup::Defaulted(v) => v,
        }
    }

    pub fn is_defaulted(&self) -> bool {
        matches!(self, Lookup::Defaulted(_))
    }
}

/// Settings file plus the codec used for its password fields.
#[derive(Debug)]
pub struct SettingsStore {
    path: PathBuf,
    document: ConfigDocument,
    secrets: SecretCodec,
}

impl SettingsStore {
    /// Load the settings file at `path`. A missing file starts empty.
    pub fn open(path: impl Into<PathBuf>, secrets: SecretCodec) -> Result<Self, MigrateError> {
        let path = path.into();
        let document = ConfigDocument::load(&path)?;
        Ok(Self::from_document(path, document, secrets))
    }

    pub fn from_document(
        path: impl Into<PathBuf>,
        document: ConfigDocument,
        secrets: SecretCodec,
    ) -> Self {
        Self {
            path: path.into(),
            document,
            secrets,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn document(&self) -> &ConfigDocument {
        &self.document
    }

    pub fn get_int(&mut self, section: &str, key: &str, default: i64) -> Lookup<i64> {
        let parsed = self
            .document
            .get(section, key)
            .and_then(|raw| raw.trim().parse::<i64>().ok());
        let lookup = match parsed {
            Some(v) => Lookup::Stored(v),
            None => {
                self.set_int(section, key, default);
                Lookup::Defaulted(default)
            }
        };
        tracing::debug!("{key} -> {}", lookup.get());
        lookup
    }

    pub fn get_float(&mut self, section: &str, key: &str, default: f64) -> Lookup<f64> {
        let parsed = self
            .document
            .get(section, key)
            .and_then(|raw| raw.trim().parse::<f64>().ok());
        let lookup = match parsed {
            Some(v) => Lookup::Stored(v),
            None => {
                self.set_float(section, key, default);
                Lookup::Defaulted(default)
            }
        };
        tracing::debug!("{key} -> {}", lookup.get());
        lookup
    }

    /// Integer flag read, `0` is false and anything else true.
    pub fn get_bool(&mut self, section: &str, key: &str, default: bool) -> Lookup<bool> {
        match self.get_int(section, key, i64::from(default)) {
            Lookup::Stored(v) => Lookup::Stored(v != 0),
            Lookup::Defaulted(v) => Lookup::Defaulted(v != 0),
        }
    }

    /// Read a string. Keys containing `password` are decoded with the
    /// configured secret version. `sensitive` masks the value in the log.
    pub fn get_string(
        &mut self,
        section: &str,
        key: &str,
        default: &str,
        sensitive: bool,
    ) -> Lookup<String> {
        let version = self.secrets.version_for(key);
        let decoded = self
            .document
            .get(section, key)
            .and_then(|raw| match self.secrets.decode(&raw, version) {
                Ok(v) => Some(v),
                Err(e) => {
                    tracing::debug!("Could not decode {section}.{key} ({e:?}), using default");
                    None
                }
            });
        let lookup = match decoded {
            Some(v) => Lookup::Stored(v),
            None => {
                self.set_string(section, key, default);
                Lookup::Defaulted(default.to_string())
            }
        };
        if sensitive {
            tracing::debug!("{key} -> ******");
        } else {
            tracing::debug!("{key} -> {}", lookup.get());
        }
        lookup
    }

    pub fn set_int(&mut self, section: &str, key: &str, value: i64) {
        self.document.set(section, key, &value.to_string());
    }

    pub fn set_float(&mut self, section: &str, key: &str, value: f64) {
        self.document.set(section, key, &value.to_string());
    }

    pub fn set_bool(&mut self, section: &str, key: &str, value: bool) {
        self.set_int(section, key, i64::from(value));
    }

    pub fn set_string(&mut self, section: &str, key: &str, value: &str) {
        let encoded = self.secrets.encode(value, self.secrets.version_for(key));
        self.document.set(section, key, &encoded);
    }

    pub fn remove(&mut self, section: &str, key: &str) -> Option<String> {
        self.document.remove(section, key)
    }

    /// Persist the whole document to [`path`](Self::path).
    pub fn save(&self) -> Result<(), MigrateError> {
        tracing::debug!("Writing settings to {}", self.path.display());
        self.document.save(&self.path)
    }
}

impl fmt::Display for SettingsStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.document)
    }
}
