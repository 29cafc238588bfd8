//! The in-process settings a migration reads and rewrites.
//!
//! [`Settings`] is built from a [`SettingsStore`] at startup, handed to the
//! migration engine by `&mut`, and written back with [`Settings::save`].

use serde::Serialize;

use crate::error::MigrateError;
use crate::naming::ABD_PRESETS;
use crate::store::SettingsStore;

pub const GENERAL: &str = "General";
pub const OMGWTFNZBS: &str = "omgwtfnzbs";
pub const NEWZNAB: &str = "Newznab";

pub const DEFAULT_NAMING_PATTERN: &str = "Season %0S/%SN - S%0SE%0E - %EN";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NamingSettings {
    pub pattern: String,
    pub custom_abd: bool,
    pub abd_pattern: String,
    pub multi_ep: i64,
    pub force_folders: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct OmgwtfnzbsSettings {
    pub username: String,
    pub api_key: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Settings {
    pub config_version: u32,
    pub naming: NamingSettings,
    pub omgwtfnzbs: OmgwtfnzbsSettings,
    pub newznab_data: String,
}

impl Settings {
    /// Defaults for a fresh installation at `config_version`.
    pub fn defaults(config_version: u32) -> Self {
        Self {
            config_version,
            naming: NamingSettings {
                pattern: DEFAULT_NAMING_PATTERN.to_string(),
                custom_abd: false,
                abd_pattern: ABD_PRESETS[0].to_string(),
                multi_ep: 1,
                force_folders: false,
            },
            omgwtfnzbs: OmgwtfnzbsSettings::default(),
            newznab_data: String::new(),
        }
    }

    /// Read the current settings, filling in and repairing missing values.
    pub fn load(store: &mut SettingsStore, expected_version: u32) -> Self {
        let defaults = Self::defaults(expected_version);
        // An unusable version is left in the store for the migration walk to refuse.
        let config_version = read_version(store, expected_version).unwrap_or(expected_version);
        Self {
            config_version,
            naming: NamingSettings {
                pattern: store
                    .get_string(GENERAL, "naming_pattern", &defaults.naming.pattern, false)
                    .value(),
                custom_abd: store
                    .get_bool(GENERAL, "naming_custom_abd", defaults.naming.custom_abd)
                    .value(),
                abd_pattern: store
                    .get_string(GENERAL, "naming_abd_pattern", &defaults.naming.abd_pattern, false)
                    .value(),
                multi_ep: store
                    .get_int(GENERAL, "naming_multi_ep", defaults.naming.multi_ep)
                    .value(),
                force_folders: store
                    .get_bool(GENERAL, "naming_force_folders", defaults.naming.force_folders)
                    .value(),
            },
            omgwtfnzbs: OmgwtfnzbsSettings {
                username: store
                    .get_string(OMGWTFNZBS, "omgwtfnzbs_username", "", false)
                    .value(),
                api_key: store
                    .get_string(OMGWTFNZBS, "omgwtfnzbs_apikey", "", true)
                    .value(),
            },
            newznab_data: store
                .get_string(NEWZNAB, "newznab_data", "", false)
                .value(),
        }
    }

    /// Write every field into the store. The store is not flushed to disk.
    pub fn save(&self, store: &mut SettingsStore) {
        store.set_int(GENERAL, "config_version", i64::from(self.config_version));
        store.set_string(GENERAL, "naming_pattern", &self.naming.pattern);
        store.set_bool(GENERAL, "naming_custom_abd", self.naming.custom_abd);
        store.set_string(GENERAL, "naming_abd_pattern", &self.naming.abd_pattern);
        store.set_int(GENERAL, "naming_multi_ep", self.naming.multi_ep);
        store.set_bool(GENERAL, "naming_force_folders", self.naming.force_folders);
        store.set_string(OMGWTFNZBS, "omgwtfnzbs_username", &self.omgwtfnzbs.username);
        store.set_string(OMGWTFNZBS, "omgwtfnzbs_apikey", &self.omgwtfnzbs.api_key);
        store.set_string(NEWZNAB, "newznab_data", &self.newznab_data);
    }
}

/// Stored `General.config_version`, defaulting to `expected_version` for a
/// fresh file. A value past `u32::MAX` is newer than anything supported; a
/// negative one has no step to start from.
pub fn read_version(
    store: &mut SettingsStore,
    expected_version: u32,
) -> Result<u32, MigrateError> {
    let raw = store
        .get_int(GENERAL, "config_version", i64::from(expected_version))
        .value();
    u32::try_from(raw).map_err(|_| match u64::try_from(raw) {
        Ok(found) => MigrateError::UnsupportedVersion {
            found,
            supported: expected_version,
        },
        Err(_) => MigrateError::InvalidVersion { found: raw },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::test::store_from;

    #[test]
    fn fresh_store_loads_defaults_at_expected_version() {
        let mut store = store_from("");
        let settings = Settings::load(&mut store, 4);
        assert_eq!(settings, Settings::defaults(4));
    }

    #[test]
    fn stored_values_win() {
        let mut store = store_from(
            "[General]\nconfig_version = \"2\"\nnaming_pattern = \"%SN %Sx%0E\"\n\
             naming_multi_ep = \"4\"\n[omgwtfnzbs]\nomgwtfnzbs_username = \"joe\"\n",
        );
        let settings = Settings::load(&mut store, 4);
        assert_eq!(settings.config_version, 2);
        assert_eq!(settings.naming.pattern, "%SN %Sx%0E");
        assert_eq!(settings.naming.multi_ep, 4);
        assert_eq!(settings.omgwtfnzbs.username, "joe");
    }

    #[test]
    fn out_of_range_versions_are_errors() {
        let mut store = store_from("[General]\nconfig_version = \"-3\"\n");
        assert!(matches!(
            read_version(&mut store, 4),
            Err(MigrateError::InvalidVersion { found: -3 })
        ));
        assert_eq!(
            store.document().get(GENERAL, "config_version").as_deref(),
            Some("-3")
        );

        let mut store = store_from("[General]\nconfig_version = \"4294967296\"\n");
        assert!(matches!(
            read_version(&mut store, 4),
            Err(MigrateError::UnsupportedVersion {
                found: 4294967296,
                supported: 4
            })
        ));
    }

    #[test]
    fn load_keeps_unusable_version_in_store() {
        let mut store = store_from("[General]\nconfig_version = \"-3\"\n");
        assert_eq!(Settings::load(&mut store, 4).config_version, 4);
        assert_eq!(
            store.document().get(GENERAL, "config_version").as_deref(),
            Some("-3")
        );
    }

    #[test]
    fn save_then_load_is_stable() {
        let mut store = store_from("");
        let mut settings = Settings::defaults(3);
        settings.naming.custom_abd = true;
        settings.newznab_data = "a|b|c|d|1".into();
        settings.save(&mut store);
        assert_eq!(Settings::load(&mut store, 4), settings);
    }
}
