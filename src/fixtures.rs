#[cfg(test)]
pub mod test {
    use std::path::Path;

    use crate::document::ConfigDocument;
    use crate::secret::SecretCodec;
    use crate::settings::Settings;
    use crate::shows::SqliteShowStore;
    use crate::steps::CONFIG_VERSION;
    use crate::store::SettingsStore;

    /// An in-memory store parsed from `content`. Saving it would write
    /// `config.toml` in the working directory, so tests that persist use
    /// [`SettingsStore::open`] on a temp dir instead.
    pub fn store_from(content: &str) -> SettingsStore {
        let doc = ConfigDocument::parse(content, Path::new("config.toml")).unwrap();
        SettingsStore::from_document("config.toml", doc, SecretCodec::plain())
    }

    pub fn settings_for(store: &mut SettingsStore) -> Settings {
        Settings::load(store, CONFIG_VERSION)
    }

    /// In-memory show table with `(name, flatten_folders)` rows.
    pub fn shows_with(rows: &[(&str, bool)]) -> SqliteShowStore {
        let store = SqliteShowStore::open_in_memory().unwrap();
        for (name, flatten) in rows {
            store.insert(name, *flatten).unwrap();
        }
        store
    }

    /// A settings file as an old release would have written it: version 0,
    /// the naming toggles, and the pre-rename provider keys.
    pub const LEGACY_CONFIG: &str = r#"# written by an old release
[General]
config_version = "0"
naming_ep_type = "1"
naming_sep_type = "0"
naming_show_name = "1"
naming_ep_name = "1"
naming_quality = "0"
naming_use_periods = "0"
naming_dates = "0"
naming_multi_ep_type = "1"
season_folders_format = "Season %02d"

[omgwtfnzbs]
omgwtfnzbs_uid = "joe"
omgwtfnzbs_key = "abc123"

[Newznab]
newznab_data = "Sick Beard Index|http://a|abc|1!!!NZBs.org|http://b|key2|1!!!Broken|http://c|1"
"#;

    #[test]
    fn legacy_fixture_parses() {
        let mut store = store_from(LEGACY_CONFIG);
        assert_eq!(store.get_int("General", "config_version", 4).value(), 0);
    }
}
