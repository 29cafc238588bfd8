//! The per-version transforms and the table that orders them.
//!
//! Step `n` upgrades a document at version `n - 1` to version `n`. The
//! table is checked at compile time: it must hold exactly one step for
//! every version from 1 to [`CONFIG_VERSION`], in order.

use std::path::MAIN_SEPARATOR;

use crate::error::MigrateError;
use crate::naming::{
    ABD_PRESETS, EpisodeStyle, LegacyNaming, Separator, requires_season_folders,
    season_folder_pattern,
};
use crate::settings::{GENERAL, NEWZNAB, OMGWTFNZBS, Settings};
use crate::shows::ShowStore;
use crate::store::SettingsStore;

/// Settings schema version this build reads and writes.
pub const CONFIG_VERSION: u32 = 4;

pub const NEWZNAB_RECORD_SEPARATOR: &str = "!!!";
pub const NEWZNAB_FIELD_SEPARATOR: &str = "|";

/// Everything a step may read or change.
pub struct MigrationContext<'a> {
    pub store: &'a mut SettingsStore,
    pub settings: &'a mut Settings,
    pub shows: &'a dyn ShowStore,
}

pub type StepFn = fn(&mut MigrationContext<'_>) -> Result<(), MigrateError>;

#[derive(Clone, Copy)]
pub struct MigrationStep {
    /// Version the document is at after this step.
    pub version: u32,
    pub name: Option<&'static str>,
    pub apply: StepFn,
}

impl MigrationStep {
    pub fn display_name(&self) -> &'static str {
        self.name.unwrap_or("unnamed")
    }
}

impl std::fmt::Debug for MigrationStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MigrationStep")
            .field("version", &self.version)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

pub const STEPS: [MigrationStep; CONFIG_VERSION as usize] = [
    MigrationStep {
        version: 1,
        name: Some("Custom naming"),
        apply: custom_naming,
    },
    MigrationStep {
        version: 2,
        name: Some("Sync backup number with version number"),
        apply: sync_backup_number,
    },
    MigrationStep {
        version: 3,
        name: Some("Rename omgwtfnzb variables"),
        apply: rename_omgwtfnzbs,
    },
    MigrationStep {
        version: 4,
        name: Some("Add newznab catIDs"),
        apply: add_newznab_cat_ids,
    },
];

const _: () = assert!(is_contiguous(&STEPS), "STEPS must cover versions 1..=CONFIG_VERSION");

/// Whether `steps[i]` produces version `i + 1` for every index.
pub const fn is_contiguous(steps: &[MigrationStep]) -> bool {
    let mut i = 0;
    while i < steps.len() {
        if steps[i].version as usize != i + 1 {
            return false;
        }
        i += 1;
    }
    true
}

/// Read the pre-pattern naming toggles from `[General]`.
pub fn read_legacy_naming(store: &mut SettingsStore) -> LegacyNaming {
    let ep_type = store.get_int(GENERAL, "naming_ep_type", 0).value();
    let episode_style = EpisodeStyle::from_index(ep_type).unwrap_or_else(|| {
        tracing::warn!("Unknown naming_ep_type {ep_type}, using the first style");
        EpisodeStyle::default()
    });
    let sep_type = store.get_int(GENERAL, "naming_sep_type", 0).value();
    let separator = Separator::from_index(sep_type).unwrap_or_else(|| {
        tracing::warn!("Unknown naming_sep_type {sep_type}, using the first separator");
        Separator::default()
    });

    LegacyNaming {
        use_periods: store.get_bool(GENERAL, "naming_use_periods", false).value(),
        episode_style,
        separator,
        use_quality: store.get_bool(GENERAL, "naming_quality", false).value(),
        use_show_name: store.get_bool(GENERAL, "naming_show_name", true).value(),
        use_episode_name: store.get_bool(GENERAL, "naming_ep_name", true).value(),
    }
}

/// v1: replace the naming toggles with a pattern.
fn custom_naming(ctx: &mut MigrationContext<'_>) -> Result<(), MigrateError> {
    let legacy = read_legacy_naming(ctx.store);
    let mut pattern = legacy.to_pattern(false);
    tracing::info!("Based on your old settings the new naming pattern is: {pattern}");

    let naming = &mut ctx.settings.naming;
    naming.custom_abd = ctx.store.get_bool(GENERAL, "naming_dates", false).value();
    naming.abd_pattern = if naming.custom_abd {
        let abd = legacy.to_pattern(true);
        tracing::info!("Adding a custom air-by-date naming pattern: {abd}");
        abd
    } else {
        ABD_PRESETS[0].to_string()
    };
    naming.multi_ep = ctx.store.get_int(GENERAL, "naming_multi_ep_type", 1).value();

    let season_folder_shows = ctx.shows.shows_with_season_folders()?;
    if season_folder_shows.is_empty() {
        tracing::info!(
            "No shows were using season folders before so flattening is disabled on all shows"
        );
        let changed = ctx.shows.set_flatten_folders_all(false)?;
        tracing::debug!("Updated {changed} shows");
    } else {
        let old_format = ctx
            .store
            .get_string(GENERAL, "season_folders_format", "Season %02d", false)
            .value();
        if !old_format.is_empty() {
            match season_folder_pattern(&old_format) {
                Ok(new_format) => {
                    tracing::info!(
                        "Changed season folder format from {old_format} to {new_format}, \
                         prepending it to the naming pattern"
                    );
                    pattern = format!("{new_format}{MAIN_SEPARATOR}{pattern}");
                }
                Err(e) => {
                    tracing::error!("Can't change {old_format} to new season format: {e}");
                }
            }
        }
    }

    naming.force_folders = requires_season_folders(&pattern);
    naming.pattern = pattern;
    Ok(())
}

/// v2: no data change; keeps backup numbers in line with versions.
fn sync_backup_number(_ctx: &mut MigrationContext<'_>) -> Result<(), MigrateError> {
    Ok(())
}

/// v3: carry the omgwtfnzbs credentials over to their new key names.
fn rename_omgwtfnzbs(ctx: &mut MigrationContext<'_>) -> Result<(), MigrateError> {
    ctx.settings.omgwtfnzbs.username = ctx
        .store
        .get_string(OMGWTFNZBS, "omgwtfnzbs_uid", "", false)
        .value();
    ctx.settings.omgwtfnzbs.api_key = ctx
        .store
        .get_string(OMGWTFNZBS, "omgwtfnzbs_key", "", true)
        .value();
    Ok(())
}

/// v4: give every newznab provider an explicit category list.
fn add_newznab_cat_ids(ctx: &mut MigrationContext<'_>) -> Result<(), MigrateError> {
    let old = ctx
        .store
        .get_string(NEWZNAB, "newznab_data", "", false)
        .value();
    ctx.settings.newznab_data = add_category_ids(&old);
    Ok(())
}

/// Rewrite `name|url|key|enabled` records as
/// `name|url|key|cat_ids|enabled`. Records with the wrong number of fields
/// are logged and dropped.
pub fn add_category_ids(data: &str) -> String {
    if data.is_empty() {
        return String::new();
    }

    data.split(NEWZNAB_RECORD_SEPARATOR)
        .filter_map(|record| {
            let fields: Vec<&str> = record.split(NEWZNAB_FIELD_SEPARATOR).collect();
            let &[name, url, key, enabled] = fields.as_slice() else {
                tracing::error!("Skipping Newznab provider string: '{record}', incorrect format");
                return None;
            };
            let key = if name == "Sick Beard Index" { "0" } else { key };
            let cat_ids = if name == "NZBs.org" {
                "5030,5040,5070,5090"
            } else {
                "5030,5040"
            };
            Some([name, url, key, cat_ids, enabled].join(NEWZNAB_FIELD_SEPARATOR))
        })
        .collect::<Vec<_>>()
        .join(NEWZNAB_RECORD_SEPARATOR)
}
