//! Per-show records the naming migration needs to inspect and update.

use std::path::Path;

use rusqlite::{Connection, params};

use crate::error::MigrateError;

/// One row of the show table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShowRecord {
    pub id: i64,
    pub name: String,
    /// `true` when the show's episodes live directly in the show folder.
    pub flatten_folders: bool,
}

/// Row-level access to the show table.
pub trait ShowStore {
    /// Shows that keep episodes in per-season sub-folders.
    fn shows_with_season_folders(&self) -> Result<Vec<ShowRecord>, MigrateError>;

    /// Set `flatten_folders` on every show. Returns the number of rows changed.
    fn set_flatten_folders_all(&self, flatten: bool) -> Result<usize, MigrateError>;
}

/// [`ShowStore`] backed by the `tv_shows` table of a SQLite database.
pub struct SqliteShowStore {
    conn: Connection,
}

impl SqliteShowStore {
    pub fn open(path: &Path) -> Result<Self, MigrateError> {
        let conn = Connection::open(path)?;
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self, MigrateError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    /// Wrap a connection, creating the show table if it does not exist.
    pub fn with_connection(conn: Connection) -> Result<Self, MigrateError> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS tv_shows (
                show_id INTEGER PRIMARY KEY,
                show_name TEXT NOT NULL DEFAULT '',
                flatten_folders INTEGER NOT NULL DEFAULT 0
            );",
        )?;
        Ok(Self { conn })
    }

    pub fn insert(&self, name: &str, flatten_folders: bool) -> Result<i64, MigrateError> {
        self.conn.execute(
            "INSERT INTO tv_shows (show_name, flatten_folders) VALUES (?1, ?2)",
            params![name, flatten_folders],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn all(&self) -> Result<Vec<ShowRecord>, MigrateError> {
        self.select("SELECT show_id, show_name, flatten_folders FROM tv_shows ORDER BY show_id")
    }

    fn select(&self, sql: &str) -> Result<Vec<ShowRecord>, MigrateError> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map([], |row| {
            Ok(ShowRecord {
                id: row.get(0)?,
                name: row.get(1)?,
                flatten_folders: row.get::<_, i64>(2)? != 0,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(MigrateError::from)
    }
}

impl ShowStore for SqliteShowStore {
    fn shows_with_season_folders(&self) -> Result<Vec<ShowRecord>, MigrateError> {
        self.select(
            "SELECT show_id, show_name, flatten_folders FROM tv_shows \
             WHERE flatten_folders = 0 ORDER BY show_id",
        )
    }

    fn set_flatten_folders_all(&self, flatten: bool) -> Result<usize, MigrateError> {
        let changed = self.conn.execute(
            "UPDATE tv_shows SET flatten_folders = ?1",
            params![i64::from(flatten)],
        )?;
        Ok(changed)
    }
}
