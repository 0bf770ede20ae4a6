//! SQLite-backed catalog store.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::{default_db_path, CatalogStore, StoreError, StoreResult};
use crate::model::{DataSource, NewDataSource, NewRecentTable, RecentTable, TableFormat};

/// Current store schema version. Bump this when the table layout changes.
const STORE_VERSION: i32 = 1;

/// SQLite catalog. Access is serialized behind a mutex.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl std::fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStore").finish_non_exhaustive()
    }
}

impl SqliteStore {
    /// Open or create the catalog at the default location.
    pub fn open_default() -> StoreResult<Self> {
        Self::open(default_db_path()?)
    }

    /// Open or create the catalog at `path`.
    ///
    /// An existing database written by another layout version is wiped.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let store = Self {
            conn: Mutex::new(Connection::open(path)?),
        };
        store.init()?;
        Ok(store)
    }

    /// Open an in-memory catalog (for testing).
    pub fn open_in_memory() -> StoreResult<Self> {
        let store = Self {
            conn: Mutex::new(Connection::open_in_memory()?),
        };
        store.init()?;
        Ok(store)
    }

    fn conn(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StoreError::LockPoisoned)
    }

    /// Create tables if missing and check the layout version.
    fn init(&self) -> StoreResult<()> {
        let conn = self.conn()?;
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS meta (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );
            ",
        )?;

        let stored_version: Option<i32> = conn
            .query_row("SELECT value FROM meta WHERE key = 'version'", [], |row| {
                let s: String = row.get(0)?;
                Ok(s.parse().unwrap_or(0))
            })
            .optional()?;

        if stored_version.is_some_and(|v| v != STORE_VERSION) {
            conn.execute_batch(
                "
                DROP TABLE IF EXISTS data_sources;
                DROP TABLE IF EXISTS recent_tables;
                ",
            )?;
        }

        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS data_sources (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                path TEXT NOT NULL,
                type TEXT NOT NULL,
                user_id INTEGER,
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS recent_tables (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                path TEXT NOT NULL,
                format TEXT NOT NULL,
                user_id INTEGER,
                metadata TEXT NOT NULL,
                last_viewed TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS recent_tables_key ON recent_tables (path, user_id);
            ",
        )?;

        conn.execute(
            "INSERT OR REPLACE INTO meta (key, value) VALUES ('version', ?)",
            params![STORE_VERSION.to_string()],
        )?;

        Ok(())
    }
}

/// Fixed-width RFC 3339 so that text order matches time order.
fn encode_time(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn decode_time(text: &str) -> StoreResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text)
        .map(|at| at.with_timezone(&Utc))
        .map_err(|_| StoreError::InvalidTimestamp(text.to_string()))
}

/// Raw columns of a `data_sources` row.
struct SourceRow {
    id: i64,
    name: String,
    path: String,
    source_type: String,
    user_id: Option<i64>,
    created_at: String,
}

impl SourceRow {
    const COLUMNS: &'static str = "id, name, path, type, user_id, created_at";

    fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            path: row.get(2)?,
            source_type: row.get(3)?,
            user_id: row.get(4)?,
            created_at: row.get(5)?,
        })
    }

    fn into_data_source(self) -> StoreResult<DataSource> {
        Ok(DataSource {
            id: self.id,
            name: self.name,
            path: self.path,
            source_type: self.source_type,
            user_id: self.user_id,
            created_at: decode_time(&self.created_at)?,
        })
    }
}

/// Raw columns of a `recent_tables` row.
struct RecentRow {
    id: i64,
    name: String,
    path: String,
    format: String,
    user_id: Option<i64>,
    metadata: String,
    last_viewed: String,
}

impl RecentRow {
    const COLUMNS: &'static str = "id, name, path, format, user_id, metadata, last_viewed";

    fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            path: row.get(2)?,
            format: row.get(3)?,
            user_id: row.get(4)?,
            metadata: row.get(5)?,
            last_viewed: row.get(6)?,
        })
    }

    fn into_recent_table(self) -> StoreResult<RecentTable> {
        Ok(RecentTable {
            id: self.id,
            name: self.name,
            path: self.path,
            format: self.format.parse::<TableFormat>()?,
            user_id: self.user_id,
            metadata: serde_json::from_str(&self.metadata)?,
            last_viewed: decode_time(&self.last_viewed)?,
        })
    }
}

impl CatalogStore for SqliteStore {
    fn list_data_sources(&self, user_id: Option<i64>) -> StoreResult<Vec<DataSource>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM data_sources WHERE ?1 IS NULL OR user_id = ?1 ORDER BY id",
            SourceRow::COLUMNS
        ))?;
        let rows = stmt
            .query_map(params![user_id], SourceRow::read)?
            .collect::<Result<Vec<_>, _>>()?;
        rows.into_iter().map(SourceRow::into_data_source).collect()
    }

    fn get_data_source(&self, id: i64) -> StoreResult<Option<DataSource>> {
        let conn = self.conn()?;
        let row = conn
            .query_row(
                &format!("SELECT {} FROM data_sources WHERE id = ?", SourceRow::COLUMNS),
                params![id],
                SourceRow::read,
            )
            .optional()?;
        row.map(SourceRow::into_data_source).transpose()
    }

    fn create_data_source(&self, source: NewDataSource) -> StoreResult<DataSource> {
        source.validate()?;
        let created_at = source.created_at.unwrap_or_else(Utc::now);

        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO data_sources (name, path, type, user_id, created_at)
             VALUES (?, ?, ?, ?, ?)",
            params![
                source.name,
                source.path,
                source.source_type,
                source.user_id,
                encode_time(created_at)
            ],
        )?;
        let id = conn.last_insert_rowid();

        Ok(source.into_data_source(id, created_at))
    }

    fn delete_data_source(&self, id: i64) -> StoreResult<bool> {
        let rows = self
            .conn()?
            .execute("DELETE FROM data_sources WHERE id = ?", params![id])?;
        Ok(rows > 0)
    }

    fn list_recent_tables(&self, user_id: Option<i64>) -> StoreResult<Vec<RecentTable>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM recent_tables WHERE ?1 IS NULL OR user_id = ?1
             ORDER BY last_viewed DESC, id ASC",
            RecentRow::COLUMNS
        ))?;
        let rows = stmt
            .query_map(params![user_id], RecentRow::read)?
            .collect::<Result<Vec<_>, _>>()?;
        rows.into_iter().map(RecentRow::into_recent_table).collect()
    }

    fn upsert_recent_table(&self, table: NewRecentTable) -> StoreResult<RecentTable> {
        let last_viewed = table.last_viewed.unwrap_or_else(Utc::now);
        let metadata = serde_json::to_string(&table.metadata)?;

        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        // `IS` so that a NULL user matches the anonymous entry.
        let existing: Option<i64> = tx
            .query_row(
                "SELECT id FROM recent_tables WHERE path = ? AND user_id IS ?",
                params![table.path, table.user_id],
                |row| row.get(0),
            )
            .optional()?;

        let id = match existing {
            Some(id) => {
                tx.execute(
                    "UPDATE recent_tables SET name = ?, format = ?, metadata = ?, last_viewed = ?
                     WHERE id = ?",
                    params![
                        table.name,
                        table.format.as_str(),
                        metadata,
                        encode_time(last_viewed),
                        id
                    ],
                )?;
                id
            }
            None => {
                tx.execute(
                    "INSERT INTO recent_tables (name, path, format, user_id, metadata, last_viewed)
                     VALUES (?, ?, ?, ?, ?, ?)",
                    params![
                        table.name,
                        table.path,
                        table.format.as_str(),
                        table.user_id,
                        metadata,
                        encode_time(last_viewed)
                    ],
                )?;
                tx.last_insert_rowid()
            }
        };
        tx.commit()?;

        Ok(table.into_recent_table(id, last_viewed))
    }
}
