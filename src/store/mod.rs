//! Catalog store for data-source bookmarks and recently viewed tables.
//!
//! # Design
//!
//! - One synchronous repository trait, injected into the API as a trait object
//! - `MemoryStore` for tests and throwaway servers
//! - `SqliteStore` persists to `~/.lakeview/catalog.db` by default
//!
//! Recent tables are keyed by `(path, user_id)`: recording a view of the same
//! table by the same user updates the existing entry instead of adding one.

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use std::path::PathBuf;

use chrono::{DateTime, Duration, Utc};

use crate::metadata::DemoCatalog;
use crate::model::{DataSource, ModelError, NewDataSource, NewRecentTable, RecentTable};

/// Errors that can occur during store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to determine data directory")]
    NoDataDir,

    #[error("Invalid record: {0}")]
    Invalid(#[from] ModelError),

    #[error("Invalid stored timestamp '{0}'")]
    InvalidTimestamp(String),

    #[error("Store lock poisoned")]
    LockPoisoned,
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Repository of bookmarks and recent tables.
pub trait CatalogStore: Send + Sync {
    /// Data sources ordered by id, optionally only those owned by `user_id`.
    fn list_data_sources(&self, user_id: Option<i64>) -> StoreResult<Vec<DataSource>>;

    fn get_data_source(&self, id: i64) -> StoreResult<Option<DataSource>>;

    /// Insert with the next id. `created_at` defaults to now.
    fn create_data_source(&self, source: NewDataSource) -> StoreResult<DataSource>;

    /// Returns true if a data source was deleted.
    fn delete_data_source(&self, id: i64) -> StoreResult<bool>;

    /// Recent tables, most recently viewed first; ties keep id order.
    fn list_recent_tables(&self, user_id: Option<i64>) -> StoreResult<Vec<RecentTable>>;

    /// Insert or update the entry for `(path, user_id)`.
    fn upsert_recent_table(&self, table: NewRecentTable) -> StoreResult<RecentTable>;
}

/// Default location of the SQLite catalog.
pub fn default_db_path() -> StoreResult<PathBuf> {
    let base = dirs::home_dir().ok_or(StoreError::NoDataDir)?;
    Ok(base.join(".lakeview").join("catalog.db"))
}

/// Owner of the seeded demo entries.
pub const DEMO_USER_ID: i64 = 1;

const DEMO_SOURCES: &[(&str, &str)] = &[
    ("analytics-bucket", "s3://analytics-bucket/"),
    ("data-warehouse", "s3://data-warehouse/"),
    ("ml-datasets", "s3://ml-datasets/"),
];

/// Insert the demo bookmarks and one recent entry per demo table.
pub fn seed_demo(store: &dyn CatalogStore, catalog: &DemoCatalog) -> StoreResult<()> {
    let anchor = catalog.anchor();

    for (offset, (name, path)) in DEMO_SOURCES.iter().enumerate() {
        let mut source = NewDataSource::new(*name, *path).for_user(DEMO_USER_ID);
        source.created_at = Some(days_before(anchor, 30 - offset as i64));
        store.create_data_source(source)?;
    }

    let mut tables: Vec<_> = catalog.tables().collect();
    tables.sort_by(|a, b| b.last_modified.cmp(&a.last_modified));
    for (hours, table) in tables.into_iter().enumerate() {
        store.upsert_recent_table(
            NewRecentTable::new(table.name.clone(), table.location.clone(), table.format)
                .for_user(DEMO_USER_ID)
                .with_metadata(table.summary())
                .viewed_at(anchor - Duration::hours(hours as i64 + 1)),
        )?;
    }

    Ok(())
}

fn days_before(anchor: DateTime<Utc>, days: i64) -> DateTime<Utc> {
    anchor - Duration::days(days)
}
