//! In-memory catalog store.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use super::{CatalogStore, StoreResult};
use crate::model::{sort_recent_tables, DataSource, NewDataSource, NewRecentTable, RecentTable};

type RecentKey = (String, Option<i64>);

/// Concurrent map store; concurrent writes to one key are last-write-wins.
#[derive(Debug)]
pub struct MemoryStore {
    sources: DashMap<i64, DataSource>,
    recent: DashMap<RecentKey, RecentTable>,
    next_source_id: AtomicI64,
    next_recent_id: AtomicI64,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            sources: DashMap::new(),
            recent: DashMap::new(),
            next_source_id: AtomicI64::new(1),
            next_recent_id: AtomicI64::new(1),
        }
    }
}

impl CatalogStore for MemoryStore {
    fn list_data_sources(&self, user_id: Option<i64>) -> StoreResult<Vec<DataSource>> {
        let mut sources: Vec<DataSource> = self
            .sources
            .iter()
            .filter(|entry| user_id.is_none() || entry.user_id == user_id)
            .map(|entry| entry.value().clone())
            .collect();
        sources.sort_by_key(|s| s.id);
        Ok(sources)
    }

    fn get_data_source(&self, id: i64) -> StoreResult<Option<DataSource>> {
        Ok(self.sources.get(&id).map(|entry| entry.value().clone()))
    }

    fn create_data_source(&self, source: NewDataSource) -> StoreResult<DataSource> {
        source.validate()?;
        let id = self.next_source_id.fetch_add(1, Ordering::SeqCst);
        let source = source.into_data_source(id, Utc::now());
        self.sources.insert(id, source.clone());
        Ok(source)
    }

    fn delete_data_source(&self, id: i64) -> StoreResult<bool> {
        Ok(self.sources.remove(&id).is_some())
    }

    fn list_recent_tables(&self, user_id: Option<i64>) -> StoreResult<Vec<RecentTable>> {
        let mut tables: Vec<RecentTable> = self
            .recent
            .iter()
            .filter(|entry| user_id.is_none() || entry.user_id == user_id)
            .map(|entry| entry.value().clone())
            .collect();
        tables.sort_by_key(|t| t.id);
        sort_recent_tables(&mut tables);
        Ok(tables)
    }

    fn upsert_recent_table(&self, table: NewRecentTable) -> StoreResult<RecentTable> {
        let now = Utc::now();
        let key = (table.path.clone(), table.user_id);

        let stored = match self.recent.entry(key) {
            Entry::Occupied(mut entry) => {
                let id = entry.get().id;
                let updated = table.into_recent_table(id, now);
                entry.insert(updated.clone());
                updated
            }
            Entry::Vacant(entry) => {
                let id = self.next_recent_id.fetch_add(1, Ordering::SeqCst);
                let created = table.into_recent_table(id, now);
                entry.insert(created.clone());
                created
            }
        };
        Ok(stored)
    }
}
