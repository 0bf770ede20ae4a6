//! Saved data sources and recently viewed tables.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ModelError, ModelResult, TableFormat};

/// A saved bucket/path bookmark.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataSource {
    pub id: i64,
    pub name: String,
    pub path: String,
    /// Storage kind, e.g. `s3`, `gcs`, `abfs`.
    #[serde(rename = "type")]
    pub source_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

/// Payload for creating a [`DataSource`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDataSource {
    pub name: String,
    pub path: String,
    #[serde(rename = "type", default = "default_source_type")]
    pub source_type: String,
    #[serde(default)]
    pub user_id: Option<i64>,
    /// Stamped by the store when absent.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

fn default_source_type() -> String {
    "s3".to_string()
}

impl NewDataSource {
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            source_type: default_source_type(),
            user_id: None,
            created_at: None,
        }
    }

    pub fn with_type(mut self, source_type: impl Into<String>) -> Self {
        self.source_type = source_type.into();
        self
    }

    pub fn for_user(mut self, user_id: i64) -> Self {
        self.user_id = Some(user_id);
        self
    }

    /// `name` and `path` are required.
    pub fn validate(&self) -> ModelResult<()> {
        if self.name.trim().is_empty() {
            return Err(ModelError::EmptyField("name"));
        }
        if self.path.trim().is_empty() {
            return Err(ModelError::EmptyField("path"));
        }
        Ok(())
    }

    /// Materialize with a store-assigned id.
    pub fn into_data_source(self, id: i64, now: DateTime<Utc>) -> DataSource {
        DataSource {
            id,
            name: self.name,
            path: self.path,
            source_type: self.source_type,
            user_id: self.user_id,
            created_at: self.created_at.unwrap_or(now),
        }
    }
}

/// Per-user marker of a table whose metadata was fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentTable {
    pub id: i64,
    pub name: String,
    pub path: String,
    pub format: TableFormat,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    #[serde(default = "empty_object")]
    pub metadata: serde_json::Value,
    pub last_viewed: DateTime<Utc>,
}

/// Upsert payload for a [`RecentTable`], keyed by `(path, user_id)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRecentTable {
    pub name: String,
    pub path: String,
    pub format: TableFormat,
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default = "empty_object")]
    pub metadata: serde_json::Value,
    #[serde(default)]
    pub last_viewed: Option<DateTime<Utc>>,
}

fn empty_object() -> serde_json::Value {
    serde_json::Value::Object(Default::default())
}

impl NewRecentTable {
    pub fn new(name: impl Into<String>, path: impl Into<String>, format: TableFormat) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            format,
            user_id: None,
            metadata: empty_object(),
            last_viewed: None,
        }
    }

    pub fn for_user(mut self, user_id: i64) -> Self {
        self.user_id = Some(user_id);
        self
    }

    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn viewed_at(mut self, at: DateTime<Utc>) -> Self {
        self.last_viewed = Some(at);
        self
    }

    pub fn into_recent_table(self, id: i64, now: DateTime<Utc>) -> RecentTable {
        RecentTable {
            id,
            name: self.name,
            path: self.path,
            format: self.format,
            user_id: self.user_id,
            metadata: self.metadata,
            last_viewed: self.last_viewed.unwrap_or(now),
        }
    }
}

/// Order recent tables by `last_viewed` descending; equal timestamps keep
/// their incoming order.
pub fn sort_recent_tables(tables: &mut [RecentTable]) {
    tables.sort_by(|a, b| b.last_viewed.cmp(&a.last_viewed));
}
