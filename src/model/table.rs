//! Table metadata types.
//!
//! These are the wire types of the metadata API. Field names serialize in
//! camelCase and optional fields are omitted when absent.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::TableFormat;

/// Free-form JSON object used for format-native dumps and row records.
pub type JsonMap = serde_json::Map<String, serde_json::Value>;

/// One loosely-typed sample row (column name -> value).
pub type SampleRow = JsonMap;

/// Complete metadata of one table at a point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableMetadata {
    /// Human-readable table identifier.
    pub name: String,
    pub format: TableFormat,
    /// Canonical storage path.
    pub location: String,
    pub last_modified: DateTime<Utc>,
    /// Total bytes of data files.
    pub size: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_count: Option<u64>,
    /// Only present for versioned formats.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<TableSchema>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partitions: Option<Vec<TablePartition>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub versions: Option<Vec<TableVersion>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<TableProperties>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_data: Option<Vec<SampleRow>>,
}

impl TableMetadata {
    /// The version flagged as latest, if any.
    pub fn latest_version(&self) -> Option<&TableVersion> {
        self.versions
            .as_deref()
            .and_then(|versions| versions.iter().find(|v| v.is_latest))
    }

    /// Number of partition leaves across the whole partition tree.
    pub fn partition_leaf_count(&self) -> usize {
        self.partitions
            .as_deref()
            .map(|parts| parts.iter().map(TablePartition::leaf_count).sum())
            .unwrap_or(0)
    }

    /// Compact JSON summary recorded alongside recent-table entries.
    pub fn summary(&self) -> serde_json::Value {
        let mut summary = JsonMap::new();
        summary.insert("size".to_string(), self.size.into());
        if let Some(rows) = self.row_count {
            summary.insert("rowCount".to_string(), rows.into());
        }
        if let Some(version) = &self.current_version {
            summary.insert("currentVersion".to_string(), version.clone().into());
        }
        serde_json::Value::Object(summary)
    }
}

/// One row of the table catalog listing: headline numbers without the slices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableSummary {
    pub name: String,
    pub format: TableFormat,
    pub location: String,
    pub last_modified: DateTime<Utc>,
    pub size: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_version: Option<String>,
    pub column_count: usize,
    pub partition_count: usize,
}

impl From<&TableMetadata> for TableSummary {
    fn from(table: &TableMetadata) -> Self {
        Self {
            name: table.name.clone(),
            format: table.format,
            location: table.location.clone(),
            last_modified: table.last_modified,
            size: table.size,
            row_count: table.row_count,
            file_count: table.file_count,
            current_version: table.current_version.clone(),
            column_count: table.schema.as_ref().map_or(0, |s| s.fields.len()),
            partition_count: table.partition_leaf_count(),
        }
    }
}

/// Ordered list of columns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableSchema {
    pub fields: Vec<TableSchemaField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<DateTime<Utc>>,
}

impl TableSchema {
    /// Look up a field by name.
    pub fn field(&self, name: &str) -> Option<&TableSchemaField> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Names of the partition key columns, in schema order.
    pub fn partition_keys(&self) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|f| f.partition_key)
            .map(|f| f.name.as_str())
            .collect()
    }
}

/// A single column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableSchemaField {
    pub name: String,
    /// Type as reported by the format (e.g. `string`, `map<string,string>`).
    #[serde(rename = "type")]
    pub data_type: String,
    pub nullable: bool,
    #[serde(default)]
    pub partition_key: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl TableSchemaField {
    pub fn new(name: impl Into<String>, data_type: impl Into<String>, nullable: bool) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            nullable,
            partition_key: false,
            description: None,
        }
    }

    pub fn partition_key(mut self) -> Self {
        self.partition_key = true;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// A partition value, possibly subdivided by further partition columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TablePartition {
    /// Partition column.
    pub name: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_count: Option<u64>,
    #[serde(default)]
    pub children: Vec<TablePartition>,
}

impl TablePartition {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            size: None,
            file_count: None,
            row_count: None,
            children: Vec::new(),
        }
    }

    /// Attach size, file and row counts.
    pub fn with_stats(mut self, size: u64, file_count: u64, row_count: u64) -> Self {
        self.size = Some(size);
        self.file_count = Some(file_count);
        self.row_count = Some(row_count);
        self
    }

    pub fn with_children(mut self, children: Vec<TablePartition>) -> Self {
        self.children = children;
        self
    }

    /// Depth of this subtree (a partition without children has depth 1).
    pub fn depth(&self) -> usize {
        1 + self.children.iter().map(|c| c.depth()).max().unwrap_or(0)
    }

    pub fn leaf_count(&self) -> usize {
        if self.children.is_empty() {
            1
        } else {
            self.children.iter().map(|c| c.leaf_count()).sum()
        }
    }

    /// Directory-style path segment, e.g. `region=EU`.
    pub fn segment(&self) -> String {
        format!("{}={}", self.name, self.value)
    }
}

/// A historical version (snapshot, commit, log entry).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableVersion {
    /// Format-specific version identifier.
    pub id: String,
    pub timestamp: DateTime<Utc>,
    /// Operation tag: append, delete, schema, upsert, vacuum, ...
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub changes: Option<JsonMap>,
    #[serde(default)]
    pub is_latest: bool,
}

/// Format-level properties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableProperties {
    pub format: TableFormat,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format_version: Option<String>,
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manifest_files: Option<Vec<ManifestFile>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot_info: Option<JsonMap>,
    /// Format-native configuration dump.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format_config: Option<JsonMap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics: Option<JsonMap>,
}

/// A manifest / log / commit file descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestFile {
    pub path: String,
    pub size: u64,
}

impl ManifestFile {
    pub fn new(path: impl Into<String>, size: u64) -> Self {
        Self {
            path: path.into(),
            size,
        }
    }
}
