//! Table metadata model.
//!
//! The canonical shape of a table's metadata (schema, partitions, versions,
//! properties, sample rows) plus the support entities for saved data sources
//! and recently viewed tables.

mod catalog;
mod format;
mod table;
mod validate;

pub use catalog::{sort_recent_tables, DataSource, NewDataSource, NewRecentTable, RecentTable};
pub use format::TableFormat;
pub use table::{
    JsonMap, ManifestFile, SampleRow, TableMetadata, TablePartition, TableProperties, TableSchema,
    TableSchemaField, TableSummary, TableVersion,
};
pub use validate::{
    parse_table_metadata, validate_partitions, validate_schema, validate_versions,
    MAX_PARTITION_DEPTH,
};

/// Errors raised by model parsing and contract validation.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("Unsupported table format: {0}")]
    UnsupportedFormat(String),

    #[error("Required field is empty: {0}")]
    EmptyField(&'static str),

    #[error("Duplicate schema field: {0}")]
    DuplicateField(String),

    #[error("{0} versions are flagged as latest; at most one is allowed")]
    MultipleLatestVersions(usize),

    #[error("Version {latest} is flagged as latest but version {newer} is more recent")]
    LatestNotMostRecent { latest: String, newer: String },

    #[error("Partition tree depth {depth} exceeds the maximum of {max}")]
    PartitionTooDeep { depth: usize, max: usize },

    #[error("Properties format '{properties}' does not match table format '{table}'")]
    FormatMismatch {
        table: TableFormat,
        properties: TableFormat,
    },

    #[error("Invalid metadata JSON: {0}")]
    Json(#[from] serde_json::Error),
}

pub type ModelResult<T> = Result<T, ModelError>;
