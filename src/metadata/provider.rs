//! FormatProvider trait definition.
//!
//! A provider produces the metadata of a table stored in one format. Only
//! `get_metadata` is required; the slice methods project it.

use std::sync::Arc;

use async_trait::async_trait;

use super::demo::{DemoCatalog, UnknownPathPolicy};
use super::error::{MetadataError, MetadataResult};
use crate::model::{
    SampleRow, TableFormat, TableMetadata, TablePartition, TableProperties, TableSchema,
    TableSummary, TableVersion,
};

/// Per-format metadata capability.
///
/// # Example
///
/// ```ignore
/// use lakeview::metadata::FormatProvider;
///
/// async fn example(provider: &dyn FormatProvider) -> MetadataResult<()> {
///     let table = provider.get_metadata("s3://analytics-bucket/transactions/").await?;
///     let versions = provider.get_versions(&table.location).await?;
///     Ok(())
/// }
/// ```
#[async_trait]
pub trait FormatProvider: Send + Sync {
    /// The format this provider reads.
    fn format(&self) -> TableFormat;

    /// Complete metadata of the table at `path`.
    async fn get_metadata(&self, path: &str) -> MetadataResult<TableMetadata>;

    // =========================================================================
    // Slice projections
    // =========================================================================

    async fn get_schema(&self, path: &str) -> MetadataResult<TableSchema> {
        schema_of(self.get_metadata(path).await?)
    }

    /// Partition tree; empty when the table is not partitioned.
    async fn get_partitions(&self, path: &str) -> MetadataResult<Vec<TablePartition>> {
        Ok(self.get_metadata(path).await?.partitions.unwrap_or_default())
    }

    /// Version history, newest first; empty for unversioned tables.
    async fn get_versions(&self, path: &str) -> MetadataResult<Vec<TableVersion>> {
        Ok(self.get_metadata(path).await?.versions.unwrap_or_default())
    }

    async fn get_properties(&self, path: &str) -> MetadataResult<TableProperties> {
        properties_of(self.get_metadata(path).await?)
    }

    async fn get_sample_data(&self, path: &str) -> MetadataResult<Vec<SampleRow>> {
        Ok(self.get_metadata(path).await?.sample_data.unwrap_or_default())
    }

    /// Tables of this format the provider can enumerate. Providers that only
    /// answer for a given path list nothing.
    async fn list_tables(&self) -> MetadataResult<Vec<TableSummary>> {
        Ok(Vec::new())
    }
}

/// Schema slice of a fetched table.
pub fn schema_of(table: TableMetadata) -> MetadataResult<TableSchema> {
    table.schema.ok_or(MetadataError::SliceUnavailable {
        slice: "schema",
        path: table.location,
    })
}

/// Properties slice of a fetched table.
pub fn properties_of(table: TableMetadata) -> MetadataResult<TableProperties> {
    table.properties.ok_or(MetadataError::SliceUnavailable {
        slice: "properties",
        path: table.location,
    })
}

/// Provider answering from the static [`DemoCatalog`].
#[derive(Debug, Clone)]
pub struct DemoProvider {
    format: TableFormat,
    catalog: Arc<DemoCatalog>,
    policy: UnknownPathPolicy,
}

impl DemoProvider {
    pub fn new(format: TableFormat, catalog: Arc<DemoCatalog>, policy: UnknownPathPolicy) -> Self {
        Self {
            format,
            catalog,
            policy,
        }
    }
}

#[async_trait]
impl FormatProvider for DemoProvider {
    fn format(&self) -> TableFormat {
        self.format
    }

    async fn get_metadata(&self, path: &str) -> MetadataResult<TableMetadata> {
        self.catalog.lookup(path, Some(self.format), self.policy)
    }

    async fn list_tables(&self) -> MetadataResult<Vec<TableSummary>> {
        Ok(self
            .catalog
            .tables()
            .filter(|table| table.format == self.format)
            .map(TableSummary::from)
            .collect())
    }
}
