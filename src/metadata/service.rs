//! Format dispatch and validation.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info};

use super::demo::{DemoCatalog, UnknownPathPolicy};
use super::error::{MetadataError, MetadataResult};
use super::provider::{properties_of, schema_of, DemoProvider, FormatProvider};
use super::resolver::resolve_format_with_reason;
use crate::model::{
    SampleRow, TableFormat, TableMetadata, TablePartition, TableProperties, TableSchema,
    TableSummary, TableVersion,
};

/// Registry of one provider per format.
#[derive(Clone, Default)]
pub struct MetadataService {
    providers: HashMap<TableFormat, Arc<dyn FormatProvider>>,
}

impl std::fmt::Debug for MetadataService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut formats: Vec<_> = self.providers.keys().collect();
        formats.sort();
        f.debug_struct("MetadataService")
            .field("formats", &formats)
            .finish()
    }
}

impl MetadataService {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Demo providers for every format over a catalog built now.
    pub fn demo(policy: UnknownPathPolicy) -> Self {
        Self::with_catalog(Arc::new(DemoCatalog::new()), policy)
    }

    /// Demo providers for every format over `catalog`.
    pub fn with_catalog(catalog: Arc<DemoCatalog>, policy: UnknownPathPolicy) -> Self {
        let mut service = Self::new();
        for format in TableFormat::ALL {
            service.register(DemoProvider::new(format, Arc::clone(&catalog), policy));
        }
        service
    }

    /// Register `provider` for its format, replacing any previous one.
    pub fn register(&mut self, provider: impl FormatProvider + 'static) {
        self.providers.insert(provider.format(), Arc::new(provider));
    }

    pub fn provider(&self, format: TableFormat) -> MetadataResult<Arc<dyn FormatProvider>> {
        self.providers
            .get(&format)
            .cloned()
            .ok_or(MetadataError::ProviderMissing(format))
    }

    /// Resolve the format of `path`. Unrecognized hints are ignored.
    pub fn resolve(&self, path: &str, hint: Option<&str>) -> TableFormat {
        let (format, reason) = resolve_format_with_reason(path, hint);
        debug!(path, ?hint, %format, ?reason, "resolved table format");
        format
    }

    /// Resolve, fetch through the matching provider and validate.
    pub async fn fetch(&self, path: &str, hint: Option<&str>) -> MetadataResult<TableMetadata> {
        let format = self.resolve(path, hint);
        let provider = self.provider(format)?;
        let table = provider.get_metadata(path).await?;

        table
            .validate()
            .map_err(|source| MetadataError::InvalidMetadata {
                path: path.to_string(),
                source,
            })?;

        info!(path, %format, table = %table.name, "fetched table metadata");
        Ok(table)
    }

    pub async fn schema(&self, path: &str, hint: Option<&str>) -> MetadataResult<TableSchema> {
        schema_of(self.fetch(path, hint).await?)
    }

    pub async fn partitions(
        &self,
        path: &str,
        hint: Option<&str>,
    ) -> MetadataResult<Vec<TablePartition>> {
        Ok(self.fetch(path, hint).await?.partitions.unwrap_or_default())
    }

    pub async fn versions(
        &self,
        path: &str,
        hint: Option<&str>,
    ) -> MetadataResult<Vec<TableVersion>> {
        Ok(self.fetch(path, hint).await?.versions.unwrap_or_default())
    }

    pub async fn properties(
        &self,
        path: &str,
        hint: Option<&str>,
    ) -> MetadataResult<TableProperties> {
        properties_of(self.fetch(path, hint).await?)
    }

    pub async fn sample_data(
        &self,
        path: &str,
        hint: Option<&str>,
    ) -> MetadataResult<Vec<SampleRow>> {
        Ok(self.fetch(path, hint).await?.sample_data.unwrap_or_default())
    }

    /// Tables known to the registered providers, sorted by name.
    ///
    /// With a `format` only that provider is asked, and a missing provider
    /// is an error. Without one, every registered provider is asked.
    pub async fn list_tables(
        &self,
        format: Option<TableFormat>,
    ) -> MetadataResult<Vec<TableSummary>> {
        let providers = match format {
            Some(format) => vec![self.provider(format)?],
            None => TableFormat::ALL
                .iter()
                .filter_map(|format| self.providers.get(format).cloned())
                .collect(),
        };

        let mut tables = Vec::new();
        for provider in providers {
            tables.extend(provider.list_tables().await?);
        }
        tables.sort_by(|a, b| a.name.cmp(&b.name));

        debug!(?format, count = tables.len(), "listed tables");
        Ok(tables)
    }
}
