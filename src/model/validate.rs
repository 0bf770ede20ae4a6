//! Contract checks for [`TableMetadata`].

use std::collections::HashSet;

use super::{ModelError, ModelResult, TableMetadata, TablePartition, TableSchema, TableVersion};

/// Maximum nesting of partition children.
pub const MAX_PARTITION_DEPTH: usize = 16;

impl TableMetadata {
    /// Check the invariants every metadata response must satisfy.
    pub fn validate(&self) -> ModelResult<()> {
        if self.name.trim().is_empty() {
            return Err(ModelError::EmptyField("name"));
        }
        if self.location.trim().is_empty() {
            return Err(ModelError::EmptyField("location"));
        }

        if let Some(schema) = &self.schema {
            validate_schema(schema)?;
        }
        if let Some(partitions) = &self.partitions {
            validate_partitions(partitions)?;
        }
        if let Some(versions) = &self.versions {
            validate_versions(versions)?;
        }
        if let Some(properties) = &self.properties {
            if properties.format != self.format {
                return Err(ModelError::FormatMismatch {
                    table: self.format,
                    properties: properties.format,
                });
            }
        }

        Ok(())
    }
}

/// Field names must be unique within one schema.
pub fn validate_schema(schema: &TableSchema) -> ModelResult<()> {
    let mut seen = HashSet::with_capacity(schema.fields.len());
    for field in &schema.fields {
        if field.name.is_empty() {
            return Err(ModelError::EmptyField("schema.fields[].name"));
        }
        if !seen.insert(field.name.as_str()) {
            return Err(ModelError::DuplicateField(field.name.clone()));
        }
    }
    Ok(())
}

/// Partition trees must stay within [`MAX_PARTITION_DEPTH`].
pub fn validate_partitions(partitions: &[TablePartition]) -> ModelResult<()> {
    let depth = partitions.iter().map(TablePartition::depth).max().unwrap_or(0);
    if depth > MAX_PARTITION_DEPTH {
        return Err(ModelError::PartitionTooDeep {
            depth,
            max: MAX_PARTITION_DEPTH,
        });
    }
    Ok(())
}

/// At most one latest version, and nothing newer than it.
pub fn validate_versions(versions: &[TableVersion]) -> ModelResult<()> {
    let latest: Vec<&TableVersion> = versions.iter().filter(|v| v.is_latest).collect();

    match latest.as_slice() {
        [] => Ok(()),
        [latest] => {
            if let Some(newer) = versions.iter().find(|v| v.timestamp > latest.timestamp) {
                return Err(ModelError::LatestNotMostRecent {
                    latest: latest.id.clone(),
                    newer: newer.id.clone(),
                });
            }
            Ok(())
        }
        many => Err(ModelError::MultipleLatestVersions(many.len())),
    }
}

/// Parse a JSON document and check it against the contract.
pub fn parse_table_metadata(json: &str) -> ModelResult<TableMetadata> {
    let metadata: TableMetadata = serde_json::from_str(json)?;
    metadata.validate()?;
    Ok(metadata)
}
