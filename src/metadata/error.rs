//! Metadata lookup error types.

use thiserror::Error;

use crate::model::{ModelError, TableFormat};

/// Result type for metadata operations.
pub type MetadataResult<T> = Result<T, MetadataError>;

/// Errors that can occur while producing table metadata.
#[derive(Error, Debug)]
pub enum MetadataError {
    /// No table is known at the path (strict unknown-path policy).
    #[error("table not found at '{path}' (format: {format})")]
    TableNotFound { path: String, format: TableFormat },

    /// The table exists but does not carry the requested slice.
    #[error("{slice} not available for table at '{path}'")]
    SliceUnavailable { slice: &'static str, path: String },

    /// No provider is registered for a format.
    #[error("no metadata provider registered for format '{0}'")]
    ProviderMissing(TableFormat),

    /// The provider produced metadata that breaks the contract.
    #[error("invalid metadata for '{path}': {source}")]
    InvalidMetadata {
        path: String,
        #[source]
        source: ModelError,
    },
}

impl MetadataError {
    /// Whether the error means "nothing there" rather than a failure.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            MetadataError::TableNotFound { .. } | MetadataError::SliceUnavailable { .. }
        )
    }
}
