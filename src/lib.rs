//! # Lakeview
//!
//! A metadata viewer for data-lake tables stored as Parquet, Iceberg, Delta
//! Lake or Hudi.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │          Terminal viewer / HTTP client (client)          │
//! │     (tabs, formatting, cached + deduplicated queries)    │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [HTTP/JSON]
//! ┌─────────────────────────────────────────────────────────┐
//! │                     API server (api)                     │
//! │   /api/metadata, /api/schema, ..., /api/datasources      │
//! └─────────────────────────────────────────────────────────┘
//!              │                               │
//!              ▼ [metadata]                    ▼ [store]
//! ┌───────────────────────────┐   ┌───────────────────────────┐
//! │ Format resolver +         │   │ Bookmarks and recently    │
//! │ per-format providers      │   │ viewed tables             │
//! │ (demo catalog)            │   │ (SQLite or in-memory)     │
//! └───────────────────────────┘   └───────────────────────────┘
//! ```

pub mod api;
pub mod config;
pub mod metadata;
pub mod model;
pub mod store;
pub mod viewer;

#[cfg(feature = "client")]
pub mod client;

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::metadata::{DemoCatalog, FormatProvider, MetadataService, UnknownPathPolicy};
    pub use crate::model::{
        DataSource, NewDataSource, RecentTable, TableFormat, TableMetadata, TablePartition,
        TableProperties, TableSchema, TableSchemaField, TableSummary, TableVersion,
    };
    pub use crate::store::{CatalogStore, MemoryStore, SqliteStore};
}

pub use model::{TableFormat, TableMetadata};
