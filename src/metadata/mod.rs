//! Metadata provider module.
//!
//! Resolves a storage path to a table format and produces the table's
//! metadata through the provider registered for that format.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      MetadataService                            │
//! │  ┌───────────────────────────────────────────────────────────┐  │
//! │  │  resolve_format()          │  fetch() -> validate()       │  │
//! │  │  - format hint             │  - schema() / partitions()   │  │
//! │  │  - dataset rules           │  - versions() / properties() │  │
//! │  │  - marker rules            │  - sample_data()             │  │
//! │  └───────────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────┘
//!                           │
//!                           ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │         FormatProvider (one per parquet/iceberg/delta/hudi)     │
//! │              DemoProvider -> DemoCatalog                        │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use lakeview::metadata::{MetadataService, UnknownPathPolicy};
//!
//! let service = MetadataService::demo(UnknownPathPolicy::Lenient);
//! let table = service.fetch("s3://analytics-bucket/customer_data/", None).await?;
//! assert_eq!(table.name, "customer_profiles");
//! ```

pub mod demo;
mod error;
mod provider;
pub mod resolver;
mod service;

pub use demo::{DemoCatalog, UnknownPathPolicy, DEFAULT_LOCATION};
pub use error::{MetadataError, MetadataResult};
pub use provider::{properties_of, schema_of, DemoProvider, FormatProvider};
pub use resolver::{resolve_format, resolve_format_with_reason, Resolution, DEFAULT_FORMAT};
pub use service::MetadataService;
