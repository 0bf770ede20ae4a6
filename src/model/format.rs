//! Table format enumeration.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::ModelError;

/// On-disk layout convention of a data-lake table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableFormat {
    /// Plain Parquet files, no table-level log.
    Parquet,
    /// Apache Iceberg
    Iceberg,
    /// Delta Lake
    Delta,
    /// Apache Hudi
    Hudi,
}

impl TableFormat {
    /// All supported formats, in display order.
    pub const ALL: [TableFormat; 4] = [
        TableFormat::Parquet,
        TableFormat::Iceberg,
        TableFormat::Delta,
        TableFormat::Hudi,
    ];

    /// Lowercase wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            TableFormat::Parquet => "parquet",
            TableFormat::Iceberg => "iceberg",
            TableFormat::Delta => "delta",
            TableFormat::Hudi => "hudi",
        }
    }

    /// Human-readable product name.
    pub fn display_name(&self) -> &'static str {
        match self {
            TableFormat::Parquet => "Apache Parquet",
            TableFormat::Iceberg => "Apache Iceberg",
            TableFormat::Delta => "Delta Lake",
            TableFormat::Hudi => "Apache Hudi",
        }
    }

    /// Directory name that marks a table of this format in object storage.
    ///
    /// Parquet has no table-level marker.
    pub fn marker(&self) -> Option<&'static str> {
        match self {
            TableFormat::Parquet => None,
            TableFormat::Iceberg => Some("metadata"),
            TableFormat::Delta => Some("_delta_log"),
            TableFormat::Hudi => Some(".hoodie"),
        }
    }

    /// Whether the format keeps a native version history.
    pub fn is_versioned(&self) -> bool {
        !matches!(self, TableFormat::Parquet)
    }
}

impl fmt::Display for TableFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TableFormat {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "parquet" => Ok(TableFormat::Parquet),
            "iceberg" => Ok(TableFormat::Iceberg),
            "delta" | "deltalake" | "delta_lake" => Ok(TableFormat::Delta),
            "hudi" => Ok(TableFormat::Hudi),
            other => Err(ModelError::UnsupportedFormat(other.to_string())),
        }
    }
}
