//! Format resolution from a storage path.
//!
//! Resolution never fails: an explicit, recognized hint wins; otherwise the
//! path is matched against naming rules, and parquet is the fallback. No
//! storage is touched. A resolver that probes the location for marker files
//! would replace this module.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::TableFormat;

/// Format returned when no rule matches.
pub const DEFAULT_FORMAT: TableFormat = TableFormat::Parquet;

/// Path fragments of the demo datasets, checked in order.
const DATASET_RULES: &[(&str, TableFormat)] = &[
    ("customer_data", TableFormat::Iceberg),
    ("transactions", TableFormat::Delta),
    ("orders", TableFormat::Hudi),
    ("products", TableFormat::Parquet),
];

/// Iceberg table metadata file, e.g. `v3.metadata.json` or
/// `00002-6b6a-44c4.metadata.json`.
static ICEBERG_METADATA_FILE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(^|/)[0-9A-Za-z_-]+\.metadata\.json$").expect("static regex")
});

/// Which rule produced a resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// The caller's hint was a recognized format.
    Hint,
    /// A demo dataset path fragment matched.
    DatasetRule,
    /// A format marker directory or file matched.
    Marker,
    /// Nothing matched.
    Default,
}

/// Resolve the format of the table at `path`.
pub fn resolve_format(path: &str, hint: Option<&str>) -> TableFormat {
    resolve_format_with_reason(path, hint).0
}

/// Like [`resolve_format`], also reporting which rule applied.
pub fn resolve_format_with_reason(path: &str, hint: Option<&str>) -> (TableFormat, Resolution) {
    if let Some(format) = hint.and_then(|h| h.parse::<TableFormat>().ok()) {
        return (format, Resolution::Hint);
    }

    if let Some((_, format)) = DATASET_RULES
        .iter()
        .find(|(fragment, _)| path.contains(fragment))
    {
        return (*format, Resolution::DatasetRule);
    }

    if let Some(format) = detect_from_markers(path) {
        return (format, Resolution::Marker);
    }

    (DEFAULT_FORMAT, Resolution::Default)
}

/// Match well-known marker directories and file names.
///
/// Markers are compared against whole path segments, so `raw_metadata` is
/// not an Iceberg metadata directory.
fn detect_from_markers(path: &str) -> Option<TableFormat> {
    let path = path.trim_end_matches('/');
    let has_segment = |format: TableFormat| {
        format
            .marker()
            .is_some_and(|marker| path.split('/').any(|segment| segment == marker))
    };

    if has_segment(TableFormat::Delta) {
        return Some(TableFormat::Delta);
    }
    if has_segment(TableFormat::Hudi) {
        return Some(TableFormat::Hudi);
    }
    if has_segment(TableFormat::Iceberg) || ICEBERG_METADATA_FILE.is_match(path) {
        return Some(TableFormat::Iceberg);
    }
    if path.ends_with(".parquet") {
        return Some(TableFormat::Parquet);
    }
    None
}
