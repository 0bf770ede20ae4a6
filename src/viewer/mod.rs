//! Tab-based terminal rendering of table metadata.
//!
//! The metadata of a table is fetched once; each tab renders one slice of it.
//! A tab is in one of four states: loading, empty (the slice is absent),
//! error (the fetch failed) or ready.

mod format;

pub use format::{format_bytes, format_large_number, format_number, time_ago};

use std::collections::BTreeSet;
use std::fmt::Write as _;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::model::{SampleRow, TableMetadata, TablePartition};

/// A viewer tab, each bound to one slice of the metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tab {
    Overview,
    Schema,
    Partitions,
    Versions,
    Properties,
    SampleData,
}

impl Tab {
    pub const ALL: [Tab; 6] = [
        Tab::Overview,
        Tab::Schema,
        Tab::Partitions,
        Tab::Versions,
        Tab::Properties,
        Tab::SampleData,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Tab::Overview => "overview",
            Tab::Schema => "schema",
            Tab::Partitions => "partitions",
            Tab::Versions => "versions",
            Tab::Properties => "properties",
            Tab::SampleData => "sample-data",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Tab::Overview => "Overview",
            Tab::Schema => "Schema",
            Tab::Partitions => "Partitions",
            Tab::Versions => "Versions",
            Tab::Properties => "Properties",
            Tab::SampleData => "Sample Data",
        }
    }

    /// What the tab shows, as used in status messages.
    fn noun(&self) -> &'static str {
        match self {
            Tab::Overview => "table overview",
            Tab::Schema => "schema",
            Tab::Partitions => "partitions",
            Tab::Versions => "versions",
            Tab::Properties => "properties",
            Tab::SampleData => "sample data",
        }
    }

    fn empty_message(&self) -> &'static str {
        match self {
            Tab::Overview => "No metadata for this table",
            Tab::Schema => "No schema available for this table",
            Tab::Partitions => "No partitions for this table",
            Tab::Versions => "No version history for this table",
            Tab::Properties => "No properties available for this table",
            Tab::SampleData => "No sample data available for this table",
        }
    }
}

impl std::fmt::Display for Tab {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tab {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        Tab::ALL
            .into_iter()
            .find(|tab| tab.as_str() == wanted)
            .ok_or_else(|| format!("Unknown tab: {}", s))
    }
}

/// Progress of the one metadata fetch all tabs share.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchState {
    Loading,
    Failed(String),
    Loaded(Box<TableMetadata>),
}

impl FetchState {
    pub fn loaded(table: TableMetadata) -> Self {
        FetchState::Loaded(Box::new(table))
    }
}

/// Display state of one tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabState {
    Loading,
    Empty,
    Error,
    Ready,
}

/// Which state `tab` is in given the shared fetch.
pub fn tab_state(tab: Tab, fetch: &FetchState) -> TabState {
    match fetch {
        FetchState::Loading => TabState::Loading,
        FetchState::Failed(_) => TabState::Error,
        FetchState::Loaded(table) => {
            if has_slice(tab, table) {
                TabState::Ready
            } else {
                TabState::Empty
            }
        }
    }
}

fn has_slice(tab: Tab, table: &TableMetadata) -> bool {
    match tab {
        Tab::Overview => true,
        Tab::Schema => table.schema.as_ref().is_some_and(|s| !s.fields.is_empty()),
        Tab::Partitions => table.partitions.as_ref().is_some_and(|p| !p.is_empty()),
        Tab::Versions => table.versions.as_ref().is_some_and(|v| !v.is_empty()),
        Tab::Properties => table.properties.is_some(),
        Tab::SampleData => table.sample_data.as_ref().is_some_and(|r| !r.is_empty()),
    }
}

/// Render `tab` for the shared fetch, with ages measured at `now`.
pub fn render(tab: Tab, fetch: &FetchState, now: DateTime<Utc>) -> String {
    match (tab_state(tab, fetch), fetch) {
        (TabState::Loading, _) => format!("Loading {}...", tab.noun()),
        (TabState::Error, FetchState::Failed(message)) => {
            format!("Failed to load {}: {}", tab.noun(), message)
        }
        (TabState::Empty, _) => tab.empty_message().to_string(),
        (TabState::Ready, FetchState::Loaded(table)) => render_ready(tab, table, now),
        // tab_state only reports Error for Failed and Ready for Loaded
        (_, _) => tab.empty_message().to_string(),
    }
}

fn render_ready(tab: Tab, table: &TableMetadata, now: DateTime<Utc>) -> String {
    match tab {
        Tab::Overview => render_overview(table, now),
        Tab::Schema => render_schema(table),
        Tab::Partitions => render_partitions(table.partitions.as_deref().unwrap_or_default()),
        Tab::Versions => render_versions(table, now),
        Tab::Properties => render_properties(table),
        Tab::SampleData => render_sample_data(table.sample_data.as_deref().unwrap_or_default()),
    }
}

/// Left-aligned columns separated by two spaces.
pub fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(width) = widths.get_mut(i) {
                *width = (*width).max(cell.chars().count());
            }
        }
    }

    let line = |cells: Vec<&str>| -> String {
        let mut out = String::new();
        for (i, cell) in cells.iter().enumerate() {
            if i > 0 {
                out.push_str("  ");
            }
            let pad = widths[i].saturating_sub(cell.chars().count());
            out.push_str(cell);
            out.push_str(&" ".repeat(pad));
        }
        out.trim_end().to_string()
    };

    let mut lines = vec![line(headers.to_vec())];
    for row in rows {
        let cells: Vec<&str> = (0..headers.len())
            .map(|i| row.get(i).map_or("", String::as_str))
            .collect();
        lines.push(line(cells));
    }
    lines.join("\n")
}

fn render_overview(table: &TableMetadata, now: DateTime<Utc>) -> String {
    let mut rows = vec![
        ("Format", table.format.display_name().to_string()),
        ("Location", table.location.clone()),
        ("Last modified", time_ago(table.last_modified, now)),
        ("Size", format_bytes(table.size)),
    ];
    if let Some(count) = table.row_count {
        rows.push(("Rows", format_large_number(count)));
    }
    if let Some(count) = table.file_count {
        rows.push(("Files", format_number(count)));
    }
    if let Some(version) = &table.current_version {
        rows.push(("Current version", version.clone()));
    }
    if let Some(schema) = &table.schema {
        rows.push(("Columns", schema.fields.len().to_string()));
    }
    if table.partitions.is_some() {
        rows.push(("Partitions", table.partition_leaf_count().to_string()));
    }

    let width = rows.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
    let mut out = table.name.clone();
    for (key, value) in rows {
        let _ = write!(out, "\n{:<width$}  {}", format!("{}:", key), value, width = width + 1);
    }
    out
}

fn render_schema(table: &TableMetadata) -> String {
    let Some(schema) = &table.schema else {
        return Tab::Schema.empty_message().to_string();
    };

    let rows: Vec<Vec<String>> = schema
        .fields
        .iter()
        .map(|field| {
            vec![
                field.name.clone(),
                field.data_type.clone(),
                if field.nullable { "yes" } else { "no" }.to_string(),
                if field.partition_key { "yes" } else { "" }.to_string(),
                field.description.clone().unwrap_or_default(),
            ]
        })
        .collect();

    render_table(
        &["COLUMN", "TYPE", "NULLABLE", "PARTITION", "DESCRIPTION"],
        &rows,
    )
}

/// Partition tree, children indented under their parent.
pub fn render_partitions(partitions: &[TablePartition]) -> String {
    let mut lines = Vec::new();
    for partition in partitions {
        partition_lines(partition, 0, &mut lines);
    }
    lines.join("\n")
}

fn partition_lines(partition: &TablePartition, depth: usize, lines: &mut Vec<String>) {
    let mut line = format!("{}{}", "  ".repeat(depth), partition.segment());
    let mut stats = Vec::new();
    if let Some(size) = partition.size {
        stats.push(format_bytes(size));
    }
    if let Some(files) = partition.file_count {
        stats.push(format!("{} files", format_number(files)));
    }
    if let Some(rows) = partition.row_count {
        stats.push(format!("{} rows", format_large_number(rows)));
    }
    if !stats.is_empty() {
        let _ = write!(line, "  ({})", stats.join(", "));
    }
    lines.push(line);

    for child in &partition.children {
        partition_lines(child, depth + 1, lines);
    }
}

fn render_versions(table: &TableMetadata, now: DateTime<Utc>) -> String {
    let versions = table.versions.as_deref().unwrap_or_default();
    let rows: Vec<Vec<String>> = versions
        .iter()
        .map(|version| {
            let id = if version.is_latest {
                format!("{} (latest)", version.id)
            } else {
                version.id.clone()
            };
            let changes = version
                .changes
                .as_ref()
                .map(|c| Value::Object(c.clone()).to_string())
                .unwrap_or_default();
            vec![
                id,
                time_ago(version.timestamp, now),
                version.operation.clone().unwrap_or_default(),
                changes,
            ]
        })
        .collect();

    render_table(&["VERSION", "WHEN", "OPERATION", "CHANGES"], &rows)
}

fn render_properties(table: &TableMetadata) -> String {
    let Some(props) = &table.properties else {
        return Tab::Properties.empty_message().to_string();
    };

    let mut out = format!("Format: {}", props.format.display_name());
    if let Some(version) = &props.format_version {
        let _ = write!(out, "\nFormat version: {}", version);
    }
    let _ = write!(out, "\nLocation: {}", props.location);

    if let Some(manifests) = props.manifest_files.as_deref().filter(|m| !m.is_empty()) {
        out.push_str("\n\nManifest files:");
        for manifest in manifests {
            let _ = write!(out, "\n  {}  ({})", manifest.path, format_bytes(manifest.size));
        }
    }

    let sections = [
        ("Snapshot", &props.snapshot_info),
        ("Configuration", &props.format_config),
        ("Metrics", &props.metrics),
    ];
    for (title, section) in sections {
        let Some(map) = section else { continue };
        let _ = write!(out, "\n\n{}:", title);
        for (key, value) in map {
            let _ = write!(out, "\n  {}: {}", key, cell_text(value));
        }
    }

    out
}

/// Sample rows as a table; columns in order of first appearance.
pub fn render_sample_data(rows: &[SampleRow]) -> String {
    let mut seen = BTreeSet::new();
    let mut columns: Vec<&str> = Vec::new();
    for row in rows {
        for key in row.keys() {
            if seen.insert(key.as_str()) {
                columns.push(key.as_str());
            }
        }
    }

    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            columns
                .iter()
                .map(|column| row.get(*column).map(cell_text).unwrap_or_default())
                .collect()
        })
        .collect();

    render_table(&columns, &cells)
}

/// Strings verbatim, everything else as compact JSON.
fn cell_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Fetch the table once and render the requested tabs.
#[cfg(feature = "client")]
pub async fn load(
    client: &crate::client::MetadataClient,
    path: &str,
    format: Option<crate::model::TableFormat>,
    user_id: Option<i64>,
) -> FetchState {
    match client.table_metadata(path, format, user_id).await {
        Ok(table) => FetchState::loaded(table),
        Err(e) => FetchState::Failed(e.to_string()),
    }
}
