//! Table metadata API handlers.
//!
//! Every endpoint takes `path`, an optional `format` hint and, for the full
//! metadata endpoint, an optional `userId` that records the table as recently
//! viewed.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::model::{
    NewRecentTable, SampleRow, TableFormat, TableMetadata, TablePartition, TableProperties,
    TableSchema, TableSummary, TableVersion,
};

use super::error::{ApiError, PATH_REQUIRED};
use super::server::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Query string shared by the table endpoints.
///
/// Kept as raw strings so that malformed values produce a JSON error body.
#[derive(Debug, Default, Deserialize)]
pub struct TableQuery {
    pub path: Option<String>,
    pub format: Option<String>,
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
}

impl TableQuery {
    /// The trimmed, non-empty `path`.
    pub fn path(&self) -> Result<&str, ApiError> {
        self.path
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .ok_or_else(|| ApiError::BadRequest(PATH_REQUIRED.to_string()))
    }

    pub fn format_hint(&self) -> Option<&str> {
        self.format.as_deref().filter(|f| !f.trim().is_empty())
    }

    pub fn user_id(&self) -> Result<Option<i64>, ApiError> {
        parse_user_id(self.user_id.as_deref())
    }
}

/// Parse an optional `userId` query value. Blank means absent.
pub fn parse_user_id(raw: Option<&str>) -> Result<Option<i64>, ApiError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(s) => s
            .parse::<i64>()
            .map(Some)
            .map_err(|_| ApiError::BadRequest(format!("Invalid userId: '{}'", s))),
    }
}

/// Query string of `GET /api/tables`.
#[derive(Debug, Default, Deserialize)]
pub struct ListTablesQuery {
    pub format: Option<String>,
}

/// Parse a format filter. Unlike a format hint, an unknown name is an error.
pub fn parse_format_filter(raw: Option<&str>) -> Result<Option<TableFormat>, ApiError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(s) => s
            .parse::<TableFormat>()
            .map(Some)
            .map_err(|e| ApiError::BadRequest(e.to_string())),
    }
}

/// Response of `GET /api/detect`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectResponse {
    pub path: String,
    pub format: TableFormat,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/metadata - Complete table metadata
pub async fn get_metadata(
    State(state): State<AppState>,
    Query(query): Query<TableQuery>,
) -> Result<Json<TableMetadata>, ApiError> {
    let path = query.path()?;
    let user_id = query.user_id()?;

    let table = state.metadata.fetch(path, query.format_hint()).await?;

    if let Some(user_id) = user_id {
        let entry = NewRecentTable::new(table.name.clone(), path, table.format)
            .for_user(user_id)
            .with_metadata(table.summary());
        if let Err(e) = state.store.upsert_recent_table(entry) {
            tracing::warn!(path, user_id, error = %e, "failed to record recent table");
        }
    }

    Ok(Json(table))
}

/// GET /api/schema - Column list
pub async fn get_schema(
    State(state): State<AppState>,
    Query(query): Query<TableQuery>,
) -> Result<Json<TableSchema>, ApiError> {
    let schema = state
        .metadata
        .schema(query.path()?, query.format_hint())
        .await?;
    Ok(Json(schema))
}

/// GET /api/partitions - Partition tree
pub async fn get_partitions(
    State(state): State<AppState>,
    Query(query): Query<TableQuery>,
) -> Result<Json<Vec<TablePartition>>, ApiError> {
    let partitions = state
        .metadata
        .partitions(query.path()?, query.format_hint())
        .await?;
    Ok(Json(partitions))
}

/// GET /api/versions - Version history
pub async fn get_versions(
    State(state): State<AppState>,
    Query(query): Query<TableQuery>,
) -> Result<Json<Vec<TableVersion>>, ApiError> {
    let versions = state
        .metadata
        .versions(query.path()?, query.format_hint())
        .await?;
    Ok(Json(versions))
}

/// GET /api/properties - Format-level properties
pub async fn get_properties(
    State(state): State<AppState>,
    Query(query): Query<TableQuery>,
) -> Result<Json<TableProperties>, ApiError> {
    let properties = state
        .metadata
        .properties(query.path()?, query.format_hint())
        .await?;
    Ok(Json(properties))
}

/// GET /api/sample-data - Sample rows
pub async fn get_sample_data(
    State(state): State<AppState>,
    Query(query): Query<TableQuery>,
) -> Result<Json<Vec<SampleRow>>, ApiError> {
    let rows = state
        .metadata
        .sample_data(query.path()?, query.format_hint())
        .await?;
    Ok(Json(rows))
}

/// GET /api/detect - Resolve the format without fetching
pub async fn detect_format(
    State(state): State<AppState>,
    Query(query): Query<TableQuery>,
) -> Result<Json<DetectResponse>, ApiError> {
    let path = query.path()?;
    let format = state.metadata.resolve(path, query.format_hint());
    Ok(Json(DetectResponse {
        path: path.to_string(),
        format,
    }))
}

/// GET /api/tables - Table catalog, optionally filtered by `format`
pub async fn list_tables(
    State(state): State<AppState>,
    Query(query): Query<ListTablesQuery>,
) -> Result<Json<Vec<TableSummary>>, ApiError> {
    let format = parse_format_filter(query.format.as_deref())?;
    Ok(Json(state.metadata.list_tables(format).await?))
}

/// GET /api/tables/format/{format} - Tables of one format
pub async fn list_tables_by_format(
    State(state): State<AppState>,
    Path(format): Path<String>,
) -> Result<Json<Vec<TableSummary>>, ApiError> {
    let format = parse_format_filter(Some(&format))?;
    Ok(Json(state.metadata.list_tables(format).await?))
}
