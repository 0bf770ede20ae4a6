//! Bookmark and recent-table API handlers.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::model::{DataSource, NewDataSource, RecentTable};

use super::error::ApiError;
use super::metadata::parse_user_id;
use super::server::AppState;

/// Query string of the list endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct UserQuery {
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
}

/// Body of a successful delete.
#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub success: bool,
}

/// GET /api/datasources - Saved bookmarks
pub async fn list_data_sources(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> Result<Json<Vec<DataSource>>, ApiError> {
    let user_id = parse_user_id(query.user_id.as_deref())?;
    Ok(Json(state.store.list_data_sources(user_id)?))
}

/// POST /api/datasources - Save a bookmark
pub async fn create_data_source(
    State(state): State<AppState>,
    body: Result<Json<NewDataSource>, JsonRejection>,
) -> Result<(StatusCode, Json<DataSource>), ApiError> {
    let Json(source) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let created = state.store.create_data_source(source)?;
    tracing::info!(id = created.id, name = %created.name, "created data source");
    Ok((StatusCode::CREATED, Json(created)))
}

/// DELETE /api/datasources/{id} - Remove a bookmark
pub async fn delete_data_source(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let Path(id) = id.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    if !state.store.delete_data_source(id)? {
        return Err(ApiError::NotFound(format!("Data source {} not found", id)));
    }
    Ok(Json(DeleteResponse { success: true }))
}

/// GET /api/recent-tables - Recently viewed tables
pub async fn list_recent_tables(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> Result<Json<Vec<RecentTable>>, ApiError> {
    let user_id = parse_user_id(query.user_id.as_deref())?;
    Ok(Json(state.store.list_recent_tables(user_id)?))
}
