//! Axum web server for the metadata API.

use std::sync::Arc;

use axum::{
    routing::{delete, get},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::{Settings, StoreBackend};
use crate::metadata::{DemoCatalog, MetadataService};
use crate::store::{seed_demo, CatalogStore, MemoryStore, SqliteStore};

use super::catalog;
use super::error::ServeError;
use super::metadata;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub metadata: Arc<MetadataService>,
    pub store: Arc<dyn CatalogStore>,
}

impl AppState {
    pub fn new(metadata: MetadataService, store: impl CatalogStore + 'static) -> Self {
        Self {
            metadata: Arc::new(metadata),
            store: Arc::new(store),
        }
    }

    /// Build the metadata service and catalog store described by `settings`.
    pub fn from_settings(settings: &Settings) -> Result<Self, ServeError> {
        let catalog = Arc::new(DemoCatalog::new());
        let metadata =
            MetadataService::with_catalog(Arc::clone(&catalog), settings.metadata.unknown_path);

        let store: Arc<dyn CatalogStore> = match settings.store.backend {
            StoreBackend::Memory => Arc::new(MemoryStore::new()),
            StoreBackend::Sqlite => match settings.store.resolved_path()? {
                Some(path) => Arc::new(SqliteStore::open(path)?),
                None => Arc::new(SqliteStore::open_default()?),
            },
        };

        if settings.store.seed_demo && is_empty(store.as_ref())? {
            seed_demo(store.as_ref(), &catalog)?;
            tracing::info!("seeded demo data sources and recent tables");
        }

        Ok(Self {
            metadata: Arc::new(metadata),
            store,
        })
    }
}

fn is_empty(store: &dyn CatalogStore) -> Result<bool, ServeError> {
    Ok(store.list_data_sources(None)?.is_empty() && store.list_recent_tables(None)?.is_empty())
}

/// Build the axum router with all routes.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Table metadata routes
        .route("/api/metadata", get(metadata::get_metadata))
        .route("/api/schema", get(metadata::get_schema))
        .route("/api/partitions", get(metadata::get_partitions))
        .route("/api/versions", get(metadata::get_versions))
        .route("/api/properties", get(metadata::get_properties))
        .route("/api/sample-data", get(metadata::get_sample_data))
        .route("/api/detect", get(metadata::detect_format))
        // Table catalog routes
        .route("/api/tables", get(metadata::list_tables))
        .route(
            "/api/tables/format/{format}",
            get(metadata::list_tables_by_format),
        )
        // Bookmark and history routes
        .route(
            "/api/datasources",
            get(catalog::list_data_sources).post(catalog::create_data_source),
        )
        .route("/api/datasources/{id}", delete(catalog::delete_data_source))
        .route("/api/recent-tables", get(catalog::list_recent_tables))
        .route("/api/health", get(health))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// GET /api/health - Liveness and build version
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Start the web server and run until Ctrl+C.
pub async fn serve(settings: Settings) -> Result<(), ServeError> {
    let state = AppState::from_settings(&settings)?;
    let app = router(state);

    let addr = settings.server.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!(
        addr = %listener.local_addr()?,
        policy = ?settings.metadata.unknown_path,
        store = ?settings.store.backend,
        "lakeview metadata API listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
