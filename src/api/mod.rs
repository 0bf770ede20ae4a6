//! HTTP JSON API over the metadata service and catalog store.
//!
//! All routes live under `/api`; errors are returned as `{"error": message}`.

mod catalog;
mod error;
mod metadata;
mod server;

pub use catalog::{DeleteResponse, UserQuery};
pub use error::{ApiError, ServeError, PATH_REQUIRED};
pub use metadata::{
    parse_format_filter, parse_user_id, DetectResponse, ListTablesQuery, TableQuery,
};
pub use server::{router, serve, AppState};
