//! Root greeting, liveness and database reachability endpoints.

use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;
use speccs_core::db::migrations::current_user_version;
use speccs_core::StoreError;

use crate::error::ApiError;
use crate::state::AppState;

pub const GREETING: &str = "Hello, Speccs World!";

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

#[derive(Serialize)]
pub struct DbCheckResponse {
    pub status: &'static str,
    pub schema_version: u32,
}

/// GET /
async fn index() -> &'static str {
    GREETING
}

/// GET /health
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// GET /db_check - round-trips a query through the shared connection
async fn db_check(State(state): State<AppState>) -> Result<Json<DbCheckResponse>, ApiError> {
    let schema_version = state
        .with_connection(|conn| {
            conn.query_row("SELECT 1;", [], |row| row.get::<_, i64>(0))
                .map_err(StoreError::from)?;
            Ok(current_user_version(conn).map_err(StoreError::from)?)
        })
        .await?;

    Ok(Json(DbCheckResponse {
        status: "ok",
        schema_version,
    }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/db_check", get(db_check))
}
