//! Connection endpoints.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use speccs_core::{Connection, NewConnection};

use crate::error::ApiError;
use crate::extractors::{Actor, IdPath};
use crate::state::AppState;

/// POST /connections
async fn create_connection(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Json(input): Json<NewConnection>,
) -> Result<(StatusCode, Json<Connection>), ApiError> {
    let connection = state
        .with_store(actor, move |store| store.create_connection(&input))
        .await?;
    Ok((StatusCode::CREATED, Json(connection)))
}

/// GET /connections/{id}
async fn get_connection(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> Result<Json<Connection>, ApiError> {
    let connection = state
        .with_store(None, move |store| store.get_connection(id))
        .await?;
    Ok(Json(connection))
}

/// DELETE /connections/{id}
async fn delete_connection(
    State(state): State<AppState>,
    Actor(actor): Actor,
    IdPath(id): IdPath,
) -> Result<StatusCode, ApiError> {
    state
        .with_store(actor, move |store| store.delete_connection(id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/connections", post(create_connection))
        .route(
            "/connections/{id}",
            get(get_connection).delete(delete_connection),
        )
}
