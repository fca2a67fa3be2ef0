//! Building endpoints and their nested floors.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use speccs_core::{Building, BuildingFields, Floor, FloorFields};

use crate::error::ApiError;
use crate::extractors::IdPath;
use crate::state::AppState;

/// GET /buildings/{id}
async fn get_building(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> Result<Json<Building>, ApiError> {
    let building = state
        .with_store(None, move |store| store.get_building(id))
        .await?;
    Ok(Json(building))
}

/// PUT /buildings/{id}
async fn update_building(
    State(state): State<AppState>,
    IdPath(id): IdPath,
    Json(fields): Json<BuildingFields>,
) -> Result<Json<Building>, ApiError> {
    let building = state
        .with_store(None, move |store| store.update_building(id, &fields))
        .await?;
    Ok(Json(building))
}

/// DELETE /buildings/{id}
async fn delete_building(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> Result<StatusCode, ApiError> {
    state
        .with_store(None, move |store| store.delete_building(id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /buildings/{id}/floors - ordered by level
async fn list_floors(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> Result<Json<Vec<Floor>>, ApiError> {
    let floors = state
        .with_store(None, move |store| store.list_floors(id))
        .await?;
    Ok(Json(floors))
}

/// POST /buildings/{id}/floors
async fn create_floor(
    State(state): State<AppState>,
    IdPath(id): IdPath,
    Json(fields): Json<FloorFields>,
) -> Result<(StatusCode, Json<Floor>), ApiError> {
    let floor = state
        .with_store(None, move |store| store.create_floor(id, &fields))
        .await?;
    Ok((StatusCode::CREATED, Json(floor)))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/buildings/{id}",
            get(get_building)
                .put(update_building)
                .delete(delete_building),
        )
        .route("/buildings/{id}/floors", get(list_floors).post(create_floor))
}
