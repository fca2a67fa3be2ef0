//! Floor endpoints and their nested rooms.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use speccs_core::{Floor, FloorFields, Room, RoomFields};

use crate::error::ApiError;
use crate::extractors::IdPath;
use crate::state::AppState;

/// GET /floors/{id}
async fn get_floor(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> Result<Json<Floor>, ApiError> {
    let floor = state
        .with_store(None, move |store| store.get_floor(id))
        .await?;
    Ok(Json(floor))
}

/// PUT /floors/{id}
async fn update_floor(
    State(state): State<AppState>,
    IdPath(id): IdPath,
    Json(fields): Json<FloorFields>,
) -> Result<Json<Floor>, ApiError> {
    let floor = state
        .with_store(None, move |store| store.update_floor(id, &fields))
        .await?;
    Ok(Json(floor))
}

/// DELETE /floors/{id}
async fn delete_floor(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> Result<StatusCode, ApiError> {
    state
        .with_store(None, move |store| store.delete_floor(id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /floors/{id}/rooms
async fn list_rooms(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> Result<Json<Vec<Room>>, ApiError> {
    let rooms = state
        .with_store(None, move |store| store.list_rooms(id))
        .await?;
    Ok(Json(rooms))
}

/// POST /floors/{id}/rooms
async fn create_room(
    State(state): State<AppState>,
    IdPath(id): IdPath,
    Json(fields): Json<RoomFields>,
) -> Result<(StatusCode, Json<Room>), ApiError> {
    let room = state
        .with_store(None, move |store| store.create_room(id, &fields))
        .await?;
    Ok((StatusCode::CREATED, Json(room)))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/floors/{id}",
            get(get_floor).put(update_floor).delete(delete_floor),
        )
        .route("/floors/{id}/rooms", get(list_rooms).post(create_room))
}
