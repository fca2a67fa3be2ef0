//! Room endpoints, reference door and room-scoped asset listing.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::{get, put};
use axum::{Json, Router};
use serde::Deserialize;
use speccs_core::{Asset, AssetListQuery, Room, RoomFields, RoomScope};
use uuid::Uuid;

use crate::error::ApiError;
use crate::extractors::IdPath;
use crate::routes::assets::AssetFilterParams;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ReferenceDoorRequest {
    /// `null` clears the reference.
    pub asset_id: Option<Uuid>,
}

/// GET /rooms/{id}
async fn get_room(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> Result<Json<Room>, ApiError> {
    let room = state
        .with_store(None, move |store| store.get_room(id))
        .await?;
    Ok(Json(room))
}

/// PUT /rooms/{id}
async fn update_room(
    State(state): State<AppState>,
    IdPath(id): IdPath,
    Json(fields): Json<RoomFields>,
) -> Result<Json<Room>, ApiError> {
    let room = state
        .with_store(None, move |store| store.update_room(id, &fields))
        .await?;
    Ok(Json(room))
}

/// DELETE /rooms/{id}
async fn delete_room(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> Result<StatusCode, ApiError> {
    state
        .with_store(None, move |store| store.delete_room(id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /rooms/{id}/reference-door
async fn set_reference_door(
    State(state): State<AppState>,
    IdPath(id): IdPath,
    Json(req): Json<ReferenceDoorRequest>,
) -> Result<Json<Room>, ApiError> {
    let room = state
        .with_store(None, move |store| store.set_reference_door(id, req.asset_id))
        .await?;
    Ok(Json(room))
}

/// GET /rooms/{id}/assets
async fn list_room_assets(
    State(state): State<AppState>,
    IdPath(id): IdPath,
    Query(params): Query<AssetFilterParams>,
) -> Result<Json<Vec<Asset>>, ApiError> {
    let mut query: AssetListQuery = params.into_query()?;
    query.room = RoomScope::Room(id);
    let assets = state
        .with_store(None, move |store| store.list_assets(&query))
        .await?;
    Ok(Json(assets))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/rooms/{id}",
            get(get_room).put(update_room).delete(delete_room),
        )
        .route("/rooms/{id}/reference-door", put(set_reference_door))
        .route("/rooms/{id}/assets", get(list_room_assets))
}
