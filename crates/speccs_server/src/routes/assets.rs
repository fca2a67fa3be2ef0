//! Asset endpoints: CRUD, lifecycle, journal and graph queries.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::Deserialize;
use speccs_core::{
    Asset, AssetListQuery, AssetStatus, AssetType, Attributes, ConnectedAsset, ConnectionType,
    Direction, JournalAction, JournalEntry, RoomScope, TraceStep, TraversalQuery,
};
use uuid::Uuid;

use crate::error::ApiError;
use crate::extractors::{Actor, IdPath};
use crate::state::AppState;

/// Trace depth used when the query does not name one.
pub const DEFAULT_TRACE_DEPTH: u32 = 8;

/// Editable asset fields accepted by create, update and replace.
#[derive(Debug, Clone, Deserialize)]
pub struct AssetInput {
    pub room_id: Option<Uuid>,
    pub asset_type: AssetType,
    pub name: Option<String>,
    pub description: Option<String>,
    pub install_date: Option<String>,
    /// Omitted on update keeps the current status.
    pub status: Option<AssetStatus>,
    pub location_angle: Option<f64>,
    pub location_height: Option<f64>,
    pub location_depth: Option<f64>,
    pub wall_length: Option<f64>,
    pub wall_height: Option<f64>,
    pub wall_unit: Option<String>,
    #[serde(default)]
    pub attributes: Attributes,
}

impl AssetInput {
    fn into_asset(self, id: Uuid) -> Asset {
        let mut asset = Asset::with_id(id, self.asset_type);
        asset.room_id = self.room_id;
        asset.name = self.name;
        asset.description = self.description;
        asset.install_date = self.install_date;
        if let Some(status) = self.status {
            asset.status = status;
        }
        asset.location_angle = self.location_angle;
        asset.location_height = self.location_height;
        asset.location_depth = self.location_depth;
        asset.wall_length = self.wall_length;
        asset.wall_height = self.wall_height;
        asset.wall_unit = self.wall_unit;
        asset.attributes = self.attributes;
        asset
    }
}

/// Query string for asset listings.
#[derive(Debug, Default, Deserialize)]
pub struct AssetFilterParams {
    pub room_id: Option<Uuid>,
    /// Only assets without a room.
    pub unassigned: Option<bool>,
    /// Type prefix; `Outlet` also matches `Outlet.Duplex`.
    #[serde(rename = "type")]
    pub asset_type: Option<AssetType>,
    pub status: Option<AssetStatus>,
    pub include_deleted: Option<bool>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl AssetFilterParams {
    pub fn into_query(self) -> Result<AssetListQuery, ApiError> {
        let room = match (self.room_id, self.unassigned.unwrap_or(false)) {
            (Some(_), true) => {
                return Err(ApiError::bad_request(
                    "room_id and unassigned=true cannot be combined",
                ))
            }
            (Some(room_id), false) => RoomScope::Room(room_id),
            (None, true) => RoomScope::Unassigned,
            (None, false) => RoomScope::Any,
        };
        Ok(AssetListQuery {
            room,
            type_prefix: self.asset_type,
            status: self.status,
            include_deleted: self.include_deleted.unwrap_or(false),
            limit: self.limit,
            offset: self.offset.unwrap_or(0),
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct DeleteParams {
    #[serde(default)]
    pub purge: bool,
}

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: AssetStatus,
}

#[derive(Debug, Deserialize)]
pub struct JournalAppendRequest {
    pub action: JournalAction,
    #[serde(default)]
    pub details: Attributes,
}

#[derive(Debug, Default, Deserialize)]
pub struct TraversalParams {
    #[serde(default)]
    pub direction: Direction,
    #[serde(rename = "type")]
    pub connection_type: Option<ConnectionType>,
    pub max_depth: Option<u32>,
}

impl TraversalParams {
    fn query(&self) -> TraversalQuery {
        TraversalQuery {
            direction: self.direction,
            connection_type: self.connection_type.clone(),
        }
    }
}

/// GET /assets
async fn list_assets(
    State(state): State<AppState>,
    Query(params): Query<AssetFilterParams>,
) -> Result<Json<Vec<Asset>>, ApiError> {
    let query = params.into_query()?;
    let assets = state
        .with_store(None, move |store| store.list_assets(&query))
        .await?;
    Ok(Json(assets))
}

/// POST /assets
async fn create_asset(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Json(input): Json<AssetInput>,
) -> Result<(StatusCode, Json<Asset>), ApiError> {
    let asset = input.into_asset(Uuid::new_v4());
    let created = state
        .with_store(actor, move |store| store.create_asset(&asset))
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /assets/{id}
async fn get_asset(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> Result<Json<Asset>, ApiError> {
    let asset = state
        .with_store(None, move |store| store.get_asset(id))
        .await?;
    Ok(Json(asset))
}

/// PUT /assets/{id}
async fn update_asset(
    State(state): State<AppState>,
    Actor(actor): Actor,
    IdPath(id): IdPath,
    Json(input): Json<AssetInput>,
) -> Result<Json<Asset>, ApiError> {
    let updated = state
        .with_store(actor, move |store| {
            let current = store.get_asset(id)?;
            let status = input.status.clone().unwrap_or(current.status);
            let mut asset = input.into_asset(id);
            asset.status = status;
            store.update_asset(&asset)
        })
        .await?;
    Ok(Json(updated))
}

/// DELETE /assets/{id} - soft delete, or physical delete with `?purge=true`
async fn delete_asset(
    State(state): State<AppState>,
    Actor(actor): Actor,
    IdPath(id): IdPath,
    Query(params): Query<DeleteParams>,
) -> Result<Response, ApiError> {
    if params.purge {
        state
            .with_store(actor, move |store| store.purge_asset(id))
            .await?;
        return Ok(StatusCode::NO_CONTENT.into_response());
    }

    let asset = state
        .with_store(actor, move |store| store.soft_delete_asset(id))
        .await?;
    Ok(Json(asset).into_response())
}

/// PUT /assets/{id}/status
async fn set_status(
    State(state): State<AppState>,
    Actor(actor): Actor,
    IdPath(id): IdPath,
    Json(req): Json<StatusRequest>,
) -> Result<Json<Asset>, ApiError> {
    let asset = state
        .with_store(actor, move |store| store.set_asset_status(id, req.status))
        .await?;
    Ok(Json(asset))
}

/// POST /assets/{id}/replace - returns the replacement asset
async fn replace_asset(
    State(state): State<AppState>,
    Actor(actor): Actor,
    IdPath(id): IdPath,
    Json(input): Json<AssetInput>,
) -> Result<(StatusCode, Json<Asset>), ApiError> {
    let replacement = input.into_asset(Uuid::new_v4());
    let created = state
        .with_store(actor, move |store| store.replace_asset(id, &replacement))
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /assets/{id}/journal
async fn list_journal(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> Result<Json<Vec<JournalEntry>>, ApiError> {
    let entries = state
        .with_store(None, move |store| store.list_journal(id))
        .await?;
    Ok(Json(entries))
}

/// POST /assets/{id}/journal
async fn append_journal(
    State(state): State<AppState>,
    Actor(actor): Actor,
    IdPath(id): IdPath,
    Json(req): Json<JournalAppendRequest>,
) -> Result<(StatusCode, Json<JournalEntry>), ApiError> {
    let entry = state
        .with_store(actor, move |store| {
            store.append_journal(id, req.action, req.details)
        })
        .await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

/// GET /assets/{id}/connections
async fn connected_assets(
    State(state): State<AppState>,
    IdPath(id): IdPath,
    Query(params): Query<TraversalParams>,
) -> Result<Json<Vec<ConnectedAsset>>, ApiError> {
    let query = params.query();
    let neighbours = state
        .with_store(None, move |store| store.connected_assets(id, &query))
        .await?;
    Ok(Json(neighbours))
}

/// GET /assets/{id}/trace
async fn trace(
    State(state): State<AppState>,
    IdPath(id): IdPath,
    Query(params): Query<TraversalParams>,
) -> Result<Json<Vec<TraceStep>>, ApiError> {
    let query = params.query();
    let max_depth = params.max_depth.unwrap_or(DEFAULT_TRACE_DEPTH);
    let steps = state
        .with_store(None, move |store| store.trace(id, &query, max_depth))
        .await?;
    Ok(Json(steps))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/assets", get(list_assets).post(create_asset))
        .route(
            "/assets/{id}",
            get(get_asset).put(update_asset).delete(delete_asset),
        )
        .route("/assets/{id}/status", put(set_status))
        .route("/assets/{id}/replace", post(replace_asset))
        .route(
            "/assets/{id}/journal",
            get(list_journal).post(append_journal),
        )
        .route("/assets/{id}/connections", get(connected_assets))
        .route("/assets/{id}/trace", get(trace))
}
