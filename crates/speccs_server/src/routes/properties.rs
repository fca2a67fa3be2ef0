//! Property endpoints and their nested buildings.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use speccs_core::{Building, BuildingFields, Property, PropertyFields};

use crate::error::ApiError;
use crate::extractors::IdPath;
use crate::state::AppState;

/// GET /properties
async fn list_properties(State(state): State<AppState>) -> Result<Json<Vec<Property>>, ApiError> {
    let properties = state
        .with_store(None, |store| store.list_properties())
        .await?;
    Ok(Json(properties))
}

/// POST /properties
async fn create_property(
    State(state): State<AppState>,
    Json(fields): Json<PropertyFields>,
) -> Result<(StatusCode, Json<Property>), ApiError> {
    let property = state
        .with_store(None, move |store| store.create_property(&fields))
        .await?;
    Ok((StatusCode::CREATED, Json(property)))
}

/// GET /properties/{id}
async fn get_property(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> Result<Json<Property>, ApiError> {
    let property = state
        .with_store(None, move |store| store.get_property(id))
        .await?;
    Ok(Json(property))
}

/// PUT /properties/{id}
async fn update_property(
    State(state): State<AppState>,
    IdPath(id): IdPath,
    Json(fields): Json<PropertyFields>,
) -> Result<Json<Property>, ApiError> {
    let property = state
        .with_store(None, move |store| store.update_property(id, &fields))
        .await?;
    Ok(Json(property))
}

/// DELETE /properties/{id} - cascades through the whole subtree
async fn delete_property(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> Result<StatusCode, ApiError> {
    state
        .with_store(None, move |store| store.delete_property(id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /properties/{id}/buildings
async fn list_buildings(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> Result<Json<Vec<Building>>, ApiError> {
    let buildings = state
        .with_store(None, move |store| store.list_buildings(id))
        .await?;
    Ok(Json(buildings))
}

/// POST /properties/{id}/buildings
async fn create_building(
    State(state): State<AppState>,
    IdPath(id): IdPath,
    Json(fields): Json<BuildingFields>,
) -> Result<(StatusCode, Json<Building>), ApiError> {
    let building = state
        .with_store(None, move |store| store.create_building(id, &fields))
        .await?;
    Ok((StatusCode::CREATED, Json(building)))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/properties", get(list_properties).post(create_property))
        .route(
            "/properties/{id}",
            get(get_property)
                .put(update_property)
                .delete(delete_property),
        )
        .route(
            "/properties/{id}/buildings",
            get(list_buildings).post(create_building),
        )
}
