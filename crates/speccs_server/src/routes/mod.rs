//! HTTP route modules.

pub mod assets;
pub mod buildings;
pub mod connections;
pub mod floors;
pub mod properties;
pub mod rooms;
pub mod system;
pub mod taxonomy;

use axum::Router;

use crate::state::AppState;

/// Builds the full application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(system::router())
        .merge(properties::router())
        .merge(buildings::router())
        .merge(floors::router())
        .merge(rooms::router())
        .merge(assets::router())
        .merge(connections::router())
        .merge(taxonomy::router())
        .with_state(state)
}
