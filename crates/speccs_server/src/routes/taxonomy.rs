//! Taxonomy registry endpoints.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use speccs_core::repo::taxonomy_repo::TaxonomyTerm;
use speccs_core::TaxonomyCategory;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterTermRequest {
    pub tag: String,
    #[serde(default)]
    pub description: String,
}

fn parse_category(value: &str) -> Result<TaxonomyCategory, ApiError> {
    TaxonomyCategory::parse(value).ok_or_else(|| {
        ApiError::bad_request(format!(
            "unknown taxonomy `{value}`; expected asset_type|connection_type|journal_action"
        ))
    })
}

/// GET /taxonomy/{category}
async fn list_terms(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> Result<Json<Vec<TaxonomyTerm>>, ApiError> {
    let category = parse_category(&category)?;
    let terms = state
        .with_store(None, move |store| store.list_terms(category))
        .await?;
    Ok(Json(terms))
}

/// POST /taxonomy/{category}
async fn register_term(
    State(state): State<AppState>,
    Path(category): Path<String>,
    Json(req): Json<RegisterTermRequest>,
) -> Result<(StatusCode, Json<TaxonomyTerm>), ApiError> {
    let category = parse_category(&category)?;
    let term = state
        .with_store(None, move |store| {
            store.register_term(category, &req.tag, &req.description)
        })
        .await?;
    Ok((StatusCode::CREATED, Json(term)))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/taxonomy/{category}", get(list_terms).post(register_term))
}
