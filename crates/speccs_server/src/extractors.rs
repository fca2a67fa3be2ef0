//! Custom Axum extractors.

use axum::extract::{FromRequestParts, Path};
use axum::http::request::Parts;
use uuid::Uuid;

use crate::error::ApiError;

/// Header naming the journal actor for the request.
pub const ACTOR_HEADER: &str = "x-actor";

/// Journal actor from `X-Actor`; `None` means the store default.
pub struct Actor(pub Option<String>);

impl<S> FromRequestParts<S> for Actor
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Some(value) = parts.headers.get(ACTOR_HEADER) else {
            return Ok(Self(None));
        };
        let actor = value
            .to_str()
            .map_err(|_| ApiError::bad_request("X-Actor header must be visible ASCII"))?;
        // Blank values are passed through so the store rejects them.
        Ok(Self(Some(actor.to_string())))
    }
}

/// Single UUID path segment.
pub struct IdPath(pub Uuid);

impl<S> FromRequestParts<S> for IdPath
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id): Path<String> = Path::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::bad_request("missing id path segment"))?;

        let uuid = Uuid::parse_str(&id)
            .map_err(|_| ApiError::bad_request(format!("`{id}` is not a valid UUID")))?;
        Ok(Self(uuid))
    }
}
