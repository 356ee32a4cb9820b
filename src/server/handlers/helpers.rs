//! Shared handler helpers: error responses and actor authorization.

use axum::{
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use super::super::AppState;
use crate::models::{ProfileStatus, Role, UserProfile};
use crate::repository::StoreError;

/// Header naming the profile performing an admin action.
pub const ACTOR_HEADER: &str = "x-actor-id";

/// Error responses rendered as `{ "error": "..." }`.
#[derive(Debug)]
pub enum ApiError {
    Unauthorized(String),
    Forbidden(String),
    Store(StoreError),
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::Store(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            ApiError::Store(err) => {
                let status = match err {
                    StoreError::NotFound(_) => StatusCode::NOT_FOUND,
                    StoreError::Conflict(_) => StatusCode::CONFLICT,
                    StoreError::Invalid(_) => StatusCode::UNPROCESSABLE_ENTITY,
                };
                (status, err.to_string())
            }
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

/// Resolve the acting profile and check its role.
///
/// Only approved profiles may act; a freshly onboarded profile is pending.
pub async fn require_actor(
    state: &AppState,
    headers: &HeaderMap,
    allowed: fn(&Role) -> bool,
) -> Result<UserProfile, ApiError> {
    let actor_id = headers
        .get(ACTOR_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::Unauthorized(format!("Missing {} header", ACTOR_HEADER)))?;

    let actor = state
        .store
        .get_profile(actor_id)
        .await?
        .ok_or_else(|| ApiError::Unauthorized(format!("Unknown actor {}", actor_id)))?;

    if actor.status != ProfileStatus::Approved {
        return Err(ApiError::Forbidden(format!(
            "Profile {} is {}",
            actor.id,
            actor.status.as_str()
        )));
    }
    if !allowed(&actor.role) {
        return Err(ApiError::Forbidden(format!(
            "Role {} may not perform this action",
            actor.role
        )));
    }
    Ok(actor)
}
