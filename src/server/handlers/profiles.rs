//! Profile endpoints.

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::Deserialize;
use tracing::info;

use super::super::AppState;
use super::helpers::{require_actor, ApiError};
use crate::models::{ProfileStatus, Role, UserProfile};
use crate::repository::StoreError;

#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub status: String,
}

/// Onboarding request. `id` is the identity provider's user id.
#[derive(Debug, Deserialize)]
pub struct NewProfile {
    pub id: String,
    pub email: String,
    pub display_name: String,
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ProfileFilter {
    pub role: Option<String>,
}

fn parse_role(role: &str) -> Result<Role, StoreError> {
    Role::from_str(role).ok_or_else(|| StoreError::Invalid(format!("unknown role '{}'", role)))
}

/// Onboard a user. The profile starts pending, whatever role it asks for,
/// until an event-managing role approves it.
pub async fn create_profile(
    State(state): State<AppState>,
    Json(request): Json<NewProfile>,
) -> Result<(StatusCode, Json<UserProfile>), ApiError> {
    if request.id.trim().is_empty() {
        return Err(StoreError::Invalid("profile id is required".to_string()).into());
    }
    let role = match request.role.as_deref() {
        Some(role) => parse_role(role)?,
        None => Role::default(),
    };

    let profile = UserProfile::new(request.id, request.email, request.display_name, role);
    state.store.create_profile(profile.clone()).await?;
    info!("Onboarded profile {} as {} (pending)", profile.id, role);
    Ok((StatusCode::CREATED, Json(profile)))
}

/// List profiles, optionally by role. Requires an event-managing role.
pub async fn list_profiles(
    State(state): State<AppState>,
    Query(filter): Query<ProfileFilter>,
    headers: HeaderMap,
) -> Result<Json<Vec<UserProfile>>, ApiError> {
    require_actor(&state, &headers, Role::can_manage_events).await?;
    let role = filter.role.as_deref().map(parse_role).transpose()?;
    Ok(Json(state.store.list_profiles(role).await?))
}

pub async fn get_profile(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<UserProfile>, ApiError> {
    let profile = state
        .store
        .get_profile(&id)
        .await?
        .ok_or_else(|| StoreError::NotFound(format!("profile {}", id)))?;
    Ok(Json(profile))
}

/// Approve or reject a profile. Requires an event-managing role.
pub async fn update_profile_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(update): Json<StatusUpdate>,
) -> Result<Json<UserProfile>, ApiError> {
    let actor = require_actor(&state, &headers, Role::can_manage_events).await?;
    let status = ProfileStatus::from_str(&update.status).ok_or_else(|| {
        StoreError::Invalid(format!("unknown profile status '{}'", update.status))
    })?;

    let profile = state.store.update_profile_status(&id, status).await?;
    info!("{} set profile {} to {}", actor.id, id, status.as_str());
    Ok(Json(profile))
}
