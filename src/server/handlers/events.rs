//! Event and registration endpoints.

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::Deserialize;
use tracing::info;

use super::super::AppState;
use super::helpers::{require_actor, ApiError};
use crate::models::{Event, EventStatus, ExtractedStudentRecord, Registration, Role};
use crate::repository::StoreError;

#[derive(Debug, Deserialize)]
pub struct CreateEvent {
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub representative_ids: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub status: String,
}

fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

pub async fn list_events(State(state): State<AppState>) -> Result<Json<Vec<Event>>, ApiError> {
    Ok(Json(state.store.list_events().await?))
}

pub async fn get_event(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Event>, ApiError> {
    let event = state
        .store
        .get_event_by_slug(&slug)
        .await?
        .ok_or_else(|| StoreError::NotFound(format!("event {}", slug)))?;
    Ok(Json(event))
}

pub async fn create_event(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<CreateEvent>,
) -> Result<(StatusCode, Json<Event>), ApiError> {
    let actor = require_actor(&state, &headers, Role::can_manage_events).await?;
    if !is_valid_slug(&request.slug) {
        return Err(StoreError::Invalid(format!(
            "slug '{}' must be lowercase letters, digits and dashes",
            request.slug
        ))
        .into());
    }

    let mut event = Event::new(request.slug, request.title);
    event.representative_ids = request.representative_ids;
    state.store.put_event(event.clone()).await?;
    info!("{} created event {}", actor.id, event.slug);
    Ok((StatusCode::CREATED, Json(event)))
}

pub async fn update_event_status(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    headers: HeaderMap,
    Json(update): Json<StatusUpdate>,
) -> Result<Json<Event>, ApiError> {
    let actor = require_actor(&state, &headers, Role::can_manage_events).await?;
    let status = EventStatus::from_str(&update.status)
        .ok_or_else(|| StoreError::Invalid(format!("unknown event status '{}'", update.status)))?;

    let event = state.store.update_event_status(&slug, status).await?;
    info!("{} set event {} to {}", actor.id, slug, status.as_str());
    Ok(Json(event))
}

pub async fn list_registrations(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    headers: HeaderMap,
) -> Result<Json<Vec<Registration>>, ApiError> {
    require_actor(&state, &headers, Role::can_review_registrations).await?;
    Ok(Json(state.store.list_registrations(&slug).await?))
}

/// Persist students, typically the `data` of a successful form scan.
pub async fn add_registrations(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    headers: HeaderMap,
    Json(records): Json<Vec<ExtractedStudentRecord>>,
) -> Result<(StatusCode, Json<Vec<Registration>>), ApiError> {
    let actor = require_actor(&state, &headers, Role::can_review_registrations).await?;
    let created = state.store.add_registrations(&slug, records).await?;
    info!(
        "{} registered {} student(s) for {}",
        actor.id,
        created.len(),
        slug
    );
    Ok((StatusCode::CREATED, Json(created)))
}
