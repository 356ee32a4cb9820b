//! Router configuration for the web server.

use axum::{
    routing::{get, patch, post},
    Router,
};
use tower_http::cors::CorsLayer;

use super::handlers;
use super::AppState;

/// Create the main router with all routes.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        // Form OCR intake
        .route(
            "/api/registration-forms/scan",
            post(handlers::scan_registration_form),
        )
        // Profiles
        .route(
            "/api/profiles",
            get(handlers::list_profiles).post(handlers::create_profile),
        )
        .route("/api/profiles/:id", get(handlers::get_profile))
        .route(
            "/api/profiles/:id/status",
            patch(handlers::update_profile_status),
        )
        // Events and registrations
        .route(
            "/api/events",
            get(handlers::list_events).post(handlers::create_event),
        )
        .route("/api/events/:slug", get(handlers::get_event))
        .route(
            "/api/events/:slug/status",
            patch(handlers::update_event_status),
        )
        .route(
            "/api/events/:slug/registrations",
            get(handlers::list_registrations).post(handlers::add_registrations),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}
