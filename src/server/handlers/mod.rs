//! HTTP request handlers for the web server.

mod api;
mod events;
mod helpers;
mod ocr;
mod profiles;

// Re-export handlers for use by the router
pub use api::health;
pub use events::{
    add_registrations, create_event, get_event, list_events, list_registrations,
    update_event_status,
};
pub use helpers::ACTOR_HEADER;
pub use ocr::scan_registration_form;
pub use profiles::{create_profile, get_profile, list_profiles, update_profile_status};
