//! Data access for profiles, events and registrations.
//!
//! [`DocumentStore`] is the contract the app uses against its hosted document
//! database. [`MemoryStore`] implements it in-process for development and
//! tests.

mod memory;

pub use memory::MemoryStore;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{
    Event, EventStatus, ExtractedStudentRecord, ProfileStatus, Registration, Role, UserProfile,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid: {0}")]
    Invalid(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get_profile(&self, id: &str) -> StoreResult<Option<UserProfile>>;

    /// Insert or replace a profile.
    async fn put_profile(&self, profile: UserProfile) -> StoreResult<()>;

    /// Insert a new profile. Fails with `Conflict` if the id is taken.
    async fn create_profile(&self, profile: UserProfile) -> StoreResult<()>;

    /// All profiles, optionally restricted to one role, oldest first.
    async fn list_profiles(&self, role: Option<Role>) -> StoreResult<Vec<UserProfile>>;

    async fn update_profile_status(
        &self,
        id: &str,
        status: ProfileStatus,
    ) -> StoreResult<UserProfile>;

    async fn get_event_by_slug(&self, slug: &str) -> StoreResult<Option<Event>>;

    /// Insert a new event. Slugs are unique.
    async fn put_event(&self, event: Event) -> StoreResult<()>;

    async fn list_events(&self) -> StoreResult<Vec<Event>>;

    async fn update_event_status(&self, slug: &str, status: EventStatus) -> StoreResult<Event>;

    /// Validate and persist students for an open event.
    async fn add_registrations(
        &self,
        slug: &str,
        records: Vec<ExtractedStudentRecord>,
    ) -> StoreResult<Vec<Registration>>;

    async fn list_registrations(&self, slug: &str) -> StoreResult<Vec<Registration>>;
}
