//! In-memory document store.

use std::collections::HashMap;
use std::sync::OnceLock;

use async_trait::async_trait;
use regex::Regex;
use tokio::sync::RwLock;

use super::{DocumentStore, StoreError, StoreResult};
use crate::models::{
    Event, EventStatus, ExtractedStudentRecord, ProfileStatus, Registration, Role, UserProfile,
};

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern is a valid regex")
    })
}

/// Check a student record before it is persisted.
fn validate_record(index: usize, record: &ExtractedStudentRecord) -> StoreResult<()> {
    if record.name.trim().is_empty() {
        return Err(StoreError::Invalid(format!("record {}: name is required", index)));
    }
    let email = record.email.trim();
    if !email.is_empty() && !email_pattern().is_match(email) {
        return Err(StoreError::Invalid(format!(
            "record {}: '{}' is not an email address",
            index, email
        )));
    }
    Ok(())
}

#[derive(Default)]
pub struct MemoryStore {
    profiles: RwLock<HashMap<String, UserProfile>>,
    /// Keyed by slug.
    events: RwLock<HashMap<String, Event>>,
    /// Keyed by event slug, in insertion order.
    registrations: RwLock<HashMap<String, Vec<Registration>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get_profile(&self, id: &str) -> StoreResult<Option<UserProfile>> {
        Ok(self.profiles.read().await.get(id).cloned())
    }

    async fn put_profile(&self, profile: UserProfile) -> StoreResult<()> {
        self.profiles
            .write()
            .await
            .insert(profile.id.clone(), profile);
        Ok(())
    }

    async fn create_profile(&self, profile: UserProfile) -> StoreResult<()> {
        let mut profiles = self.profiles.write().await;
        if profiles.contains_key(&profile.id) {
            return Err(StoreError::Conflict(format!(
                "profile {} already exists",
                profile.id
            )));
        }
        profiles.insert(profile.id.clone(), profile);
        Ok(())
    }

    async fn list_profiles(&self, role: Option<Role>) -> StoreResult<Vec<UserProfile>> {
        let mut profiles: Vec<UserProfile> = self
            .profiles
            .read()
            .await
            .values()
            .filter(|p| role.map_or(true, |r| p.role == r))
            .cloned()
            .collect();
        profiles.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(profiles)
    }

    async fn update_profile_status(
        &self,
        id: &str,
        status: ProfileStatus,
    ) -> StoreResult<UserProfile> {
        let mut profiles = self.profiles.write().await;
        let profile = profiles
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(format!("profile {}", id)))?;
        profile.status = status;
        Ok(profile.clone())
    }

    async fn get_event_by_slug(&self, slug: &str) -> StoreResult<Option<Event>> {
        Ok(self.events.read().await.get(slug).cloned())
    }

    async fn put_event(&self, event: Event) -> StoreResult<()> {
        let mut events = self.events.write().await;
        if events.contains_key(&event.slug) {
            return Err(StoreError::Conflict(format!(
                "event slug '{}' is taken",
                event.slug
            )));
        }
        events.insert(event.slug.clone(), event);
        Ok(())
    }

    async fn list_events(&self) -> StoreResult<Vec<Event>> {
        let mut events: Vec<Event> = self.events.read().await.values().cloned().collect();
        events.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.slug.cmp(&b.slug)));
        Ok(events)
    }

    async fn update_event_status(&self, slug: &str, status: EventStatus) -> StoreResult<Event> {
        let mut events = self.events.write().await;
        let event = events
            .get_mut(slug)
            .ok_or_else(|| StoreError::NotFound(format!("event {}", slug)))?;
        event.status = status;
        Ok(event.clone())
    }

    async fn add_registrations(
        &self,
        slug: &str,
        records: Vec<ExtractedStudentRecord>,
    ) -> StoreResult<Vec<Registration>> {
        // Held until the batch is stored so the event cannot close in between.
        let events = self.events.read().await;
        let status = events
            .get(slug)
            .map(|e| e.status)
            .ok_or_else(|| StoreError::NotFound(format!("event {}", slug)))?;
        if !status.accepts_registrations() {
            return Err(StoreError::Invalid(format!(
                "event '{}' is {} and not accepting registrations",
                slug,
                status.as_str()
            )));
        }

        // All-or-nothing: one bad record rejects the batch.
        for (index, record) in records.iter().enumerate() {
            validate_record(index, record)?;
        }

        let created: Vec<Registration> = records
            .into_iter()
            .map(|record| Registration::new(slug.to_string(), record))
            .collect();
        self.registrations
            .write()
            .await
            .entry(slug.to_string())
            .or_default()
            .extend(created.iter().cloned());
        drop(events);
        Ok(created)
    }

    async fn list_registrations(&self, slug: &str) -> StoreResult<Vec<Registration>> {
        if self.events.read().await.get(slug).is_none() {
            return Err(StoreError::NotFound(format!("event {}", slug)));
        }
        Ok(self
            .registrations
            .read()
            .await
            .get(slug)
            .cloned()
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn student(name: &str, email: &str) -> ExtractedStudentRecord {
        ExtractedStudentRecord {
            name: name.to_string(),
            email: email.to_string(),
            ..Default::default()
        }
    }

    async fn store_with_event(status: EventStatus) -> MemoryStore {
        let store = MemoryStore::new();
        let mut event = Event::new("hackfest".to_string(), "Hack Fest".to_string());
        event.status = status;
        store.put_event(event).await.unwrap();
        store
    }

    #[tokio::test]
    async fn test_duplicate_slug_conflicts() {
        let store = store_with_event(EventStatus::Draft).await;
        let again = Event::new("hackfest".to_string(), "Other".to_string());
        assert!(matches!(
            store.put_event(again).await,
            Err(StoreError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_registrations_require_open_event() {
        let store = store_with_event(EventStatus::Draft).await;
        let err = store
            .add_registrations("hackfest", vec![student("Jane", "")])
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Invalid(_)));

        store
            .update_event_status("hackfest", EventStatus::Open)
            .await
            .unwrap();
        let created = store
            .add_registrations("hackfest", vec![student("Jane", "jane@example.com")])
            .await
            .unwrap();
        assert_eq!(created.len(), 1);
        assert_eq!(store.list_registrations("hackfest").await.unwrap(), created);
    }

    #[tokio::test]
    async fn test_bad_record_rejects_whole_batch() {
        let store = store_with_event(EventStatus::Open).await;
        let err = store
            .add_registrations(
                "hackfest",
                vec![student("Jane", "jane@example.com"), student("Sam", "sam-at-home")],
            )
            .await
            .unwrap_err();
        assert_eq!(
            err,
            StoreError::Invalid("record 1: 'sam-at-home' is not an email address".to_string())
        );
        assert!(store.list_registrations("hackfest").await.unwrap().is_empty());

        let err = store
            .add_registrations("hackfest", vec![student("  ", "")])
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Invalid(msg) if msg.contains("name")));
    }

    #[tokio::test]
    async fn test_unknown_event() {
        let store = MemoryStore::new();
        assert!(matches!(
            store.list_registrations("nope").await,
            Err(StoreError::NotFound(_))
        ));
        assert!(matches!(
            store.add_registrations("nope", vec![]).await,
            Err(StoreError::NotFound(_))
        ));
        assert!(store.get_event_by_slug("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_create_profile_does_not_overwrite() {
        let store = MemoryStore::new();
        let mut admin = UserProfile::new(
            "u1".to_string(),
            "head@fest.edu".to_string(),
            "Head".to_string(),
            Role::Admin,
        );
        admin.status = ProfileStatus::Approved;
        store.create_profile(admin.clone()).await.unwrap();

        let impostor = UserProfile::new(
            "u1".to_string(),
            "other@fest.edu".to_string(),
            "Other".to_string(),
            Role::Student,
        );
        assert!(matches!(
            store.create_profile(impostor).await,
            Err(StoreError::Conflict(_))
        ));
        assert_eq!(store.get_profile("u1").await.unwrap(), Some(admin));
    }

    #[tokio::test]
    async fn test_profile_status_and_role_filter() {
        let store = MemoryStore::new();
        store
            .put_profile(UserProfile::new(
                "u1".to_string(),
                "head@fest.edu".to_string(),
                "Head".to_string(),
                Role::OverallHead,
            ))
            .await
            .unwrap();
        store
            .put_profile(UserProfile::new(
                "u2".to_string(),
                "kid@fest.edu".to_string(),
                "Kid".to_string(),
                Role::Student,
            ))
            .await
            .unwrap();

        let heads = store.list_profiles(Some(Role::OverallHead)).await.unwrap();
        assert_eq!(heads.len(), 1);
        assert_eq!(heads[0].id, "u1");
        assert_eq!(store.list_profiles(None).await.unwrap().len(), 2);

        let updated = store
            .update_profile_status("u2", ProfileStatus::Approved)
            .await
            .unwrap();
        assert_eq!(updated.status, ProfileStatus::Approved);
        assert!(matches!(
            store.update_profile_status("u9", ProfileStatus::Approved).await,
            Err(StoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_closing_waits_for_inflight_registration() {
        let store = std::sync::Arc::new(store_with_event(EventStatus::Open).await);

        let registering = {
            let store = store.clone();
            tokio::spawn(async move {
                store
                    .add_registrations("hackfest", vec![student("Jane", "jane@example.com")])
                    .await
            })
        };
        let closing = {
            let store = store.clone();
            tokio::spawn(async move {
                store
                    .update_event_status("hackfest", EventStatus::Closed)
                    .await
            })
        };
        let registered = registering.await.unwrap();
        closing.await.unwrap().unwrap();

        // Either the batch landed before the close, or it was refused; never
        // a stored batch for an event that was already closed.
        let stored = store.list_registrations("hackfest").await.unwrap();
        match registered {
            Ok(created) => assert_eq!(stored, created),
            Err(err) => {
                assert!(matches!(err, StoreError::Invalid(_)));
                assert!(stored.is_empty());
            }
        }
        assert!(matches!(
            store
                .add_registrations("hackfest", vec![student("Sam", "")])
                .await,
            Err(StoreError::Invalid(_))
        ));
    }
}
