//! Events students register for.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle state of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    #[default]
    Draft,
    Open,
    Closed,
}

impl EventStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Open => "open",
            Self::Closed => "closed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(Self::Draft),
            "open" => Some(Self::Open),
            "closed" => Some(Self::Closed),
            _ => None,
        }
    }

    /// Whether new registrations are accepted.
    pub fn accepts_registrations(&self) -> bool {
        matches!(self, Self::Open)
    }
}

/// An event document, addressed by its slug.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    /// URL-safe unique key.
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub status: EventStatus,
    /// Profile ids of the event's representatives.
    #[serde(default)]
    pub representative_ids: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl Event {
    pub fn new(slug: String, title: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            slug,
            title,
            status: EventStatus::default(),
            representative_ids: Vec::new(),
            created_at: Utc::now(),
        }
    }
}
