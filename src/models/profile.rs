//! User profiles and platform roles.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Platform role attached to a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[default]
    Student,
    Organizer,
    EventRepresentative,
    OverallHead,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::Organizer => "organizer",
            Self::EventRepresentative => "event_representative",
            Self::OverallHead => "overall_head",
            Self::Admin => "admin",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "student" => Some(Self::Student),
            "organizer" => Some(Self::Organizer),
            "event_representative" | "event-representative" | "rep" => {
                Some(Self::EventRepresentative)
            }
            "overall_head" | "overall-head" => Some(Self::OverallHead),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }

    /// Whether this role may create events and change event or profile status.
    pub fn can_manage_events(&self) -> bool {
        matches!(self, Self::OverallHead | Self::Admin)
    }

    /// Whether this role may view and submit registrations for events.
    pub fn can_review_registrations(&self) -> bool {
        !matches!(self, Self::Student)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Approval state of a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl ProfileStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }
}

/// A user profile document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Identity provider user id.
    pub id: String,
    pub email: String,
    pub display_name: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub status: ProfileStatus,
    pub created_at: DateTime<Utc>,
}

impl UserProfile {
    pub fn new(id: String, email: String, display_name: String, role: Role) -> Self {
        Self {
            id,
            email,
            display_name,
            role,
            status: ProfileStatus::default(),
            created_at: Utc::now(),
        }
    }
}
