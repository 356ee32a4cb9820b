//! Persisted student registrations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ExtractedStudentRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationStatus {
    #[default]
    Pending,
    Confirmed,
    Rejected,
}

impl RegistrationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Rejected => "rejected",
        }
    }
}

/// A student registered for an event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Registration {
    pub id: String,
    pub event_slug: String,
    pub student: ExtractedStudentRecord,
    #[serde(default)]
    pub status: RegistrationStatus,
    pub created_at: DateTime<Utc>,
}

impl Registration {
    pub fn new(event_slug: String, student: ExtractedStudentRecord) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            event_slug,
            student,
            status: RegistrationStatus::default(),
            created_at: Utc::now(),
        }
    }
}
