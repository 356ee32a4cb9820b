//! Data models for eventreg.

mod event;
mod profile;
mod registration;
mod student;

pub use event::{Event, EventStatus};
pub use profile::{ProfileStatus, Role, UserProfile};
pub use registration::{Registration, RegistrationStatus};
pub use student::ExtractedStudentRecord;
