//! Uniform result of a registration-form scan.

use serde::ser::{Serialize, SerializeStruct, Serializer};

use crate::models::ExtractedStudentRecord;

/// Either the extracted records or a human-readable failure message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OcrOutcome {
    Success(Vec<ExtractedStudentRecord>),
    Failure(String),
}

impl OcrOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn records(&self) -> Option<&[ExtractedStudentRecord]> {
        match self {
            Self::Success(records) => Some(records),
            Self::Failure(_) => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Success(_) => None,
            Self::Failure(message) => Some(message),
        }
    }
}

/// Wire shape: `{success: true, data: [...]}` or `{success: false, error: "..."}`.
impl Serialize for OcrOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("OcrOutcome", 2)?;
        match self {
            Self::Success(records) => {
                state.serialize_field("success", &true)?;
                state.serialize_field("data", records)?;
            }
            Self::Failure(message) => {
                state.serialize_field("success", &false)?;
                state.serialize_field("error", message)?;
            }
        }
        state.end()
    }
}
