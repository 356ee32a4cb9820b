//! The extraction capability seam.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::FormImage;
use crate::models::ExtractedStudentRecord;

/// Response shape of an extraction capability.
///
/// `student_data` is `None` when the provider answered without the field,
/// which the intake boundary treats as a malformed response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResult {
    #[serde(default)]
    pub student_data: Option<Vec<ExtractedStudentRecord>>,
}

impl ExtractionResult {
    pub fn with_records(records: Vec<ExtractedStudentRecord>) -> Self {
        Self {
            student_data: Some(records),
        }
    }
}

/// Errors raised by an extraction capability.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("timeout")]
    Timeout,

    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("rate limited, retry after {retry_after_secs:?}s")]
    RateLimited { retry_after_secs: Option<u64> },

    #[error("failed to parse response: {0}")]
    Parse(String),

    #[error("extractor not configured: {0}")]
    NotConfigured(String),

    /// Anything else. The message may be empty.
    #[error("{0}")]
    Other(String),
}

/// An external capability that converts a form image into student records.
///
/// `Ok(None)` means the capability produced no response at all.
/// Implementations own their retry, backoff and timeout policy.
#[async_trait]
pub trait FormExtractor: Send + Sync {
    async fn extract(&self, image: &FormImage)
        -> Result<Option<ExtractionResult>, ExtractionError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_message() {
        assert_eq!(ExtractionError::Timeout.to_string(), "timeout");
    }

    #[test]
    fn test_result_without_student_data() {
        let result: ExtractionResult = serde_json::from_str(r#"{"records": []}"#).unwrap();
        assert!(result.student_data.is_none());

        let result: ExtractionResult = serde_json::from_str(r#"{"studentData": []}"#).unwrap();
        assert_eq!(result.student_data, Some(vec![]));
    }
}
