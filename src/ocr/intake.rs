//! The registration-form intake boundary.
//!
//! Validates the caller's data URI, delegates exactly once to the configured
//! [`FormExtractor`], and folds every result into an [`OcrOutcome`]. The
//! boundary is total: provider errors, malformed responses and even a
//! panicking extractor all come back as `OcrOutcome::Failure`.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use thiserror::Error;
use tracing::{debug, error, warn};

use super::{ExtractionError, ExtractionResult, FormExtractor, FormImage, OcrOutcome};

const UNKNOWN_FAILURE: &str = "an unknown error occurred.";

/// Every way a scan can fail.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntakeError {
    /// Missing input or no `data:` prefix. Detected before any external call.
    #[error("Invalid form data URI provided.")]
    InvalidInput,

    /// The capability answered without a `studentData` field, or not at all.
    #[error("AI could not extract data or returned an unexpected format.")]
    MalformedResponse,

    /// The capability raised an error. `None` when it carried no message.
    #[error("AI processing failed: {}", .0.as_deref().unwrap_or(UNKNOWN_FAILURE))]
    DelegateFailure(Option<String>),
}

impl From<ExtractionError> for IntakeError {
    fn from(err: ExtractionError) -> Self {
        let message = err.to_string();
        if message.trim().is_empty() {
            IntakeError::DelegateFailure(None)
        } else {
            IntakeError::DelegateFailure(Some(message))
        }
    }
}

impl From<IntakeError> for OcrOutcome {
    fn from(err: IntakeError) -> Self {
        OcrOutcome::Failure(err.to_string())
    }
}

/// Scans registration forms through an extraction capability.
#[derive(Clone)]
pub struct RegistrationFormIntake {
    extractor: Arc<dyn FormExtractor>,
}

impl RegistrationFormIntake {
    pub fn new(extractor: Arc<dyn FormExtractor>) -> Self {
        Self { extractor }
    }

    /// Scan one form image. Never fails and never panics.
    pub async fn process_registration_form(&self, form_data_uri: &str) -> OcrOutcome {
        match self.scan(form_data_uri).await {
            Ok(records) => OcrOutcome::Success(records),
            Err(err) => err.into(),
        }
    }

    async fn scan(
        &self,
        form_data_uri: &str,
    ) -> Result<Vec<crate::models::ExtractedStudentRecord>, IntakeError> {
        let image = FormImage::parse(form_data_uri).inspect_err(|_| {
            debug!("Rejected form upload without a data URI");
        })?;

        let response = AssertUnwindSafe(self.extractor.extract(&image))
            .catch_unwind()
            .await
            .map_err(|_| {
                error!("Form extractor panicked");
                IntakeError::DelegateFailure(None)
            })?
            .map_err(|e| {
                warn!("Form extraction failed: {}", e);
                IntakeError::from(e)
            })?;

        match response {
            Some(ExtractionResult {
                student_data: Some(records),
            }) => {
                // An empty list is still a success; see the intake tests.
                debug!("Extracted {} student record(s)", records.len());
                Ok(records)
            }
            _ => {
                debug!("Form extractor returned no studentData");
                Err(IntakeError::MalformedResponse)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ExtractedStudentRecord;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    enum Reply {
        Records(Vec<ExtractedStudentRecord>),
        MissingField,
        Nothing,
        Fail(fn() -> ExtractionError),
        Panic,
    }

    struct ScriptedExtractor {
        reply: Reply,
        calls: AtomicUsize,
        seen: Mutex<Vec<String>>,
    }

    impl ScriptedExtractor {
        fn new(reply: Reply) -> Arc<Self> {
            Arc::new(Self {
                reply,
                calls: AtomicUsize::new(0),
                seen: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl FormExtractor for ScriptedExtractor {
        async fn extract(
            &self,
            image: &FormImage,
        ) -> Result<Option<ExtractionResult>, ExtractionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen.lock().unwrap().push(image.as_str().to_string());
            match &self.reply {
                Reply::Records(records) => Ok(Some(ExtractionResult::with_records(records.clone()))),
                Reply::MissingField => Ok(Some(ExtractionResult::default())),
                Reply::Nothing => Ok(None),
                Reply::Fail(make) => Err(make()),
                Reply::Panic => panic!("provider exploded"),
            }
        }
    }

    fn jane() -> ExtractedStudentRecord {
        ExtractedStudentRecord {
            name: "Jane Doe".to_string(),
            school: "Lincoln High".to_string(),
            grade: "10".to_string(),
            contact_number: "555-0100".to_string(),
            email: "jane@example.com".to_string(),
        }
    }

    const PNG_URI: &str = "data:image/png;base64,AAAA";

    #[tokio::test]
    async fn test_invalid_inputs_never_reach_extractor() {
        let extractor = ScriptedExtractor::new(Reply::Records(vec![jane()]));
        let intake = RegistrationFormIntake::new(extractor.clone());

        for input in ["", "image/png;base64,AAAA", "http://x/form.png", " data:"] {
            let outcome = intake.process_registration_form(input).await;
            assert_eq!(
                outcome,
                OcrOutcome::Failure("Invalid form data URI provided.".to_string()),
                "input {:?}",
                input
            );
        }
        assert_eq!(extractor.calls(), 0);
    }

    #[tokio::test]
    async fn test_single_record_scan() {
        let extractor = ScriptedExtractor::new(Reply::Records(vec![jane()]));
        let intake = RegistrationFormIntake::new(extractor.clone());

        let outcome = intake.process_registration_form(PNG_URI).await;

        assert_eq!(outcome, OcrOutcome::Success(vec![jane()]));
        assert_eq!(extractor.calls(), 1);
        assert_eq!(extractor.seen.lock().unwrap().as_slice(), [PNG_URI]);
    }

    #[tokio::test]
    async fn test_repeated_scans_compare_equal() {
        let extractor = ScriptedExtractor::new(Reply::Records(vec![jane(), jane()]));
        let intake = RegistrationFormIntake::new(extractor.clone());

        let first = intake.process_registration_form(PNG_URI).await;
        let second = intake.process_registration_form(PNG_URI).await;
        assert_eq!(first, second);
        assert_eq!(extractor.calls(), 2);
    }

    #[tokio::test]
    async fn test_empty_student_data_is_success() {
        // Zero extracted records is reported as success, not as a failure.
        let intake = RegistrationFormIntake::new(ScriptedExtractor::new(Reply::Records(vec![])));

        let outcome = intake.process_registration_form(PNG_URI).await;
        assert_eq!(outcome, OcrOutcome::Success(vec![]));
    }

    #[tokio::test]
    async fn test_missing_or_absent_response_is_malformed() {
        for reply in [Reply::MissingField, Reply::Nothing] {
            let intake = RegistrationFormIntake::new(ScriptedExtractor::new(reply));
            let outcome = intake.process_registration_form(PNG_URI).await;
            assert_eq!(
                outcome.error(),
                Some("AI could not extract data or returned an unexpected format.")
            );
        }
    }

    #[tokio::test]
    async fn test_timeout_is_translated() {
        let intake = RegistrationFormIntake::new(ScriptedExtractor::new(Reply::Fail(|| {
            ExtractionError::Timeout
        })));

        let outcome = intake.process_registration_form(PNG_URI).await;
        assert_eq!(
            outcome,
            OcrOutcome::Failure("AI processing failed: timeout".to_string())
        );
    }

    #[tokio::test]
    async fn test_provider_error_message_is_kept() {
        let intake = RegistrationFormIntake::new(ScriptedExtractor::new(Reply::Fail(|| {
            ExtractionError::Api {
                status: 403,
                body: "key revoked".to_string(),
            }
        })));

        let outcome = intake.process_registration_form(PNG_URI).await;
        assert_eq!(
            outcome.error(),
            Some("AI processing failed: API error (403): key revoked")
        );
    }

    #[tokio::test]
    async fn test_messageless_error_uses_fallback() {
        let intake = RegistrationFormIntake::new(ScriptedExtractor::new(Reply::Fail(|| {
            ExtractionError::Other(String::new())
        })));

        let outcome = intake.process_registration_form(PNG_URI).await;
        assert_eq!(
            outcome.error(),
            Some("AI processing failed: an unknown error occurred.")
        );
    }

    #[tokio::test]
    async fn test_panicking_extractor_is_contained() {
        let intake = RegistrationFormIntake::new(ScriptedExtractor::new(Reply::Panic));

        let outcome = intake.process_registration_form(PNG_URI).await;
        assert_eq!(
            outcome.error(),
            Some("AI processing failed: an unknown error occurred.")
        );
    }

    #[test]
    fn test_failure_messages_are_never_empty() {
        let errors = [
            IntakeError::InvalidInput,
            IntakeError::MalformedResponse,
            IntakeError::DelegateFailure(None),
            IntakeError::DelegateFailure(Some("boom".to_string())),
            IntakeError::from(ExtractionError::Other("  ".to_string())),
        ];
        for err in errors {
            assert!(!err.to_string().trim().is_empty());
        }
    }
}
