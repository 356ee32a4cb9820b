//! End-to-end checks of the registration-form intake boundary through the
//! public API, using an echoing test double for the extraction capability.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use eventreg::models::ExtractedStudentRecord;
use eventreg::ocr::{
    ExtractionError, ExtractionResult, FormExtractor, FormImage, OcrOutcome,
    RegistrationFormIntake,
};

/// Returns one record whose `name` is the image payload, after a delay
/// derived from the payload length.
struct EchoExtractor {
    calls: AtomicUsize,
}

#[async_trait]
impl FormExtractor for EchoExtractor {
    async fn extract(
        &self,
        image: &FormImage,
    ) -> Result<Option<ExtractionResult>, ExtractionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let payload = image.payload().to_string();
        tokio::time::sleep(Duration::from_millis(40 / payload.len().max(1) as u64)).await;
        if payload == "TIMEOUT" {
            return Err(ExtractionError::Timeout);
        }
        Ok(Some(ExtractionResult::with_records(vec![
            ExtractedStudentRecord {
                name: payload,
                ..Default::default()
            },
        ])))
    }
}

fn intake() -> (RegistrationFormIntake, Arc<EchoExtractor>) {
    let extractor = Arc::new(EchoExtractor {
        calls: AtomicUsize::new(0),
    });
    (RegistrationFormIntake::new(extractor.clone()), extractor)
}

#[tokio::test]
async fn empty_input_is_rejected_without_delegation() {
    let (intake, extractor) = intake();

    let outcome = intake.process_registration_form("").await;

    assert_eq!(
        serde_json::to_value(&outcome).unwrap(),
        serde_json::json!({"success": false, "error": "Invalid form data URI provided."})
    );
    assert_eq!(extractor.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn timeout_surfaces_as_processing_failure() {
    let (intake, extractor) = intake();

    let outcome = intake
        .process_registration_form("data:image/png;base64,TIMEOUT")
        .await;

    assert_eq!(
        outcome,
        OcrOutcome::Failure("AI processing failed: timeout".to_string())
    );
    assert_eq!(extractor.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn concurrent_scans_do_not_interfere() {
    let (intake, extractor) = intake();

    let (a, b, c) = tokio::join!(
        intake.process_registration_form("data:image/png;base64,A"),
        intake.process_registration_form("data:image/png;base64,BBBBBBBB"),
        intake.process_registration_form("not a data uri"),
    );

    assert_eq!(a.records().unwrap()[0].name, "A");
    assert_eq!(b.records().unwrap()[0].name, "BBBBBBBB");
    assert_eq!(c.error(), Some("Invalid form data URI provided."));
    assert_eq!(extractor.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn intake_can_be_shared_across_tasks() {
    let (intake, extractor) = intake();

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let intake = intake.clone();
            tokio::spawn(async move {
                intake
                    .process_registration_form(&format!("data:image/png;base64,{}", i))
                    .await
            })
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        let outcome = handle.await.unwrap();
        assert_eq!(outcome.records().unwrap()[0].name, i.to_string());
    }
    assert_eq!(extractor.calls.load(Ordering::SeqCst), 8);
}
