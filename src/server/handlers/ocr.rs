//! Registration-form scanning endpoint.

use axum::{body::Bytes, extract::State, Json};
use tracing::debug;

use super::super::AppState;
use crate::ocr::OcrOutcome;

/// Scan an uploaded registration form.
///
/// Body: `{ "formDataUri": "data:image/png;base64,..." }`. The reply is always
/// 200 with the outcome shape; a body that is not JSON, or a `formDataUri`
/// that is missing or not a string, is reported as invalid input.
pub async fn scan_registration_form(
    State(state): State<AppState>,
    body: Bytes,
) -> Json<OcrOutcome> {
    let request: Option<serde_json::Value> = serde_json::from_slice(&body).ok();
    let form_data_uri = request
        .as_ref()
        .and_then(|v| v.get("formDataUri"))
        .and_then(|v| v.as_str())
        .unwrap_or_default();

    // Waiting for a permit only happens when a cap is configured.
    let _permit = match state.scan_permits.as_ref() {
        Some(permits) => match permits.clone().acquire_owned().await {
            Ok(permit) => Some(permit),
            Err(_) => {
                debug!("Scan semaphore closed; scanning without a permit");
                None
            }
        },
        None => None,
    };

    Json(state.intake.process_registration_form(form_data_uri).await)
}
