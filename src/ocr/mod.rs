//! Registration-form OCR intake.
//!
//! Turns an uploaded form image (a base64 data URI) into structured student
//! records by delegating to an external extraction capability:
//! - [`FormImage`]: the validated data-URI payload
//! - [`FormExtractor`]: the capability seam (Gemini in production, doubles in tests)
//! - [`RegistrationFormIntake`]: the total boundary that validates, delegates,
//!   and folds every result into an [`OcrOutcome`]

mod extractor;
mod form_image;
mod gemini;
mod intake;
mod outcome;

pub use extractor::{ExtractionError, ExtractionResult, FormExtractor};
pub use form_image::{data_uri_from_bytes, FormImage};
pub use gemini::{GeminiConfig, GeminiExtractor};
pub use intake::{IntakeError, RegistrationFormIntake};
pub use outcome::OcrOutcome;
