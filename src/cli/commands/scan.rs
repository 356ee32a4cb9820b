//! Scan a registration form from the command line.

use std::path::Path;
use std::sync::Arc;

use console::style;

use crate::config::Settings;
use crate::ocr::{data_uri_from_bytes, GeminiExtractor, OcrOutcome, RegistrationFormIntake};

/// Read an image, run it through the intake boundary, print the outcome JSON.
///
/// A failed outcome is still printed, then returned as an error so the
/// process exits non-zero.
pub async fn cmd_scan(settings: &Settings, image: &Path) -> anyhow::Result<()> {
    let bytes = tokio::fs::read(image)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", image.display(), e))?;

    let extractor = GeminiExtractor::new(settings.gemini.clone())?;
    let intake = RegistrationFormIntake::new(Arc::new(extractor));

    eprintln!(
        "{} Scanning {} ({} bytes) with {}",
        style("→").cyan(),
        image.display(),
        bytes.len(),
        settings.gemini.model
    );

    let outcome = intake
        .process_registration_form(&data_uri_from_bytes(&bytes))
        .await;

    match &outcome {
        OcrOutcome::Success(records) => {
            eprintln!(
                "  {} Extracted {} student record(s)",
                style("✓").green(),
                records.len()
            );
        }
        OcrOutcome::Failure(message) => {
            eprintln!("  {} {}", style("✗").red(), message);
        }
    }

    println!("{}", serde_json::to_string_pretty(&outcome)?);

    if let OcrOutcome::Failure(message) = outcome {
        anyhow::bail!("Scan failed: {}", message);
    }
    Ok(())
}
