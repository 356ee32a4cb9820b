//! Google Gemini extraction backend.
//!
//! Sends the form image inline to Gemini's `generateContent` API and asks for
//! a JSON object of the form `{"studentData": [...]}`.
//!
//! Rate limiting is this backend's concern, not the intake boundary's:
//! - `delay_ms` is waited before each request (GEMINI_DELAY_MS)
//! - 429 answers are retried with exponential backoff, honoring Retry-After
//! - the request timeout surfaces as [`ExtractionError::Timeout`]

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{ExtractionError, ExtractionResult, FormExtractor, FormImage};
use crate::rate_limit::{backoff_delay, get_delay_from_env, parse_retry_after};

/// Instruction sent alongside every form image.
pub const REGISTRATION_FORM_PROMPT: &str = "This image is a student registration form. \
Extract every student listed on it. Respond with JSON only, shaped as \
{\"studentData\": [{\"name\": string, \"school\": string, \"grade\": string, \
\"contactNumber\": string, \"email\": string}]}. Use an empty string for any field \
that is missing or unreadable. If no students are listed, return {\"studentData\": []}.";

/// MIME type assumed when the data URI does not declare one.
const FALLBACK_MIME_TYPE: &str = "image/jpeg";

/// Settings for [`GeminiExtractor`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeminiConfig {
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

fn default_model() -> String {
    "gemini-1.5-flash".to_string()
}

fn default_endpoint() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_delay_ms() -> u64 {
    200
}

fn default_max_retries() -> u32 {
    5
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            endpoint: default_endpoint(),
            timeout_secs: default_timeout_secs(),
            delay_ms: default_delay_ms(),
            max_retries: default_max_retries(),
        }
    }
}

impl GeminiConfig {
    /// Apply environment variable overrides.
    ///
    /// Supported env vars:
    /// - `GEMINI_API_KEY`
    /// - `GEMINI_MODEL`
    /// - `GEMINI_ENDPOINT`
    /// - `GEMINI_TIMEOUT_SECS`
    /// - `GEMINI_DELAY_MS`
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(key) = env_non_empty("GEMINI_API_KEY") {
            self.api_key = Some(key);
        }
        if let Some(model) = env_non_empty("GEMINI_MODEL") {
            self.model = model;
        }
        if let Some(endpoint) = env_non_empty("GEMINI_ENDPOINT") {
            self.endpoint = endpoint;
        }
        if let Some(secs) = env_non_empty("GEMINI_TIMEOUT_SECS").and_then(|s| s.parse().ok()) {
            self.timeout_secs = secs;
        }
        self.delay_ms = get_delay_from_env("GEMINI_DELAY_MS", self.delay_ms).as_millis() as u64;
        self
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

fn env_non_empty(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.is_empty())
}

#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(rename = "generationConfig")]
    generation_config: GeminiGenerationConfig,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum GeminiPart {
    Text { text: String },
    InlineData { inline_data: GeminiInlineData },
}

#[derive(Debug, Serialize)]
struct GeminiInlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
struct GeminiGenerationConfig {
    temperature: f32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
    #[serde(rename = "responseMimeType")]
    response_mime_type: String,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    candidates: Option<Vec<GeminiCandidate>>,
    error: Option<GeminiError>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiResponseContent>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponseContent {
    #[serde(default)]
    parts: Vec<GeminiResponsePart>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    message: String,
}

/// Form extractor backed by Gemini's vision models.
pub struct GeminiExtractor {
    config: GeminiConfig,
    client: Client,
}

impl GeminiExtractor {
    pub fn new(config: GeminiConfig) -> Result<Self, ExtractionError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .gzip(true)
            .brotli(true)
            .build()
            .map_err(|e| ExtractionError::Http(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }

    fn build_request(image: &FormImage) -> GeminiRequest {
        let mime_type = image.mime_type().unwrap_or(FALLBACK_MIME_TYPE);
        GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![
                    GeminiPart::Text {
                        text: REGISTRATION_FORM_PROMPT.to_string(),
                    },
                    GeminiPart::InlineData {
                        inline_data: GeminiInlineData {
                            mime_type: mime_type.to_string(),
                            data: image.payload().to_string(),
                        },
                    },
                ],
            }],
            generation_config: GeminiGenerationConfig {
                temperature: 0.1,
                max_output_tokens: 8192,
                response_mime_type: "application/json".to_string(),
            },
        }
    }

    async fn post_with_retry(
        &self,
        url: &str,
        request: &GeminiRequest,
    ) -> Result<reqwest::Response, ExtractionError> {
        let mut attempt = 0;
        loop {
            let response = self
                .client
                .post(url)
                .json(request)
                .send()
                .await
                .map_err(map_reqwest_error)?;

            if response.status().as_u16() != 429 {
                return Ok(response);
            }

            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .map(|s| s.to_string());
            let retry_after_secs = retry_after.as_deref().and_then(|s| s.parse::<u64>().ok());

            if attempt >= self.config.max_retries {
                return Err(ExtractionError::RateLimited { retry_after_secs });
            }

            let wait = parse_retry_after(retry_after.as_deref())
                .unwrap_or_else(|| backoff_delay(attempt, 1000));
            warn!(
                "Gemini rate limited (attempt {}), waiting {:?}",
                attempt + 1,
                wait
            );
            tokio::time::sleep(wait).await;
            attempt += 1;
        }
    }
}

#[async_trait]
impl FormExtractor for GeminiExtractor {
    async fn extract(
        &self,
        image: &FormImage,
    ) -> Result<Option<ExtractionResult>, ExtractionError> {
        let api_key = self.config.api_key.as_ref().ok_or_else(|| {
            ExtractionError::NotConfigured(
                "GEMINI_API_KEY not set. Get an API key from https://ai.google.dev/".to_string(),
            )
        })?;

        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.config.endpoint.trim_end_matches('/'),
            self.config.model,
            api_key
        );
        let request = Self::build_request(image);

        let delay = Duration::from_millis(self.config.delay_ms);
        if delay > Duration::ZERO {
            debug!("Gemini: waiting {:?} before request", delay);
            tokio::time::sleep(delay).await;
        }

        let response = self.post_with_retry(&url, &request).await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ExtractionError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let gemini_response: GeminiResponse = response
            .json()
            .await
            .map_err(|e| ExtractionError::Parse(e.to_string()))?;

        if let Some(error) = gemini_response.error {
            return Err(ExtractionError::Other(format!(
                "Gemini API error: {}",
                error.message
            )));
        }

        let text = gemini_response
            .candidates
            .and_then(|c| c.into_iter().next())
            .and_then(|c| c.content)
            .and_then(|c| c.parts.into_iter().find_map(|p| p.text));

        match text {
            Some(text) => parse_reply(&text),
            None => {
                debug!("Gemini returned no candidates");
                Ok(None)
            }
        }
    }
}

fn map_reqwest_error(err: reqwest::Error) -> ExtractionError {
    if err.is_timeout() {
        ExtractionError::Timeout
    } else {
        ExtractionError::Http(err.to_string())
    }
}

/// Remove a surrounding markdown code fence, if the model added one.
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

/// Parse the model's text reply into an extraction result.
///
/// `null` is an absent response. Any other JSON object is accepted as-is, so
/// an object without `studentData` reaches the intake as a malformed reply.
fn parse_reply(text: &str) -> Result<Option<ExtractionResult>, ExtractionError> {
    let value: serde_json::Value = serde_json::from_str(strip_code_fence(text))
        .map_err(|e| ExtractionError::Parse(format!("model reply is not JSON: {}", e)))?;

    match value {
        serde_json::Value::Null => Ok(None),
        serde_json::Value::Object(_) => serde_json::from_value(value)
            .map(Some)
            .map_err(|e| ExtractionError::Parse(e.to_string())),
        other => Err(ExtractionError::Parse(format!(
            "expected a JSON object, got {}",
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}
