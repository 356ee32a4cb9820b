//! Data-URI image payloads.

use base64::Engine;

use super::intake::IntakeError;

const DATA_SCHEME: &str = "data:";

/// An uploaded image, transport-encoded as `data:<mime>;base64,<payload>`.
///
/// Only the scheme marker is checked. Size, MIME allow-lists and dimensions
/// are left to callers and to the extraction provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormImage(String);

impl FormImage {
    /// Validate a caller-supplied data URI.
    pub fn parse(form_data_uri: &str) -> Result<Self, IntakeError> {
        if form_data_uri.is_empty() || !form_data_uri.starts_with(DATA_SCHEME) {
            return Err(IntakeError::InvalidInput);
        }
        Ok(Self(form_data_uri.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// MIME type from the header, if one is present.
    pub fn mime_type(&self) -> Option<&str> {
        let header = self.header();
        let mime = header.split(';').next().unwrap_or_default();
        (!mime.is_empty()).then_some(mime)
    }

    /// Everything after the first comma. Empty when the URI has no comma.
    pub fn payload(&self) -> &str {
        self.0
            .split_once(',')
            .map(|(_, payload)| payload)
            .unwrap_or_default()
    }

    fn header(&self) -> &str {
        let rest = &self.0[DATA_SCHEME.len()..];
        rest.split_once(',').map(|(h, _)| h).unwrap_or(rest)
    }
}

/// Build a data URI from raw image bytes, sniffing the MIME type.
pub fn data_uri_from_bytes(bytes: &[u8]) -> String {
    let mime = infer::get(bytes)
        .map(|kind| kind.mime_type())
        .unwrap_or("application/octet-stream");
    let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
    format!("{}{};base64,{}", DATA_SCHEME, mime, encoded)
}
