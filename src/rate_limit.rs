//! Backoff helpers for cloud API clients.
//!
//! The Gemini extraction client uses these when the provider answers 429.
//! The OCR intake boundary itself never retries.

use std::time::Duration;

/// Upper bound for any single wait.
const MAX_DELAY: Duration = Duration::from_secs(60);

/// Parse a Retry-After header value (seconds).
/// Returns the duration to wait, or None if the header is missing or not numeric.
pub fn parse_retry_after(header_value: Option<&str>) -> Option<Duration> {
    let value = header_value?;
    value
        .trim()
        .parse::<u64>()
        .ok()
        .map(|secs| Duration::from_secs(secs).min(MAX_DELAY))
}

/// Exponential backoff delay for a given attempt, capped at one minute.
pub fn backoff_delay(attempt: u32, base_ms: u64) -> Duration {
    let factor = 2u64.saturating_pow(attempt);
    Duration::from_millis(base_ms.saturating_mul(factor)).min(MAX_DELAY)
}

/// Read a millisecond delay from an environment variable, with default fallback.
pub fn get_delay_from_env(env_var: &str, default_ms: u64) -> Duration {
    std::env::var(env_var)
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(Duration::from_millis(default_ms))
}
