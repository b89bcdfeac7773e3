//! Error taxonomy shared by every crate that can fail a fetch.

use thiserror::Error;

/// Advisory action a caller might take in response to a failed fetch.
///
/// Purely informational: nothing in this crate enforces it, the CLI layer
/// (out of scope) is expected to render it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestedAction {
    Skip,
    WaitAndRetry,
    RetryWithExtract,
    TryArchive,
    SolveCaptcha,
    GiveUp,
}

/// Stable error kinds for a failed fetch or extraction.
#[derive(Error, Debug, Clone)]
pub enum FetchError {
    #[error("network error fetching {url}: {message}")]
    Network { url: String, message: String },

    #[error("http status {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("rate limited (429) for {url}")]
    RateLimited { url: String, retry_after_secs: Option<u64> },

    #[error("wrong content type {content_type:?} for {url}")]
    WrongContentType { url: String, content_type: Option<String> },

    #[error("body too small ({size} bytes) for {url}")]
    BodyTooSmall { url: String, size: usize },

    #[error("insufficient content ({word_count} words) for {url}")]
    InsufficientContent { url: String, word_count: usize },

    #[error("challenge detected ({challenge_type}) for {url}")]
    ChallengeDetected { url: String, challenge_type: String },

    #[error("access restricted for {url}")]
    AccessRestricted { url: String },

    #[error("extraction failed for {url}: {hint}")]
    ExtractionFailed { url: String, hint: String },

    #[error("pdf fetch failed for {url}: {message}")]
    PdfFetchFailed { url: String, message: String },

    #[error("dns resolution failed for {host}")]
    DnsResolution { host: String },

    #[error("ssrf blocked: {host} resolves to a private address ({detail})")]
    SsrfBlocked { host: String, detail: String },

    #[error("response too large (> {limit} bytes) for {url}")]
    ResponseTooLarge { url: String, limit: usize },

    #[error("invalid proxy url: {proxy}")]
    InvalidProxy { proxy: String },

    #[error("timeout after {elapsed_ms}ms fetching {url}")]
    Timeout { url: String, elapsed_ms: u64 },
}

impl FetchError {
    /// Stable machine-readable name, matching the taxonomy's wire form.
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::Network { .. } => "network_error",
            FetchError::HttpStatus { .. } => "http_status_error",
            FetchError::RateLimited { .. } => "rate_limited",
            FetchError::WrongContentType { .. } => "wrong_content_type",
            FetchError::BodyTooSmall { .. } => "body_too_small",
            FetchError::InsufficientContent { .. } => "insufficient_content",
            FetchError::ChallengeDetected { .. } => "challenge_detected",
            FetchError::AccessRestricted { .. } => "access_restricted",
            FetchError::ExtractionFailed { .. } => "extraction_failed",
            FetchError::PdfFetchFailed { .. } => "pdf_fetch_failed",
            FetchError::DnsResolution { .. } => "dns_resolution",
            FetchError::SsrfBlocked { .. } => "ssrf_blocked",
            FetchError::ResponseTooLarge { .. } => "response_too_large",
            FetchError::InvalidProxy { .. } => "invalid_proxy",
            FetchError::Timeout { .. } => "timeout",
        }
    }

    /// True for transient, status-0-style failures that the transport layer
    /// may retry with backoff. Security errors are never retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            FetchError::Network { .. } | FetchError::Timeout { .. } | FetchError::RateLimited { .. }
        )
    }

    /// True for errors that must never be retried regardless of attempt count.
    pub fn is_security_error(&self) -> bool {
        matches!(self, FetchError::SsrfBlocked { .. } | FetchError::InvalidProxy { .. })
    }

    pub fn suggested_action(&self) -> SuggestedAction {
        match self {
            FetchError::RateLimited { .. } | FetchError::Timeout { .. } | FetchError::Network { .. } => {
                SuggestedAction::WaitAndRetry
            }
            FetchError::InsufficientContent { .. } => SuggestedAction::RetryWithExtract,
            FetchError::ChallengeDetected { .. } => SuggestedAction::SolveCaptcha,
            FetchError::AccessRestricted { .. } => SuggestedAction::TryArchive,
            FetchError::SsrfBlocked { .. } | FetchError::InvalidProxy { .. } => SuggestedAction::GiveUp,
            FetchError::HttpStatus { status, .. } if *status == 404 => SuggestedAction::Skip,
            _ => SuggestedAction::Skip,
        }
    }

    /// Short, host-readable hint surfaced alongside the error kind.
    pub fn hint(&self) -> Option<String> {
        match self {
            FetchError::InsufficientContent { word_count, .. } => {
                Some(format!("only {word_count} words extracted before falling back"))
            }
            FetchError::ChallengeDetected { challenge_type, .. } => {
                Some(format!("blocked by a {challenge_type} challenge page"))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn security_errors_are_never_retryable() {
        let ssrf = FetchError::SsrfBlocked { host: "10.0.0.1".into(), detail: "private".into() };
        let proxy = FetchError::InvalidProxy { proxy: "ftp://x".into() };
        assert!(!ssrf.is_retryable());
        assert!(!proxy.is_retryable());
        assert!(ssrf.is_security_error());
        assert!(proxy.is_security_error());
    }

    #[test]
    fn transient_network_errors_are_retryable_and_not_security() {
        let err = FetchError::Network { url: "https://x".into(), message: "connect refused".into() };
        assert!(err.is_retryable());
        assert!(!err.is_security_error());
    }

    #[test]
    fn kind_strings_match_taxonomy_wire_form() {
        assert_eq!(
            FetchError::InsufficientContent { url: "u".into(), word_count: 10 }.kind(),
            "insufficient_content"
        );
        assert_eq!(
            FetchError::SsrfBlocked { host: "h".into(), detail: "d".into() }.kind(),
            "ssrf_blocked"
        );
    }

    #[test]
    fn suggested_action_matches_error_category() {
        let challenge = FetchError::ChallengeDetected { url: "u".into(), challenge_type: "turnstile".into() };
        assert_eq!(challenge.suggested_action(), SuggestedAction::SolveCaptcha);
        let restricted = FetchError::AccessRestricted { url: "u".into() };
        assert_eq!(restricted.suggested_action(), SuggestedAction::TryArchive);
    }
}
