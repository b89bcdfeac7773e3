//! The top-level result of a single `fetch()` call.

use serde::{Deserialize, Serialize};

use crate::error::{FetchError, SuggestedAction};
use crate::extraction::Extraction;

/// A tagged sum type rather than a duck-typed record: a `FetchResult` is
/// either a successful `Extraction` with envelope fields, or a structured
/// failure. See SPEC_FULL.md §9 "tagged variants replace duck-typed returns".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchResult {
    pub url: String,
    pub latency_ms: u64,
    pub status_code: Option<u16>,
    pub raw_html: Option<String>,
    pub outcome: FetchOutcome,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "success")]
pub enum FetchOutcome {
    #[serde(rename = "true")]
    Ok {
        extraction_method: String,
        #[serde(flatten)]
        extraction: Extraction,
    },
    #[serde(rename = "false")]
    Err {
        error_kind: String,
        error_details: String,
        suggested_action: SuggestedAction,
        hint: Option<String>,
    },
}

impl FetchResult {
    pub fn success(url: String, latency_ms: u64, status_code: Option<u16>, extraction: Extraction) -> Self {
        Self {
            url,
            latency_ms,
            status_code,
            raw_html: None,
            outcome: FetchOutcome::Ok {
                extraction_method: extraction.method_string(),
                extraction,
            },
        }
    }

    pub fn failure(url: String, latency_ms: u64, status_code: Option<u16>, error: &FetchError) -> Self {
        Self {
            url,
            latency_ms,
            status_code,
            raw_html: None,
            outcome: FetchOutcome::Err {
                error_kind: error.kind().to_string(),
                error_details: error.to_string(),
                suggested_action: error.suggested_action(),
                hint: error.hint(),
            },
        }
    }

    pub fn with_raw_html(mut self, html: Option<String>) -> Self {
        self.raw_html = html;
        self
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, FetchOutcome::Ok { .. })
    }
}
