//! Shared data model and capability ports for the extraction engine.
//!
//! This crate has no I/O of its own: it fixes the vocabulary that
//! `articaut-fetch`, `articaut-html`, `articaut-extraction`, `articaut-pdf`,
//! `articaut-spider` and `articaut-config` agree on, plus the trait-based
//! "ports" that let the orchestration crates depend on interfaces instead
//! of concrete HTTP/DNS clients.

pub mod error;
pub mod extraction;
pub mod fetch_result;
pub mod media;
pub mod ports;

pub use error::{FetchError, SuggestedAction};
pub use extraction::{Extraction, MethodTag};
pub use fetch_result::FetchResult;
pub use media::MediaElement;

/// Floor, in characters, below which a strategy must not return a candidate.
pub const MIN_CONTENT_LENGTH: usize = 100;

/// Floor at which a candidate is "good enough" to short-circuit or win a length tie-break.
pub const GOOD_CONTENT_LENGTH: usize = 500;

/// Hard cap on a single fetched response body.
pub const MAX_RESPONSE_SIZE: usize = 10 * 1024 * 1024;

/// Minimum body size, in bytes, for the content validator to proceed past `body_too_small`.
pub const MIN_BODY_SIZE: usize = 5 * 1024;
