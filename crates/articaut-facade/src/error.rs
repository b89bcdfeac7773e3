//! Facade-level error type. Every library crate underneath returns
//! `Result<T, FetchError>`; this type exists only to add the facade's own
//! configuration and cookie-file parsing failures at the composition
//! boundary, per SPEC_FULL.md §9's "only the facade's top-level
//! examples/binaries use anyhow" rule — this crate still returns typed
//! errors, it just has more kinds to union.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FacadeError {
    #[error(transparent)]
    Fetch(#[from] articaut_types::error::FetchError),

    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("malformed cookie file: {0}")]
    CookieFile(String),
}

pub type FacadeResult<T> = Result<T, FacadeError>;
