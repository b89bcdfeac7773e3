//! PDF branch (SPEC_FULL.md §4.M): detect a PDF response by URL or
//! Content-Type, then extract text and title losslessly from the raw bytes.
//! This crate does no fetching of its own — the facade hands it bytes
//! already retrieved through the SSRF-guarded transport.

pub mod detect;
pub mod extract;

pub use detect::{has_pdf_signature, is_pdf_content_type, is_pdf_url};
pub use extract::extract;
