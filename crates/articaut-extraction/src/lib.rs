//! Content extraction (SPEC_FULL.md §4.G/§4.H): the DOM orchestrator that
//! runs every strategy over a single parsed document, and the fetch-level
//! site-API fallback chain that wraps it. This crate owns no network
//! transport of its own — the fallback chain consumes
//! `articaut_types::ports::HttpTransport` so it never depends on
//! `articaut-fetch` directly.

pub mod fallback;
pub mod orchestrator;

pub use fallback::{resolve as resolve_with_fallback, ValidatorVerdict};
pub use orchestrator::{extract, OrchestratorConfig};
