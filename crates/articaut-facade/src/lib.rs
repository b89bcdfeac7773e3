//! Top-level `fetch(url, options)` / `crawl(start_url, options)` entry
//! points (SPEC_FULL.md module N): wires the SSRF-guarded transport,
//! content validator, extraction fallback chain, PDF branch and crawler
//! behind two calls. [`Facade`] is constructible state, not a global
//! singleton — callers own it and can run as many independent instances as
//! they like, each with its own session cache and site-config table.

pub mod config;
pub mod cookie_file;
pub mod crawl;
pub mod error;
pub mod fetch;

use std::collections::HashMap;
use std::sync::Arc;

use articaut_config::SiteProfile;
use articaut_fetch::ReqwestTransport;
use articaut_security::TokioDnsResolver;
use articaut_types::fetch_result::FetchResult;
use articaut_types::ports::{DnsResolver, HttpTransport};

pub use config::{CrawlOptions, FetchOptions};
pub use error::{FacadeError, FacadeResult};

/// Owns the HTTP transport (and, through it, the session cache) and the
/// per-host site-profile table. Build one per process, or one per tenant —
/// nothing here is shared implicitly.
pub struct Facade {
    transport: Arc<dyn HttpTransport>,
    site_profiles: HashMap<String, SiteProfile>,
}

impl Facade {
    /// Build a facade backed by the real `reqwest`-based transport and
    /// tokio's DNS resolver.
    pub fn new() -> Self {
        let resolver: Arc<dyn DnsResolver> = Arc::new(TokioDnsResolver);
        Self { transport: Arc::new(ReqwestTransport::new(resolver)), site_profiles: HashMap::new() }
    }

    /// Build a facade over a caller-supplied transport, e.g. a test double.
    pub fn with_transport(transport: Arc<dyn HttpTransport>) -> Self {
        Self { transport, site_profiles: HashMap::new() }
    }

    pub fn with_site_profiles(mut self, site_profiles: HashMap<String, SiteProfile>) -> Self {
        self.site_profiles = site_profiles;
        self
    }

    pub async fn fetch(&self, url: &str, options: &FetchOptions) -> FacadeResult<FetchResult> {
        fetch::fetch(self, url, options).await
    }

    pub fn crawl(
        self: Arc<Self>,
        start_url: String,
        options: CrawlOptions,
    ) -> tokio_stream::wrappers::ReceiverStream<articaut_spider::CrawlEvent> {
        crawl::crawl(self, start_url, options)
    }
}

impl Default for Facade {
    fn default() -> Self {
        Self::new()
    }
}
