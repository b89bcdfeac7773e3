//! Capability traits ("ports") the extraction and crawl orchestrators depend
//! on, instead of importing `articaut-fetch` directly. This breaks the cycle
//! described in SPEC_FULL.md §9: the fallback chain in `articaut-extraction`
//! needs an HTTP transport (for WP REST / Prism / mobile-API / next-data-route
//! calls) but must not import the crate that implements the session cache.

use std::collections::HashMap;
use std::net::IpAddr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::FetchError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    pub domain: String,
    pub path: String,
    pub expires: Option<i64>,
    pub http_only: bool,
    pub secure: bool,
}

/// Case-insensitive header map, as returned by the HTTP transport.
#[derive(Debug, Clone, Default)]
pub struct HeaderMap(HashMap<String, Vec<String>>);

impl HeaderMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &str, value: String) {
        self.0.entry(name.to_ascii_lowercase()).or_default().push(value);
    }

    /// First non-empty value for a header, case-insensitively.
    pub fn first(&self, name: &str) -> Option<&str> {
        self.0
            .get(&name.to_ascii_lowercase())
            .and_then(|values| values.iter().find(|v| !v.is_empty()))
            .map(|s| s.as_str())
    }

    pub fn all(&self, name: &str) -> &[String] {
        self.0
            .get(&name.to_ascii_lowercase())
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }
}

/// A fetched HTTP response. The body is carried as raw bytes end-to-end so
/// binary content (PDFs) re-boxes losslessly; text extraction decodes it
/// where needed with the declared or sniffed charset.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub ok: bool,
    pub status_code: u16,
    pub body: bytes::Bytes,
    pub headers: HeaderMap,
    pub cookies: Vec<Cookie>,
    pub final_url: String,
}

impl HttpResponse {
    pub fn content_type(&self) -> Option<&str> {
        self.headers.first("content-type")
    }

    pub fn body_str(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}

#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub preset: Option<String>,
    pub timeout_ms: Option<u64>,
    pub proxy: Option<String>,
    pub cookies: HashMap<String, String>,
    pub extra_headers: HashMap<String, String>,
}

/// The HTTP transport capability: SSRF-guarded, session-pooled GET/POST.
/// Implemented concretely by `articaut-fetch::SessionCache`-backed transport;
/// consumed abstractly by `articaut-extraction`'s fallback chain and by
/// `articaut-spider`'s crawl orchestrator.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn get(&self, url: &str, options: &RequestOptions) -> Result<HttpResponse, FetchError>;

    async fn post_form(
        &self,
        url: &str,
        form: &HashMap<String, String>,
        options: &RequestOptions,
    ) -> Result<HttpResponse, FetchError>;
}

/// DNS resolution capability, used by the SSRF guard. Kept separate from
/// `HttpTransport` so `articaut-security` does not need to depend on reqwest.
#[async_trait]
pub trait DnsResolver: Send + Sync {
    async fn resolve_a(&self, host: &str) -> Result<Vec<IpAddr>, FetchError>;
    async fn resolve_aaaa(&self, host: &str) -> Result<Vec<IpAddr>, FetchError>;
}
