//! Per-host extraction overrides (SPEC_FULL.md §3 "SiteProfile").

use serde::{Deserialize, Serialize};

/// Flags that steer the extraction orchestrator for a specific host. Built
/// once at startup and held read-only in `AppConfig`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SiteProfile {
    pub host: String,
    /// Run the JSON-LD metadata/content pass ahead of DOM strategies.
    pub prefer_json_ld: bool,
    /// Prefer the Next.js `__NEXT_DATA__`/RSC strategy ahead of Readability.
    pub prefer_next_data: bool,
    /// Dotted path into the Next.js data blob holding article content, when
    /// it is not at the conventional location.
    pub next_data_content_path: Option<String>,
    /// Route mobile-API fallback attempts for this host even when the
    /// generic heuristics would not trigger one.
    pub is_mobile_api_site: bool,
    /// URL template with an `{id}` placeholder for this host's mobile JSON
    /// API, consulted only when `is_mobile_api_site` is set.
    pub mobile_api_url_template: Option<String>,
    /// Site slug for the Prism `_website` query parameter; falls back to
    /// the page's host when unset.
    pub site_slug: Option<String>,
}

impl SiteProfile {
    pub fn new(host: impl Into<String>) -> Self {
        Self { host: host.into(), ..Default::default() }
    }

    pub fn prefer_json_ld(mut self, value: bool) -> Self {
        self.prefer_json_ld = value;
        self
    }

    pub fn prefer_next_data(mut self, value: bool) -> Self {
        self.prefer_next_data = value;
        self
    }

    pub fn with_next_data_content_path(mut self, path: impl Into<String>) -> Self {
        self.next_data_content_path = Some(path.into());
        self
    }

    pub fn mobile_api_site(mut self, value: bool) -> Self {
        self.is_mobile_api_site = value;
        self
    }

    pub fn with_mobile_api_url_template(mut self, template: impl Into<String>) -> Self {
        self.mobile_api_url_template = Some(template.into());
        self
    }

    pub fn with_site_slug(mut self, slug: impl Into<String>) -> Self {
        self.site_slug = Some(slug.into());
        self
    }
}
