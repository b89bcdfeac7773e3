//! Public option types for [`crate::fetch`] and [`crate::crawl`], matching
//! the option keys the facade exposes to callers.

use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct FetchOptions {
    /// Client fingerprint preset, e.g. `"chrome_desktop"`. Defaults to the
    /// transport's own default when unset.
    pub preset: Option<String>,
    pub timeout_ms: Option<u64>,
    pub proxy: Option<String>,
    pub cookies: HashMap<String, String>,
    /// Raw contents of a Netscape-format cookie file; merged with `cookies`
    /// after filtering by domain/path/secure-ness against the request URL.
    pub cookie_file: Option<String>,
    pub target_selector: Vec<String>,
    pub remove_selector: Vec<String>,
    pub include_raw_html: bool,
}

#[derive(Debug, Clone)]
pub struct CrawlOptions {
    pub max_depth: u32,
    pub max_pages: usize,
    pub concurrency: usize,
    pub delay_ms: u64,
    pub same_origin: bool,
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    pub max_queued: Option<usize>,
    /// Applied to every page fetched during the crawl.
    pub fetch_options: FetchOptions,
}

impl Default for CrawlOptions {
    fn default() -> Self {
        Self {
            max_depth: 3,
            max_pages: 100,
            concurrency: 5,
            delay_ms: 0,
            same_origin: true,
            include: Vec::new(),
            exclude: Vec::new(),
            max_queued: None,
            fetch_options: FetchOptions::default(),
        }
    }
}
