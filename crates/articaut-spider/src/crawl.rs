//! Crawl orchestrator (SPEC_FULL.md §4.K): robots → sitemap-or-links source
//! selection, sliding-window concurrency, link harvesting, lazy result
//! stream, final summary. Network access for robots.txt/sitemap.xml goes
//! through `HttpTransport` directly; a full per-page fetch+extract is a
//! capability ([`PageFetcher`]) the caller injects, keeping this crate from
//! depending on either `articaut-fetch` or `articaut-extraction`.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use futures::stream::FuturesUnordered;
use futures::StreamExt;
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use url::Url;

use articaut_types::fetch_result::FetchResult;
use articaut_types::ports::{HttpTransport, RequestOptions};

use crate::frontier::{Frontier, FrontierOptions};
use crate::robots::{self, RobotsRules};
use crate::sitemap;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum CrawlSource {
    Sitemap,
    Links,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlSummary {
    pub pages_total: usize,
    pub pages_success: usize,
    pub pages_failed: usize,
    pub pages_blocked: usize,
    pub duration_ms: u64,
    pub source: CrawlSource,
    pub start_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlResult {
    #[serde(flatten)]
    pub fetch_result: FetchResult,
    pub depth: u32,
}

pub enum CrawlEvent {
    Page(CrawlResult),
    Done(CrawlSummary),
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
    pub include_raw_html: bool,
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
            include_raw_html: true,
        }
    }
}

/// Full fetch-and-extract capability for a single URL, injected by the
/// facade (which owns `articaut-fetch` and `articaut-extraction`).
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch_page(&self, url: &str, include_raw_html: bool) -> FetchResult;
}

const LINK_SCHEME_BLOCKLIST: &[&str] = &["mailto:", "tel:", "javascript:", "data:", "blob:", "file:", "ftp:"];

fn harvest_links(html: &str, page_url: &Url) -> Vec<String> {
    let doc = Html::parse_document(html);
    let Ok(selector) = Selector::parse("a[href]") else { return Vec::new() };
    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for el in doc.select(&selector) {
        let Some(href) = el.value().attr("href") else { continue };
        if LINK_SCHEME_BLOCKLIST.iter().any(|scheme| href.trim_start().to_ascii_lowercase().starts_with(scheme)) {
            continue;
        }
        let Ok(mut resolved) = page_url.join(href) else { continue };
        resolved.set_fragment(None);
        let resolved_str = resolved.to_string();
        if seen.insert(resolved_str.clone()) {
            links.push(resolved_str);
        }
    }
    links
}

async fn fetch_robots(transport: &dyn HttpTransport, origin: &str) -> RobotsRules {
    let robots_url = format!("{origin}/robots.txt");
    match transport.get(&robots_url, &RequestOptions::default()).await {
        Ok(response) if response.ok => robots::parse_robots(&response.body_str()),
        _ => RobotsRules::default(),
    }
}

async fn discover_sitemap_seeds(transport: &dyn HttpTransport, origin: &str, robots: &RobotsRules) -> Vec<String> {
    if !robots.sitemaps.is_empty() {
        return robots.sitemaps.clone();
    }
    let probe_url = format!("{origin}/sitemap.xml");
    match transport.get(&probe_url, &RequestOptions::default()).await {
        Ok(response) if response.ok => vec![probe_url],
        _ => Vec::new(),
    }
}

/// Drive the crawl to completion, sending each page result plus one final
/// summary over `tx`. Spawned as a background task by [`crawl`].
async fn run(
    start_url: String,
    options: CrawlOptions,
    transport: Arc<dyn HttpTransport>,
    fetcher: Arc<dyn PageFetcher>,
    tx: mpsc::Sender<CrawlEvent>,
) {
    let started_at = Instant::now();
    let Ok(start) = Url::parse(&start_url) else {
        let _ = tx
            .send(CrawlEvent::Done(CrawlSummary {
                pages_total: 0,
                pages_success: 0,
                pages_failed: 0,
                pages_blocked: 0,
                duration_ms: 0,
                source: CrawlSource::Links,
                start_url,
            }))
            .await;
        return;
    };
    let origin = start.origin().ascii_serialization();

    let robots_rules = fetch_robots(transport.as_ref(), &origin).await;
    let sitemap_seeds = discover_sitemap_seeds(transport.as_ref(), &origin, &robots_rules).await;
    let sitemap_entries = if sitemap_seeds.is_empty() { Vec::new() } else { sitemap::fetch_sitemap_entries(&sitemap_seeds, transport.as_ref()).await };

    let source = if sitemap_entries.is_empty() { CrawlSource::Links } else { CrawlSource::Sitemap };

    let frontier_max_depth = match source {
        CrawlSource::Sitemap => 0,
        CrawlSource::Links => options.max_depth,
    };
    let mut frontier_options = FrontierOptions::new(options.max_pages, frontier_max_depth);
    frontier_options.same_origin = options.same_origin;
    frontier_options.include = options.include.clone();
    frontier_options.exclude = options.exclude.clone();
    if let Some(max_queued) = options.max_queued {
        frontier_options.max_queued = max_queued;
    }
    let mut frontier = Frontier::new(&start, frontier_options);

    let link_discovery_enabled = match source {
        CrawlSource::Sitemap => {
            let urls: Vec<String> = sitemap_entries.iter().map(|e| e.loc.to_string()).collect();
            frontier.add_all(urls, 0);
            false
        }
        CrawlSource::Links => {
            frontier.add(start.as_str(), 0);
            true
        }
    };

    let mut pages_success = 0usize;
    let mut pages_failed = 0usize;
    let mut pages_blocked = 0usize;
    let mut pages_total = 0usize;

    let mut inflight = FuturesUnordered::new();

    loop {
        while inflight.len() < options.concurrency {
            let Some(entry) = frontier.next() else { break };
            let Ok(entry_url) = Url::parse(&entry.normalized_url) else { continue };

            if !robots::is_allowed(entry_url.path(), &robots_rules.disallow) {
                pages_blocked += 1;
                continue;
            }

            let fetcher = Arc::clone(&fetcher);
            let depth = entry.depth;
            let url = entry.normalized_url.clone();
            let delay_ms = options.delay_ms;
            let include_raw_html = options.include_raw_html || link_discovery_enabled;

            inflight.push(async move {
                if delay_ms > 0 {
                    tokio::time::sleep(std::time::Duration::from_millis(delay_ms)).await;
                }
                let fetch_result = fetcher.fetch_page(&url, include_raw_html).await;
                (fetch_result, depth)
            });
        }

        let Some((fetch_result, depth)) = inflight.next().await else { break };
        pages_total += 1;
        if fetch_result.is_success() {
            pages_success += 1;
        } else {
            pages_failed += 1;
        }

        if link_discovery_enabled {
            if let (true, Some(html)) = (fetch_result.is_success(), fetch_result.raw_html.as_ref()) {
                if let Ok(page_url) = Url::parse(&fetch_result.url) {
                    let links = harvest_links(html, &page_url);
                    frontier.add_all(links, depth + 1);
                }
            }
        }

        let _ = tx.send(CrawlEvent::Page(CrawlResult { fetch_result, depth })).await;

        if inflight.is_empty() && !frontier.has_more() {
            break;
        }
    }

    let _ = tx
        .send(CrawlEvent::Done(CrawlSummary {
            pages_total,
            pages_success,
            pages_failed,
            pages_blocked,
            duration_ms: started_at.elapsed().as_millis() as u64,
            source,
            start_url,
        }))
        .await;
}

/// Spawn the crawl and return a lazy stream of page results terminated by a
/// single [`CrawlEvent::Done`] summary.
pub fn crawl(start_url: String, options: CrawlOptions, transport: Arc<dyn HttpTransport>, fetcher: Arc<dyn PageFetcher>) -> ReceiverStream<CrawlEvent> {
    let (tx, rx) = mpsc::channel(32);
    tokio::spawn(run(start_url, options, transport, fetcher, tx));
    ReceiverStream::new(rx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use articaut_types::error::FetchError;
    use articaut_types::extraction::{Extraction, MethodTag};
    use articaut_types::ports::HttpResponse;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FakeTransport {
        robots_body: Option<String>,
    }

    #[async_trait]
    impl HttpTransport for FakeTransport {
        async fn get(&self, url: &str, _options: &RequestOptions) -> Result<HttpResponse, FetchError> {
            if url.ends_with("/robots.txt") {
                return match &self.robots_body {
                    Some(body) => Ok(ok_response(body.clone())),
                    None => Err(FetchError::Network { url: url.to_string(), message: "no robots.txt".into() }),
                };
            }
            Err(FetchError::Network { url: url.to_string(), message: "not found".into() })
        }

        async fn post_form(&self, url: &str, _form: &HashMap<String, String>, _options: &RequestOptions) -> Result<HttpResponse, FetchError> {
            Err(FetchError::Network { url: url.to_string(), message: "unsupported in fake".into() })
        }
    }

    fn ok_response(body: String) -> HttpResponse {
        HttpResponse { ok: true, status_code: 200, body: bytes::Bytes::from(body), headers: Default::default(), cookies: Vec::new(), final_url: String::new() }
    }

    struct FakeFetcher {
        pages: HashMap<String, (bool, String)>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl PageFetcher for FakeFetcher {
        async fn fetch_page(&self, url: &str, _include_raw_html: bool) -> FetchResult {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.pages.get(url) {
                Some((true, html)) => {
                    let extraction = Extraction::new(MethodTag::Readability, "word ".repeat(30));
                    FetchResult::success(url.to_string(), 10, Some(200), extraction).with_raw_html(Some(html.clone()))
                }
                _ => FetchResult::failure(url.to_string(), 10, Some(404), &FetchError::Network { url: url.to_string(), message: "missing".into() }),
            }
        }
    }

    #[tokio::test]
    async fn link_mode_crawl_discovers_and_respects_robots_disallow() {
        let transport: Arc<dyn HttpTransport> = Arc::new(FakeTransport { robots_body: Some("User-agent: *\nDisallow: /admin\n".to_string()) });

        let mut pages = HashMap::new();
        pages.insert(
            "https://example.com/".to_string(),
            (true, r#"<a href="/public">pub</a><a href="/admin/secret">secret</a>"#.to_string()),
        );
        pages.insert("https://example.com/public".to_string(), (true, String::new()));

        let fetcher = Arc::new(FakeFetcher { pages, calls: AtomicUsize::new(0) });
        let options = CrawlOptions { concurrency: 2, ..Default::default() };

        let mut stream = crawl("https://example.com/".to_string(), options, transport, fetcher);
        let mut seen = Vec::new();
        let mut summary = None;
        while let Some(event) = stream.next().await {
            match event {
                CrawlEvent::Page(page) => seen.push(page.fetch_result.url),
                CrawlEvent::Done(s) => summary = Some(s),
            }
        }

        assert!(seen.contains(&"https://example.com/".to_string()));
        assert!(seen.contains(&"https://example.com/public".to_string()));
        assert!(!seen.iter().any(|u| u.contains("/admin/")));

        let summary = summary.unwrap();
        assert_eq!(summary.source, CrawlSource::Links);
        assert!(summary.pages_blocked >= 1);
    }
}
