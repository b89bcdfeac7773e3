//! `crawl(start_url, options)` (SPEC_FULL.md module N): bridges the
//! crate-agnostic `articaut_spider::PageFetcher` capability to this crate's
//! own [`crate::fetch`], so the spider never needs to know about transport
//! or extraction.

use std::sync::Arc;

use async_trait::async_trait;
use tokio_stream::wrappers::ReceiverStream;

use articaut_spider::{CrawlEvent, CrawlOptions as SpiderCrawlOptions, PageFetcher};
use articaut_types::error::FetchError;
use articaut_types::fetch_result::FetchResult;

use crate::config::CrawlOptions;
use crate::error::FacadeError;
use crate::fetch;
use crate::Facade;

fn to_fetch_error(url: &str, err: FacadeError) -> FetchError {
    match err {
        FacadeError::Fetch(e) => e,
        FacadeError::InvalidUrl(e) => FetchError::Network { url: url.to_string(), message: e.to_string() },
        FacadeError::CookieFile(message) => FetchError::Network { url: url.to_string(), message },
    }
}

struct FacadePageFetcher {
    facade: Arc<Facade>,
    fetch_options: crate::config::FetchOptions,
}

#[async_trait]
impl PageFetcher for FacadePageFetcher {
    async fn fetch_page(&self, url: &str, include_raw_html: bool) -> FetchResult {
        let mut options = self.fetch_options.clone();
        options.include_raw_html = include_raw_html;
        match fetch::fetch(&self.facade, url, &options).await {
            Ok(result) => result,
            Err(err) => FetchResult::failure(url.to_string(), 0, None, &to_fetch_error(url, err)),
        }
    }
}

/// Start a crawl and return its lazy event stream; the caller drains it to
/// completion to obtain the final [`articaut_spider::CrawlSummary`].
pub fn crawl(facade: Arc<Facade>, start_url: String, options: CrawlOptions) -> ReceiverStream<CrawlEvent> {
    let fetcher = Arc::new(FacadePageFetcher { facade: Arc::clone(&facade), fetch_options: options.fetch_options.clone() });
    let spider_options = SpiderCrawlOptions {
        max_depth: options.max_depth,
        max_pages: options.max_pages,
        concurrency: options.concurrency,
        delay_ms: options.delay_ms,
        same_origin: options.same_origin,
        include: options.include,
        exclude: options.exclude,
        max_queued: options.max_queued,
        include_raw_html: options.fetch_options.include_raw_html,
    };
    articaut_spider::crawl(start_url, spider_options, Arc::clone(&facade.transport), fetcher)
}
