//! Crawl frontier, robots.txt/sitemap parsing, and the sliding-window crawl
//! orchestrator (SPEC_FULL.md §4.I–§4.K). This crate owns no HTTP transport
//! of its own for page fetches — `crawl::PageFetcher` is a capability the
//! caller injects, so this crate depends only on `articaut_types::ports` and
//! never on `articaut-fetch` or `articaut-extraction` directly.

pub mod crawl;
pub mod frontier;
pub mod glob;
pub mod robots;
pub mod sitemap;

pub use crawl::{crawl, CrawlEvent, CrawlOptions, CrawlResult, CrawlSource, CrawlSummary, PageFetcher};
pub use frontier::{normalize, Frontier, FrontierEntry, FrontierOptions};
pub use glob::glob_match;
pub use robots::{is_allowed, parse_robots, RobotsRules};
pub use sitemap::{fetch_sitemap_entries, parse_sitemap, ParsedSitemap, SitemapEntry};
