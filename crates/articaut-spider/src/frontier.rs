//! Crawl frontier (SPEC_FULL.md §4.I): a single-owner FIFO queue plus a
//! visited set. Nothing here is `Send`-shared across tasks — the crawl
//! orchestrator task owns one `Frontier` exclusively and is the only thing
//! that calls its mutating methods, matching §5's "frontier is not shared
//! across tasks" rule.

use std::collections::{HashSet, VecDeque};

use url::Url;

use crate::glob::glob_match;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontierEntry {
    pub normalized_url: String,
    pub depth: u32,
}

#[derive(Debug, Clone)]
pub struct FrontierOptions {
    pub same_origin: bool,
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    pub max_depth: u32,
    pub max_pages: usize,
    pub max_queued: usize,
}

impl FrontierOptions {
    pub fn new(max_pages: usize, max_depth: u32) -> Self {
        Self { same_origin: true, include: Vec::new(), exclude: Vec::new(), max_depth, max_pages, max_queued: max_pages * 10 }
    }
}

/// Strip the fragment; for non-root paths strip a single trailing slash.
/// All dedup, include/exclude and same-origin checks run on this form.
pub fn normalize(url: &Url) -> String {
    let mut normalized = url.clone();
    normalized.set_fragment(None);
    let path = normalized.path().to_string();
    if path != "/" && path.ends_with('/') {
        normalized.set_path(path.trim_end_matches('/'));
    }
    normalized.to_string()
}

pub struct Frontier {
    start_host: Option<String>,
    options: FrontierOptions,
    queue: VecDeque<FrontierEntry>,
    visited: HashSet<String>,
    processed_count: usize,
}

impl Frontier {
    pub fn new(start_url: &Url, options: FrontierOptions) -> Self {
        Self {
            start_host: start_url.host_str().map(str::to_string),
            options,
            queue: VecDeque::new(),
            visited: HashSet::new(),
            processed_count: 0,
        }
    }

    fn matches_filters(&self, url: &str, path: &str) -> bool {
        let against_include = |pattern: &str| {
            if let Some(path_pattern) = pattern.strip_prefix('/') {
                glob_match(path_pattern, path.trim_start_matches('/'))
            } else {
                glob_match(pattern, url)
            }
        };
        if !self.options.include.is_empty() && !self.options.include.iter().any(|p| against_include(p)) {
            return false;
        }
        if self.options.exclude.iter().any(|p| against_include(p)) {
            return false;
        }
        true
    }

    /// Add one URL at `depth`, resolved against nothing (already absolute).
    /// Returns `false` for every rejection reason named in §4.I.
    pub fn add(&mut self, url: &str, depth: u32) -> bool {
        let Ok(parsed) = Url::parse(url) else { return false };
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return false;
        }
        if self.options.same_origin {
            if self.start_host.as_deref() != parsed.host_str() {
                return false;
            }
        }
        if depth > self.options.max_depth {
            return false;
        }
        if !self.matches_filters(parsed.as_str(), parsed.path()) {
            return false;
        }
        let normalized_url = normalize(&parsed);
        if self.visited.contains(&normalized_url) {
            return false;
        }
        if self.queue.len() >= self.options.max_queued {
            return false;
        }
        self.queue.push_back(FrontierEntry { normalized_url, depth });
        true
    }

    pub fn add_all<I: IntoIterator<Item = S>, S: AsRef<str>>(&mut self, urls: I, depth: u32) -> usize {
        urls.into_iter().filter(|u| self.add(u.as_ref(), depth)).count()
    }

    pub fn next(&mut self) -> Option<FrontierEntry> {
        if self.processed_count >= self.options.max_pages {
            return None;
        }
        let entry = self.queue.pop_front()?;
        self.visited.insert(entry.normalized_url.clone());
        self.processed_count += 1;
        Some(entry)
    }

    pub fn has_more(&self) -> bool {
        !self.queue.is_empty() && self.processed_count < self.options.max_pages
    }

    pub fn processed_count(&self) -> usize {
        self.processed_count
    }
}
