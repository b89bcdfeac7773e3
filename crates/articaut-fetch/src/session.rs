//! Session cache (SPEC_FULL.md §4.B): a pool of fingerprinted `reqwest`
//! clients keyed by `(preset, proxy)`, recycled by age or request count
//! without racing in-flight requests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use articaut_types::error::FetchError;
use dashmap::DashMap;
use reqwest::Client;
use tokio::sync::Mutex as AsyncMutex;
use tracing::{debug, info, warn};

use articaut_utils::time::now_unix_secs;

const MAX_AGE_SECS: i64 = 60 * 60;
const MAX_REQUESTS: u64 = 10_000;
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionKey {
    pub preset: String,
    pub proxy: Option<String>,
}

impl SessionKey {
    pub fn new(preset: impl Into<String>, proxy: Option<String>) -> Self {
        Self { preset: preset.into(), proxy }
    }
}

/// A live session. Cheaply clonable; cloning shares the underlying
/// `reqwest::Client` connection pool and counters.
#[derive(Debug)]
pub struct SessionEntry {
    pub client: Client,
    created_at: i64,
    request_count: AtomicU64,
    in_flight_count: AtomicI64,
}

impl SessionEntry {
    fn new(client: Client) -> Self {
        Self { client, created_at: now_unix_secs(), request_count: AtomicU64::new(0), in_flight_count: AtomicI64::new(0) }
    }

    fn is_stale(&self) -> bool {
        now_unix_secs() - self.created_at > MAX_AGE_SECS || self.request_count.load(Ordering::SeqCst) >= MAX_REQUESTS
    }

    fn in_flight(&self) -> i64 {
        self.in_flight_count.load(Ordering::SeqCst)
    }

    /// Mark the start of a request: bumps both counters atomically enough
    /// for the recycle decision (no lock needed, only monotonic counters).
    fn begin_request(&self) {
        self.request_count.fetch_add(1, Ordering::SeqCst);
        self.in_flight_count.fetch_add(1, Ordering::SeqCst);
    }

    /// Must be called on every exit path (success, error, timeout).
    pub fn end_request(&self) {
        self.in_flight_count.fetch_sub(1, Ordering::SeqCst);
    }
}

fn build_client(preset: &str, proxy: Option<&str>) -> Result<Client, FetchError> {
    let mut builder = Client::builder()
        .user_agent(preset_user_agent(preset))
        .gzip(true)
        .brotli(true)
        .cookie_store(true)
        .connect_timeout(CONNECT_TIMEOUT)
        .timeout(Duration::from_secs(30));

    if let Some(proxy_url) = proxy {
        let proxy = reqwest::Proxy::all(proxy_url).map_err(|_| FetchError::InvalidProxy { proxy: proxy_url.to_string() })?;
        builder = builder.proxy(proxy);
    }

    builder.build().map_err(|e| FetchError::Network { url: String::new(), message: format!("client build failed: {e}") })
}

/// TLS-fingerprint preset vocabulary. True ClientHello spoofing is out of
/// scope (see DESIGN.md); presets map to a user-agent string only.
fn preset_user_agent(preset: &str) -> &'static str {
    match preset {
        "firefox_desktop" => "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:128.0) Gecko/20100101 Firefox/128.0",
        "safari_desktop" => "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.5 Safari/605.1.15",
        "mobile_safari" => "Mozilla/5.0 (iPhone; CPU iPhone OS 17_5 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.5 Mobile/15E148 Safari/604.1",
        _ => "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0.0.0 Safari/537.36",
    }
}

/// Keyed pool of sessions with single-creation-per-key and deferred,
/// in-flight-safe recycling.
#[derive(Debug, Default)]
pub struct SessionCache {
    sessions: DashMap<SessionKey, Arc<SessionEntry>>,
    creation_locks: DashMap<SessionKey, Arc<AsyncMutex<()>>>,
}

impl SessionCache {
    pub fn new() -> Self {
        Self { sessions: DashMap::new(), creation_locks: DashMap::new() }
    }

    /// Acquire (creating if needed) the session for `(preset, proxy)`,
    /// bumping its counters for the caller's in-flight request.
    pub async fn get(&self, preset: &str, proxy: Option<&str>) -> Result<Arc<SessionEntry>, FetchError> {
        let key = SessionKey::new(preset, proxy.map(str::to_string));

        let existing = self.sessions.get(&key).map(|entry| entry.clone());
        if let Some(entry) = existing {
            if !entry.is_stale() {
                entry.begin_request();
                return Ok(entry);
            }
            if entry.in_flight() > 0 {
                debug!(preset, "session stale but in-flight, deferring recycle");
                entry.begin_request();
                return Ok(entry);
            }
            info!(preset, "recycling stale session with no in-flight requests");
            self.sessions.remove(&key);
            let stale = entry;
            tokio::spawn(async move {
                drop(stale);
            });
        }

        let lock = self.creation_locks.entry(key.clone()).or_insert_with(|| Arc::new(AsyncMutex::new(()))).clone();
        let _guard = lock.lock().await;

        if let Some(entry) = self.sessions.get(&key) {
            let entry = entry.clone();
            entry.begin_request();
            return Ok(entry);
        }

        let client = build_client(preset, proxy)?;
        let entry = Arc::new(SessionEntry::new(client));
        entry.begin_request();
        self.sessions.insert(key, entry.clone());
        Ok(entry)
    }

    /// Drop every session, tolerating per-session close errors. `reqwest`
    /// clients do not error on drop, so this is a best-effort sweep rather
    /// than a fallible close call.
    pub fn close_all(&self) {
        let drained: HashMap<SessionKey, Arc<SessionEntry>> = self.sessions.clone().into_iter().collect();
        self.sessions.clear();
        for (key, entry) in drained {
            if Arc::strong_count(&entry) > 1 {
                warn!(preset = %key.preset, "closing session with callers still holding a reference");
            }
        }
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn get_creates_and_reuses_session_for_same_key() {
        let cache = SessionCache::new();
        let first = cache.get("chrome_desktop", None).await.unwrap();
        first.end_request();
        let second = cache.get("chrome_desktop", None).await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn different_proxies_get_different_sessions() {
        let cache = SessionCache::new();
        let a = cache.get("chrome_desktop", None).await.unwrap();
        let b = cache.get("chrome_desktop", Some("http://proxy.example:8080")).await.unwrap();
        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(cache.len(), 2);
    }

    #[tokio::test]
    async fn stale_session_with_in_flight_requests_is_not_recycled() {
        let cache = SessionCache::new();
        let entry = cache.get("chrome_desktop", None).await.unwrap();
        // Force staleness without waiting an hour.
        entry.request_count.store(MAX_REQUESTS, Ordering::SeqCst);
        assert!(entry.is_stale());
        assert_eq!(entry.in_flight(), 1);

        let again = cache.get("chrome_desktop", None).await.unwrap();
        assert!(Arc::ptr_eq(&entry, &again), "in-flight session must not be recycled");
    }

    #[tokio::test]
    async fn stale_session_with_no_in_flight_is_recycled() {
        let cache = SessionCache::new();
        let entry = cache.get("chrome_desktop", None).await.unwrap();
        entry.request_count.store(MAX_REQUESTS, Ordering::SeqCst);
        entry.end_request();
        assert_eq!(entry.in_flight(), 0);

        let fresh = cache.get("chrome_desktop", None).await.unwrap();
        assert!(!Arc::ptr_eq(&entry, &fresh), "drained stale session should be replaced");
    }

    #[tokio::test]
    async fn close_all_empties_the_cache() {
        let cache = SessionCache::new();
        let entry = cache.get("chrome_desktop", None).await.unwrap();
        entry.end_request();
        cache.close_all();
        assert!(cache.is_empty());
    }
}
