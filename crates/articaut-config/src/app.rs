//! Process-lifetime application configuration (SPEC_FULL.md §3 "AppConfig").
//!
//! Built once, read-only afterwards: defaults come from `RIPTIDE_*`
//! environment variables via [`EnvConfigLoader`], with an escape hatch for
//! tests to inject fixtures without touching the environment.

use std::collections::HashMap;
use std::time::Duration;

use crate::env::EnvConfigLoader;
use crate::site::SiteProfile;

const ENV_PREFIX: &str = "RIPTIDE_";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_CONCURRENCY: usize = 4;
const DEFAULT_PRESET: &str = "chrome_desktop";
const DEFAULT_MAX_RESPONSE_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub default_timeout: Duration,
    pub default_concurrency: usize,
    pub default_preset: String,
    pub max_response_bytes: usize,
    site_profiles: HashMap<String, SiteProfile>,
}

impl AppConfig {
    /// Load from `RIPTIDE_*` environment variables, falling back to the
    /// spec's defaults for anything unset. No site profiles are loaded this
    /// way; an on-disk site-profile loader is out of scope, callers inject
    /// one with [`Self::with_site_profiles`].
    pub fn from_env() -> Self {
        let loader = EnvConfigLoader::new().with_prefix(ENV_PREFIX);

        let default_timeout = loader
            .get_duration("DEFAULT_TIMEOUT")
            .unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        let default_concurrency = loader.get_uint("DEFAULT_CONCURRENCY").map(|v| v as usize).unwrap_or(DEFAULT_CONCURRENCY);
        let default_preset = loader.get("DEFAULT_PRESET").unwrap_or_else(|_| DEFAULT_PRESET.to_string());
        let max_response_bytes =
            loader.get_uint("MAX_RESPONSE_BYTES").map(|v| v as usize).unwrap_or(DEFAULT_MAX_RESPONSE_BYTES);

        Self { default_timeout, default_concurrency, default_preset, max_response_bytes, site_profiles: HashMap::new() }
    }

    /// Attach a pre-built site-profile map, replacing any previously set.
    /// Intended for tests and for callers that load profiles from their own
    /// storage before constructing the facade.
    pub fn with_site_profiles(mut self, profiles: HashMap<String, SiteProfile>) -> Self {
        self.site_profiles = profiles;
        self
    }

    pub fn site_profile(&self, host: &str) -> Option<&SiteProfile> {
        self.site_profiles.get(host)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            default_concurrency: DEFAULT_CONCURRENCY,
            default_preset: DEFAULT_PRESET.to_string(),
            max_response_bytes: DEFAULT_MAX_RESPONSE_BYTES,
            site_profiles: HashMap::new(),
        }
    }
}
