//! Catalog configuration.

use std::time::Duration;

/// Default YouTube Data API v3 endpoint.
pub const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/youtube/v3";

/// Largest `maxResults` the search endpoint accepts.
pub const MAX_RESULTS_CAP: u32 = 50;

/// Catalog client configuration.
#[derive(Clone)]
pub struct CatalogConfig {
    /// API key sent as the `key` query parameter
    pub api_key: String,
    /// API base URL (overridable for tests and proxies)
    pub base_url: String,
    /// Request timeout
    pub timeout: Duration,
    /// Only return videos published after this RFC 3339 timestamp
    pub published_after: Option<String>,
    /// Fill `known_duration` with a second `videos` call
    pub lookup_durations: bool,
}

impl std::fmt::Debug for CatalogConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("published_after", &self.published_after)
            .field("lookup_durations", &self.lookup_durations)
            .finish()
    }
}

impl CatalogConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(10),
            published_after: None,
            lookup_durations: false,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_published_after(mut self, published_after: Option<String>) -> Self {
        self.published_after = published_after;
        self
    }

    pub fn with_duration_lookup(mut self, enabled: bool) -> Self {
        self.lookup_durations = enabled;
        self
    }

    pub(crate) fn endpoint(&self, name: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), name)
    }
}
