//! Connection settings for the hosted REST backend.

use std::time::Duration;

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Configuration for [`RestStore`](crate::rest::RestStore).
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Project base URL, e.g. `https://abc.supabase.co`. No trailing slash.
    pub url: String,
    /// Anonymous or service API key sent as `apikey` and bearer token.
    pub api_key: String,
    /// Per-request timeout. Expiry surfaces as [`StoreError::Http`].
    ///
    /// [`StoreError::Http`]: crate::StoreError::Http
    pub timeout: Duration,
}

impl StoreConfig {
    /// Create a configuration with the default timeout.
    pub fn new(url: &str, api_key: &str) -> Self {
        Self {
            url: url.trim_end_matches('/').to_owned(),
            api_key: api_key.to_owned(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Set the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}
