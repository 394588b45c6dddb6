//! Store configuration.
//!
//! Loaded from environment variables. Missing values become empty strings
//! and are not validated; a bad endpoint or key only shows up as a
//! `StoreError` on the first remote call.

use std::env;
use std::fmt;
use std::time::Duration;

use crate::error::ConfigError;

/// Environment variable holding the service endpoint.
pub const URL_VAR: &str = "PUBLIC_SUPABASE_URL";

/// Environment variable holding the access key.
pub const ANON_KEY_VAR: &str = "PUBLIC_SUPABASE_ANON_KEY";

/// Environment variable overriding the request timeout (seconds).
pub const TIMEOUT_VAR: &str = "STORE_TIMEOUT_SECS";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection settings for the hosted store.
///
/// ## Example
/// ```rust,ignore
/// let config = StoreConfig::new("https://xyz.supabase.co", "anon-key")
///     .timeout(Duration::from_secs(10));
/// ```
#[derive(Clone, PartialEq)]
pub struct StoreConfig {
    /// Service endpoint, e.g. `https://xyz.supabase.co`.
    pub url: String,

    /// Access key sent with every request.
    pub anon_key: String,

    /// Per-request timeout.
    /// Default: 30 seconds
    pub timeout: Duration,
}

impl StoreConfig {
    pub fn new(url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        StoreConfig {
            url: url.into(),
            anon_key: anon_key.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Sets the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let timeout = match lookup(TIMEOUT_VAR) {
            Some(secs) => Duration::from_secs(
                secs.trim()
                    .parse()
                    .map_err(|_| ConfigError::InvalidValue(TIMEOUT_VAR.to_string()))?,
            ),
            None => DEFAULT_TIMEOUT,
        };

        Ok(StoreConfig {
            url: lookup(URL_VAR).unwrap_or_default(),
            anon_key: lookup(ANON_KEY_VAR).unwrap_or_default(),
            timeout,
        })
    }
}

impl fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreConfig")
            .field("url", &self.url)
            .field("anon_key_set", &!self.anon_key.is_empty())
            .field("timeout", &self.timeout)
            .finish()
    }
}
