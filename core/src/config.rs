//! Client configuration.
//!
//! # Design
//! The base URL prefix lives in an immutable `ClientConfig` owned by each
//! `ApiClient` instead of process-wide state. Changing it means building a
//! new client.

use std::time::Duration;

use crate::error::ApiError;

/// Prefix used when none is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:3000/api/";

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

const BASE_URL_VAR: &str = "API_BASE_URL";
const TIMEOUT_VAR: &str = "API_TIMEOUT_SECS";

/// How query keys and values are written into the URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueryEncoding {
    /// Insert keys and values as given. Reserved characters pass through.
    #[default]
    Verbatim,
    /// Form-urlencode keys and values.
    Percent,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Prepended verbatim to every request path.
    pub base_url: String,
    /// `None` waits indefinitely.
    pub timeout: Option<Duration>,
    pub query_encoding: QueryEncoding,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Some(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
            query_encoding: QueryEncoding::default(),
        }
    }
}

impl ClientConfig {
    /// Defaults overridden by `API_BASE_URL` and `API_TIMEOUT_SECS`.
    ///
    /// A timeout of `0` disables the timeout.
    ///
    /// ## Errors
    ///
    /// Returns [`ApiError::Config`] if `API_TIMEOUT_SECS` is not an integer.
    pub fn from_env() -> Result<Self, ApiError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ApiError> {
        let mut config = Self::default();
        if let Some(base_url) = lookup(BASE_URL_VAR).filter(|v| !v.is_empty()) {
            config.base_url = base_url;
        }
        if let Some(raw) = lookup(TIMEOUT_VAR) {
            let secs: u64 = raw
                .trim()
                .parse()
                .map_err(|_| ApiError::Config(format!("{TIMEOUT_VAR} must be a whole number of seconds, got {raw:?}")))?;
            config.timeout = (secs > 0).then(|| Duration::from_secs(secs));
        }
        Ok(config)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_query_encoding(mut self, encoding: QueryEncoding) -> Self {
        self.query_encoding = encoding;
        self
    }
}
