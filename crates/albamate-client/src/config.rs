//! Client configuration.

use std::time::Duration;

use url::Url;

/// Default request timeout applied when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration for a [`crate::RestClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the backend, e.g. `https://api.albamate.example`.
    pub base_url: Url,
    /// Per-request timeout delegated to the underlying transport.
    pub timeout: Duration,
    /// Bearer token attached to authenticated requests, when present.
    pub bearer_token: Option<String>,
}

impl ClientConfig {
    /// Configuration with the default timeout and no credentials.
    #[must_use]
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            timeout: DEFAULT_TIMEOUT,
            bearer_token: None,
        }
    }

    /// Attach a bearer token.
    #[must_use]
    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    /// Override the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}
