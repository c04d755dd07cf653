//! Directory provider configuration.

use std::time::Duration;
use url::Url;

/// Where and how to reach the directory provider.
#[derive(Clone)]
pub struct DirectoryConfig {
    /// Root of the provider API, e.g. `https://admin.googleapis.com/`.
    pub api_root: Url,
    /// Customer whose users are watched (`my_customer` for the caller's own).
    pub customer: String,
    /// Public URL of our `/receive` endpoint, given to the provider.
    pub callback_url: Url,
    /// Bearer token for provider requests.
    pub access_token: String,
    /// Applied to every provider request.
    pub request_timeout: Duration,
    /// Requested channel lifetime. The provider may shorten it.
    pub channel_ttl: Option<Duration>,
}

impl std::fmt::Debug for DirectoryConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirectoryConfig")
            .field("api_root", &self.api_root.as_str())
            .field("customer", &self.customer)
            .field("callback_url", &self.callback_url.as_str())
            .field("access_token", &"<redacted>")
            .field("request_timeout", &self.request_timeout)
            .field("channel_ttl", &self.channel_ttl)
            .finish()
    }
}
