//! Binding configuration for the HTTP relay transport.

use std::time::Duration;

/// Header the relay reads the shared access signature from.
pub const DEFAULT_TOKEN_HEADER: &str = "ServiceBusAuthorization";

/// Transport settings shared by every factory a [`super::HttpTransport`] opens.
#[derive(Debug, Clone)]
pub struct BindingConfig {
    /// Maximum time for a whole request, connect through response body.
    pub request_timeout: Duration,
    /// Maximum time to establish the TCP/TLS connection.
    pub connect_timeout: Duration,
    /// Request header carrying the auth token.
    pub token_header: String,
    /// `User-Agent` sent with every request.
    pub user_agent: String,
}

impl Default for BindingConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(60),
            connect_timeout: Duration::from_secs(10),
            token_header: DEFAULT_TOKEN_HEADER.to_string(),
            user_agent: concat!("relaycall/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}
