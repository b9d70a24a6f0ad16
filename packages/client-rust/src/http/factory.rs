//! HTTP transport and its per-invocation channel factory.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use http::{HeaderName, HeaderValue};
use relaycall_core::{AuthToken, Endpoint, ServiceIdentity};

use super::channel::HttpChannel;
use super::config::BindingConfig;
use crate::channel::{ChannelError, ChannelFactory, ChannelLease, Transport};

/// Secured HTTP binding. Each factory it opens gets its own connection pool.
///
/// TLS is provided by rustls for `https` endpoints; no client certificate is
/// presented. Authentication travels in the token header instead.
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    config: BindingConfig,
}

impl HttpTransport {
    #[must_use]
    pub fn new(config: BindingConfig) -> Self {
        Self { config }
    }
}

impl Transport for HttpTransport {
    type Factory = HttpChannelFactory;

    fn open_factory(&self) -> Result<Self::Factory, ChannelError> {
        let token_header = HeaderName::try_from(self.config.token_header.as_str()).map_err(|_| {
            ChannelError::InvalidCredential {
                header: self.config.token_header.clone(),
            }
        })?;

        let client = reqwest::Client::builder()
            .use_rustls_tls()
            .connect_timeout(self.config.connect_timeout)
            .timeout(self.config.request_timeout)
            .user_agent(self.config.user_agent.clone())
            .build()
            .map_err(ChannelError::Setup)?;

        Ok(HttpChannelFactory {
            client: Some(client),
            token_header,
            live: Arc::new(AtomicBool::new(false)),
        })
    }
}

/// Owns the HTTP client for one invocation and at most one live channel.
#[derive(Debug)]
pub struct HttpChannelFactory {
    client: Option<reqwest::Client>,
    token_header: HeaderName,
    live: Arc<AtomicBool>,
}

impl ChannelFactory for HttpChannelFactory {
    type Channel = HttpChannel;

    fn create_channel(
        &mut self,
        identity: &ServiceIdentity,
        endpoint: &Endpoint,
        token: AuthToken,
    ) -> Result<HttpChannel, ChannelError> {
        let client = self.client.as_ref().ok_or(ChannelError::Disposed)?;

        let mut header = HeaderValue::from_str(token.expose()).map_err(|_| {
            ChannelError::InvalidCredential {
                header: self.token_header.to_string(),
            }
        })?;
        header.set_sensitive(true);

        let lease = ChannelLease::acquire(&self.live).ok_or(ChannelError::Busy)?;

        tracing::debug!(
            service = identity.service_name(),
            %endpoint,
            "channel created"
        );
        Ok(HttpChannel::new(
            client.clone(),
            endpoint.clone(),
            self.token_header.clone(),
            header,
            lease,
        ))
    }

    fn dispose(&mut self) {
        // Dropping the last client handle tears down its connection pool.
        if self.client.take().is_some() {
            tracing::debug!("channel factory disposed");
        }
    }

    fn is_disposed(&self) -> bool {
        self.client.is_none()
    }
}
