//! Relay channel carried over HTTP(S).
//!
//! Each operation is a `POST {endpoint}/{operation}` with a JSON body and the
//! auth token in the configured header. The connection itself is opened
//! lazily by the HTTP client on the first request.

use async_trait::async_trait;
use http::{HeaderName, HeaderValue};
use relaycall_core::Endpoint;

use crate::channel::{Channel, ChannelError, ChannelLease, ChannelState, StateCell};

/// A channel to one service endpoint, produced by [`super::HttpChannelFactory`].
#[derive(Debug)]
pub struct HttpChannel {
    client: reqwest::Client,
    endpoint: Endpoint,
    token_header: HeaderName,
    token: HeaderValue,
    state: StateCell,
    _lease: ChannelLease,
}

impl HttpChannel {
    pub(crate) fn new(
        client: reqwest::Client,
        endpoint: Endpoint,
        token_header: HeaderName,
        token: HeaderValue,
        lease: ChannelLease,
    ) -> Self {
        Self {
            client,
            endpoint,
            token_header,
            token,
            state: StateCell::default(),
            _lease: lease,
        }
    }

    /// Maps a client error to a channel error, faulting the channel when the
    /// failure broke the transport.
    fn transport_failure(&self, error: reqwest::Error) -> ChannelError {
        let endpoint = self.endpoint.to_string();
        let mapped = if error.is_timeout() {
            ChannelError::Timeout { endpoint }
        } else if error.is_connect() {
            ChannelError::Unreachable {
                endpoint,
                source: Box::new(error),
            }
        } else {
            ChannelError::Transport {
                endpoint,
                source: error,
            }
        };
        if mapped.faults_channel() {
            self.state.set(ChannelState::Faulted);
            tracing::debug!(endpoint = %self.endpoint, "channel faulted");
        }
        mapped
    }
}

#[async_trait]
impl Channel for HttpChannel {
    fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    fn state(&self) -> ChannelState {
        self.state.get()
    }

    async fn call(
        &self,
        operation: &str,
        request: serde_json::Value,
    ) -> Result<serde_json::Value, ChannelError> {
        let state = self.state.get();
        if !state.accepts_calls() {
            return Err(ChannelError::InvalidState {
                state,
                action: "call",
            });
        }

        let url = self.endpoint.join_operation(operation);
        tracing::debug!(%url, operation, "sending request");

        let response = self
            .client
            .post(&url)
            .header(self.token_header.clone(), self.token.clone())
            .json(&request)
            .send()
            .await
            .map_err(|e| self.transport_failure(e))?;
        self.state.mark_open();

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| self.transport_failure(e))?;

        if !status.is_success() {
            return Err(ChannelError::Fault {
                endpoint: self.endpoint.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        if body.trim().is_empty() {
            return Ok(serde_json::Value::Null);
        }
        serde_json::from_str(&body).map_err(|source| ChannelError::Codec {
            operation: operation.to_string(),
            source,
        })
    }

    async fn close(&self) -> anyhow::Result<()> {
        let previous = self.state.get();
        if previous != ChannelState::Closed {
            self.state.set(ChannelState::Closed);
            tracing::debug!(endpoint = %self.endpoint, from = %previous, "channel closed");
        }
        Ok(())
    }
}
