//! Channel, channel factory, and transport abstractions.
//!
//! A [`Transport`] holds the immutable binding configuration and hands out one
//! fresh [`ChannelFactory`] per invocation. The factory produces at most one
//! live [`Channel`] and owns the credential attached to it.
//!
//! Lifecycle of a channel:
//!
//! ```text
//! Created --first call--> Open --close--> Closed
//!    |                      |
//!    +------transport error-+--> Faulted --close--> Closed
//! ```

pub mod error;
pub mod state;

pub use error::ChannelError;
pub use state::{ChannelLease, ChannelState, StateCell};

use async_trait::async_trait;
use relaycall_core::{AuthToken, Endpoint, ServiceIdentity};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// A connection to one remote service through which named operations are invoked.
#[async_trait]
pub trait Channel: Send + Sync {
    /// The endpoint this channel talks to.
    fn endpoint(&self) -> &Endpoint;

    /// Current lifecycle state.
    fn state(&self) -> ChannelState;

    /// Invokes `operation` with a JSON request body and returns the JSON reply.
    ///
    /// The first call opens the channel.
    ///
    /// # Errors
    ///
    /// Returns a [`ChannelError`]; see [`ChannelError::is_communication`] for
    /// which variants count as transport failures.
    async fn call(
        &self,
        operation: &str,
        request: serde_json::Value,
    ) -> Result<serde_json::Value, ChannelError>;

    /// Closes the channel. Closing an already-closed channel is a no-op.
    ///
    /// # Errors
    ///
    /// Implementations may fail to shut the underlying connection down cleanly.
    async fn close(&self) -> anyhow::Result<()>;
}

/// Produces channels for a single invocation and owns their credential.
pub trait ChannelFactory: Send {
    type Channel: Channel;

    /// Creates a channel to `endpoint` carrying `token` on every request.
    ///
    /// Must not open a network connection.
    ///
    /// # Errors
    ///
    /// Fails if the factory is disposed, already owns a live channel, or the
    /// token cannot be attached.
    fn create_channel(
        &mut self,
        identity: &ServiceIdentity,
        endpoint: &Endpoint,
        token: AuthToken,
    ) -> Result<Self::Channel, ChannelError>;

    /// Releases factory-level resources. Calling it again is a no-op.
    fn dispose(&mut self);

    fn is_disposed(&self) -> bool;
}

/// Binding configuration that hands out one factory per invocation.
pub trait Transport: Send + Sync {
    type Factory: ChannelFactory;

    /// Builds a fresh factory.
    ///
    /// # Errors
    ///
    /// Fails if the underlying transport cannot be configured.
    fn open_factory(&self) -> Result<Self::Factory, ChannelError>;
}

/// Channel type produced by a transport's factories.
pub type ChannelOf<T> = <<T as Transport>::Factory as ChannelFactory>::Channel;

/// Serializes `request`, calls `operation`, and deserializes the reply.
///
/// # Errors
///
/// Returns [`ChannelError::Codec`] if either side fails to (de)serialize,
/// otherwise whatever [`Channel::call`] returns.
pub async fn call_typed<C, Req, Resp>(
    channel: &C,
    operation: &str,
    request: &Req,
) -> Result<Resp, ChannelError>
where
    C: Channel + ?Sized,
    Req: Serialize + ?Sized,
    Resp: DeserializeOwned,
{
    let body = serde_json::to_value(request).map_err(|source| ChannelError::Codec {
        operation: operation.to_string(),
        source,
    })?;
    let reply = channel.call(operation, body).await?;
    serde_json::from_value(reply).map_err(|source| ChannelError::Codec {
        operation: operation.to_string(),
        source,
    })
}
