//! `relaycall` client: authenticated channels to relay-hosted services and a
//! runner that executes one operation per scoped channel.
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use relaycall_client::http::HttpTransport;
//! use relaycall_client::InvocationRunner;
//! use relaycall_core::{RelayConfig, TracingErrorLogger};
//! use relaycall_client::channel::Channel;
//!
//! # async fn run(config: RelayConfig) -> anyhow::Result<()> {
//! let runner = InvocationRunner::builder()
//!     .transport(HttpTransport::default())
//!     .config(Arc::new(config))
//!     .logger(Arc::new(TracingErrorLogger))
//!     .build()?;
//!
//! let outcome = runner
//!     .invoke("orders", |ch| {
//!         Box::pin(async move {
//!             let reply = ch.call("GetOrder", serde_json::json!({ "id": 7 })).await?;
//!             Ok::<_, anyhow::Error>(reply)
//!         })
//!     })
//!     .await?;
//! assert!(outcome.is_success());
//! # Ok(())
//! # }
//! ```

pub mod channel;
pub mod http;
pub mod invoke;
pub mod telemetry;

pub use channel::{
    call_typed, Channel, ChannelError, ChannelFactory, ChannelOf, ChannelState, Transport,
};
pub use invoke::{
    FailureKind, FailureStage, InvocationError, InvocationFailure, InvocationOutcome,
    InvocationRunner,
};
pub use telemetry::init_tracing;
