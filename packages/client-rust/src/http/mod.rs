//! HTTP(S) relay transport built on `reqwest`.

pub mod channel;
pub mod config;
pub mod factory;

pub use channel::HttpChannel;
pub use config::{BindingConfig, DEFAULT_TOKEN_HEADER};
pub use factory::{HttpChannelFactory, HttpTransport};
