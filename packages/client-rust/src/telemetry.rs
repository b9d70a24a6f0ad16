//! Process-wide tracing setup for binaries embedding the client.

use tracing_subscriber::EnvFilter;

/// Default filter when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "relaycall_client=info,relaycall_core=info,warn";

/// Installs a global `tracing` subscriber.
///
/// `RUST_LOG` overrides [`DEFAULT_FILTER`]. With `json` set, events are written
/// as one JSON object per line. Calling this when a subscriber is already
/// installed leaves the existing one in place and returns `false`.
pub fn init_tracing(json: bool) -> bool {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let result = if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .json()
            .try_init()
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .try_init()
    };

    if result.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
    result.is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_init_keeps_existing_subscriber() {
        init_tracing(false);
        assert!(tracing::dispatcher::has_been_set());
        assert!(!init_tracing(true));
    }
}
