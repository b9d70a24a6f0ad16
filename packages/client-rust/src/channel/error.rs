use super::state::ChannelState;

/// Errors produced by channels and channel factories.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("endpoint {endpoint} is unreachable")]
    Unreachable {
        endpoint: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error("request to {endpoint} timed out")]
    Timeout { endpoint: String },
    #[error("remote fault from {endpoint}: HTTP {status}")]
    Fault {
        endpoint: String,
        status: u16,
        body: String,
    },
    #[error("transport error talking to {endpoint}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("channel to {endpoint} is faulted")]
    Faulted { endpoint: String },
    #[error("cannot {action} a {state} channel")]
    InvalidState {
        state: ChannelState,
        action: &'static str,
    },
    #[error("channel factory already owns a live channel")]
    Busy,
    #[error("channel factory has been disposed")]
    Disposed,
    #[error("auth token cannot be carried in the `{header}` header")]
    InvalidCredential { header: String },
    #[error("failed to encode or decode payload for `{operation}`")]
    Codec {
        operation: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to configure transport")]
    Setup(#[source] reqwest::Error),
}

impl ChannelError {
    /// Whether this error stems from connectivity, remote availability, or a
    /// remote fault, as opposed to a local programming or payload error.
    #[must_use]
    pub fn is_communication(&self) -> bool {
        match self {
            Self::Unreachable { .. }
            | Self::Timeout { .. }
            | Self::Fault { .. }
            | Self::Faulted { .. } => true,
            Self::Transport { source, .. } => !source.is_decode() && !source.is_builder(),
            Self::InvalidState { .. }
            | Self::Busy
            | Self::Disposed
            | Self::InvalidCredential { .. }
            | Self::Codec { .. }
            | Self::Setup(_) => false,
        }
    }

    /// Whether the channel that raised this error can no longer carry calls.
    #[must_use]
    pub fn faults_channel(&self) -> bool {
        matches!(
            self,
            Self::Unreachable { .. } | Self::Timeout { .. } | Self::Transport { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn endpoint() -> String {
        "https://myns/mysvc".to_string()
    }

    #[test]
    fn connectivity_errors_are_communication() {
        let unreachable = ChannelError::Unreachable {
            endpoint: endpoint(),
            source: "connection refused".into(),
        };
        assert!(unreachable.is_communication());
        assert!(unreachable.faults_channel());

        let timeout = ChannelError::Timeout { endpoint: endpoint() };
        assert!(timeout.is_communication());
        assert!(timeout.faults_channel());
    }

    #[test]
    fn remote_fault_is_communication_but_keeps_channel() {
        let fault = ChannelError::Fault {
            endpoint: endpoint(),
            status: 503,
            body: String::new(),
        };
        assert!(fault.is_communication());
        assert!(!fault.faults_channel());
    }

    #[test]
    fn local_errors_are_not_communication() {
        assert!(!ChannelError::Busy.is_communication());
        assert!(!ChannelError::Disposed.is_communication());
        assert!(!ChannelError::InvalidState {
            state: ChannelState::Closed,
            action: "call",
        }
        .is_communication());
    }

    #[test]
    fn display_includes_endpoint() {
        let err = ChannelError::Fault {
            endpoint: endpoint(),
            status: 500,
            body: "boom".to_string(),
        };
        assert_eq!(err.to_string(), "remote fault from https://myns/mysvc: HTTP 500");
    }
}
