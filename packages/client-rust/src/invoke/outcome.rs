//! Failure classification and the per-invocation outcome.

use std::fmt;
use std::io;

use crate::channel::ChannelError;

/// Which phase of an invocation a failure happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureStage {
    /// Opening the channel factory or creating the channel.
    Acquire,
    /// Running the caller's operation.
    Operation,
    /// Closing the channel after the operation.
    Close,
}

impl FailureStage {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Acquire => "channel acquisition",
            Self::Operation => "operation",
            Self::Close => "channel close",
        }
    }
}

impl fmt::Display for FailureStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Two-way split between transport problems and everything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Connectivity, remote availability, remote fault, or transport timeout.
    Communication,
    /// Anything else: caller bugs, payload errors, panics.
    Unexpected,
}

/// Classifies an error by walking its source chain.
///
/// The first [`ChannelError`], `reqwest::Error`, or connection-level
/// [`io::Error`] found decides the kind. Errors carrying none of those are
/// unexpected.
#[must_use]
pub fn classify(error: &anyhow::Error) -> FailureKind {
    for cause in error.chain() {
        if let Some(e) = cause.downcast_ref::<ChannelError>() {
            return kind_of(e.is_communication());
        }
        if let Some(e) = cause.downcast_ref::<reqwest::Error>() {
            return kind_of(is_transport_error(e));
        }
        if let Some(e) = cause.downcast_ref::<io::Error>() {
            if is_connection_error(e) {
                return FailureKind::Communication;
            }
        }
    }
    FailureKind::Unexpected
}

fn kind_of(communication: bool) -> FailureKind {
    if communication {
        FailureKind::Communication
    } else {
        FailureKind::Unexpected
    }
}

fn is_transport_error(error: &reqwest::Error) -> bool {
    error.is_connect() || error.is_timeout() || error.is_request() || error.is_status()
}

fn is_connection_error(error: &io::Error) -> bool {
    matches!(
        error.kind(),
        io::ErrorKind::ConnectionRefused
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::NotConnected
            | io::ErrorKind::BrokenPipe
            | io::ErrorKind::TimedOut
    )
}

/// A classified failure, carrying what was reported to the logger.
#[derive(Debug)]
pub struct InvocationFailure {
    pub stage: FailureStage,
    pub service_name: String,
    pub endpoint: String,
    pub error: anyhow::Error,
}

/// Result of an invocation whose configuration was valid.
///
/// When both the operation and the close step fail, the operation's failure
/// is the outcome. Both are logged.
#[derive(Debug)]
pub enum InvocationOutcome {
    Success,
    CommunicationFailure(InvocationFailure),
    UnexpectedFailure(InvocationFailure),
}

impl InvocationOutcome {
    pub(crate) fn failed(kind: FailureKind, failure: InvocationFailure) -> Self {
        match kind {
            FailureKind::Communication => Self::CommunicationFailure(failure),
            FailureKind::Unexpected => Self::UnexpectedFailure(failure),
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    #[must_use]
    pub fn failure(&self) -> Option<&InvocationFailure> {
        match self {
            Self::Success => None,
            Self::CommunicationFailure(f) | Self::UnexpectedFailure(f) => Some(f),
        }
    }

    #[must_use]
    pub fn kind(&self) -> Option<FailureKind> {
        match self {
            Self::Success => None,
            Self::CommunicationFailure(_) => Some(FailureKind::Communication),
            Self::UnexpectedFailure(_) => Some(FailureKind::Unexpected),
        }
    }

    /// Short label for spans and metrics.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::CommunicationFailure(_) => "communication_failure",
            Self::UnexpectedFailure(_) => "unexpected_failure",
        }
    }
}
