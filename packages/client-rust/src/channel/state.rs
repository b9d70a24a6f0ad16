//! Channel lifecycle state and the single-live-channel lease.
//!
//! State is held in an `ArcSwap` so reads on the call path never block, the
//! lease is an RAII guard that frees its factory slot on drop.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use arc_swap::ArcSwap;

/// Lifecycle of a channel.
///
/// State machine: Created -> Open -> Closed, with Faulted reachable from
/// Created or Open on a transport error. Closed and Faulted are terminal for
/// calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    /// Built by a factory, no request sent yet.
    Created,
    /// At least one request has reached the remote side.
    Open,
    /// Explicitly closed. No further calls are accepted.
    Closed,
    /// A transport failure broke the channel. Only `close` is accepted.
    Faulted,
}

impl ChannelState {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Open => "open",
            Self::Closed => "closed",
            Self::Faulted => "faulted",
        }
    }

    /// Whether the channel can still carry calls.
    #[must_use]
    pub fn accepts_calls(self) -> bool {
        matches!(self, Self::Created | Self::Open)
    }
}

impl fmt::Display for ChannelState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lock-free holder for a [`ChannelState`].
#[derive(Debug)]
pub struct StateCell {
    inner: ArcSwap<ChannelState>,
}

impl StateCell {
    #[must_use]
    pub fn new(initial: ChannelState) -> Self {
        Self {
            inner: ArcSwap::from_pointee(initial),
        }
    }

    #[must_use]
    pub fn get(&self) -> ChannelState {
        **self.inner.load()
    }

    pub fn set(&self, state: ChannelState) {
        self.inner.store(Arc::new(state));
    }

    /// Moves `Created` to `Open`. Any other state is left untouched.
    pub fn mark_open(&self) {
        self.inner.rcu(|current| {
            if **current == ChannelState::Created {
                Arc::new(ChannelState::Open)
            } else {
                Arc::clone(current)
            }
        });
    }
}

impl Default for StateCell {
    fn default() -> Self {
        Self::new(ChannelState::Created)
    }
}

/// Marks a factory's channel slot as taken until dropped.
///
/// Released during unwinding as well, so a panicking operation never leaves
/// its factory believing a channel is still live.
#[derive(Debug)]
pub struct ChannelLease {
    live: Arc<AtomicBool>,
}

impl ChannelLease {
    /// Takes the slot guarded by `live`, or returns `None` if it is taken.
    #[must_use]
    pub fn acquire(live: &Arc<AtomicBool>) -> Option<Self> {
        live.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self {
                live: Arc::clone(live),
            })
    }
}

impl Drop for ChannelLease {
    fn drop(&mut self) {
        self.live.store(false, Ordering::Release);
    }
}
