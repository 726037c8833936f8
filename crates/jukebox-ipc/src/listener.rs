//! Listener abstraction for the broadcast fan-out.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use thiserror::Error;

static NEXT_LISTENER_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identifier of a listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ListenerId(u64);

impl ListenerId {
    /// Allocates a fresh identifier.
    pub fn next() -> Self {
        Self(NEXT_LISTENER_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "listener-{}", self.0)
    }
}

/// Errors returned when writing a chunk to a listener.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ListenerError {
    /// The listener cannot take the chunk right now.
    #[error("Listener is congested")]
    Congested,

    /// The listener's connection is gone.
    #[error("Listener connection closed")]
    Closed,
}

/// A live outbound connection receiving broadcast chunks.
///
/// The engine asks [`Listener::has_capacity`] before every write and skips
/// the listener for that chunk when it answers `false`. Chunks are never
/// queued on the engine side for a congested listener.
pub trait Listener: Send {
    /// Identifier used for unregistration.
    fn id(&self) -> ListenerId;

    /// Whether the listener can accept a chunk without blocking.
    fn has_capacity(&self) -> bool;

    /// Hands a chunk to the listener's transport.
    fn write(&mut self, chunk: Bytes) -> Result<(), ListenerError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listener_ids_are_unique() {
        let a = ListenerId::next();
        let b = ListenerId::next();
        assert_ne!(a, b);
        assert!(b > a);
    }

    #[test]
    fn test_listener_id_display() {
        let id = ListenerId(42);
        assert_eq!(id.to_string(), "listener-42");
    }
}
