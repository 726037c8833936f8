//! Listener registry and lossy fan-out.

use bytes::Bytes;
use tracing::{debug, info, trace};

use jukebox_ipc::{Listener, ListenerError, ListenerId};

/// Result of fanning one chunk out to the registered listeners.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastOutcome {
    /// Listeners that received the chunk.
    pub delivered: usize,

    /// Congested listeners that missed the chunk.
    pub skipped: usize,

    /// Listeners removed because the write failed.
    pub dropped: usize,
}

/// The live set of listeners receiving the broadcast.
#[derive(Default)]
pub struct ListenerRegistry {
    listeners: Vec<Box<dyn Listener>>,
}

impl ListenerRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a listener. A listener registered twice replaces the first entry.
    pub fn register(&mut self, listener: Box<dyn Listener>) {
        let id = listener.id();
        self.listeners.retain(|l| l.id() != id);
        self.listeners.push(listener);
        info!(listener = %id, total = self.listeners.len(), "Listener registered");
    }

    /// Removes a listener. Returns false if it was not registered.
    pub fn unregister(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|l| l.id() != id);
        let removed = self.listeners.len() != before;
        if removed {
            info!(listener = %id, total = self.listeners.len(), "Listener unregistered");
        }
        removed
    }

    /// Number of registered listeners.
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Writes `chunk` to every listener with capacity.
    ///
    /// Congested listeners miss this chunk for good. Listeners whose write
    /// fails are removed; the remaining listeners still get the chunk.
    pub fn broadcast(&mut self, chunk: &Bytes) -> BroadcastOutcome {
        let mut outcome = BroadcastOutcome::default();

        self.listeners.retain_mut(|listener| {
            if !listener.has_capacity() {
                trace!(listener = %listener.id(), "Listener congested, skipping chunk");
                outcome.skipped += 1;
                return true;
            }

            match listener.write(chunk.clone()) {
                Ok(()) => {
                    outcome.delivered += 1;
                    true
                }
                Err(ListenerError::Congested) => {
                    outcome.skipped += 1;
                    true
                }
                Err(ListenerError::Closed) => {
                    debug!(listener = %listener.id(), "Listener write failed, removing");
                    outcome.dropped += 1;
                    false
                }
            }
        });

        outcome
    }
}
