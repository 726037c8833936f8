//! Error types for the transport module.

use thiserror::Error;

use jukebox_ipc::BusError;

/// Errors that can occur in the network surfaces.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Listening socket could not be bound.
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// The engine no longer accepts commands.
    #[error("Engine unavailable: {0}")]
    EngineUnavailable(#[from] BusError),

    /// A control client sent more than the line limit without a newline.
    #[error("Control line exceeds {limit} bytes")]
    LineTooLong { limit: usize },

    /// HTTP server terminated.
    #[error("HTTP server error: {0}")]
    Http(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
