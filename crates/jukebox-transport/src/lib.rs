//! Network surfaces of the jukebox.
//!
//! - the line-oriented control protocol (`/list`, `/play`, `/pause`,
//!   `/schedule <track>`) served over TCP;
//! - the HTTP side: live stream intake on `/`, whole-file downloads,
//!   catalog listing and engine status.
//!
//! Nothing here touches engine state directly; every operation goes through
//! the [`jukebox_ipc::EngineHandle`].

mod command;
mod control;
mod error;
mod framer;
mod http;
mod listener;

#[cfg(test)]
mod test_utils;

pub use command::{ControlCommand, SCHEDULE_PREFIX, UNKNOWN_COMMAND_REPLY};
pub use control::{run_session, ControlServer};
pub use error::TransportError;
pub use framer::LineFramer;
pub use http::{router, HttpServer, HttpState};
pub use listener::{ChannelListener, ListenerStream};

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

/// Default TCP port of the control protocol.
pub const DEFAULT_CONTROL_PORT: u16 = 3000;

/// Default TCP port of the HTTP server.
pub const DEFAULT_HTTP_PORT: u16 = 8080;

/// Size of the socket read buffer of a control session.
pub const READ_BUFFER_SIZE: usize = 4096;

/// Longest control line accepted before the session is closed.
pub const MAX_LINE_LENGTH: usize = 8192;

/// Chunks a listener may have queued before it counts as congested.
pub const LISTENER_QUEUE_CHUNKS: usize = 8;

/// Content type of the live stream and of downloads.
pub const AUDIO_CONTENT_TYPE: &str = "audio/mpeg";
