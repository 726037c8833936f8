//! Listener backed by a bounded per-connection queue.

use std::convert::Infallible;
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use futures::Stream;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::debug;

use jukebox_ipc::{EngineHandle, Listener, ListenerError, ListenerId};

/// Engine-side end of a stream connection.
///
/// The connection drains the queue as fast as the client reads; a full queue
/// makes the listener report no capacity, so the engine skips it.
pub struct ChannelListener {
    id: ListenerId,
    tx: mpsc::Sender<Bytes>,
}

impl ChannelListener {
    /// Create a listener whose queue holds up to `queue_chunks` chunks.
    pub fn new(queue_chunks: usize) -> (Self, mpsc::Receiver<Bytes>) {
        let (tx, rx) = mpsc::channel(queue_chunks.max(1));
        let listener = Self {
            id: ListenerId::next(),
            tx,
        };
        (listener, rx)
    }
}

impl Listener for ChannelListener {
    fn id(&self) -> ListenerId {
        self.id
    }

    // A closed queue still reports capacity so the next write fails and the
    // engine drops the listener.
    fn has_capacity(&self) -> bool {
        self.tx.is_closed() || self.tx.capacity() > 0
    }

    fn write(&mut self, chunk: Bytes) -> Result<(), ListenerError> {
        self.tx.try_send(chunk).map_err(|e| match e {
            TrySendError::Full(_) => ListenerError::Congested,
            TrySendError::Closed(_) => ListenerError::Closed,
        })
    }
}

/// Connection-side end of a stream connection, used as a response body.
///
/// Dropping it (client gone, response aborted) unregisters the listener.
pub struct ListenerStream {
    id: ListenerId,
    rx: mpsc::Receiver<Bytes>,
    engine: EngineHandle,
}

impl ListenerStream {
    /// Wrap the receiving end of the listener's queue.
    pub fn new(id: ListenerId, rx: mpsc::Receiver<Bytes>, engine: EngineHandle) -> Self {
        Self { id, rx, engine }
    }
}

impl Stream for ListenerStream {
    type Item = Result<Bytes, Infallible>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx).map(|chunk| chunk.map(Ok))
    }
}

impl Drop for ListenerStream {
    fn drop(&mut self) {
        debug!(listener = %self.id, "Stream connection closed");
        // A listener left registered is dropped on its next failed write.
        if let Err(e) = self.engine.unregister_listener(self.id) {
            debug!(listener = %self.id, "Unregister not sent: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    use jukebox_ipc::EngineCommand;

    #[test]
    fn test_full_queue_reports_no_capacity() {
        let (mut listener, _rx) = ChannelListener::new(2);

        assert!(listener.has_capacity());
        listener.write(Bytes::from_static(b"1")).unwrap();
        listener.write(Bytes::from_static(b"2")).unwrap();

        assert!(!listener.has_capacity());
        assert_eq!(
            listener.write(Bytes::from_static(b"3")),
            Err(ListenerError::Congested)
        );
    }

    #[test]
    fn test_closed_queue_fails_the_write() {
        let (mut listener, rx) = ChannelListener::new(1);
        listener.write(Bytes::from_static(b"1")).unwrap();
        drop(rx);

        assert!(listener.has_capacity());
        assert_eq!(
            listener.write(Bytes::from_static(b"2")),
            Err(ListenerError::Closed)
        );
    }

    #[tokio::test]
    async fn test_stream_yields_chunks_and_unregisters_on_drop() {
        let (tx, rx) = jukebox_ipc::command_channel();
        let engine = EngineHandle::new(tx);
        let (mut listener, queue) = ChannelListener::new(4);
        let id = listener.id();
        let mut stream = ListenerStream::new(id, queue, engine);

        listener.write(Bytes::from_static(b"abc")).unwrap();
        let chunk = stream.next().await.unwrap().unwrap();
        assert_eq!(chunk, Bytes::from_static(b"abc"));

        drop(stream);
        match rx.try_recv() {
            Ok(EngineCommand::UnregisterListener(unregistered)) => assert_eq!(unregistered, id),
            other => panic!("expected unregister, got {other:?}"),
        }
    }
}
