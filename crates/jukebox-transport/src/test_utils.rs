//! Test doubles shared by the control and HTTP tests.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::Receiver;
use parking_lot::Mutex;
use tokio::io::{AsyncRead, AsyncReadExt};

use jukebox_ipc::{CatalogUnavailable, EngineCommand, EngineHandle, EngineStatus, Listener};

/// Engine stand-in serviced by a plain thread.
///
/// Records every command it receives as a short line, answers catalog and
/// status requests, and forwards registered listeners to the test.
pub(crate) struct FakeEngine {
    pub handle: EngineHandle,
    pub listeners: Receiver<Box<dyn Listener>>,
    log: Arc<Mutex<Vec<String>>>,
    thread: JoinHandle<()>,
}

impl FakeEngine {
    /// `None` makes every catalog request fail.
    pub fn spawn(catalog: Option<Vec<String>>) -> Self {
        let (command_tx, command_rx) = jukebox_ipc::command_channel();
        let (listener_tx, listener_rx) = crossbeam_channel::unbounded();
        let log = Arc::new(Mutex::new(Vec::new()));

        let thread_log = log.clone();
        let thread = thread::spawn(move || {
            for command in command_rx.iter() {
                let entry = match command {
                    EngineCommand::Enqueue { track } => format!("enqueue {track}"),
                    EngineCommand::Play => "play".to_string(),
                    EngineCommand::Pause => "pause".to_string(),
                    EngineCommand::ListCatalog { reply } => {
                        let _ = reply.send(catalog.clone().ok_or_else(|| CatalogUnavailable {
                            message: "tracks directory is gone".to_string(),
                        }));
                        "list".to_string()
                    }
                    EngineCommand::RegisterListener(listener) => {
                        let entry = format!("register {}", listener.id());
                        let _ = listener_tx.send(listener);
                        entry
                    }
                    EngineCommand::UnregisterListener(id) => format!("unregister {id}"),
                    EngineCommand::GetStatus { reply } => {
                        let _ = reply.send(EngineStatus::default());
                        "status".to_string()
                    }
                    EngineCommand::Shutdown => break,
                };
                thread_log.lock().push(entry);
            }
        });

        Self {
            handle: EngineHandle::new(command_tx),
            listeners: listener_rx,
            log,
            thread,
        }
    }

    /// Commands recorded so far.
    pub fn log(&self) -> Vec<String> {
        self.log.lock().clone()
    }

    /// Drops the handle and returns the full log once every other handle
    /// clone is gone.
    pub fn finish(self) -> Vec<String> {
        drop(self.handle);
        self.thread.join().unwrap();
        let log = self.log.lock().clone();
        log
    }
}

/// Reads exactly `len` bytes, failing the test after a few seconds.
pub(crate) async fn read_exactly<R: AsyncRead + Unpin>(reader: &mut R, len: usize) -> String {
    let mut buf = vec![0u8; len];
    tokio::time::timeout(Duration::from_secs(5), reader.read_exact(&mut buf))
        .await
        .expect("timed out waiting for reply")
        .unwrap();
    String::from_utf8(buf).unwrap()
}

/// Reads until `needle` shows up, failing the test after a few seconds.
pub(crate) async fn read_until<R: AsyncRead + Unpin>(reader: &mut R, needle: &str) -> String {
    let mut data = Vec::new();
    let mut buf = [0u8; 1024];
    tokio::time::timeout(Duration::from_secs(5), async {
        while !String::from_utf8_lossy(&data).contains(needle) {
            let n = reader.read(&mut buf).await.unwrap();
            assert!(n > 0, "connection closed before {needle:?} arrived");
            data.extend_from_slice(&buf[..n]);
        }
    })
    .await
    .expect("timed out waiting for response");
    String::from_utf8_lossy(&data).into_owned()
}
