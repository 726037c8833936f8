//! Sender-side façade over the command channel.

use crossbeam_channel::{Sender, TrySendError};
use thiserror::Error;
use tokio::sync::oneshot;

use crate::commands::{EngineCommand, Reply};
use crate::listener::{Listener, ListenerId};
use crate::state::EngineStatus;

/// Errors raised on the sending side of the command bus.
#[derive(Debug, Clone, Error)]
pub enum BusError {
    /// The engine is no longer receiving commands.
    #[error("Engine command channel disconnected")]
    Disconnected,

    /// The command channel is full and the caller chose not to wait.
    #[error("Engine command channel is full")]
    Busy,

    /// The engine dropped a request without replying.
    #[error("Engine dropped the request without replying")]
    NoReply,

    /// The engine handled the request but it failed.
    #[error("Request failed: {0}")]
    Failed(String),
}

/// Cloneable handle used by sessions to reach the engine.
///
/// Sends never park a runtime worker: when the channel is full the caller is
/// suspended until the engine drains it.
#[derive(Debug, Clone)]
pub struct EngineHandle {
    command_tx: Sender<EngineCommand>,
}

impl EngineHandle {
    /// Wrap the sending end of a command channel.
    pub fn new(command_tx: Sender<EngineCommand>) -> Self {
        Self { command_tx }
    }

    /// Sends a command, waiting for room if the channel is full.
    pub async fn send(&self, command: EngineCommand) -> Result<(), BusError> {
        match self.command_tx.try_send(command) {
            Ok(()) => Ok(()),
            Err(TrySendError::Disconnected(_)) => Err(BusError::Disconnected),
            Err(TrySendError::Full(command)) => {
                // The blocking send runs on the blocking pool; this task only awaits it.
                let command_tx = self.command_tx.clone();
                tokio::task::spawn_blocking(move || command_tx.send(command))
                    .await
                    .map_err(|_| BusError::Disconnected)?
                    .map_err(|_| BusError::Disconnected)
            }
        }
    }

    /// Sends a command only if the channel has room right now.
    pub fn try_send(&self, command: EngineCommand) -> Result<(), BusError> {
        self.command_tx.try_send(command).map_err(|e| match e {
            TrySendError::Full(_) => BusError::Busy,
            TrySendError::Disconnected(_) => BusError::Disconnected,
        })
    }

    /// Sends a command carrying a reply slot and waits for the reply.
    pub async fn request<T>(
        &self,
        make_command: impl FnOnce(Reply<T>) -> EngineCommand,
    ) -> Result<T, BusError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(make_command(reply_tx)).await?;
        reply_rx.await.map_err(|_| BusError::NoReply)
    }

    /// Append a track to the playlist.
    pub async fn enqueue(&self, track: impl Into<String>) -> Result<(), BusError> {
        self.send(EngineCommand::Enqueue {
            track: track.into(),
        })
        .await
    }

    /// Resume playback.
    pub async fn play(&self) -> Result<(), BusError> {
        self.send(EngineCommand::Play).await
    }

    /// Pause playback.
    pub async fn pause(&self) -> Result<(), BusError> {
        self.send(EngineCommand::Pause).await
    }

    /// Start broadcasting to a listener.
    pub async fn register_listener(&self, listener: Box<dyn Listener>) -> Result<(), BusError> {
        self.send(EngineCommand::RegisterListener(listener)).await
    }

    /// Stop broadcasting to a listener, without waiting.
    ///
    /// Usable from `Drop`. If the channel is full the command is finished on
    /// a runtime task; outside a runtime it fails with [`BusError::Busy`].
    pub fn unregister_listener(&self, id: ListenerId) -> Result<(), BusError> {
        match self
            .command_tx
            .try_send(EngineCommand::UnregisterListener(id))
        {
            Ok(()) => Ok(()),
            Err(TrySendError::Disconnected(_)) => Err(BusError::Disconnected),
            Err(TrySendError::Full(command)) => {
                let runtime =
                    tokio::runtime::Handle::try_current().map_err(|_| BusError::Busy)?;
                let handle = self.clone();
                runtime.spawn(async move {
                    let _ = handle.send(command).await;
                });
                Ok(())
            }
        }
    }

    /// Ask the engine thread to stop.
    pub async fn shutdown(&self) -> Result<(), BusError> {
        self.send(EngineCommand::Shutdown).await
    }

    /// Lists the catalog through the engine.
    pub async fn list_catalog(&self) -> Result<Vec<String>, BusError> {
        self.request(|reply| EngineCommand::ListCatalog { reply })
            .await?
            .map_err(|e| BusError::Failed(e.message))
    }

    /// Fetches a snapshot of the engine.
    pub async fn status(&self) -> Result<EngineStatus, BusError> {
        self.request(|reply| EngineCommand::GetStatus { reply }).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::commands::CatalogUnavailable;

    #[tokio::test]
    async fn test_list_catalog_round_trip() {
        let (tx, rx) = crate::command_channel();
        let handle = EngineHandle::new(tx);

        let responder = std::thread::spawn(move || match rx.recv() {
            Ok(EngineCommand::ListCatalog { reply }) => {
                let _ = reply.send(Ok(vec!["a.mp3".to_string(), "b.mp3".to_string()]));
            }
            other => panic!("unexpected command: {other:?}"),
        });

        let files = handle.list_catalog().await.unwrap();
        assert_eq!(files, vec!["a.mp3", "b.mp3"]);
        responder.join().unwrap();
    }

    #[tokio::test]
    async fn test_list_catalog_failure_is_reported() {
        let (tx, rx) = crate::command_channel();
        let handle = EngineHandle::new(tx);

        let responder = std::thread::spawn(move || {
            if let Ok(EngineCommand::ListCatalog { reply }) = rx.recv() {
                let _ = reply.send(Err(CatalogUnavailable {
                    message: "permission denied".to_string(),
                }));
            }
        });

        let err = handle.list_catalog().await.unwrap_err();
        assert!(matches!(err, BusError::Failed(ref m) if m == "permission denied"));
        responder.join().unwrap();
    }

    #[tokio::test]
    async fn test_dropped_reply_is_no_reply() {
        let (tx, rx) = crate::command_channel();
        let handle = EngineHandle::new(tx);

        let responder = std::thread::spawn(move || {
            let command = rx.recv().unwrap();
            drop(command);
        });

        let err = handle.status().await.unwrap_err();
        assert!(matches!(err, BusError::NoReply));
        responder.join().unwrap();
    }

    #[tokio::test]
    async fn test_send_after_engine_gone_is_disconnected() {
        let (tx, rx) = crate::command_channel();
        drop(rx);
        let handle = EngineHandle::new(tx);

        assert!(matches!(handle.play().await, Err(BusError::Disconnected)));
        assert!(matches!(handle.enqueue("a.mp3").await, Err(BusError::Disconnected)));
        assert!(matches!(
            handle.unregister_listener(ListenerId::next()),
            Err(BusError::Disconnected)
        ));
    }

    #[tokio::test]
    async fn test_commands_arrive_in_send_order() {
        let (tx, rx) = crate::command_channel();
        let handle = EngineHandle::new(tx);

        handle.enqueue("track1.mp3").await.unwrap();
        handle.pause().await.unwrap();
        handle.play().await.unwrap();

        let topics: Vec<_> = rx.try_iter().map(|c| c.topic()).collect();
        assert_eq!(topics, vec!["enqueue", "pause", "play"]);
    }

    fn fill(handle: &EngineHandle) {
        for _ in 0..crate::COMMAND_CHANNEL_CAPACITY {
            handle.try_send(EngineCommand::Pause).unwrap();
        }
        assert!(matches!(
            handle.try_send(EngineCommand::Pause),
            Err(BusError::Busy)
        ));
    }

    #[tokio::test]
    async fn test_full_channel_suspends_sender_without_blocking_runtime() {
        let (tx, rx) = crate::command_channel();
        let handle = EngineHandle::new(tx);
        fill(&handle);

        let sender = handle.clone();
        let pending = tokio::spawn(async move { sender.play().await });

        // Timers still fire on this single-threaded runtime.
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!pending.is_finished());

        rx.recv().unwrap();
        tokio::time::timeout(Duration::from_secs(5), pending)
            .await
            .unwrap()
            .unwrap()
            .unwrap();

        let topics: Vec<_> = rx.try_iter().map(|c| c.topic()).collect();
        assert_eq!(topics.len(), crate::COMMAND_CHANNEL_CAPACITY);
        assert_eq!(topics.last(), Some(&"play"));
    }

    #[tokio::test]
    async fn test_unregister_on_full_channel_completes_in_background() {
        let (tx, rx) = crate::command_channel();
        let handle = EngineHandle::new(tx);
        fill(&handle);

        let id = ListenerId::next();
        handle.unregister_listener(id).unwrap();

        let drained = tokio::task::spawn_blocking(move || {
            let timeout = Duration::from_secs(5);
            let mut last = None;
            for _ in 0..=crate::COMMAND_CHANNEL_CAPACITY {
                last = rx.recv_timeout(timeout).ok();
            }
            last
        })
        .await
        .unwrap();

        match drained {
            Some(EngineCommand::UnregisterListener(unregistered)) => assert_eq!(unregistered, id),
            other => panic!("expected unregister, got {other:?}"),
        }
    }

    #[test]
    fn test_unregister_on_full_channel_outside_runtime_is_busy() {
        let (tx, _rx) = crate::command_channel();
        let handle = EngineHandle::new(tx);
        fill(&handle);

        assert!(matches!(
            handle.unregister_listener(ListenerId::next()),
            Err(BusError::Busy)
        ));
    }
}
