//! Control protocol server and sessions.

use std::net::SocketAddr;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpListener;
use tracing::{debug, error, info, instrument, warn, Instrument};

use jukebox_ipc::{BusError, EngineHandle};

use crate::command::{ControlCommand, UNKNOWN_COMMAND_REPLY};
use crate::error::TransportError;
use crate::framer::LineFramer;
use crate::{TransportResult, MAX_LINE_LENGTH, READ_BUFFER_SIZE};

/// TCP server accepting control sessions.
pub struct ControlServer {
    listener: TcpListener,
    engine: EngineHandle,
}

impl ControlServer {
    /// Bind the control port.
    pub async fn bind(addr: SocketAddr, engine: EngineHandle) -> TransportResult<Self> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| TransportError::Bind {
                addr: addr.to_string(),
                source,
            })?;
        Ok(Self { listener, engine })
    }

    /// Address the server is bound to.
    pub fn local_addr(&self) -> TransportResult<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept connections forever, one task per session.
    #[instrument(name = "control_server", skip(self))]
    pub async fn run(self) {
        if let Ok(addr) = self.listener.local_addr() {
            info!(%addr, "Control server listening");
        }

        loop {
            let (stream, peer) = match self.listener.accept().await {
                Ok(accepted) => accepted,
                Err(e) => {
                    warn!("Accept failed: {}", e);
                    continue;
                }
            };

            let engine = self.engine.clone();
            let span = tracing::info_span!("control_session", %peer);
            tokio::spawn(
                async move {
                    if let Err(e) = run_session(stream, engine).await {
                        warn!("Control session ended with error: {}", e);
                    }
                }
                .instrument(span),
            );
        }
    }
}

/// Serve one control connection until the peer disconnects.
///
/// Commands are handled in arrival order. The session ends with an error if
/// the connection fails, the engine is gone, or a line grows past
/// [`MAX_LINE_LENGTH`].
pub async fn run_session<S>(stream: S, engine: EngineHandle) -> TransportResult<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    info!("Control session opened");

    let (mut reader, mut writer) = tokio::io::split(stream);
    let mut framer = LineFramer::new();
    let mut buf = vec![0u8; READ_BUFFER_SIZE];

    loop {
        let n = reader.read(&mut buf).await?;
        if n == 0 {
            info!(pending = framer.pending(), "Connection ended");
            return Ok(());
        }

        framer.push(&buf[..n]);
        while let Some(line) = framer.next_line() {
            handle_line(&line, &engine, &mut writer).await?;
        }

        if framer.pending() > MAX_LINE_LENGTH {
            warn!(pending = framer.pending(), "Control line too long, closing session");
            return Err(TransportError::LineTooLong {
                limit: MAX_LINE_LENGTH,
            });
        }
    }
}

async fn handle_line<W>(line: &str, engine: &EngineHandle, writer: &mut W) -> TransportResult<()>
where
    W: AsyncWrite + Unpin,
{
    let command = ControlCommand::parse(line);
    debug!(?command, "Control command");

    match command {
        ControlCommand::List => match engine.list_catalog().await {
            Ok(files) => {
                let mut reply = String::new();
                for file in files {
                    reply.push_str(&file);
                    reply.push('\n');
                }
                writer.write_all(reply.as_bytes()).await?;
            }
            Err(BusError::Disconnected) => return Err(BusError::Disconnected.into()),
            // No reply line on failure; the client only sees silence.
            Err(e) => error!("/list failed: {}", e),
        },
        ControlCommand::Play => engine.play().await?,
        ControlCommand::Pause => engine.pause().await?,
        ControlCommand::Schedule(track) => engine.enqueue(track).await?,
        ControlCommand::Unknown(_) => writer.write_all(UNKNOWN_COMMAND_REPLY.as_bytes()).await?,
    }

    Ok(())
}
