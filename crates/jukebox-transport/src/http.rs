//! HTTP surface: live stream intake, downloads, catalog and status.

use std::net::SocketAddr;

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use tokio::net::TcpListener;
use tokio_util::io::ReaderStream;
use tracing::{error, info, instrument, warn};

use jukebox_ipc::{EngineHandle, Listener};
use jukebox_library::FsTrackStore;

use crate::error::TransportError;
use crate::listener::{ChannelListener, ListenerStream};
use crate::{TransportResult, AUDIO_CONTENT_TYPE};

/// Shared state of the HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub engine: EngineHandle,
    pub store: FsTrackStore,
    pub listener_queue_chunks: usize,
}

/// Build the router.
pub fn router(state: HttpState) -> Router {
    Router::new()
        .route("/", get(open_stream))
        .route("/download/{*name}", get(download))
        .route("/tracks", get(list_tracks))
        .route("/status", get(status))
        .fallback(not_found)
        .with_state(state)
}

/// Bound HTTP server.
pub struct HttpServer {
    listener: TcpListener,
    state: HttpState,
}

impl HttpServer {
    /// Bind the HTTP port.
    pub async fn bind(addr: SocketAddr, state: HttpState) -> TransportResult<Self> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| TransportError::Bind {
                addr: addr.to_string(),
                source,
            })?;
        Ok(Self { listener, state })
    }

    /// Address the server is bound to.
    pub fn local_addr(&self) -> TransportResult<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    #[instrument(name = "http_server", skip(self))]
    pub async fn run(self) -> TransportResult<()> {
        let addr = self.local_addr()?;
        info!(%addr, "HTTP server listening");
        axum::serve(self.listener, router(self.state))
            .await
            .map_err(|e| TransportError::Http(e.to_string()))
    }
}

/// Register the connection as a listener and stream broadcast chunks to it.
async fn open_stream(State(state): State<HttpState>) -> Response {
    let (listener, rx) = ChannelListener::new(state.listener_queue_chunks);
    let id = listener.id();

    if let Err(e) = state.engine.register_listener(Box::new(listener)).await {
        warn!("Cannot register stream listener: {}", e);
        return StatusCode::SERVICE_UNAVAILABLE.into_response();
    }
    info!(listener = %id, "Stream listener connected");

    let stream = ListenerStream::new(id, rx, state.engine.clone());
    (
        [(header::CONTENT_TYPE, AUDIO_CONTENT_TYPE)],
        Body::from_stream(stream),
    )
        .into_response()
}

/// Send a whole track file. Slashes in the requested name are dropped.
async fn download(State(state): State<HttpState>, Path(name): Path<String>) -> Response {
    let name = name.replace('/', "");
    let Ok(path) = state.store.resolve(&name) else {
        return StatusCode::NOT_FOUND.into_response();
    };

    match tokio::fs::metadata(&path).await {
        Ok(meta) if meta.is_file() => {}
        _ => return StatusCode::NOT_FOUND.into_response(),
    }

    match tokio::fs::File::open(&path).await {
        Ok(file) => {
            info!(file = %name, "Download started");
            (
                [(header::CONTENT_TYPE, AUDIO_CONTENT_TYPE)],
                Body::from_stream(ReaderStream::new(file)),
            )
                .into_response()
        }
        Err(e) => {
            error!(file = %name, "Cannot open download: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

async fn list_tracks(State(state): State<HttpState>) -> Response {
    match state.engine.list_catalog().await {
        Ok(files) => Json(json!({ "files": files })).into_response(),
        Err(e) => {
            error!("Catalog listing failed: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

async fn status(State(state): State<HttpState>) -> Response {
    match state.engine.status().await {
        Ok(status) => Json(status).into_response(),
        Err(e) => {
            warn!("Status unavailable: {}", e);
            StatusCode::SERVICE_UNAVAILABLE.into_response()
        }
    }
}

async fn not_found() -> StatusCode {
    StatusCode::NOT_FOUND
}
