//! Runtime configuration: defaults, optional TOML file, CLI/env overrides.

use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde::{Deserialize, Serialize};

use jukebox_engine::{EngineConfig, CHUNK_SIZE, TICK_INTERVAL_MS};
use jukebox_library::{DEFAULT_TRACKS_DIR, DEFAULT_TRACK_EXTENSION};
use jukebox_transport::{DEFAULT_CONTROL_PORT, DEFAULT_HTTP_PORT, LISTENER_QUEUE_CHUNKS};

#[derive(Parser, Debug, Default)]
#[command(name = "jukebox", version, about = "Single-station audio jukebox")]
pub struct Cli {
    /// TOML configuration file
    #[arg(short, long, env = "JUKEBOX_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory holding the track files
    #[arg(long, env = "JUKEBOX_TRACKS_DIR")]
    pub tracks_dir: Option<PathBuf>,

    /// Address of the control protocol listener
    #[arg(long, env = "JUKEBOX_CONTROL_ADDR")]
    pub control_addr: Option<SocketAddr>,

    /// Address of the HTTP listener
    #[arg(long, env = "JUKEBOX_HTTP_ADDR")]
    pub http_addr: Option<SocketAddr>,

    /// Milliseconds between two broadcast ticks
    #[arg(long, env = "JUKEBOX_TICK_INTERVAL_MS")]
    pub tick_interval_ms: Option<u64>,

    /// Bytes read from the current track per tick
    #[arg(long, env = "JUKEBOX_CHUNK_SIZE")]
    pub chunk_size: Option<usize>,

    /// Chunks a stream listener may queue before it misses chunks
    #[arg(long, env = "JUKEBOX_LISTENER_QUEUE_CHUNKS")]
    pub listener_queue_chunks: Option<usize>,

    /// File extension of tracks listed in the catalog
    #[arg(long, env = "JUKEBOX_TRACK_EXTENSION")]
    pub track_extension: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JukeboxConfig {
    pub tracks_dir: PathBuf,
    pub control_addr: SocketAddr,
    pub http_addr: SocketAddr,
    pub tick_interval_ms: u64,
    pub chunk_size: usize,
    pub listener_queue_chunks: usize,
    pub track_extension: String,
}

impl Default for JukeboxConfig {
    fn default() -> Self {
        Self {
            tracks_dir: PathBuf::from(DEFAULT_TRACKS_DIR),
            control_addr: SocketAddr::from((Ipv4Addr::UNSPECIFIED, DEFAULT_CONTROL_PORT)),
            http_addr: SocketAddr::from((Ipv4Addr::UNSPECIFIED, DEFAULT_HTTP_PORT)),
            tick_interval_ms: TICK_INTERVAL_MS,
            chunk_size: CHUNK_SIZE,
            listener_queue_chunks: LISTENER_QUEUE_CHUNKS,
            track_extension: DEFAULT_TRACK_EXTENSION.to_string(),
        }
    }
}

impl JukeboxConfig {
    /// Resolve the configuration for this run.
    pub fn load(cli: &Cli) -> Result<Self> {
        let mut config = match &cli.config {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("failed to read config file {}", path.display()))?;
                Self::from_toml(&text)
                    .with_context(|| format!("invalid config file {}", path.display()))?
            }
            None => Self::default(),
        };

        config.apply_overrides(cli);
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML document; missing keys keep their defaults.
    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    fn apply_overrides(&mut self, cli: &Cli) {
        if let Some(dir) = &cli.tracks_dir {
            self.tracks_dir = dir.clone();
        }
        if let Some(addr) = cli.control_addr {
            self.control_addr = addr;
        }
        if let Some(addr) = cli.http_addr {
            self.http_addr = addr;
        }
        if let Some(ms) = cli.tick_interval_ms {
            self.tick_interval_ms = ms;
        }
        if let Some(size) = cli.chunk_size {
            self.chunk_size = size;
        }
        if let Some(chunks) = cli.listener_queue_chunks {
            self.listener_queue_chunks = chunks;
        }
        if let Some(extension) = &cli.track_extension {
            self.track_extension = extension.clone();
        }
    }

    fn validate(&self) -> Result<()> {
        if self.tick_interval_ms == 0 {
            bail!("tick_interval_ms must be greater than zero");
        }
        if self.chunk_size == 0 {
            bail!("chunk_size must be greater than zero");
        }
        if self.listener_queue_chunks == 0 {
            bail!("listener_queue_chunks must be greater than zero");
        }
        Ok(())
    }

    /// Engine settings derived from this configuration.
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            tick_interval: Duration::from_millis(self.tick_interval_ms),
            chunk_size: self.chunk_size,
        }
    }
}
