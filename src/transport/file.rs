//! File / stdin transport for replaying captured byte streams
//!
//! Reads the source in fixed-size chunks on a tokio task and closes the
//! receive channel at EOF. Outgoing bytes are discarded.

use super::{Transport, TransportChannels};
use crate::constants::{CHANNEL_CAPACITY, READ_CHUNK_SIZE};
use crate::error::{MonitorError, Result};
use bytes::{Bytes, BytesMut};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Where the replayed bytes come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    File(PathBuf),
    Stdin,
}

impl Source {
    /// `-` selects stdin
    pub fn from_arg(arg: &str) -> Self {
        if arg == "-" {
            Self::Stdin
        } else {
            Self::File(PathBuf::from(arg))
        }
    }
}

/// Replay transport for capture files and pipes
pub struct FileTransport {
    source: Source,
    chunk_size: usize,
}

impl FileTransport {
    pub fn new(source: Source) -> Self {
        Self {
            source,
            chunk_size: READ_CHUNK_SIZE,
        }
    }

    /// Deliver the source in chunks of at most `chunk_size` bytes
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }
}

async fn pump<R>(
    mut reader: R,
    chunk_size: usize,
    tx: mpsc::Sender<Bytes>,
    shutdown: Arc<AtomicBool>,
) where
    R: AsyncRead + Unpin,
{
    let mut buf = BytesMut::with_capacity(chunk_size);
    let mut total = 0usize;

    while !shutdown.load(Ordering::Relaxed) {
        buf.clear();
        buf.resize(chunk_size, 0);
        match reader.read(&mut buf[..]).await {
            Ok(0) => break,
            Ok(n) => {
                total += n;
                buf.truncate(n);
                if tx.send(buf.split().freeze()).await.is_err() {
                    break;
                }
            }
            Err(e) => {
                warn!("input read failed: {}", e);
                break;
            }
        }
    }
    debug!(bytes = total, "input finished");
}

impl Transport for FileTransport {
    fn spawn(self, shutdown: Arc<AtomicBool>) -> Result<TransportChannels> {
        let (in_tx, in_rx) = mpsc::channel::<Bytes>(CHANNEL_CAPACITY);
        let (out_tx, mut out_rx) = mpsc::channel::<Bytes>(CHANNEL_CAPACITY);
        let chunk_size = self.chunk_size;

        match self.source {
            Source::File(path) => {
                // Open synchronously so a missing file fails spawn()
                let file = std::fs::File::open(&path)
                    .map_err(|e| MonitorError::InputOpen { path, source: e })?;
                let file = tokio::fs::File::from_std(file);
                tokio::spawn(pump(file, chunk_size, in_tx, shutdown));
            }
            Source::Stdin => {
                tokio::spawn(pump(tokio::io::stdin(), chunk_size, in_tx, shutdown));
            }
        }

        // Replay sources are read-only
        tokio::spawn(async move { while out_rx.recv().await.is_some() {} });

        Ok(TransportChannels {
            rx: in_rx,
            tx: out_tx,
            writer_done: None,
        })
    }
}
