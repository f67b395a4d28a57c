//! Link monitor
//!
//! Connects a transport to the HDLC codec and streams decode events to a
//! consumer.

pub mod report;
pub mod session;
pub mod stats;

pub use session::MonitorSession;
pub use stats::{Snapshot, Stats};

use crate::codec::{Event, HdlcCodec};
use crate::config::Config;
use crate::constants::CHANNEL_CAPACITY;
use crate::error::{MonitorError, Result};
use crate::transport::file::Source;
use crate::transport::{FileTransport, SerialTransport, Transport, TransportChannels};
use bytes::Bytes;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info};

/// Where the monitored byte stream comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Serial { port: String, baud_rate: u32 },
    Replay(Source),
}

impl Input {
    /// Resolve the input from an explicit replay argument or the link config
    ///
    /// Serial ports are auto-detected when no port is configured.
    pub fn resolve(config: &Config, replay: Option<&str>) -> Result<Self> {
        if let Some(arg) = replay {
            return Ok(Self::Replay(Source::from_arg(arg)));
        }

        let port = if config.link.serial_port.is_empty() {
            let device = config
                .link
                .device
                .as_ref()
                .ok_or(MonitorError::NoDeviceFound)?;
            let port = SerialTransport::detect(device)?;
            info!("Found {} on {}", device.name, port);
            port
        } else {
            config.link.serial_port.clone()
        };

        Ok(Self::Serial {
            port,
            baud_rate: config.link.baud_rate,
        })
    }

    pub fn spawn(self, shutdown: Arc<AtomicBool>) -> Result<TransportChannels> {
        match self {
            Self::Serial { port, baud_rate } => {
                SerialTransport::new(port, baud_rate).spawn(shutdown)
            }
            Self::Replay(source) => FileTransport::new(source).spawn(shutdown),
        }
    }
}

/// Run a monitor session with the configured codec
///
/// Returns when the transport closes, the shutdown flag is set, `events` is
/// closed, or `outgoing` is closed and drained.
pub async fn run(
    config: &Config,
    channels: TransportChannels,
    shutdown: Arc<AtomicBool>,
    stats: Arc<Stats>,
    events: mpsc::Sender<Event>,
    outgoing: Option<mpsc::Receiver<Bytes>>,
) -> Result<()> {
    let codec = HdlcCodec::new(config.decoder.buffer_size, config.decoder.address);

    let mut session = MonitorSession::new(channels, codec, stats, events)
        .with_frame_timeout(config.decoder.frame_timeout());
    if let Some(outgoing) = outgoing {
        session = session.with_outgoing(outgoing);
    }

    session.run(shutdown).await
}

/// Send one payload as a UI frame and wait until the writer confirms it
///
/// Frames received meanwhile are decoded and dropped. Transports without a
/// writer signal count the frame as delivered once it is queued.
/// Returns the number of bytes written.
pub async fn send(
    config: &Config,
    mut channels: TransportChannels,
    shutdown: Arc<AtomicBool>,
    payload: Bytes,
) -> Result<usize> {
    let writer_done = channels.writer_done.take();
    let stats = Arc::new(Stats::new());
    let (event_tx, mut event_rx) = mpsc::channel::<Event>(CHANNEL_CAPACITY);
    let (out_tx, out_rx) = mpsc::channel::<Bytes>(1);

    out_tx
        .send(payload)
        .await
        .map_err(|_| MonitorError::TransportClosed)?;
    drop(out_tx);

    let session = run(config, channels, shutdown, stats.clone(), event_tx, Some(out_rx));
    let drain = async { while event_rx.recv().await.is_some() {} };
    let (result, ()) = tokio::join!(session, drain);
    result?;

    let expected = stats.snapshot().tx_bytes as usize;
    if expected == 0 {
        return Err(MonitorError::TransportClosed);
    }

    let written = match writer_done {
        Some(done) => done.await.map_err(|_| MonitorError::TransportClosed)?,
        None => expected,
    };
    if written < expected {
        return Err(MonitorError::WriteIncomplete { written, expected });
    }

    debug!(written, "frame delivered");
    Ok(written)
}
