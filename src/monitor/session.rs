//! Monitor session - decode loop over one transport
//!
//! The session handles:
//! - Feeding received bytes through the codec
//! - Forwarding decoded frames and decode errors
//! - Encoding and writing outgoing payloads
//! - Abandoning partial frames that went stale
//! - Statistics tracking
//!
//! The session does NOT handle:
//! - Transport lifecycle (that's the caller's responsibility)
//! - Presentation of events (that's the receiver's job)

use super::stats::Stats;
use crate::codec::{Codec, Event};
use crate::constants::SESSION_TICK_MS;
use crate::error::Result;
use crate::transport::TransportChannels;
use bytes::Bytes;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, info};

/// Decode session over a single transport
///
/// # Example
///
/// ```ignore
/// let (event_tx, mut event_rx) = mpsc::channel(256);
/// let session = MonitorSession::new(channels, HdlcCodec::new(1024, 1), stats, event_tx)
///     .with_frame_timeout(Some(Duration::from_millis(50)));
/// session.run(shutdown).await?;
/// ```
pub struct MonitorSession<C: Codec> {
    /// Transport channels (e.g., Serial)
    transport: TransportChannels,
    /// Codec for the link
    codec: C,
    /// Link statistics
    stats: Arc<Stats>,
    /// Receiver of decoded events
    events: mpsc::Sender<Event>,
    /// Payloads to encode and transmit
    outgoing: Option<mpsc::Receiver<Bytes>>,
    /// Silence after which a partial frame is dropped
    frame_timeout: Option<Duration>,
}

impl<C: Codec> MonitorSession<C> {
    /// Create a new monitor session
    pub fn new(
        transport: TransportChannels,
        codec: C,
        stats: Arc<Stats>,
        events: mpsc::Sender<Event>,
    ) -> Self {
        Self {
            transport,
            codec,
            stats,
            events,
            outgoing: None,
            frame_timeout: None,
        }
    }

    /// Abandon partial frames after `timeout` without new bytes
    pub fn with_frame_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.frame_timeout = timeout;
        self
    }

    /// Encode payloads from `outgoing` and write them to the transport
    ///
    /// The session stops once `outgoing` is closed and drained.
    pub fn with_outgoing(mut self, outgoing: mpsc::Receiver<Bytes>) -> Self {
        self.outgoing = Some(outgoing);
        self
    }

    /// Run until shutdown, transport close, event receiver drop, or outgoing close
    pub async fn run(mut self, shutdown: Arc<AtomicBool>) -> Result<()> {
        let tick = Duration::from_millis(SESSION_TICK_MS);
        let mut last_rx = Instant::now();

        loop {
            let wake = self.next_wake(last_rx, tick);

            tokio::select! {
                biased;

                msg = self.transport.rx.recv() => {
                    match msg {
                        Some(data) => {
                            last_rx = Instant::now();
                            if !self.handle_incoming(&data).await {
                                break;
                            }
                        }
                        None => {
                            debug!("transport closed");
                            break;
                        }
                    }
                }

                payload = recv_outgoing(&mut self.outgoing) => {
                    match payload {
                        Some(payload) => self.send(&payload).await,
                        None => {
                            debug!("outgoing closed");
                            break;
                        }
                    }
                }

                _ = tokio::time::sleep_until(wake) => {
                    if shutdown.load(Ordering::Relaxed) {
                        break;
                    }
                    self.check_stale(last_rx);
                }
            }
        }

        Ok(())
    }

    /// Earlier of the next shutdown poll and the staleness deadline
    fn next_wake(&self, last_rx: Instant, tick: Duration) -> Instant {
        let poll = Instant::now() + tick;
        match self.frame_timeout {
            Some(timeout) if self.codec.pending_bytes() > 0 => poll.min(last_rx + timeout),
            _ => poll,
        }
    }

    fn check_stale(&mut self, last_rx: Instant) {
        let Some(timeout) = self.frame_timeout else {
            return;
        };
        let pending = self.codec.pending_bytes();
        if pending > 0 && last_rx.elapsed() >= timeout {
            info!(pending, "partial frame timed out");
            self.codec.reset();
            self.stats.add_timeout();
        }
    }

    /// Returns false once nobody listens for events
    async fn handle_incoming(&mut self, data: &[u8]) -> bool {
        self.stats.add_rx(data.len());

        let mut decoded = Vec::new();
        self.codec.decode(data, |event| decoded.push(event));

        for event in decoded {
            self.stats.record(&event);
            if self.events.send(event).await.is_err() {
                return false;
            }
        }
        true
    }

    async fn send(&mut self, payload: &[u8]) {
        let mut encoded = Vec::new();
        self.codec.encode(payload, &mut encoded);
        let len = encoded.len();

        if self.transport.tx.send(Bytes::from(encoded)).await.is_ok() {
            self.stats.add_tx(len);
        } else {
            debug!("transport rejected outgoing frame");
        }
    }
}

async fn recv_outgoing(outgoing: &mut Option<mpsc::Receiver<Bytes>>) -> Option<Bytes> {
    match outgoing {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}
