//! Link statistics for the monitor
//!
//! Thread-safe counters for throughput and decode outcomes.
//! Uses lock-free atomics for all operations.

use crate::codec::Event;
use crate::hdlc::DecodeError;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Link statistics (fully lock-free)
pub struct Stats {
    /// Total bytes received from the transport
    rx_total: AtomicU64,
    /// Total bytes written to the transport
    tx_total: AtomicU64,
    /// Frames decoded successfully
    frames: AtomicU64,
    /// DataLoss results
    data_loss: AtomicU64,
    /// ResourceExhausted results
    oversize: AtomicU64,
    /// Partial frames abandoned by the staleness timeout
    timeouts: AtomicU64,
    /// Reference instant for rate calculations
    start_time: Instant,
}

/// Point-in-time copy of the counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub rx_bytes: u64,
    pub tx_bytes: u64,
    pub frames: u64,
    pub data_loss: u64,
    pub oversize: u64,
    pub timeouts: u64,
}

impl Stats {
    pub fn new() -> Self {
        Self {
            rx_total: AtomicU64::new(0),
            tx_total: AtomicU64::new(0),
            frames: AtomicU64::new(0),
            data_loss: AtomicU64::new(0),
            oversize: AtomicU64::new(0),
            timeouts: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    #[inline]
    pub fn add_rx(&self, bytes: usize) {
        self.rx_total.fetch_add(bytes as u64, Ordering::Relaxed);
    }

    #[inline]
    pub fn add_tx(&self, bytes: usize) {
        self.tx_total.fetch_add(bytes as u64, Ordering::Relaxed);
    }

    #[inline]
    pub fn add_timeout(&self) {
        self.timeouts.fetch_add(1, Ordering::Relaxed);
    }

    /// Count a decode outcome
    pub fn record(&self, event: &Event) {
        let counter = match event {
            Event::Frame(_) => &self.frames,
            Event::Error(DecodeError::DataLoss(_)) => &self.data_loss,
            Event::Error(DecodeError::ResourceExhausted { .. }) => &self.oversize,
            Event::Error(DecodeError::Unavailable) => return,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            rx_bytes: self.rx_total.load(Ordering::Relaxed),
            tx_bytes: self.tx_total.load(Ordering::Relaxed),
            frames: self.frames.load(Ordering::Relaxed),
            data_loss: self.data_loss.load(Ordering::Relaxed),
            oversize: self.oversize.load(Ordering::Relaxed),
            timeouts: self.timeouts.load(Ordering::Relaxed),
        }
    }

    /// Average receive rate since creation, in KB/s
    pub fn rx_rate(&self) -> f64 {
        let elapsed = self.start_time.elapsed().as_secs_f64();
        if elapsed <= 0.0 {
            return 0.0;
        }
        self.rx_total.load(Ordering::Relaxed) as f64 / elapsed / 1024.0
    }
}

impl Default for Stats {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} bytes in, {} bytes out, {} frames, {} data loss, {} oversize, {} timeouts",
            self.rx_bytes, self.tx_bytes, self.frames, self.data_loss, self.oversize, self.timeouts
        )
    }
}
