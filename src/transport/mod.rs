//! Transport abstraction for byte-level I/O
//!
//! Separates I/O concerns from protocol logic:
//! - **Transport**: How bytes flow (Serial, capture file, stdin)
//! - **Codec**: How frames are encoded/decoded (handled separately)
//!
//! Each transport manages its own execution model internally:
//! - Serial: blocking threads for low latency
//! - File/stdin: async tokio task

pub mod file;
pub mod serial;

pub use file::FileTransport;
pub use serial::SerialTransport;

use bytes::Bytes;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

use crate::error::Result;

/// Channels for bidirectional communication with a transport
///
/// The transport owns the underlying I/O (serial port, file, etc.)
/// and communicates via these channels. When the transport stops
/// (shutdown, EOF or error), it closes the channels.
pub struct TransportChannels {
    /// Receive raw bytes from the transport
    ///
    /// Returns `None` when the transport has stopped.
    pub rx: mpsc::Receiver<Bytes>,

    /// Send raw bytes to the transport
    ///
    /// The transport will write these bytes to its underlying I/O.
    /// Everything queued here is written before the writer stops.
    pub tx: mpsc::Sender<Bytes>,

    /// Resolves with the number of bytes written once the writer has
    /// stopped (all `tx` senders dropped, or a write error)
    ///
    /// `None` for read-only transports.
    pub writer_done: Option<oneshot::Receiver<usize>>,
}

/// Trait for spawnable transports
///
/// A transport abstracts byte-level I/O operations. It handles:
/// - Opening/closing the byte source
/// - Reading/writing raw bytes
/// - Threading model (blocking or async)
///
/// A transport does NOT handle:
/// - Frame delimiting (that's the codec's job)
/// - Statistics or logging (that's the session's job)
///
/// # Lifecycle
///
/// 1. Create transport with configuration
/// 2. Call `spawn()` to start I/O in background
/// 3. Use returned channels for communication
/// 4. Transport runs until:
///    - `shutdown` flag is set, OR
///    - The source ends or a fatal error occurs
/// 5. Transport closes channels when stopping
pub trait Transport: Send + 'static {
    /// Spawn the transport in background
    ///
    /// Starts I/O threads/tasks and returns channels for communication.
    ///
    /// # Errors
    ///
    /// Returns an error if the transport cannot be initialized
    /// (e.g., port not found, file missing).
    fn spawn(self, shutdown: Arc<AtomicBool>) -> Result<TransportChannels>;
}
