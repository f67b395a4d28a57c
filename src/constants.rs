//! Application-wide constants
//!
//! Wire-format constants live in [`crate::hdlc`].

// =============================================================================
// Decoder
// =============================================================================

/// Default reassembly buffer size (largest frame body, FCS included)
pub const DEFAULT_BUFFER_SIZE: usize = 1024;

/// Default address for outgoing frames
pub const DEFAULT_ADDRESS: u64 = 1;

/// Default staleness timeout for a partial frame (milliseconds, 0 = off)
pub const DEFAULT_FRAME_TIMEOUT_MS: u64 = 0;

// =============================================================================
// Serial
// =============================================================================

/// Default serial baud rate
pub const DEFAULT_BAUD_RATE: u32 = 115_200;

/// Serial read timeout (milliseconds)
pub const SERIAL_READ_TIMEOUT_MS: u64 = 10;

/// Consecutive zero-byte reads before assuming port disconnected
pub const SERIAL_DISCONNECT_THRESHOLD: u32 = 10;

// =============================================================================
// Buffers
// =============================================================================

/// Transport read chunk size
pub const READ_CHUNK_SIZE: usize = 4096;

/// Channel capacity for async message passing
pub const CHANNEL_CAPACITY: usize = 256;

// =============================================================================
// Timing
// =============================================================================

/// Interval between shutdown / staleness checks in a session (milliseconds)
pub const SESSION_TICK_MS: u64 = 100;

// =============================================================================
// Config
// =============================================================================

/// Config file looked up in the working directory
pub const CONFIG_FILE_NAME: &str = "hdlc-monitor.toml";
