//! Codec abstraction for message encoding/decoding
//!
//! Separates encoding concerns from transport:
//! - **Codec**: How frames are encoded/decoded (HDLC)
//! - **Transport**: How bytes flow (Serial, file replay)

pub mod hdlc;

pub use self::hdlc::HdlcCodec;

use crate::hdlc::{DecodeError, DecodedFrame};

/// Something a codec found in the byte stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Complete, checksum-verified frame
    Frame(DecodedFrame),
    /// Corrupt or oversize frame (never `Unavailable`)
    Error(DecodeError),
}

/// Codec trait for encoding/decoding frames
///
/// A codec transforms raw bytes into events (decode)
/// and payloads into bytes for transmission (encode).
pub trait Codec: Send {
    /// Decode incoming bytes
    ///
    /// Calls `on_event` for each frame or error detected.
    /// Partial frames are kept until more data arrives.
    fn decode(&mut self, data: &[u8], on_event: impl FnMut(Event));

    /// Encode a payload for transmission
    ///
    /// Appends encoded bytes to `output`.
    fn encode(&self, payload: &[u8], output: &mut Vec<u8>);

    /// Drop any partially received frame
    fn reset(&mut self);

    /// Bytes buffered for a frame that has not completed yet
    fn pending_bytes(&self) -> usize;
}
