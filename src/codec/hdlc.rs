//! HDLC codec for serial links
//!
//! Wraps the streaming [`Decoder`] and copies completed frames out of its
//! reassembly buffer so they can cross task boundaries.

use super::{Codec, Event};
use crate::hdlc::{encode_ui_frame, Decoder};

/// Codec for HDLC-framed byte streams
///
/// Outgoing payloads are sent as unnumbered-information frames to a fixed
/// address.
pub struct HdlcCodec {
    decoder: Decoder<Vec<u8>>,
    address: u64,
}

impl HdlcCodec {
    /// Create a codec able to receive frames up to `max_frame_size` bytes
    pub fn new(max_frame_size: usize, address: u64) -> Self {
        Self {
            decoder: Decoder::with_capacity(max_frame_size),
            address,
        }
    }

    /// Address used for outgoing frames
    pub fn address(&self) -> u64 {
        self.address
    }
}

impl Default for HdlcCodec {
    fn default() -> Self {
        Self::new(
            crate::constants::DEFAULT_BUFFER_SIZE,
            crate::constants::DEFAULT_ADDRESS,
        )
    }
}

impl Codec for HdlcCodec {
    fn decode(&mut self, data: &[u8], mut on_event: impl FnMut(Event)) {
        self.decoder.process_all(data, |result| match result {
            Ok(frame) => on_event(Event::Frame(frame.to_decoded())),
            Err(e) => on_event(Event::Error(e)),
        });
    }

    fn encode(&self, payload: &[u8], output: &mut Vec<u8>) {
        encode_ui_frame(self.address, payload, output);
    }

    fn reset(&mut self) {
        self.decoder.reset();
    }

    fn pending_bytes(&self) -> usize {
        self.decoder.pending_bytes()
    }
}
