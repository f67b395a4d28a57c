//! Streaming frame decoder
//!
//! Consumes the raw byte stream one byte at a time and yields complete,
//! checksum-verified frames. Results do not depend on how the transport
//! chunks the stream.
//!
//! The FCS is only identified once the closing flag arrives, so the last
//! `FCS_SIZE` bytes of every frame are held back in an [`FcsWindow`] and fed
//! to the running checksum as they are evicted.

use super::checksum::{Crc32, RunningChecksum};
use super::fcs_window::FcsWindow;
use super::frame::Frame;
use super::{DataLoss, DecodeError, ESCAPE, ESCAPE_MASK, FCS_SIZE, FLAG, MIN_CONTENT_SIZE};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    InterFrame,
    InFrame,
    InFrameEscape,
}

/// Incremental HDLC decoder over a caller-provided reassembly buffer
///
/// The buffer capacity bounds the largest frame that can be returned. Larger
/// frames are still checksummed and reported as `ResourceExhausted`.
///
/// # Example
///
/// ```
/// use hdlc_link::hdlc::{encode_frame, Decoder};
///
/// let mut wire = Vec::new();
/// encode_frame(1, 2, &[0xAA, 0xBB], &mut wire);
///
/// let mut decoder = Decoder::new([0u8; 64]);
/// let (last, rest) = wire.split_last().unwrap();
/// for &byte in rest {
///     assert!(decoder.process(byte).unwrap_err().is_unavailable());
/// }
/// let frame = decoder.process(*last).unwrap();
/// assert_eq!(frame.payload(), &[0xAA, 0xBB]);
/// ```
#[derive(Debug)]
pub struct Decoder<B, C = Crc32> {
    buffer: B,
    state: State,
    /// Bytes seen for the current attempt; may exceed the buffer capacity
    current_frame_size: usize,
    window: FcsWindow<FCS_SIZE>,
    checksum: C,
}

impl<B> Decoder<B, Crc32>
where
    B: AsRef<[u8]> + AsMut<[u8]>,
{
    /// Create a decoder using CRC-32 over `buffer`
    pub fn new(buffer: B) -> Self {
        Self::with_checksum(buffer)
    }
}

impl Decoder<Vec<u8>, Crc32> {
    /// Create a decoder with a heap buffer of `capacity` bytes
    pub fn with_capacity(capacity: usize) -> Self {
        Self::new(vec![0; capacity])
    }
}

impl<B, C> Decoder<B, C>
where
    B: AsRef<[u8]> + AsMut<[u8]>,
    C: RunningChecksum,
{
    /// Create a decoder with a custom running checksum
    pub fn with_checksum(buffer: B) -> Self {
        Self {
            buffer,
            state: State::InterFrame,
            current_frame_size: 0,
            window: FcsWindow::new(),
            checksum: C::default(),
        }
    }

    /// Largest frame body (including FCS) that fits in the buffer
    pub fn capacity(&self) -> usize {
        self.buffer.as_ref().len()
    }

    /// Bytes counted for the frame or noise run in progress
    pub fn pending_bytes(&self) -> usize {
        self.current_frame_size
    }

    /// Drop any partial frame without reporting it
    pub fn reset(&mut self) {
        self.state = State::InterFrame;
        self.reset_frame();
    }

    /// Feed one byte from the wire
    ///
    /// Returns `Unavailable` until a frame completes. The returned frame
    /// borrows the reassembly buffer and must be dropped before the next call.
    pub fn process(&mut self, byte: u8) -> Result<Frame<'_>, DecodeError> {
        match self.state {
            State::InterFrame => {
                if byte == FLAG {
                    self.state = State::InFrame;
                    if self.current_frame_size != 0 {
                        let discarded = self.current_frame_size;
                        self.reset_frame();
                        debug!(discarded, "bytes dropped between frames");
                        return Err(DataLoss::Noise { discarded }.into());
                    }
                } else {
                    self.current_frame_size += 1;
                }
                Err(DecodeError::Unavailable)
            }
            State::InFrame => {
                if byte == FLAG {
                    let status = self.check_frame();
                    let completed_size = self.current_frame_size;
                    // The closing flag also opens the next frame
                    self.reset_frame();
                    status?;
                    return Frame::parse(&self.buffer.as_ref()[..completed_size - FCS_SIZE]);
                }
                if byte == ESCAPE {
                    self.state = State::InFrameEscape;
                } else {
                    self.append(byte);
                }
                Err(DecodeError::Unavailable)
            }
            State::InFrameEscape => {
                if byte == FLAG {
                    self.state = State::InFrame;
                    self.reset_frame();
                    warn!("escaped flag byte, frame dropped");
                    return Err(DataLoss::EscapedFlag.into());
                }
                if byte == ESCAPE {
                    // Abandoned; reported as noise when the next flag arrives
                    self.state = State::InterFrame;
                    self.current_frame_size += 1;
                } else {
                    self.state = State::InFrame;
                    self.append(byte ^ ESCAPE_MASK);
                }
                Err(DecodeError::Unavailable)
            }
        }
    }

    /// Feed a chunk, calling `on_result` for every frame or error
    ///
    /// `Unavailable` results are not reported.
    pub fn process_all<F>(&mut self, data: &[u8], mut on_result: F)
    where
        F: FnMut(Result<Frame<'_>, DecodeError>),
    {
        for &byte in data {
            match self.process(byte) {
                Err(DecodeError::Unavailable) => {}
                result => on_result(result),
            }
        }
    }

    fn append(&mut self, byte: u8) {
        if let Some(slot) = self.buffer.as_mut().get_mut(self.current_frame_size) {
            *slot = byte;
        }

        let evicted = self.window.push(byte);
        if self.current_frame_size >= FCS_SIZE {
            self.checksum.update(evicted);
        }

        // Counted past capacity so oversize frames can be detected
        self.current_frame_size += 1;
    }

    fn check_frame(&self) -> Result<(), DecodeError> {
        let size = self.current_frame_size;

        // Repeated flags are padding
        if size == 0 {
            return Err(DecodeError::Unavailable);
        }

        if size < MIN_CONTENT_SIZE {
            warn!(size, "frame too short");
            return Err(DataLoss::TooShort { size }.into());
        }

        let expected = self.checksum.value();
        let actual = u32::from_le_bytes(self.window.in_order());
        if expected != actual {
            warn!(
                "FCS mismatch: computed 0x{:08X}, received 0x{:08X}",
                expected, actual
            );
            return Err(DataLoss::ChecksumMismatch { expected, actual }.into());
        }

        let capacity = self.capacity();
        if size > capacity {
            warn!(size, capacity, "frame exceeds decoder buffer");
            return Err(DecodeError::ResourceExhausted {
                frame_size: size,
                capacity,
            });
        }

        Ok(())
    }

    fn reset_frame(&mut self) {
        self.current_frame_size = 0;
        self.window.clear();
        self.checksum = C::default();
    }
}
