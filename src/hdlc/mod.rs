//! HDLC-style link framing
//!
//! Frames are delimited by `FLAG` bytes. Inside a frame, `FLAG` and `ESCAPE`
//! are transmitted as `ESCAPE` followed by the byte XOR `ESCAPE_MASK`.
//!
//! Frame body after unescaping:
//!
//! ```text
//! [address: varint][control: 1 byte][payload: N bytes][fcs: 4 bytes, little-endian]
//! ```
//!
//! The FCS is a CRC-32 over address, control and payload.

pub mod checksum;
pub mod decoder;
pub mod encoder;
pub mod fcs_window;
pub mod frame;
pub mod varint;

pub use checksum::{Crc32, RunningChecksum};
pub use decoder::Decoder;
pub use encoder::{encode_frame, encode_ui_frame};
pub use frame::{DecodedFrame, Frame};

use std::fmt;

/// Frame boundary marker
pub const FLAG: u8 = 0x7E;
/// Escape marker; the next byte is XORed with `ESCAPE_MASK`
pub const ESCAPE: u8 = 0x7D;
pub const ESCAPE_MASK: u8 = 0x20;

/// Width of the frame check sequence in bytes
pub const FCS_SIZE: usize = 4;
pub const CONTROL_SIZE: usize = 1;
pub const MIN_ADDRESS_SIZE: usize = 1;
/// Smallest frame body the decoder accepts (address + control + FCS)
pub const MIN_CONTENT_SIZE: usize = MIN_ADDRESS_SIZE + CONTROL_SIZE + FCS_SIZE;

/// Control byte of an unnumbered-information frame
pub const UI_FRAME_CONTROL: u8 = 0x03;

/// Why a frame attempt was discarded as corrupt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataLoss {
    /// Bytes arrived outside of a frame (or a frame was abandoned)
    Noise { discarded: usize },
    /// An escape byte was followed by a flag
    EscapedFlag,
    /// Frame body shorter than `MIN_CONTENT_SIZE`
    TooShort { size: usize },
    /// Trailing FCS does not match the computed checksum
    ChecksumMismatch { expected: u32, actual: u32 },
    /// The address varint could not be decoded
    MalformedAddress,
    /// No control byte after the address
    MissingControl,
}

/// Result states of the decoder other than a complete frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    /// No complete frame yet
    Unavailable,
    /// A protocol violation; the frame attempt was dropped
    DataLoss(DataLoss),
    /// A checksum-valid frame did not fit in the reassembly buffer
    ResourceExhausted { frame_size: usize, capacity: usize },
}

impl DecodeError {
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable)
    }

    pub fn is_data_loss(&self) -> bool {
        matches!(self, Self::DataLoss(_))
    }

    pub fn is_resource_exhausted(&self) -> bool {
        matches!(self, Self::ResourceExhausted { .. })
    }
}

impl From<DataLoss> for DecodeError {
    fn from(loss: DataLoss) -> Self {
        Self::DataLoss(loss)
    }
}

impl fmt::Display for DataLoss {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Noise { discarded } => {
                write!(f, "{} bytes discarded between frames", discarded)
            }
            Self::EscapedFlag => write!(f, "escaped flag byte"),
            Self::TooShort { size } => write!(
                f,
                "frame too short: {} bytes (min {})",
                size, MIN_CONTENT_SIZE
            ),
            Self::ChecksumMismatch { expected, actual } => write!(
                f,
                "FCS mismatch: computed 0x{:08X}, received 0x{:08X}",
                expected, actual
            ),
            Self::MalformedAddress => write!(f, "malformed address"),
            Self::MissingControl => write!(f, "missing control byte"),
        }
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable => write!(f, "No complete frame available"),
            Self::DataLoss(loss) => write!(f, "Data loss: {}", loss),
            Self::ResourceExhausted {
                frame_size,
                capacity,
            } => write!(
                f,
                "Frame too large: {} bytes (buffer {})",
                frame_size, capacity
            ),
        }
    }
}

impl std::error::Error for DecodeError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_constants_match_wire_format() {
        assert_eq!(FLAG ^ ESCAPE_MASK, 0x5E);
        assert_eq!(ESCAPE ^ ESCAPE_MASK, 0x5D);
        assert_eq!(MIN_CONTENT_SIZE, 6);
    }

    #[test]
    fn error_display() {
        let err = DecodeError::DataLoss(DataLoss::TooShort { size: 3 });
        assert_eq!(err.to_string(), "Data loss: frame too short: 3 bytes (min 6)");

        let err = DecodeError::ResourceExhausted {
            frame_size: 40,
            capacity: 16,
        };
        assert_eq!(err.to_string(), "Frame too large: 40 bytes (buffer 16)");
    }

    #[test]
    fn error_predicates() {
        assert!(DecodeError::Unavailable.is_unavailable());
        assert!(DecodeError::from(DataLoss::EscapedFlag).is_data_loss());
        assert!(DecodeError::ResourceExhausted {
            frame_size: 1,
            capacity: 0
        }
        .is_resource_exhausted());
    }
}
