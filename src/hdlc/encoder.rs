//! Frame encoder (byte stuffing writer)
//!
//! Mirror image of the decoder: writes an opening flag, the escaped body and
//! FCS, and a closing flag. Output is appended to the caller's buffer.

use super::checksum::{Crc32, RunningChecksum};
use super::{varint, ESCAPE, ESCAPE_MASK, FLAG, UI_FRAME_CONTROL};

/// Append `byte` to `output`, escaped if it is `FLAG` or `ESCAPE`
#[inline]
pub fn escape_into(byte: u8, output: &mut Vec<u8>) {
    if byte == FLAG || byte == ESCAPE {
        output.push(ESCAPE);
        output.push(byte ^ ESCAPE_MASK);
    } else {
        output.push(byte);
    }
}

/// Append a complete frame to `output`
///
/// Returns the number of bytes written.
pub fn encode_frame(address: u64, control: u8, payload: &[u8], output: &mut Vec<u8>) -> usize {
    let start = output.len();
    output.reserve(payload.len() + 16);

    let mut address_bytes = Vec::with_capacity(varint::MAX_VARINT_SIZE);
    varint::encode_into(address, &mut address_bytes);

    let mut fcs = Crc32::new();
    output.push(FLAG);
    for &byte in address_bytes
        .iter()
        .chain(std::iter::once(&control))
        .chain(payload)
    {
        fcs.update(byte);
        escape_into(byte, output);
    }
    for byte in fcs.value().to_le_bytes() {
        escape_into(byte, output);
    }
    output.push(FLAG);

    output.len() - start
}

/// Append an unnumbered-information frame to `output`
pub fn encode_ui_frame(address: u64, payload: &[u8], output: &mut Vec<u8>) -> usize {
    encode_frame(address, UI_FRAME_CONTROL, payload, output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_frame_layout() {
        let mut out = Vec::new();
        let n = encode_frame(1, 2, &[0xAA, 0xBB, 0xCC], &mut out);

        assert_eq!(n, out.len());
        assert_eq!(out.first(), Some(&FLAG));
        assert_eq!(out.last(), Some(&FLAG));
        assert_eq!(&out[1..6], &[0x01, 0x02, 0xAA, 0xBB, 0xCC]);

        let crc = Crc32::checksum(&[0x01, 0x02, 0xAA, 0xBB, 0xCC]);
        let mut expected_fcs = Vec::new();
        for b in crc.to_le_bytes() {
            escape_into(b, &mut expected_fcs);
        }
        assert_eq!(&out[6..out.len() - 1], expected_fcs.as_slice());
    }

    #[test]
    fn special_bytes_are_escaped() {
        let mut out = Vec::new();
        encode_ui_frame(FLAG as u64, &[ESCAPE, 0x00, FLAG], &mut out);

        // Only the delimiters may be raw flags
        let inner = &out[1..out.len() - 1];
        assert!(!inner.contains(&FLAG));
        assert_eq!(&inner[..2], &[ESCAPE, FLAG ^ ESCAPE_MASK]);
        assert_eq!(inner[2], UI_FRAME_CONTROL);
        assert_eq!(&inner[3..8], &[ESCAPE, 0x5D, 0x00, ESCAPE, 0x5E]);
    }

    #[test]
    fn appends_to_existing_output() {
        let mut out = vec![FLAG];
        encode_ui_frame(3, b"hi", &mut out);
        assert_eq!(&out[..3], &[FLAG, FLAG, 0x03]);
    }
}
