//! One-shot subcommands that do not need a transport

use crate::error::Result;
use crate::hdlc::{encode_frame, Decoder};

/// Decode a hex-encoded wire capture, one line per frame or error
pub fn decode_hex(input: &str, buffer_size: usize) -> Result<Vec<String>> {
    let wire = parse_hex(input)?;
    let mut decoder = Decoder::with_capacity(buffer_size);
    let mut lines = Vec::new();

    decoder.process_all(&wire, |result| {
        lines.push(match result {
            Ok(frame) => format!(
                "addr={} ctrl=0x{:02X} payload={}",
                frame.address(),
                frame.control(),
                hex::encode_upper(frame.payload())
            ),
            Err(e) => format!("error: {}", e),
        });
    });

    if decoder.pending_bytes() > 0 {
        lines.push(format!("incomplete: {} bytes pending", decoder.pending_bytes()));
    }
    Ok(lines)
}

/// Encode one frame and return the wire bytes as hex
pub fn encode_hex(address: u64, control: u8, payload: &str) -> Result<String> {
    let payload = parse_hex(payload)?;
    let mut wire = Vec::new();
    encode_frame(address, control, &payload, &mut wire);
    Ok(hex::encode_upper(wire))
}

/// Parse hex, ignoring whitespace and an optional `0x` prefix
pub fn parse_hex(input: &str) -> Result<Vec<u8>> {
    let trimmed = input.trim();
    let trimmed = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    let compact: String = trimmed.chars().filter(|c| !c.is_whitespace()).collect();
    Ok(hex::decode(compact)?)
}
