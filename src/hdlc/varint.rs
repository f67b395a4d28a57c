//! Unsigned LEB128 varints (frame address field)

/// Longest encoding of a `u64`
pub const MAX_VARINT_SIZE: usize = 10;

/// Decode a varint from the start of `data`
///
/// Returns the value and the number of bytes consumed, or `None` if the
/// varint is unterminated, longer than `MAX_VARINT_SIZE`, or overflows `u64`.
pub fn decode(data: &[u8]) -> Option<(u64, usize)> {
    let mut value: u64 = 0;

    for (i, &byte) in data.iter().take(MAX_VARINT_SIZE).enumerate() {
        let bits = u64::from(byte & 0x7F);
        let shift = 7 * i as u32;

        // Last byte may only carry the top bit of a u64
        if i == MAX_VARINT_SIZE - 1 && bits > 1 {
            return None;
        }
        value |= bits << shift;

        if byte & 0x80 == 0 {
            return Some((value, i + 1));
        }
    }

    None
}

/// Append the encoding of `value` to `output`
///
/// Returns the number of bytes written.
pub fn encode_into(mut value: u64, output: &mut Vec<u8>) -> usize {
    let start = output.len();
    loop {
        let byte = (value & 0x7F) as u8;
        value >>= 7;
        if value == 0 {
            output.push(byte);
            break;
        }
        output.push(byte | 0x80);
    }
    output.len() - start
}
