//! Running frame check sequence

/// Checksum accumulated one byte at a time
///
/// A fresh value (`Default`) is used for every frame attempt.
pub trait RunningChecksum: Default {
    /// Incorporate one byte
    fn update(&mut self, byte: u8);

    /// Current checksum; stable between updates
    fn value(&self) -> u32;
}

/// CRC-32 (IEEE 802.3), the FCS used on the wire
#[derive(Debug, Clone, Default)]
pub struct Crc32 {
    hasher: crc32fast::Hasher,
}

impl Crc32 {
    pub fn new() -> Self {
        Self::default()
    }

    /// Checksum of a complete byte slice
    pub fn checksum(data: &[u8]) -> u32 {
        crc32fast::hash(data)
    }
}

impl RunningChecksum for Crc32 {
    #[inline]
    fn update(&mut self, byte: u8) {
        self.hasher.update(&[byte]);
    }

    fn value(&self) -> u32 {
        // finalize() consumes the hasher
        self.hasher.clone().finalize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_vector() {
        let mut crc = Crc32::new();
        for &b in b"123456789" {
            crc.update(b);
        }
        assert_eq!(crc.value(), 0xCBF4_3926);
    }

    #[test]
    fn empty_is_zero() {
        assert_eq!(Crc32::new().value(), 0);
    }

    #[test]
    fn value_is_idempotent() {
        let mut crc = Crc32::new();
        crc.update(0xAA);
        let first = crc.value();
        assert_eq!(crc.value(), first);

        crc.update(0xBB);
        assert_eq!(crc.value(), Crc32::checksum(&[0xAA, 0xBB]));
    }
}
