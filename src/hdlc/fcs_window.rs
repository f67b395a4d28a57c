//! Fixed-size ring of the most recently received bytes
//!
//! The FCS trails the frame, so the last `N` bytes appended could still turn
//! out to be checksum rather than content. The decoder keeps them here and
//! only feeds a byte to the running checksum once it is evicted.

#[derive(Debug, Clone)]
pub struct FcsWindow<const N: usize> {
    bytes: [u8; N],
    /// Next slot to overwrite, which is also the oldest byte once full
    next: usize,
}

impl<const N: usize> FcsWindow<N> {
    pub const fn new() -> Self {
        Self {
            bytes: [0; N],
            next: 0,
        }
    }

    /// Store `byte`, returning the byte it replaced
    ///
    /// Until `N` bytes have been pushed the returned value is stale.
    #[inline]
    pub fn push(&mut self, byte: u8) -> u8 {
        let evicted = std::mem::replace(&mut self.bytes[self.next], byte);
        self.next = (self.next + 1) % N;
        evicted
    }

    /// Oldest byte in the window
    pub fn oldest(&self) -> u8 {
        self.bytes[self.next]
    }

    /// Window contents from oldest to newest
    pub fn in_order(&self) -> [u8; N] {
        let mut out = [0; N];
        for (i, slot) in out.iter_mut().enumerate() {
            *slot = self.bytes[(self.next + i) % N];
        }
        out
    }

    pub fn clear(&mut self) {
        self.next = 0;
    }
}

impl<const N: usize> Default for FcsWindow<N> {
    fn default() -> Self {
        Self::new()
    }
}
