//! A growable byte sink used by every encoder.
//!
//! `ByteWriter` mirrors the reserve/commit shape `bytes::BufMut` uses so
//! bulk encoders can write directly into spare capacity (including SIMD
//! stores) and only afterwards tell the writer how many bytes actually
//! landed there.

pub struct ByteWriter {
    buf: Vec<u8>,
}

impl ByteWriter {
    pub fn new() -> Self {
        ByteWriter { buf: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        ByteWriter { buf: Vec::with_capacity(capacity) }
    }

    /// Ensure at least `min` bytes of spare capacity exist past the
    /// current length, then hand back a mutable view of that spare
    /// region. The caller writes into the returned span and then calls
    /// `commit` with however many bytes it actually used.
    pub fn reserve(&mut self, min: usize) -> &mut [u8] {
        let len = self.buf.len();
        if self.buf.capacity() - len < min {
            self.buf.reserve(min);
        }
        // SAFETY: we just ensured `capacity - len >= min`, and the
        // returned slice is only ever read back after `commit` advances
        // `len`, at which point its bytes are considered initialized by
        // the caller's write.
        unsafe {
            let ptr = self.buf.as_mut_ptr().add(len);
            std::slice::from_raw_parts_mut(ptr, self.buf.capacity() - len)
        }
    }

    /// Advance the writer's logical length by `n` bytes, which must have
    /// been fully initialized by a prior `reserve` call.
    pub fn commit(&mut self, n: usize) {
        let new_len = self.buf.len() + n;
        debug_assert!(new_len <= self.buf.capacity());
        // SAFETY: caller's contract (see `reserve`) guarantees the first
        // `n` bytes past the old length were initialized before calling
        // `commit`.
        unsafe {
            self.buf.set_len(new_len);
        }
    }

    pub fn write_bytes(&mut self, src: &[u8]) {
        let dest = self.reserve(src.len());
        dest[..src.len()].copy_from_slice(src);
        self.commit(src.len());
    }

    pub fn write_u8(&mut self, byte: u8) {
        self.write_bytes(&[byte]);
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.buf
    }
}

impl Default for ByteWriter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_bytes_round_trips() {
        let mut w = ByteWriter::new();
        w.write_bytes(&[1, 2, 3]);
        w.write_bytes(&[4, 5]);
        assert_eq!(w.as_slice(), &[1, 2, 3, 4, 5]);
    }

    #[test]
    fn reserve_then_commit_partial() {
        let mut w = ByteWriter::with_capacity(16);
        let span = w.reserve(8);
        span[0] = 0xaa;
        span[1] = 0xbb;
        w.commit(2);
        assert_eq!(w.as_slice(), &[0xaa, 0xbb]);
    }

    #[test]
    fn grows_past_initial_capacity() {
        let mut w = ByteWriter::with_capacity(1);
        for i in 0..100u8 {
            w.write_u8(i);
        }
        assert_eq!(w.len(), 100);
        assert_eq!(w.as_slice()[50], 50);
    }
}
