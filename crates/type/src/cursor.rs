//! A read cursor over possibly-fragmented byte spans.
//!
//! Wire data does not always arrive as one contiguous buffer (a TCP reader
//! may hand over a ring of fixed-size chunks). `Cursor` hides that behind
//! a single linear read position so every decoder can pretend it's reading
//! a contiguous byte slice.

use crate::error::{Error, Result};

/// A cursor over one or more byte spans treated as a single logical stream.
///
/// Construction from a single slice is the common case; construction from
/// multiple spans models a fragmented transport buffer without requiring
/// the caller to copy everything into one contiguous `Vec<u8>` first.
pub struct Cursor<'a> {
    spans: Vec<&'a [u8]>,
    span_index: usize,
    offset_in_span: usize,
    absolute_offset: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Cursor { spans: vec![data], span_index: 0, offset_in_span: 0, absolute_offset: 0 }
    }

    pub fn from_spans(spans: Vec<&'a [u8]>) -> Self {
        Cursor { spans, span_index: 0, offset_in_span: 0, absolute_offset: 0 }
    }

    /// Bytes not yet consumed, across all remaining spans.
    pub fn remaining_length(&self) -> usize {
        let mut total = 0usize;
        if let Some(current) = self.spans.get(self.span_index) {
            total += current.len() - self.offset_in_span;
        }
        for span in self.spans.iter().skip(self.span_index + 1) {
            total += span.len();
        }
        total
    }

    /// Absolute byte offset from the start of the stream, used in error
    /// messages to point at the failing position.
    pub fn position(&self) -> usize {
        self.absolute_offset
    }

    /// True when the cursor sits exactly at the boundary between two
    /// spans (or at the very start/end of the stream). Bulk decoders use
    /// this to decide whether a SIMD kernel can run directly against the
    /// current span or must fall back to a copy first.
    pub fn is_at_segment_boundary(&self) -> bool {
        match self.spans.get(self.span_index) {
            Some(span) => self.offset_in_span == 0 || self.offset_in_span == span.len(),
            None => true,
        }
    }

    /// Peek at the next byte without consuming it.
    pub fn peek_byte(&self) -> Result<u8> {
        self.byte_at(self.span_index, self.offset_in_span)
    }

    fn byte_at(&self, mut span_index: usize, mut offset: usize) -> Result<u8> {
        loop {
            match self.spans.get(span_index) {
                None => {
                    return Err(Error::InsufficientData {
                        at: self.absolute_offset,
                        needed: 1,
                        available: 0,
                    });
                }
                Some(span) => {
                    if offset < span.len() {
                        return Ok(span[offset]);
                    }
                    span_index += 1;
                    offset = 0;
                }
            }
        }
    }

    /// Advance the cursor by `n` bytes without copying anything out.
    pub fn advance(&mut self, n: usize) -> Result<()> {
        let mut remaining = n;
        while remaining > 0 {
            match self.spans.get(self.span_index) {
                None => {
                    return Err(Error::InsufficientData {
                        at: self.absolute_offset,
                        needed: n,
                        available: n - remaining,
                    });
                }
                Some(span) => {
                    let available_in_span = span.len() - self.offset_in_span;
                    let take = available_in_span.min(remaining);
                    self.offset_in_span += take;
                    remaining -= take;
                    self.absolute_offset += take;
                    if self.offset_in_span == span.len() {
                        self.span_index += 1;
                        self.offset_in_span = 0;
                    }
                }
            }
        }
        Ok(())
    }

    /// Copy exactly `dest.len()` bytes into `dest`, advancing the cursor.
    /// This is the one allocation-free way to pull bytes out across a
    /// span boundary without the caller having to know spans exist.
    pub fn try_read_into(&mut self, dest: &mut [u8]) -> Result<()> {
        let start_offset = self.absolute_offset;
        let mut written = 0usize;
        while written < dest.len() {
            match self.spans.get(self.span_index) {
                None => {
                    return Err(Error::InsufficientData {
                        at: start_offset,
                        needed: dest.len(),
                        available: written,
                    });
                }
                Some(span) => {
                    let available_in_span = span.len() - self.offset_in_span;
                    let take = available_in_span.min(dest.len() - written);
                    dest[written..written + take]
                        .copy_from_slice(&span[self.offset_in_span..self.offset_in_span + take]);
                    self.offset_in_span += take;
                    written += take;
                    self.absolute_offset += take;
                    if self.offset_in_span == span.len() {
                        self.span_index += 1;
                        self.offset_in_span = 0;
                    }
                }
            }
        }
        Ok(())
    }

    /// A contiguous slice of the current span starting at the read
    /// position, when the requested length fits entirely within it.
    /// SIMD bulk kernels use this to operate directly on the underlying
    /// buffer instead of copying; callers must fall back to
    /// `try_read_into` when this returns `None`.
    pub fn contiguous_slice(&self, len: usize) -> Option<&'a [u8]> {
        let span = self.spans.get(self.span_index)?;
        if self.offset_in_span + len <= span.len() {
            Some(&span[self.offset_in_span..self.offset_in_span + len])
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_across_span_boundary() {
        let a: &[u8] = &[1, 2, 3];
        let b: &[u8] = &[4, 5, 6];
        let mut cursor = Cursor::from_spans(vec![a, b]);
        let mut dest = [0u8; 5];
        cursor.try_read_into(&mut dest).unwrap();
        assert_eq!(dest, [1, 2, 3, 4, 5]);
        assert_eq!(cursor.remaining_length(), 1);
        assert_eq!(cursor.position(), 5);
    }

    #[test]
    fn insufficient_data_reports_offset() {
        let a: &[u8] = &[1, 2];
        let mut cursor = Cursor::new(a);
        let mut dest = [0u8; 3];
        let err = cursor.try_read_into(&mut dest).unwrap_err();
        match err {
            Error::InsufficientData { at, needed, available } => {
                assert_eq!(at, 0);
                assert_eq!(needed, 3);
                assert_eq!(available, 2);
            }
            _ => panic!("wrong variant"),
        }
    }

    #[test]
    fn segment_boundary_detection() {
        let a: &[u8] = &[1, 2];
        let b: &[u8] = &[3, 4];
        let mut cursor = Cursor::from_spans(vec![a, b]);
        assert!(cursor.is_at_segment_boundary());
        cursor.advance(1).unwrap();
        assert!(!cursor.is_at_segment_boundary());
        cursor.advance(1).unwrap();
        assert!(cursor.is_at_segment_boundary());
    }

    #[test]
    fn contiguous_slice_respects_span_limits() {
        let a: &[u8] = &[1, 2, 3];
        let cursor = Cursor::new(a);
        assert_eq!(cursor.contiguous_slice(3), Some(&[1, 2, 3][..]));
        assert_eq!(cursor.contiguous_slice(4), None);
    }
}
