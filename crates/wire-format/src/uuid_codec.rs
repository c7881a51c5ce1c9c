//! 16-byte mixed-endian UUID permutation.
//!
//! The wire form is a fixed permutation of the logical big-endian UUID
//! byte order: the two 64-bit halves are each byte-reversed. The
//! permutation is its own inverse (each half is independently reversed,
//! and reversal is an involution), so encode and decode share one
//! function.
//!
//! Bulk read/write walks a SIMD tier ladder the same way
//! `primitive::bulk_copy_read`/`bulk_copy_write` do, except the vector
//! operation here is a byte shuffle (the permutation), not a plain
//! copy: AVX512BW processes 4 UUIDs per vector, AVX2 2, SSSE3/SSE2 1.

use chdirect_type::{ByteWriter, CapabilityDescriptor, Cursor, Error, Result, Tier};
use uuid::Uuid;

/// `WIRE_PERMUTATION[i]` is the logical-byte index that lands at wire
/// position `i`.
pub const WIRE_PERMUTATION: [usize; 16] = [7, 6, 5, 4, 3, 2, 1, 0, 15, 14, 13, 12, 11, 10, 9, 8];

pub fn permute(logical: &[u8; 16]) -> [u8; 16] {
    let mut wire = [0u8; 16];
    for (i, &src) in WIRE_PERMUTATION.iter().enumerate() {
        wire[i] = logical[src];
    }
    wire
}

/// The permutation is self-inverse, so un-permuting uses the same
/// function; this wrapper exists only to name the direction at call
/// sites.
pub fn unpermute(wire: &[u8; 16]) -> [u8; 16] {
    permute(wire)
}

pub fn read_uuid(cursor: &mut Cursor<'_>) -> Result<Uuid> {
    let start = cursor.position();
    let mut wire = [0u8; 16];
    cursor.try_read_into(&mut wire).map_err(|e| match e {
        Error::InsufficientData { needed, available, .. } => {
            Error::InsufficientData { at: start, needed, available }
        }
        other => other,
    })?;
    let logical = unpermute(&wire);
    Ok(Uuid::from_bytes(logical))
}

pub fn write_uuid(writer: &mut ByteWriter, value: &Uuid) {
    let logical = *value.as_bytes();
    let wire = permute(&logical);
    writer.write_bytes(&wire);
}

mod simd {
    use super::WIRE_PERMUTATION;
    use chdirect_type::{CapabilityDescriptor, Tier};

    /// `WIRE_PERMUTATION` as a `pshufb`-style shuffle mask: byte `i` of
    /// the result is taken from byte `mask[i]` of the source lane.
    const SHUFFLE_MASK_16: [u8; 16] = [7, 6, 5, 4, 3, 2, 1, 0, 15, 14, 13, 12, 11, 10, 9, 8];

    /// UUIDs moved by one vector shuffle at this tier, or `None` for the
    /// scalar fallback.
    pub fn uuids_per_vector(tier: Tier) -> Option<usize> {
        match tier {
            Tier::Avx512Bw => Some(4),
            Tier::Avx2 => Some(2),
            Tier::Ssse3 | Tier::Sse2 => Some(1),
            Tier::Avx512F | Tier::Avx | Tier::Scalar => None,
        }
    }

    pub fn next_lower(tier: Tier) -> Tier {
        match tier {
            Tier::Avx512Bw => Tier::Avx2,
            Tier::Avx2 => Tier::Ssse3,
            Tier::Ssse3 => Tier::Sse2,
            Tier::Sse2 | Tier::Avx512F | Tier::Avx | Tier::Scalar => Tier::Scalar,
        }
    }

    /// Highest tier this kernel can use for the given descriptor. SSSE3
    /// and SSE2 both move one UUID per vector but take different code
    /// paths: SSSE3 has `pshufb` directly, plain SSE2 does not, so it
    /// reaches the same permutation via two 16-bit shuffles plus a
    /// byte-swap.
    pub fn select_tier(capabilities: CapabilityDescriptor) -> Tier {
        if capabilities.avx512bw {
            Tier::Avx512Bw
        } else if capabilities.avx2 {
            Tier::Avx2
        } else if capabilities.ssse3 {
            Tier::Ssse3
        } else if capabilities.sse2 {
            Tier::Sse2
        } else {
            Tier::Scalar
        }
    }

    #[cfg(target_arch = "x86_64")]
    #[target_feature(enable = "sse2")]
    pub unsafe fn permute_sse2(src: *const u8, dst: *mut u8) {
        use core::arch::x86_64::*;
        unsafe {
            let v = _mm_loadu_si128(src as *const __m128i);
            // Reverse bytes within each 64-bit half: reverse the order of
            // the four 16-bit words in each half, then swap the two
            // bytes within each word. Together that is exactly a
            // byte-reversal of each 64-bit lane, which is `WIRE_PERMUTATION`.
            let v = _mm_shufflelo_epi16(v, 0b00_01_10_11);
            let v = _mm_shufflehi_epi16(v, 0b00_01_10_11);
            let v = _mm_or_si128(_mm_slli_epi16(v, 8), _mm_srli_epi16(v, 8));
            _mm_storeu_si128(dst as *mut __m128i, v);
        }
    }

    #[cfg(target_arch = "x86_64")]
    #[target_feature(enable = "ssse3")]
    pub unsafe fn permute_ssse3(src: *const u8, dst: *mut u8) {
        use core::arch::x86_64::*;
        unsafe {
            let mask = _mm_loadu_si128(SHUFFLE_MASK_16.as_ptr() as *const __m128i);
            let v = _mm_loadu_si128(src as *const __m128i);
            let shuffled = _mm_shuffle_epi8(v, mask);
            _mm_storeu_si128(dst as *mut __m128i, shuffled);
        }
    }

    #[cfg(target_arch = "x86_64")]
    #[target_feature(enable = "avx2")]
    pub unsafe fn permute_avx2(src: *const u8, dst: *mut u8) {
        use core::arch::x86_64::*;
        unsafe {
            // `_mm256_shuffle_epi8` shuffles within each 128-bit lane
            // independently, so the 16-byte mask repeated twice shuffles
            // two UUIDs in one 256-bit register.
            const MASK_32: [u8; 32] = [
                7, 6, 5, 4, 3, 2, 1, 0, 15, 14, 13, 12, 11, 10, 9, 8, //
                7, 6, 5, 4, 3, 2, 1, 0, 15, 14, 13, 12, 11, 10, 9, 8,
            ];
            let mask = _mm256_loadu_si256(MASK_32.as_ptr() as *const __m256i);
            let v = _mm256_loadu_si256(src as *const __m256i);
            let shuffled = _mm256_shuffle_epi8(v, mask);
            _mm256_storeu_si256(dst as *mut __m256i, shuffled);
        }
    }

    #[cfg(target_arch = "x86_64")]
    #[target_feature(enable = "avx512bw")]
    pub unsafe fn permute_avx512bw(src: *const u8, dst: *mut u8) {
        use core::arch::x86_64::*;
        unsafe {
            // Same per-128-bit-lane shuffle as AVX2, four lanes wide: 4
            // UUIDs in one 512-bit register.
            const MASK_64: [u8; 64] = [
                7, 6, 5, 4, 3, 2, 1, 0, 15, 14, 13, 12, 11, 10, 9, 8, //
                7, 6, 5, 4, 3, 2, 1, 0, 15, 14, 13, 12, 11, 10, 9, 8, //
                7, 6, 5, 4, 3, 2, 1, 0, 15, 14, 13, 12, 11, 10, 9, 8, //
                7, 6, 5, 4, 3, 2, 1, 0, 15, 14, 13, 12, 11, 10, 9, 8,
            ];
            let mask = _mm512_loadu_si512(MASK_64.as_ptr() as *const __m512i);
            let v = _mm512_loadu_si512(src as *const __m512i);
            let shuffled = _mm512_shuffle_epi8(v, mask);
            _mm512_storeu_si512(dst as *mut __m512i, shuffled);
        }
    }

    #[cfg(target_arch = "x86_64")]
    pub unsafe fn permute_vector(tier: Tier, src: *const u8, dst: *mut u8) {
        unsafe {
            match tier {
                Tier::Avx512Bw => permute_avx512bw(src, dst),
                Tier::Avx2 => permute_avx2(src, dst),
                Tier::Ssse3 => permute_ssse3(src, dst),
                Tier::Sse2 => permute_sse2(src, dst),
                Tier::Avx512F | Tier::Avx | Tier::Scalar => unreachable!("no vector width at this tier"),
            }
        }
    }

    #[cfg(not(target_arch = "x86_64"))]
    pub unsafe fn permute_vector(_tier: Tier, _src: *const u8, _dst: *mut u8) {
        unreachable!("no SIMD tier is ever selected on a non-x86_64 target")
    }
}

/// Bulk-permute `count` UUIDs' worth of bytes (16 bytes each) from `src`
/// into `dest`, using the capability-gated shuffle ladder. Used
/// identically for both directions: the permutation is self-inverse, so
/// decoding wire bytes into logical bytes and encoding logical bytes
/// into wire bytes are the same transform.
fn bulk_permute(src: &[u8], dest: &mut [u8], capabilities: CapabilityDescriptor) {
    debug_assert_eq!(src.len(), dest.len());
    let mut tier = simd::select_tier(capabilities);
    let mut offset = 0usize;
    loop {
        let uuids = match simd::uuids_per_vector(tier) {
            Some(n) if (dest.len() - offset) / 16 >= n => n,
            _ => {
                if matches!(tier, Tier::Scalar) {
                    break;
                }
                tier = simd::next_lower(tier);
                continue;
            }
        };
        let vbytes = uuids * 16;
        // SAFETY: `tier` was chosen from a descriptor the caller asserts
        // matches the running hardware, and both `src`/`dest` have at
        // least `vbytes` bytes left at `offset` (checked above).
        unsafe {
            simd::permute_vector(tier, src[offset..offset + vbytes].as_ptr(), dest[offset..offset + vbytes].as_mut_ptr());
        }
        offset += vbytes;
    }
    for chunk_start in (offset..dest.len()).step_by(16) {
        let mut logical = [0u8; 16];
        logical.copy_from_slice(&src[chunk_start..chunk_start + 16]);
        dest[chunk_start..chunk_start + 16].copy_from_slice(&permute(&logical));
    }
}

pub fn read_uuid_many(cursor: &mut Cursor<'_>, count: usize, capabilities: CapabilityDescriptor) -> Result<Vec<Uuid>> {
    let start = cursor.position();
    let mut wire = vec![0u8; count * 16];
    cursor.try_read_into(&mut wire).map_err(|e| match e {
        Error::InsufficientData { needed, available, .. } => {
            Error::InsufficientData { at: start, needed, available }
        }
        other => other,
    })?;
    let mut logical = vec![0u8; count * 16];
    bulk_permute(&wire, &mut logical, capabilities);
    Ok(logical.chunks_exact(16).map(|c| Uuid::from_bytes(c.try_into().unwrap())).collect())
}

pub fn write_uuid_many(writer: &mut ByteWriter, values: &[Uuid], capabilities: CapabilityDescriptor) {
    let mut logical = Vec::with_capacity(values.len() * 16);
    for value in values {
        logical.extend_from_slice(value.as_bytes());
    }
    let mut wire = vec![0u8; logical.len()];
    bulk_permute(&logical, &mut wire, capabilities);
    writer.write_bytes(&wire);
}
