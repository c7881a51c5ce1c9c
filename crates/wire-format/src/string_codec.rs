//! Length-prefixed UTF-8 string codec: `varint(byte_length) || utf8_bytes`.

use crate::varint::{encoded_len, read_varint, write_varint};
use chdirect_type::{ByteWriter, CapabilityDescriptor, Cursor, Error, Result, Tier};

/// Implementations MUST reject lengths above this; matches the spec's
/// `i32_max` ceiling on a value slot's declared length.
const MAX_STRING_LEN: u64 = i32::MAX as u64;

pub fn read_string(cursor: &mut Cursor<'_>) -> Result<String> {
    let start = cursor.position();
    let len = read_varint(cursor)?;
    if len > MAX_STRING_LEN {
        return Err(Error::StringTooLong { at: start, len, limit: MAX_STRING_LEN });
    }
    let len = len as usize;
    let mut bytes = vec![0u8; len];
    cursor.try_read_into(&mut bytes)?;
    match ascii_fast_path(&bytes, CapabilityDescriptor::none()) {
        true => Ok(unsafe { String::from_utf8_unchecked(bytes) }),
        false => String::from_utf8(bytes)
            .map_err(|e| Error::invalid_utf8(start, e.utf8_error())),
    }
}

pub fn write_string(writer: &mut ByteWriter, value: &str) {
    write_varint(writer, value.len() as u64);
    writer.write_bytes(value.as_bytes());
}

pub fn string_encoded_len(value: &str) -> usize {
    encoded_len(value.len() as u64) + value.len()
}

/// Reads `count` strings in sequence, using the capability-gated
/// vectorized ASCII check on each one's bytes. The varint length prefix
/// is inherently sequential (the next string's offset depends on
/// decoding the current one), so only the per-string ASCII-mask test is
/// vectorized, not the loop itself.
pub fn read_string_many(cursor: &mut Cursor<'_>, count: usize, capabilities: CapabilityDescriptor) -> Result<Vec<String>> {
    let mut out = Vec::with_capacity(count);
    for _ in 0..count {
        let start = cursor.position();
        let len = read_varint(cursor)?;
        if len > MAX_STRING_LEN {
            return Err(Error::StringTooLong { at: start, len, limit: MAX_STRING_LEN });
        }
        let mut bytes = vec![0u8; len as usize];
        cursor.try_read_into(&mut bytes)?;
        let s = match ascii_fast_path(&bytes, capabilities) {
            true => unsafe { String::from_utf8_unchecked(bytes) },
            false => String::from_utf8(bytes).map_err(|e| Error::invalid_utf8(start, e.utf8_error()))?,
        };
        out.push(s);
    }
    Ok(out)
}

/// Writing has no ASCII detection to vectorize (the bytes are already a
/// valid `&str`); this exists only so callers have a `capabilities`-gated
/// bulk entry point symmetric with `read_string_many`.
pub fn write_string_many(writer: &mut ByteWriter, values: &[String], _capabilities: CapabilityDescriptor) {
    for value in values {
        write_string(writer, value);
    }
}

/// All bytes are ASCII (`<= 0x7F`): in that case the bytes are trivially
/// valid UTF-8 and the full UTF-8 validation pass can be skipped (ASCII
/// is a subset of UTF-8, so the decoded string is byte-for-byte the same
/// either way). The check itself is vectorized per spec §4.3: each
/// vector tests a chunk's high bits at once via a movemask-style
/// instruction, walking the same tier ladder `primitive`'s bulk copy
/// uses.
fn ascii_fast_path(bytes: &[u8], capabilities: CapabilityDescriptor) -> bool {
    let mut tier = simd::select_tier(capabilities);
    let mut offset = 0usize;
    loop {
        let vbytes = match simd::vector_bytes(tier) {
            Some(v) if bytes.len() - offset >= v => v,
            _ => {
                if matches!(tier, Tier::Scalar) {
                    break;
                }
                tier = simd::next_lower(tier);
                continue;
            }
        };
        // SAFETY: `tier` was chosen from a descriptor the caller asserts
        // matches the running hardware, and `vbytes` bytes remain in
        // `bytes` at `offset` (checked above).
        let all_ascii = unsafe { simd::all_high_bit_clear(tier, &bytes[offset..offset + vbytes]) };
        if !all_ascii {
            return false;
        }
        offset += vbytes;
    }
    bytes[offset..].iter().all(|&b| b <= 0x7f)
}

mod simd {
    use chdirect_type::{CapabilityDescriptor, Tier};

    /// Bytes tested by one vector high-bit check at this tier, or `None`
    /// for the scalar fallback.
    pub fn vector_bytes(tier: Tier) -> Option<usize> {
        match tier {
            Tier::Avx512Bw => Some(64),
            Tier::Avx2 => Some(32),
            Tier::Sse2 => Some(16),
            Tier::Ssse3 | Tier::Avx | Tier::Avx512F | Tier::Scalar => None,
        }
    }

    pub fn next_lower(tier: Tier) -> Tier {
        match tier {
            Tier::Avx512Bw => Tier::Avx2,
            Tier::Avx2 => Tier::Sse2,
            Tier::Sse2 | Tier::Ssse3 | Tier::Avx | Tier::Avx512F | Tier::Scalar => Tier::Scalar,
        }
    }

    pub fn select_tier(capabilities: CapabilityDescriptor) -> Tier {
        if capabilities.avx512bw {
            Tier::Avx512Bw
        } else if capabilities.avx2 {
            Tier::Avx2
        } else if capabilities.sse2 {
            Tier::Sse2
        } else {
            Tier::Scalar
        }
    }

    #[cfg(target_arch = "x86_64")]
    #[target_feature(enable = "sse2")]
    unsafe fn high_bit_clear_sse2(chunk: &[u8]) -> bool {
        use core::arch::x86_64::*;
        unsafe {
            let v = _mm_loadu_si128(chunk.as_ptr() as *const __m128i);
            _mm_movemask_epi8(v) == 0
        }
    }

    #[cfg(target_arch = "x86_64")]
    #[target_feature(enable = "avx2")]
    unsafe fn high_bit_clear_avx2(chunk: &[u8]) -> bool {
        use core::arch::x86_64::*;
        unsafe {
            let v = _mm256_loadu_si256(chunk.as_ptr() as *const __m256i);
            _mm256_movemask_epi8(v) == 0
        }
    }

    #[cfg(target_arch = "x86_64")]
    #[target_feature(enable = "avx512bw")]
    unsafe fn high_bit_clear_avx512bw(chunk: &[u8]) -> bool {
        use core::arch::x86_64::*;
        unsafe {
            let v = _mm512_loadu_si512(chunk.as_ptr() as *const __m512i);
            _mm512_movepi8_mask(v) == 0
        }
    }

    /// # Safety
    /// `tier` must have been produced by `select_tier`/`next_lower` from
    /// a `CapabilityDescriptor` the caller asserts matches the running
    /// hardware, and `chunk` must be exactly `vector_bytes(tier)` long.
    #[cfg(target_arch = "x86_64")]
    pub unsafe fn all_high_bit_clear(tier: Tier, chunk: &[u8]) -> bool {
        unsafe {
            match tier {
                Tier::Avx512Bw => high_bit_clear_avx512bw(chunk),
                Tier::Avx2 => high_bit_clear_avx2(chunk),
                Tier::Sse2 => high_bit_clear_sse2(chunk),
                Tier::Ssse3 | Tier::Avx | Tier::Avx512F | Tier::Scalar => {
                    unreachable!("no vector width at this tier")
                }
            }
        }
    }

    #[cfg(not(target_arch = "x86_64"))]
    pub unsafe fn all_high_bit_clear(_tier: Tier, _chunk: &[u8]) -> bool {
        unreachable!("no SIMD tier is ever selected on a non-x86_64 target")
    }
}
