//! Round-trip over all primitive types: decode(encode(v)) == v for a
//! representative sample per type, bit-pattern preserving for floats.

use chdirect_wire_format::primitive::*;
use chdirect_wire_format::string_codec::{read_string, write_string};
use chdirect_wire_format::uuid_codec::{read_uuid, write_uuid};
use chdirect_wire_format::{ByteWriter, Cursor};
use uuid::Uuid;

macro_rules! round_trip_case {
    ($name:ident, $write:ident, $read:ident, $ty:ty, [$($v:expr),+ $(,)?]) => {
        #[test]
        fn $name() {
            let samples: Vec<$ty> = vec![$($v),+];
            for v in samples {
                let mut writer = ByteWriter::new();
                $write(&mut writer, v);
                let bytes = writer.into_vec();
                let mut cursor = Cursor::new(&bytes);
                let decoded = $read(&mut cursor).unwrap();
                assert_eq!(decoded, v);
            }
        }
    };
}

round_trip_case!(int8_round_trip, write_i8, read_i8, i8, [0, 1, -1, i8::MIN, i8::MAX]);
round_trip_case!(uint8_round_trip, write_u8, read_u8, u8, [0, 1, u8::MAX]);
round_trip_case!(int16_round_trip, write_i16, read_i16, i16, [0, 1, -1, i16::MIN, i16::MAX]);
round_trip_case!(uint16_round_trip, write_u16, read_u16, u16, [0, 1, u16::MAX]);
round_trip_case!(int32_round_trip, write_i32, read_i32, i32, [0, 1, -1, i32::MIN, i32::MAX]);
round_trip_case!(uint32_round_trip, write_u32, read_u32, u32, [0, 1, u32::MAX]);
round_trip_case!(int64_round_trip, write_i64, read_i64, i64, [0, 1, -1, i64::MIN, i64::MAX]);
round_trip_case!(uint64_round_trip, write_u64, read_u64, u64, [0, 1, u64::MAX]);

#[test]
fn float_round_trip_preserves_bit_patterns() {
    let samples: [f64; 8] = [
        0.0,
        -0.0,
        1.0,
        -1.0,
        f64::INFINITY,
        f64::NEG_INFINITY,
        f64::from_bits(0x7ff8_0000_0000_0001), // NaN, specific payload
        f64::MIN_POSITIVE,
    ];
    for v in samples {
        let mut writer = ByteWriter::new();
        write_f64(&mut writer, v);
        let bytes = writer.into_vec();
        let mut cursor = Cursor::new(&bytes);
        let decoded = read_f64(&mut cursor).unwrap();
        assert_eq!(decoded.to_bits(), v.to_bits());
    }

    let samples32: [f32; 6] =
        [0.0, -0.0, 1.0, f32::INFINITY, f32::NEG_INFINITY, f32::from_bits(0x7fc0_0001)];
    for v in samples32 {
        let mut writer = ByteWriter::new();
        write_f32(&mut writer, v);
        let bytes = writer.into_vec();
        let mut cursor = Cursor::new(&bytes);
        let decoded = read_f32(&mut cursor).unwrap();
        assert_eq!(decoded.to_bits(), v.to_bits());
    }
}

#[test]
fn string_round_trip_over_representative_samples() {
    let samples = ["", "a", "hello", "中文字符", "mix of ASCII and 中文", &"y".repeat(5000)];
    for s in samples {
        let mut writer = ByteWriter::new();
        write_string(&mut writer, s);
        let bytes = writer.into_vec();
        let mut cursor = Cursor::new(&bytes);
        assert_eq!(read_string(&mut cursor).unwrap(), s);
    }
}

#[test]
fn uuid_round_trip_over_representative_samples() {
    let samples = [Uuid::nil(), Uuid::from_bytes([0xAA; 16]), Uuid::from_bytes([0x55; 16]), Uuid::new_v4()];
    for id in samples {
        let mut writer = ByteWriter::new();
        write_uuid(&mut writer, &id);
        let bytes = writer.into_vec();
        let mut cursor = Cursor::new(&bytes);
        assert_eq!(read_uuid(&mut cursor).unwrap(), id);
    }
}
