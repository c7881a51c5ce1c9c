//! The closed set of wire leaf types and the canonical type-name grammar.
//!
//! Grounded on spec §9's "tagged variant over a closed set" strategy: a
//! `match`-dispatched enum stands in for the source's late-bound type
//! instances. `FixedString(N)` and `DateTime64(scale)` carry their
//! parameter directly on the variant, since this codec treats type
//! parameters as first-class rather than best-effort (see SPEC_FULL.md).

use crate::primitive;
use crate::string_codec;
use crate::uuid_codec;
use chdirect_type::{
    CapabilityDescriptor, ClickHouseType, Cursor, Error, NativeRepresentation, Result, Value,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarType {
    Int8,
    UInt8,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Float32,
    Float64,
    String,
    FixedString(u32),
    Date,
    DateTime,
    DateTime64(u8),
    Bool,
    Uuid,
}

impl ScalarType {
    /// Parses the canonical grammar, including zero or more `Array(...)`
    /// wrappers, returning the leaf type and how many `Array` layers
    /// wrapped it.
    pub fn parse(name: &str) -> Result<(ScalarType, u32)> {
        let mut depth = 0u32;
        let mut rest = name.trim();
        loop {
            match rest.strip_prefix("Array(") {
                Some(inner) => {
                    let inner = inner.strip_suffix(')').ok_or_else(|| Error::UnknownType {
                        name: name.to_string(),
                    })?;
                    depth += 1;
                    rest = inner.trim();
                }
                None => break,
            }
        }
        let leaf = Self::parse_leaf(rest, name)?;
        Ok((leaf, depth))
    }

    fn parse_leaf(leaf: &str, original: &str) -> Result<ScalarType> {
        match leaf {
            "Int8" => Ok(ScalarType::Int8),
            "UInt8" => Ok(ScalarType::UInt8),
            "Int16" => Ok(ScalarType::Int16),
            "UInt16" => Ok(ScalarType::UInt16),
            "Int32" => Ok(ScalarType::Int32),
            "UInt32" => Ok(ScalarType::UInt32),
            "Int64" => Ok(ScalarType::Int64),
            "UInt64" => Ok(ScalarType::UInt64),
            "Float32" => Ok(ScalarType::Float32),
            "Float64" => Ok(ScalarType::Float64),
            "String" => Ok(ScalarType::String),
            "Date" => Ok(ScalarType::Date),
            "DateTime" => Ok(ScalarType::DateTime),
            "Bool" => Ok(ScalarType::Bool),
            "UUID" => Ok(ScalarType::Uuid),
            other => {
                if let Some(param) = other.strip_prefix("FixedString(").and_then(|s| s.strip_suffix(')')) {
                    let width: u32 = param
                        .trim()
                        .parse()
                        .map_err(|_| Error::UnknownType { name: original.to_string() })?;
                    Ok(ScalarType::FixedString(width))
                } else if let Some(param) =
                    other.strip_prefix("DateTime64(").and_then(|s| s.strip_suffix(')'))
                {
                    let scale: u8 = param
                        .trim()
                        .parse()
                        .map_err(|_| Error::UnknownType { name: original.to_string() })?;
                    Ok(ScalarType::DateTime64(scale))
                } else {
                    Err(Error::UnknownType { name: original.to_string() })
                }
            }
        }
    }

    /// Canonical wire type name for this leaf (no `Array(...)` wrapping;
    /// callers combine this with `array_depth` via `ColumnDescriptor`).
    pub fn leaf_type_name(&self) -> String {
        match self {
            ScalarType::Int8 => "Int8".to_string(),
            ScalarType::UInt8 => "UInt8".to_string(),
            ScalarType::Int16 => "Int16".to_string(),
            ScalarType::UInt16 => "UInt16".to_string(),
            ScalarType::Int32 => "Int32".to_string(),
            ScalarType::UInt32 => "UInt32".to_string(),
            ScalarType::Int64 => "Int64".to_string(),
            ScalarType::UInt64 => "UInt64".to_string(),
            ScalarType::Float32 => "Float32".to_string(),
            ScalarType::Float64 => "Float64".to_string(),
            ScalarType::String => "String".to_string(),
            ScalarType::FixedString(n) => format!("FixedString({n})"),
            ScalarType::Date => "Date".to_string(),
            ScalarType::DateTime => "DateTime".to_string(),
            ScalarType::DateTime64(scale) => format!("DateTime64({scale})"),
            ScalarType::Bool => "Bool".to_string(),
            ScalarType::Uuid => "UUID".to_string(),
        }
    }
}

impl ClickHouseType for ScalarType {
    fn type_name(&self) -> String {
        self.leaf_type_name()
    }

    fn native_representation(&self) -> NativeRepresentation {
        match self {
            ScalarType::Int8 | ScalarType::UInt8 | ScalarType::Bool => {
                NativeRepresentation::FixedWidth { width: 1 }
            }
            ScalarType::Int16 | ScalarType::UInt16 | ScalarType::Date => {
                NativeRepresentation::FixedWidth { width: 2 }
            }
            ScalarType::Int32 | ScalarType::UInt32 | ScalarType::Float32 | ScalarType::DateTime => {
                NativeRepresentation::FixedWidth { width: 4 }
            }
            ScalarType::Int64 | ScalarType::UInt64 | ScalarType::Float64 | ScalarType::DateTime64(_) => {
                NativeRepresentation::FixedWidth { width: 8 }
            }
            ScalarType::Uuid => NativeRepresentation::FixedWidth { width: 16 },
            ScalarType::FixedString(n) => NativeRepresentation::FixedWidth { width: *n as usize },
            ScalarType::String => NativeRepresentation::Variable,
        }
    }

    fn read_one(&self, cursor: &mut Cursor<'_>) -> Result<Value> {
        match self {
            ScalarType::Int8 => Ok(Value::Int8(primitive::read_i8(cursor)?)),
            ScalarType::UInt8 => Ok(Value::UInt8(primitive::read_u8(cursor)?)),
            ScalarType::Bool => Ok(Value::Bool(primitive::read_u8(cursor)? != 0)),
            ScalarType::Int16 => Ok(Value::Int16(primitive::read_i16(cursor)?)),
            ScalarType::UInt16 => Ok(Value::UInt16(primitive::read_u16(cursor)?)),
            ScalarType::Date => Ok(Value::Date(primitive::read_u16(cursor)?)),
            ScalarType::Int32 => Ok(Value::Int32(primitive::read_i32(cursor)?)),
            ScalarType::UInt32 => Ok(Value::UInt32(primitive::read_u32(cursor)?)),
            ScalarType::Float32 => Ok(Value::Float32(primitive::read_f32(cursor)?)),
            ScalarType::DateTime => Ok(Value::DateTime(primitive::read_u32(cursor)?)),
            ScalarType::Int64 => Ok(Value::Int64(primitive::read_i64(cursor)?)),
            ScalarType::UInt64 => Ok(Value::UInt64(primitive::read_u64(cursor)?)),
            ScalarType::Float64 => Ok(Value::Float64(primitive::read_f64(cursor)?)),
            ScalarType::DateTime64(_) => Ok(Value::DateTime64(primitive::read_i64(cursor)?)),
            ScalarType::Uuid => Ok(Value::Uuid(uuid_codec::read_uuid(cursor)?)),
            ScalarType::String => Ok(Value::String(string_codec::read_string(cursor)?)),
            ScalarType::FixedString(width) => {
                let start = cursor.position();
                let mut buf = vec![0u8; *width as usize];
                cursor.try_read_into(&mut buf).map_err(|e| match e {
                    Error::InsufficientData { needed, available, .. } => {
                        Error::InsufficientData { at: start, needed, available }
                    }
                    other => other,
                })?;
                Ok(Value::FixedString(buf))
            }
        }
    }

    fn write_one(&self, writer: &mut chdirect_type::ByteWriter, value: &Value) -> Result<()> {
        match (self, value) {
            (ScalarType::Int8, Value::Int8(v)) => Ok(primitive::write_i8(writer, *v)),
            (ScalarType::UInt8, Value::UInt8(v)) => Ok(primitive::write_u8(writer, *v)),
            (ScalarType::Bool, Value::Bool(v)) => Ok(primitive::write_u8(writer, *v as u8)),
            (ScalarType::Int16, Value::Int16(v)) => Ok(primitive::write_i16(writer, *v)),
            (ScalarType::UInt16, Value::UInt16(v)) => Ok(primitive::write_u16(writer, *v)),
            (ScalarType::Date, Value::Date(v)) => Ok(primitive::write_u16(writer, *v)),
            (ScalarType::Int32, Value::Int32(v)) => Ok(primitive::write_i32(writer, *v)),
            (ScalarType::UInt32, Value::UInt32(v)) => Ok(primitive::write_u32(writer, *v)),
            (ScalarType::Float32, Value::Float32(v)) => Ok(primitive::write_f32(writer, *v)),
            (ScalarType::DateTime, Value::DateTime(v)) => Ok(primitive::write_u32(writer, *v)),
            (ScalarType::Int64, Value::Int64(v)) => Ok(primitive::write_i64(writer, *v)),
            (ScalarType::UInt64, Value::UInt64(v)) => Ok(primitive::write_u64(writer, *v)),
            (ScalarType::Float64, Value::Float64(v)) => Ok(primitive::write_f64(writer, *v)),
            (ScalarType::DateTime64(_), Value::DateTime64(v)) => Ok(primitive::write_i64(writer, *v)),
            (ScalarType::Uuid, Value::Uuid(v)) => Ok(uuid_codec::write_uuid(writer, v)),
            (ScalarType::String, Value::String(v)) => Ok(string_codec::write_string(writer, v)),
            (ScalarType::FixedString(width), Value::FixedString(bytes)) => {
                if bytes.len() > *width as usize {
                    return Err(Error::OutOfRange {
                        type_name: "FixedString",
                        detail: format!("value of {} bytes exceeds declared width {}", bytes.len(), width),
                    });
                }
                writer.write_bytes(bytes);
                for _ in bytes.len()..*width as usize {
                    writer.write_u8(0);
                }
                Ok(())
            }
            (expected, found) => Err(Error::OutOfRange {
                type_name: "ScalarType",
                detail: format!(
                    "expected a {} value, got a {} value",
                    expected.leaf_type_name(),
                    found.variant_name()
                ),
            }),
        }
    }

    fn read_many(
        &self,
        cursor: &mut Cursor<'_>,
        count: usize,
        capabilities: CapabilityDescriptor,
    ) -> Result<Vec<Value>> {
        match self {
            ScalarType::Int8 => Ok(primitive::read_i8_many(cursor, count, capabilities)?
                .into_iter()
                .map(Value::Int8)
                .collect()),
            ScalarType::UInt8 => Ok(primitive::read_u8_many(cursor, count, capabilities)?
                .into_iter()
                .map(Value::UInt8)
                .collect()),
            ScalarType::Bool => Ok(primitive::read_u8_many(cursor, count, capabilities)?
                .into_iter()
                .map(|b| Value::Bool(b != 0))
                .collect()),
            ScalarType::Int16 => Ok(primitive::read_i16_many(cursor, count, capabilities)?
                .into_iter()
                .map(Value::Int16)
                .collect()),
            ScalarType::UInt16 => Ok(primitive::read_u16_many(cursor, count, capabilities)?
                .into_iter()
                .map(Value::UInt16)
                .collect()),
            ScalarType::Date => Ok(primitive::read_u16_many(cursor, count, capabilities)?
                .into_iter()
                .map(Value::Date)
                .collect()),
            ScalarType::Int32 => Ok(primitive::read_i32_many(cursor, count, capabilities)?
                .into_iter()
                .map(Value::Int32)
                .collect()),
            ScalarType::UInt32 => Ok(primitive::read_u32_many(cursor, count, capabilities)?
                .into_iter()
                .map(Value::UInt32)
                .collect()),
            ScalarType::Float32 => Ok(primitive::read_f32_many(cursor, count, capabilities)?
                .into_iter()
                .map(Value::Float32)
                .collect()),
            ScalarType::DateTime => Ok(primitive::read_u32_many(cursor, count, capabilities)?
                .into_iter()
                .map(Value::DateTime)
                .collect()),
            ScalarType::Int64 => Ok(primitive::read_i64_many(cursor, count, capabilities)?
                .into_iter()
                .map(Value::Int64)
                .collect()),
            ScalarType::UInt64 => Ok(primitive::read_u64_many(cursor, count, capabilities)?
                .into_iter()
                .map(Value::UInt64)
                .collect()),
            ScalarType::Float64 => Ok(primitive::read_f64_many(cursor, count, capabilities)?
                .into_iter()
                .map(Value::Float64)
                .collect()),
            ScalarType::DateTime64(_) => Ok(primitive::read_i64_many(cursor, count, capabilities)?
                .into_iter()
                .map(Value::DateTime64)
                .collect()),
            ScalarType::Uuid => Ok(uuid_codec::read_uuid_many(cursor, count, capabilities)?
                .into_iter()
                .map(Value::Uuid)
                .collect()),
            ScalarType::String => Ok(string_codec::read_string_many(cursor, count, capabilities)?
                .into_iter()
                .map(Value::String)
                .collect()),
            // FixedString has no SIMD bulk path of its own: unlike String
            // it carries no variable-length ASCII check to vectorize, and
            // unlike UUID its width varies per column, so it falls back
            // to the default singleton loop.
            ScalarType::FixedString(_) => {
                let mut out = Vec::with_capacity(count);
                for _ in 0..count {
                    out.push(self.read_one(cursor)?);
                }
                Ok(out)
            }
        }
    }

    fn write_many(
        &self,
        writer: &mut chdirect_type::ByteWriter,
        values: &[Value],
        capabilities: CapabilityDescriptor,
    ) -> Result<()> {
        macro_rules! bulk_numeric {
            ($extract:path, $write_many_fn:path) => {{
                let mut raw = Vec::with_capacity(values.len());
                for v in values {
                    match v {
                        $extract(x) => raw.push(*x),
                        other => {
                            return Err(Error::OutOfRange {
                                type_name: "ScalarType",
                                detail: format!("unexpected value variant {}", other.variant_name()),
                            });
                        }
                    }
                }
                $write_many_fn(writer, &raw, capabilities);
                Ok(())
            }};
        }
        match self {
            ScalarType::Int8 => bulk_numeric!(Value::Int8, primitive::write_i8_many),
            ScalarType::UInt8 => bulk_numeric!(Value::UInt8, primitive::write_u8_many),
            ScalarType::Bool => {
                let raw: Vec<u8> = values
                    .iter()
                    .map(|v| match v {
                        Value::Bool(b) => Ok(*b as u8),
                        other => Err(Error::OutOfRange {
                            type_name: "Bool",
                            detail: format!("unexpected value variant {}", other.variant_name()),
                        }),
                    })
                    .collect::<Result<_>>()?;
                primitive::write_u8_many(writer, &raw, capabilities);
                Ok(())
            }
            ScalarType::Int16 => bulk_numeric!(Value::Int16, primitive::write_i16_many),
            ScalarType::UInt16 => bulk_numeric!(Value::UInt16, primitive::write_u16_many),
            ScalarType::Date => bulk_numeric!(Value::Date, primitive::write_u16_many),
            ScalarType::Int32 => bulk_numeric!(Value::Int32, primitive::write_i32_many),
            ScalarType::UInt32 => bulk_numeric!(Value::UInt32, primitive::write_u32_many),
            ScalarType::Float32 => bulk_numeric!(Value::Float32, primitive::write_f32_many),
            ScalarType::DateTime => bulk_numeric!(Value::DateTime, primitive::write_u32_many),
            ScalarType::Int64 => bulk_numeric!(Value::Int64, primitive::write_i64_many),
            ScalarType::UInt64 => bulk_numeric!(Value::UInt64, primitive::write_u64_many),
            ScalarType::Float64 => bulk_numeric!(Value::Float64, primitive::write_f64_many),
            ScalarType::DateTime64(_) => bulk_numeric!(Value::DateTime64, primitive::write_i64_many),
            ScalarType::Uuid => {
                let raw: Vec<uuid::Uuid> = values
                    .iter()
                    .map(|v| match v {
                        Value::Uuid(u) => Ok(*u),
                        other => Err(Error::OutOfRange {
                            type_name: "UUID",
                            detail: format!("unexpected value variant {}", other.variant_name()),
                        }),
                    })
                    .collect::<Result<_>>()?;
                uuid_codec::write_uuid_many(writer, &raw, capabilities);
                Ok(())
            }
            ScalarType::String => {
                let raw: Vec<String> = values
                    .iter()
                    .map(|v| match v {
                        Value::String(s) => Ok(s.clone()),
                        other => Err(Error::OutOfRange {
                            type_name: "String",
                            detail: format!("unexpected value variant {}", other.variant_name()),
                        }),
                    })
                    .collect::<Result<_>>()?;
                string_codec::write_string_many(writer, &raw, capabilities);
                Ok(())
            }
            ScalarType::FixedString(_) => {
                for value in values {
                    self.write_one(writer, value)?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_leaf_names() {
        assert_eq!(ScalarType::parse("Int32").unwrap(), (ScalarType::Int32, 0));
        assert_eq!(ScalarType::parse("UUID").unwrap(), (ScalarType::Uuid, 0));
    }

    #[test]
    fn parses_nested_arrays() {
        assert_eq!(ScalarType::parse("Array(Int32)").unwrap(), (ScalarType::Int32, 1));
        assert_eq!(
            ScalarType::parse("Array(Array(Int32))").unwrap(),
            (ScalarType::Int32, 2)
        );
    }

    #[test]
    fn parses_parametrized_types() {
        assert_eq!(ScalarType::parse("FixedString(16)").unwrap(), (ScalarType::FixedString(16), 0));
        assert_eq!(ScalarType::parse("DateTime64(3)").unwrap(), (ScalarType::DateTime64(3), 0));
    }

    #[test]
    fn unknown_leaf_is_rejected() {
        let err = ScalarType::parse("NotAType").unwrap_err();
        assert!(matches!(err, Error::UnknownType { .. }));
    }

    #[test]
    fn type_name_round_trips_through_parse() {
        for (name, depth) in [("Int32", 0), ("String", 2), ("UUID", 1)] {
            let (leaf, parsed_depth) = ScalarType::parse(&wrap(name, depth)).unwrap();
            assert_eq!(parsed_depth, depth);
            assert_eq!(leaf.leaf_type_name(), name);
        }
    }

    fn wrap(name: &str, depth: u32) -> String {
        let mut s = name.to_string();
        for _ in 0..depth {
            s = format!("Array({s})");
        }
        s
    }

    #[test]
    fn fixed_string_short_value_is_zero_padded() {
        let ty = ScalarType::FixedString(4);
        let mut writer = chdirect_type::ByteWriter::new();
        ty.write_one(&mut writer, &Value::FixedString(vec![1, 2])).unwrap();
        assert_eq!(writer.as_slice(), &[1, 2, 0, 0]);
    }

    #[test]
    fn fixed_string_overlong_value_is_rejected() {
        let ty = ScalarType::FixedString(2);
        let mut writer = chdirect_type::ByteWriter::new();
        let err = ty.write_one(&mut writer, &Value::FixedString(vec![1, 2, 3])).unwrap_err();
        assert!(matches!(err, Error::OutOfRange { .. }));
    }
}
