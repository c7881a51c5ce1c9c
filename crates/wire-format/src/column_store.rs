//! Per-column typed storage.
//!
//! Grounded on spec §9's "reflection-constructed typed containers"
//! redesign note: instead of allocating a container whose element type is
//! chosen reflectively, the column's storage is a tagged variant with one
//! arm per primitive element kind, plus a `Nested` arm that wraps an
//! inner store with the cumulative offsets for one array-nesting level.

use chdirect_type::{Error, Result, Value};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub enum ColumnStore {
    Int8(Vec<i8>),
    UInt8(Vec<u8>),
    Int16(Vec<i16>),
    UInt16(Vec<u16>),
    Int32(Vec<i32>),
    UInt32(Vec<u32>),
    Int64(Vec<i64>),
    UInt64(Vec<u64>),
    Float32(Vec<f32>),
    Float64(Vec<f64>),
    Bool(Vec<bool>),
    String(Vec<String>),
    FixedString(Vec<Vec<u8>>),
    Date(Vec<u16>),
    DateTime(Vec<u32>),
    DateTime64(Vec<i64>),
    Uuid(Vec<Uuid>),
    Nested { offsets: Vec<u64>, inner: Box<ColumnStore> },
}

impl ColumnStore {
    /// Number of logical rows this store represents at its own level:
    /// the element count for a scalar store, or `offsets.len()` (one
    /// offset per row) for a nested store.
    pub fn len(&self) -> usize {
        match self {
            ColumnStore::Int8(v) => v.len(),
            ColumnStore::UInt8(v) => v.len(),
            ColumnStore::Int16(v) => v.len(),
            ColumnStore::UInt16(v) => v.len(),
            ColumnStore::Int32(v) => v.len(),
            ColumnStore::UInt32(v) => v.len(),
            ColumnStore::Int64(v) => v.len(),
            ColumnStore::UInt64(v) => v.len(),
            ColumnStore::Float32(v) => v.len(),
            ColumnStore::Float64(v) => v.len(),
            ColumnStore::Bool(v) => v.len(),
            ColumnStore::String(v) => v.len(),
            ColumnStore::FixedString(v) => v.len(),
            ColumnStore::Date(v) => v.len(),
            ColumnStore::DateTime(v) => v.len(),
            ColumnStore::DateTime64(v) => v.len(),
            ColumnStore::Uuid(v) => v.len(),
            ColumnStore::Nested { offsets, .. } => offsets.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Build a typed store from a flat sequence of decoded scalar
    /// values, as produced by `ClickHouseType::read_many`.
    pub fn from_scalar_values(values: Vec<Value>) -> Result<ColumnStore> {
        macro_rules! collect {
            ($variant:path, $out:ident) => {{
                let mut out = Vec::with_capacity(values.len());
                for v in values {
                    match v {
                        $variant(x) => out.push(x),
                        other => {
                            return Err(Error::OutOfRange {
                                type_name: "ColumnStore",
                                detail: format!("unexpected value variant {}", other.variant_name()),
                            });
                        }
                    }
                }
                Ok(ColumnStore::$out(out))
            }};
        }
        match values.first() {
            None => Ok(ColumnStore::Int8(Vec::new())),
            Some(Value::Int8(_)) => collect!(Value::Int8, Int8),
            Some(Value::UInt8(_)) => collect!(Value::UInt8, UInt8),
            Some(Value::Int16(_)) => collect!(Value::Int16, Int16),
            Some(Value::UInt16(_)) => collect!(Value::UInt16, UInt16),
            Some(Value::Int32(_)) => collect!(Value::Int32, Int32),
            Some(Value::UInt32(_)) => collect!(Value::UInt32, UInt32),
            Some(Value::Int64(_)) => collect!(Value::Int64, Int64),
            Some(Value::UInt64(_)) => collect!(Value::UInt64, UInt64),
            Some(Value::Float32(_)) => collect!(Value::Float32, Float32),
            Some(Value::Float64(_)) => collect!(Value::Float64, Float64),
            Some(Value::Bool(_)) => collect!(Value::Bool, Bool),
            Some(Value::String(_)) => collect!(Value::String, String),
            Some(Value::FixedString(_)) => collect!(Value::FixedString, FixedString),
            Some(Value::Date(_)) => collect!(Value::Date, Date),
            Some(Value::DateTime(_)) => collect!(Value::DateTime, DateTime),
            Some(Value::DateTime64(_)) => collect!(Value::DateTime64, DateTime64),
            Some(Value::Uuid(_)) => collect!(Value::Uuid, Uuid),
            Some(Value::Array(_)) => Err(Error::OutOfRange {
                type_name: "ColumnStore",
                detail: "nested arrays must be stored via ColumnStore::Nested, not as scalar values"
                    .to_string(),
            }),
        }
    }

    /// Read back the value at logical row `index` at this store's own
    /// level. For a `Nested` store this materializes the whole
    /// sub-array for that row as `Value::Array`.
    pub fn cell(&self, index: usize) -> Result<Value> {
        macro_rules! at {
            ($v:ident, $ctor:path) => {
                $v.get(index).copied().map($ctor).ok_or(Error::OutOfRange {
                    type_name: "ColumnStore",
                    detail: format!("row {index} out of range"),
                })
            };
        }
        match self {
            ColumnStore::Int8(v) => at!(v, Value::Int8),
            ColumnStore::UInt8(v) => at!(v, Value::UInt8),
            ColumnStore::Int16(v) => at!(v, Value::Int16),
            ColumnStore::UInt16(v) => at!(v, Value::UInt16),
            ColumnStore::Int32(v) => at!(v, Value::Int32),
            ColumnStore::UInt32(v) => at!(v, Value::UInt32),
            ColumnStore::Int64(v) => at!(v, Value::Int64),
            ColumnStore::UInt64(v) => at!(v, Value::UInt64),
            ColumnStore::Float32(v) => at!(v, Value::Float32),
            ColumnStore::Float64(v) => at!(v, Value::Float64),
            ColumnStore::Bool(v) => at!(v, Value::Bool),
            ColumnStore::Date(v) => at!(v, Value::Date),
            ColumnStore::DateTime(v) => at!(v, Value::DateTime),
            ColumnStore::DateTime64(v) => at!(v, Value::DateTime64),
            ColumnStore::Uuid(v) => v
                .get(index)
                .map(|u| Value::Uuid(*u))
                .ok_or(Error::OutOfRange { type_name: "ColumnStore", detail: format!("row {index} out of range") }),
            ColumnStore::String(v) => v
                .get(index)
                .cloned()
                .map(Value::String)
                .ok_or(Error::OutOfRange { type_name: "ColumnStore", detail: format!("row {index} out of range") }),
            ColumnStore::FixedString(v) => v
                .get(index)
                .cloned()
                .map(Value::FixedString)
                .ok_or(Error::OutOfRange { type_name: "ColumnStore", detail: format!("row {index} out of range") }),
            ColumnStore::Nested { offsets, inner } => {
                let start = if index == 0 { 0 } else { offsets[index - 1] } as usize;
                let end = *offsets.get(index).ok_or(Error::OutOfRange {
                    type_name: "ColumnStore",
                    detail: format!("row {index} out of range"),
                })? as usize;
                let mut elements = Vec::with_capacity(end - start);
                for i in start..end {
                    elements.push(inner.cell(i)?);
                }
                Ok(Value::Array(elements))
            }
        }
    }
}
