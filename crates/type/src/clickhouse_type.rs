//! The core per-type codec contract.
//!
//! Every leaf wire type implements `ClickHouseType`. `read_many`/
//! `write_many` exist purely as an optimization: their output must be
//! indistinguishable from calling `read_one`/`write_one` the matching
//! number of times in sequence (the "contract equivalence" invariant in
//! spec §3) — they differ only in that they may dispatch to a SIMD
//! kernel internally.

use crate::capability::CapabilityDescriptor;
use crate::cursor::Cursor;
use crate::error::Result;
use crate::value::Value;
use crate::writer::ByteWriter;

/// How a type's values are laid out in memory once decoded, used by
/// bulk callers that want to reinterpret a decoded column as a typed
/// slice instead of a `Vec<Value>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeRepresentation {
    FixedWidth { width: usize },
    Variable,
}

pub trait ClickHouseType {
    /// Canonical wire type name, e.g. `"Int32"`, `"FixedString(16)"`.
    fn type_name(&self) -> String;

    /// How decoded values of this type are laid out in memory.
    fn native_representation(&self) -> NativeRepresentation;

    fn read_one(&self, cursor: &mut Cursor<'_>) -> Result<Value>;

    fn write_one(&self, writer: &mut ByteWriter, value: &Value) -> Result<()>;

    /// Decode `count` consecutive values. The default implementation is
    /// always correct; implementors override it to use a SIMD kernel
    /// gated by `capabilities` when a contiguous decode is eligible for
    /// one.
    fn read_many(
        &self,
        cursor: &mut Cursor<'_>,
        count: usize,
        capabilities: CapabilityDescriptor,
    ) -> Result<Vec<Value>> {
        let _ = capabilities;
        let mut out = Vec::with_capacity(count);
        for _ in 0..count {
            out.push(self.read_one(cursor)?);
        }
        Ok(out)
    }

    /// Encode a slice of values. Same contract-equivalence requirement
    /// as `read_many`.
    fn write_many(
        &self,
        writer: &mut ByteWriter,
        values: &[Value],
        capabilities: CapabilityDescriptor,
    ) -> Result<()> {
        let _ = capabilities;
        for value in values {
            self.write_one(writer, value)?;
        }
        Ok(())
    }
}
