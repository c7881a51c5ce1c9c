//! The Native (column-major) block framer.
//!
//! Write sequence: `varint(column_count) || varint(row_count)`, then for
//! each column a name/type-name string pair followed by the column
//! payload. A scalar column's payload is `type.write_many` over its
//! values; an `Array(...)` column of depth `d` emits a cumulative
//! offsets vector at this level, then recurses on the flattened
//! next-inner level with depth `d - 1`.

use crate::column_descriptor::ColumnDescriptor;
use crate::column_store::ColumnStore;
use crate::primitive;
use crate::scalar_type::ScalarType;
use crate::string_codec;
use crate::varint::{read_varint, write_varint};
use crate::Block;
use chdirect_type::{ByteWriter, CapabilityDescriptor, ClickHouseType, Cursor, Error, Result, Value};

pub struct NativeFramer;

impl NativeFramer {
    #[tracing::instrument(level = "debug", skip(writer, block, capabilities))]
    pub fn write_block(writer: &mut ByteWriter, block: &Block, capabilities: CapabilityDescriptor) -> Result<()> {
        tracing::debug!(
            column_count = block.column_count(),
            row_count = block.row_count(),
            "writing native block"
        );
        write_varint(writer, block.column_count() as u64);
        write_varint(writer, block.row_count() as u64);
        for (index, descriptor) in block.descriptors().iter().enumerate() {
            string_codec::write_string(writer, &descriptor.name);
            string_codec::write_string(writer, &descriptor.wire_type_name());
            write_payload(
                writer,
                &descriptor.element_type,
                descriptor.array_depth,
                block.column(index)?,
                capabilities,
            )?;
        }
        Ok(())
    }

    /// Decode a block whose schema is already known to the caller.
    /// `expected_row_count`, when given, is cross-checked against the
    /// wire header (spec §4.6: "fail with `HeaderMismatch` ... or
    /// explicit expected row count").
    #[tracing::instrument(level = "debug", skip(cursor, expected, capabilities))]
    pub fn read_block(
        cursor: &mut Cursor<'_>,
        expected: &[ColumnDescriptor],
        expected_row_count: Option<usize>,
        capabilities: CapabilityDescriptor,
    ) -> Result<Block> {
        let header_at = cursor.position();
        let column_count_wire = read_varint(cursor)? as usize;
        let row_count_wire = read_varint(cursor)? as usize;
        tracing::debug!(column_count = column_count_wire, row_count = row_count_wire, "reading native block");

        if column_count_wire != expected.len() {
            return Err(Error::HeaderMismatch {
                at: header_at,
                detail: format!(
                    "wire column count {column_count_wire} disagrees with expected {}",
                    expected.len()
                ),
            });
        }
        if let Some(expected_rows) = expected_row_count {
            if row_count_wire != expected_rows {
                return Err(Error::HeaderMismatch {
                    at: header_at,
                    detail: format!("wire row count {row_count_wire} disagrees with expected {expected_rows}"),
                });
            }
        }

        let mut stores = Vec::with_capacity(expected.len());
        for descriptor in expected {
            let name_at = cursor.position();
            let wire_name = string_codec::read_string(cursor)?;
            if wire_name != descriptor.name {
                return Err(Error::NameMismatch { at: name_at, expected: descriptor.name.clone(), found: wire_name });
            }
            let type_at = cursor.position();
            let wire_type_name = string_codec::read_string(cursor)?;
            let (wire_leaf, wire_depth) = ScalarType::parse(&wire_type_name)?;
            if wire_leaf != descriptor.element_type || wire_depth != descriptor.array_depth {
                return Err(Error::TypeNameMismatch {
                    at: type_at,
                    expected: descriptor.wire_type_name(),
                    found: wire_type_name,
                });
            }
            let store = read_payload(
                cursor,
                &descriptor.element_type,
                descriptor.array_depth,
                row_count_wire,
                capabilities,
            )?;
            stores.push(store);
        }
        Block::from_columns(expected.to_vec(), stores, row_count_wire)
    }
}

fn write_payload(
    writer: &mut ByteWriter,
    element_type: &ScalarType,
    depth: u32,
    store: &ColumnStore,
    capabilities: CapabilityDescriptor,
) -> Result<()> {
    if depth == 0 {
        let values = scalar_values(store)?;
        element_type.write_many(writer, &values, capabilities)
    } else {
        match store {
            ColumnStore::Nested { offsets, inner } => {
                primitive::write_u64_many(writer, offsets, capabilities);
                write_payload(writer, element_type, depth - 1, inner, capabilities)
            }
            _ => Err(Error::BadOffsets { at: writer.len(), detail: "expected nested column storage".to_string() }),
        }
    }
}

fn read_payload(
    cursor: &mut Cursor<'_>,
    element_type: &ScalarType,
    depth: u32,
    count: usize,
    capabilities: CapabilityDescriptor,
) -> Result<ColumnStore> {
    if depth == 0 {
        let values = element_type.read_many(cursor, count, capabilities)?;
        ColumnStore::from_scalar_values(values)
    } else {
        let offsets_at = cursor.position();
        let offsets = primitive::read_u64_many(cursor, count, capabilities)?;
        let mut previous = 0u64;
        for &offset in &offsets {
            if offset < previous {
                return Err(Error::BadOffsets {
                    at: offsets_at,
                    detail: format!("offsets are not monotonically non-decreasing: {offset} < {previous}"),
                });
            }
            previous = offset;
        }
        let inner_count = offsets.last().copied().unwrap_or(0) as usize;
        let inner = read_payload(cursor, element_type, depth - 1, inner_count, capabilities)?;
        Ok(ColumnStore::Nested { offsets, inner: Box::new(inner) })
    }
}

/// Extract the flat `Vec<Value>` a base-depth `ColumnStore` represents,
/// for handing to `ClickHouseType::write_many`.
fn scalar_values(store: &ColumnStore) -> Result<Vec<Value>> {
    (0..store.len()).map(|i| store.cell(i)).collect()
}
