//! The RowBinary (row-major) block framer.
//!
//! No header. For each row, for each column in declared order: a scalar
//! cell is `write_one`/`read_one`; an `Array(T)` cell is
//! `varint(length)` followed by `length` recursive cells, repeating the
//! same procedure one level deeper for nested arrays.

use crate::column_descriptor::ColumnDescriptor;
use crate::column_store::ColumnStore;
use crate::scalar_type::ScalarType;
use crate::varint::{read_varint, write_varint};
use crate::Block;
use chdirect_type::{ByteWriter, CapabilityDescriptor, ClickHouseType, Cursor, Error, Result, Value};

pub struct RowBinaryFramer;

impl RowBinaryFramer {
    #[tracing::instrument(level = "debug", skip(writer, block, capabilities))]
    pub fn write_block(writer: &mut ByteWriter, block: &Block, capabilities: CapabilityDescriptor) -> Result<()> {
        tracing::debug!(column_count = block.column_count(), row_count = block.row_count(), "writing row binary block");
        for row in 0..block.row_count() {
            for (col_index, descriptor) in block.descriptors().iter().enumerate() {
                let value = block.cell(row, col_index)?;
                write_cell(writer, &descriptor.element_type, descriptor.array_depth, &value, capabilities)?;
            }
        }
        Ok(())
    }

    /// Decode `row_count` rows against a known schema. RowBinary carries
    /// no header, so the row count must come from the caller (typically
    /// negotiated out of band, e.g. via a preceding Native block or a
    /// protocol-level row count).
    #[tracing::instrument(level = "debug", skip(cursor, expected, capabilities))]
    pub fn read_block(
        cursor: &mut Cursor<'_>,
        expected: &[ColumnDescriptor],
        row_count: usize,
        capabilities: CapabilityDescriptor,
    ) -> Result<Block> {
        tracing::debug!(column_count = expected.len(), row_count, "reading row binary block");
        let mut per_column: Vec<Vec<Value>> = expected.iter().map(|_| Vec::with_capacity(row_count)).collect();
        for _ in 0..row_count {
            for (col_index, descriptor) in expected.iter().enumerate() {
                let value = read_cell(cursor, &descriptor.element_type, descriptor.array_depth, capabilities)?;
                per_column[col_index].push(value);
            }
        }
        let mut stores = Vec::with_capacity(expected.len());
        for (descriptor, values) in expected.iter().zip(per_column) {
            stores.push(build_column_store(&descriptor.element_type, descriptor.array_depth, values)?);
        }
        Block::from_columns(expected.to_vec(), stores, row_count)
    }
}

fn write_cell(
    writer: &mut ByteWriter,
    element_type: &ScalarType,
    depth: u32,
    value: &Value,
    capabilities: CapabilityDescriptor,
) -> Result<()> {
    if depth == 0 {
        element_type.write_one(writer, value)
    } else {
        match value {
            Value::Array(elements) => {
                write_varint(writer, elements.len() as u64);
                for element in elements {
                    write_cell(writer, element_type, depth - 1, element, capabilities)?;
                }
                Ok(())
            }
            other => Err(Error::OutOfRange {
                type_name: "RowBinaryFramer",
                detail: format!("expected an array cell, found {}", other.variant_name()),
            }),
        }
    }
}

fn read_cell(
    cursor: &mut Cursor<'_>,
    element_type: &ScalarType,
    depth: u32,
    capabilities: CapabilityDescriptor,
) -> Result<Value> {
    if depth == 0 {
        element_type.read_one(cursor)
    } else {
        let len = read_varint(cursor)? as usize;
        let mut elements = Vec::with_capacity(len);
        for _ in 0..len {
            elements.push(read_cell(cursor, element_type, depth - 1, capabilities)?);
        }
        Ok(Value::Array(elements))
    }
}

fn build_column_store(element_type: &ScalarType, depth: u32, values: Vec<Value>) -> Result<ColumnStore> {
    if depth == 0 {
        ColumnStore::from_scalar_values(values)
    } else {
        let mut offsets = Vec::with_capacity(values.len());
        let mut flattened = Vec::new();
        let mut cumulative = 0u64;
        for value in values {
            match value {
                Value::Array(elements) => {
                    cumulative += elements.len() as u64;
                    offsets.push(cumulative);
                    flattened.extend(elements);
                }
                other => {
                    return Err(Error::OutOfRange {
                        type_name: "ColumnStore",
                        detail: format!("expected an array cell, found {}", other.variant_name()),
                    });
                }
            }
        }
        let inner = build_column_store(element_type, depth - 1, flattened)?;
        Ok(ColumnStore::Nested { offsets, inner: Box::new(inner) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn e6_array_int32_round_trip() {
        let rows = vec![
            vec![1, 2, 3, 4, 5],
            vec![-1, -2, -3],
            vec![i32::MAX, i32::MIN, 0],
            vec![],
            vec![42],
        ];
        let descriptors = vec![ColumnDescriptor::new("xs", ScalarType::Int32, 1).unwrap()];
        let mut writer = ByteWriter::new();
        for row in &rows {
            write_cell(
                &mut writer,
                &ScalarType::Int32,
                1,
                &Value::Array(row.iter().map(|&v| Value::Int32(v)).collect()),
                CapabilityDescriptor::all(),
            )
            .unwrap();
        }
        let bytes = writer.into_vec();
        let mut cursor = Cursor::new(&bytes);
        let block = RowBinaryFramer::read_block(&mut cursor, &descriptors, rows.len(), CapabilityDescriptor::all())
            .unwrap();
        for (i, row) in rows.iter().enumerate() {
            let expected = Value::Array(row.iter().map(|&v| Value::Int32(v)).collect());
            assert_eq!(block.cell(i, 0).unwrap(), expected);
        }
    }

    #[test]
    fn e8_mixed_type_round_trip() {
        let descriptors = vec![
            ColumnDescriptor::scalar("id", ScalarType::Int32).unwrap(),
            ColumnDescriptor::scalar("name", ScalarType::String).unwrap(),
            ColumnDescriptor::scalar("token", ScalarType::Uuid).unwrap(),
        ];
        let ids = [i32::MIN, -1, 0, 1, i32::MAX];
        let names = ["", "a", "Test", "Unicode: 你好", &"x".repeat(1000)];
        let tokens = [
            Uuid::nil(),
            Uuid::from_bytes([1; 16]),
            Uuid::new_v4(),
            Uuid::new_v4(),
            Uuid::from_bytes([0xFF; 16]),
        ];

        let mut rows = Vec::new();
        for i in 0..5 {
            rows.push(vec![
                Value::Int32(ids[i]),
                Value::String(names[i].to_string()),
                Value::Uuid(tokens[i]),
            ]);
        }

        let mut writer = ByteWriter::new();
        for row in &rows {
            for (value, descriptor) in row.iter().zip(&descriptors) {
                write_cell(&mut writer, &descriptor.element_type, 0, value, CapabilityDescriptor::all()).unwrap();
            }
        }
        let bytes = writer.into_vec();
        let mut cursor = Cursor::new(&bytes);
        let block = RowBinaryFramer::read_block(&mut cursor, &descriptors, rows.len(), CapabilityDescriptor::all())
            .unwrap();
        for (i, row) in rows.iter().enumerate() {
            assert_eq!(block.row(i).unwrap(), *row);
        }
    }

    #[test]
    fn nested_array_depth_two_round_trips() {
        let descriptors = vec![ColumnDescriptor::new("xss", ScalarType::Int32, 2).unwrap()];
        let rows: Vec<Value> = vec![
            Value::Array(vec![
                Value::Array(vec![Value::Int32(1), Value::Int32(2), Value::Int32(3)]),
                Value::Array(vec![Value::Int32(4), Value::Int32(5), Value::Int32(6)]),
            ]),
            Value::Array(vec![
                Value::Array(vec![Value::Int32(10)]),
                Value::Array(vec![Value::Int32(20)]),
                Value::Array(vec![Value::Int32(30)]),
            ]),
            Value::Array(vec![Value::Array(vec![])]),
            Value::Array(vec![]),
        ];
        let mut writer = ByteWriter::new();
        for row in &rows {
            write_cell(&mut writer, &ScalarType::Int32, 2, row, CapabilityDescriptor::all()).unwrap();
        }
        let bytes = writer.into_vec();
        let mut cursor = Cursor::new(&bytes);
        let block = RowBinaryFramer::read_block(&mut cursor, &descriptors, rows.len(), CapabilityDescriptor::all())
            .unwrap();
        for (i, row) in rows.iter().enumerate() {
            assert_eq!(block.cell(i, 0).unwrap(), *row);
        }
    }
}
