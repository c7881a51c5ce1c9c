//! RowBinary block framer integration tests.

use chdirect_wire_format::{
    Block, CapabilityDescriptor, ColumnDescriptor, Cursor, NativeFramer, RowBinaryFramer, ScalarType, Value,
};
use uuid::Uuid;

#[test]
fn e8_five_row_mixed_type_round_trip() {
    let descriptors = vec![
        ColumnDescriptor::scalar("id", ScalarType::Int32).unwrap(),
        ColumnDescriptor::scalar("name", ScalarType::String).unwrap(),
        ColumnDescriptor::scalar("token", ScalarType::Uuid).unwrap(),
    ];

    let ids = [i32::MIN, -1, 0, 1, i32::MAX];
    let names = ["", "a", "Test", "Unicode: 你好", "x".repeat(1000).as_str()];
    let tokens = [Uuid::nil(), Uuid::from_bytes([1u8; 16]), Uuid::new_v4(), Uuid::new_v4(), Uuid::from_bytes([0xFF; 16])];

    let rows: Vec<Vec<Value>> = (0..5)
        .map(|i| vec![Value::Int32(ids[i]), Value::String(names[i].to_string()), Value::Uuid(tokens[i])])
        .collect();

    let store_a = chdirect_wire_format::ColumnStore::from_scalar_values(
        rows.iter().map(|r| r[0].clone()).collect(),
    )
    .unwrap();
    let store_b = chdirect_wire_format::ColumnStore::from_scalar_values(
        rows.iter().map(|r| r[1].clone()).collect(),
    )
    .unwrap();
    let store_c = chdirect_wire_format::ColumnStore::from_scalar_values(
        rows.iter().map(|r| r[2].clone()).collect(),
    )
    .unwrap();
    let block = Block::from_columns(descriptors.clone(), vec![store_a, store_b, store_c], 5).unwrap();

    let mut writer = chdirect_wire_format::ByteWriter::new();
    RowBinaryFramer::write_block(&mut writer, &block, CapabilityDescriptor::all()).unwrap();
    let bytes = writer.into_vec();
    let mut cursor = Cursor::new(&bytes);
    let decoded = RowBinaryFramer::read_block(&mut cursor, &descriptors, 5, CapabilityDescriptor::all()).unwrap();

    for (i, row) in rows.iter().enumerate() {
        assert_eq!(decoded.row(i).unwrap(), *row);
    }
}

#[test]
fn row_binary_has_no_header_bytes() {
    let descriptors = vec![ColumnDescriptor::scalar("id", ScalarType::Int32).unwrap()];
    let store =
        chdirect_wire_format::ColumnStore::from_scalar_values(vec![Value::Int32(42)]).unwrap();
    let block = Block::from_columns(descriptors, vec![store], 1).unwrap();
    let mut writer = chdirect_wire_format::ByteWriter::new();
    RowBinaryFramer::write_block(&mut writer, &block, CapabilityDescriptor::all()).unwrap();
    // A single Int32 row is exactly 4 bytes: no varint(column_count) /
    // varint(row_count) header the way Native would have.
    assert_eq!(writer.as_slice(), &[42, 0, 0, 0]);
}

#[test]
fn row_binary_is_less_compact_than_native_for_repeated_schema_metadata() {
    // Not a correctness property, just documents the format trade-off:
    // Native pays the name/type strings once, RowBinary pays nothing,
    // so for a single-column block RowBinary has no header overhead at
    // all while Native's header dominates for tiny blocks.
    let descriptors = vec![ColumnDescriptor::scalar("id", ScalarType::Int32).unwrap()];
    let store =
        chdirect_wire_format::ColumnStore::from_scalar_values(vec![Value::Int32(1)]).unwrap();
    let block = Block::from_columns(descriptors.clone(), vec![store], 1).unwrap();

    let mut native_writer = chdirect_wire_format::ByteWriter::new();
    NativeFramer::write_block(&mut native_writer, &block, CapabilityDescriptor::all()).unwrap();

    let mut row_writer = chdirect_wire_format::ByteWriter::new();
    RowBinaryFramer::write_block(&mut row_writer, &block, CapabilityDescriptor::all()).unwrap();

    assert!(row_writer.len() < native_writer.len());
}
