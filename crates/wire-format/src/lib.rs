//! Native and RowBinary block codec built on top of `chdirect-type`'s
//! capability descriptor, cursor/writer primitives, and error model.

pub mod block;
pub mod column_descriptor;
pub mod column_store;
pub mod native;
pub mod primitive;
pub mod row_binary;
pub mod scalar_type;
pub mod string_codec;
pub mod uuid_codec;
pub mod varint;

pub use block::Block;
pub use chdirect_type::{ByteWriter, CapabilityDescriptor, ClickHouseType, Cursor, Error, Result, Tier, Value};
pub use column_descriptor::ColumnDescriptor;
pub use column_store::ColumnStore;
pub use native::NativeFramer;
pub use row_binary::RowBinaryFramer;
pub use scalar_type::ScalarType;
