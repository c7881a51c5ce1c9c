//! Data model for the chdirect wire codec: capability gating, the
//! fragmented-buffer cursor/writer primitives, the error model, and the
//! `ClickHouseType` trait every leaf wire type implements.

pub mod capability;
pub mod clickhouse_type;
pub mod cursor;
pub mod error;
pub mod value;
pub mod writer;

pub use capability::{CapabilityDescriptor, Tier};
pub use clickhouse_type::{ClickHouseType, NativeRepresentation};
pub use cursor::Cursor;
pub use error::{Error, Result};
pub use value::Value;
pub use writer::ByteWriter;
