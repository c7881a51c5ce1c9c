//! Error model for the chdirect wire codec.

use std::array::TryFromSliceError;
use std::str::Utf8Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong decoding or encoding a chdirect wire value.
///
/// Every variant that can be attributed to a specific byte offset carries
/// an `at` field holding that offset, measured from the start of the
/// buffer or cursor the error was raised against.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("insufficient data at offset {at}: needed {needed} bytes, had {available}")]
    InsufficientData { at: usize, needed: usize, available: usize },

    #[error("varint overflow at offset {at}: exceeds 64 bits")]
    VarintOverflow { at: usize },

    #[error("string too long at offset {at}: length {len} exceeds limit {limit}")]
    StringTooLong { at: usize, len: u64, limit: u64 },

    #[error("invalid utf-8 at offset {at}: {source}")]
    InvalidUtf8 {
        at: usize,
        #[source]
        source: Utf8Error,
    },

    #[error("header mismatch at offset {at}: {detail}")]
    HeaderMismatch { at: usize, detail: String },

    #[error("column name mismatch at offset {at}: expected {expected:?}, found {found:?}")]
    NameMismatch { at: usize, expected: String, found: String },

    #[error("duplicate column name {name:?} in schema")]
    DuplicateColumnName { name: String },

    #[error("invalid column name: {detail}")]
    InvalidColumnName { detail: String },

    #[error(
        "column type mismatch at offset {at}: expected {expected:?}, found {found:?}"
    )]
    TypeNameMismatch { at: usize, expected: String, found: String },

    #[error("bad offsets at offset {at}: {detail}")]
    BadOffsets { at: usize, detail: String },

    #[error("column count mismatch: expected {expected}, found {found}")]
    ColumnCountMismatch { expected: usize, found: usize },

    #[error("unknown type name {name:?}")]
    UnknownType { name: String },

    #[error("value out of range for {type_name}: {detail}")]
    OutOfRange { type_name: &'static str, detail: String },

    #[error("unknown column {name:?}")]
    UnknownColumn { name: String },
}

impl Error {
    pub fn invalid_utf8(at: usize, source: Utf8Error) -> Self {
        Error::InvalidUtf8 { at, source }
    }
}

impl From<(usize, TryFromSliceError)> for Error {
    fn from((at, _): (usize, TryFromSliceError)) -> Self {
        Error::BadOffsets { at, detail: "fixed-width slice conversion failed".to_string() }
    }
}
