//! Column metadata: name, element type, and array-nesting depth.

use crate::scalar_type::ScalarType;
use chdirect_type::{ClickHouseType, Error, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDescriptor {
    pub name: String,
    pub element_type: ScalarType,
    pub array_depth: u32,
}

impl ColumnDescriptor {
    pub fn new(name: impl Into<String>, element_type: ScalarType, array_depth: u32) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(Error::InvalidColumnName { detail: "column name must not be empty".to_string() });
        }
        Ok(ColumnDescriptor { name, element_type, array_depth })
    }

    pub fn scalar(name: impl Into<String>, element_type: ScalarType) -> Result<Self> {
        Self::new(name, element_type, 0)
    }

    /// The element type's canonical name, wrapped in `array_depth`
    /// layers of `Array(...)`.
    pub fn wire_type_name(&self) -> String {
        let mut name = self.element_type.type_name();
        for _ in 0..self.array_depth {
            name = format!("Array({name})");
        }
        name
    }

    /// A human-readable shape description, e.g. `"sequence of sequence
    /// of Int32"` for a depth-2 array of `Int32`.
    pub fn effective_element_shape(&self) -> String {
        let mut shape = self.element_type.type_name();
        for _ in 0..self.array_depth {
            shape = format!("sequence of {shape}");
        }
        shape
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_type_name_wraps_array_layers() {
        let col = ColumnDescriptor::new("ids", ScalarType::Int32, 2).unwrap();
        assert_eq!(col.wire_type_name(), "Array(Array(Int32))");
    }

    #[test]
    fn scalar_has_no_wrapping() {
        let col = ColumnDescriptor::scalar("id", ScalarType::Int32).unwrap();
        assert_eq!(col.wire_type_name(), "Int32");
        assert_eq!(col.effective_element_shape(), "Int32");
    }

    #[test]
    fn empty_name_is_rejected() {
        let err = ColumnDescriptor::scalar("", ScalarType::Int32).unwrap_err();
        assert!(matches!(err, Error::InvalidColumnName { .. }));
    }
}
