//! The columnar carrier moved between the codec and its caller.
//!
//! A `Block` is an opaque pairing of `ColumnDescriptor`s with typed
//! `ColumnStore`s: it does not interpret types itself, it only keeps
//! descriptors and storage in lockstep and offers row/column access.
//! Grounded on spec §9's "Block as row iterator" note: row views are
//! produced lazily on demand rather than kept as a persistent row-shaped
//! copy — the columnar layout is the canonical representation.

use crate::column_descriptor::ColumnDescriptor;
use crate::column_store::ColumnStore;
use chdirect_type::{Error, Result, Value};
use std::collections::HashMap;

pub struct Block {
    descriptors: Vec<ColumnDescriptor>,
    columns: Vec<ColumnStore>,
    row_count: usize,
    name_index: HashMap<String, usize>,
}

impl Block {
    /// An empty, appendable block carrying only a schema. Columns are
    /// added later via `push_column`, which is how the Native and
    /// RowBinary framers populate a block while reading.
    pub fn empty(descriptors: Vec<ColumnDescriptor>) -> Result<Self> {
        let name_index = build_name_index(&descriptors)?;
        Ok(Block { descriptors, columns: Vec::new(), row_count: 0, name_index })
    }

    /// Construct a fully-populated, immutable block from descriptors
    /// paired with already-decoded column storage.
    pub fn from_columns(
        descriptors: Vec<ColumnDescriptor>,
        columns: Vec<ColumnStore>,
        row_count: usize,
    ) -> Result<Self> {
        if descriptors.len() != columns.len() {
            return Err(Error::ColumnCountMismatch { expected: descriptors.len(), found: columns.len() });
        }
        for column in &columns {
            if column.len() != row_count {
                return Err(Error::ColumnCountMismatch { expected: row_count, found: column.len() });
            }
        }
        let name_index = build_name_index(&descriptors)?;
        Ok(Block { descriptors, columns, row_count, name_index })
    }

    /// Append one fully-decoded column; used by framers that build a
    /// block incrementally, one column at a time, while reading.
    pub fn push_column(&mut self, store: ColumnStore) -> Result<()> {
        let index = self.columns.len();
        let expected_name = self
            .descriptors
            .get(index)
            .ok_or(Error::ColumnCountMismatch { expected: self.descriptors.len(), found: index + 1 })?
            .name
            .clone();
        if self.columns.is_empty() {
            self.row_count = store.len();
        } else if store.len() != self.row_count {
            return Err(Error::ColumnCountMismatch { expected: self.row_count, found: store.len() });
        }
        let _ = expected_name;
        self.columns.push(store);
        Ok(())
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn column_count(&self) -> usize {
        self.descriptors.len()
    }

    pub fn descriptors(&self) -> &[ColumnDescriptor] {
        &self.descriptors
    }

    pub fn column(&self, index: usize) -> Result<&ColumnStore> {
        self.columns
            .get(index)
            .ok_or(Error::OutOfRange { type_name: "Block", detail: format!("column index {index} out of range") })
    }

    pub fn column_by_name(&self, name: &str) -> Result<&ColumnStore> {
        let index = *self
            .name_index
            .get(name)
            .ok_or_else(|| Error::UnknownColumn { name: name.to_string() })?;
        self.column(index)
    }

    pub fn cell(&self, row: usize, col_index: usize) -> Result<Value> {
        if row >= self.row_count {
            return Err(Error::OutOfRange { type_name: "Block", detail: format!("row {row} out of range") });
        }
        self.column(col_index)?.cell(row)
    }

    pub fn cell_by_name(&self, row: usize, col_name: &str) -> Result<Value> {
        if row >= self.row_count {
            return Err(Error::OutOfRange { type_name: "Block", detail: format!("row {row} out of range") });
        }
        self.column_by_name(col_name)?.cell(row)
    }

    /// Lazily materialize row `row` as a vector of cell values in
    /// column-declaration order. No persistent row-shaped storage is
    /// kept; this is a thin per-call projection over the columnar data.
    pub fn row(&self, row: usize) -> Result<Vec<Value>> {
        (0..self.column_count()).map(|c| self.cell(row, c)).collect()
    }

    pub fn rows(&self) -> impl Iterator<Item = Result<Vec<Value>>> + '_ {
        (0..self.row_count).map(move |r| self.row(r))
    }
}

fn build_name_index(descriptors: &[ColumnDescriptor]) -> Result<HashMap<String, usize>> {
    let mut index = HashMap::with_capacity(descriptors.len());
    for (i, d) in descriptors.iter().enumerate() {
        if index.insert(d.name.clone(), i).is_some() {
            return Err(Error::DuplicateColumnName { name: d.name.clone() });
        }
    }
    Ok(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scalar_type::ScalarType;

    #[test]
    fn row_count_must_match_every_column() {
        let descriptors = vec![
            ColumnDescriptor::scalar("a", ScalarType::Int32).unwrap(),
            ColumnDescriptor::scalar("b", ScalarType::Int32).unwrap(),
        ];
        let a = ColumnStore::from_scalar_values(vec![Value::Int32(1), Value::Int32(2)]).unwrap();
        let b = ColumnStore::from_scalar_values(vec![Value::Int32(1)]).unwrap();
        let err = Block::from_columns(descriptors, vec![a, b], 2).unwrap_err();
        assert!(matches!(err, Error::ColumnCountMismatch { .. }));
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let descriptors = vec![
            ColumnDescriptor::scalar("a", ScalarType::Int32).unwrap(),
            ColumnDescriptor::scalar("a", ScalarType::Int32).unwrap(),
        ];
        let err = Block::empty(descriptors).unwrap_err();
        assert!(matches!(err, Error::DuplicateColumnName { .. }));
    }

    #[test]
    fn name_lookup_is_case_sensitive_and_exact() {
        let descriptors = vec![ColumnDescriptor::scalar("Id", ScalarType::Int32).unwrap()];
        let store = ColumnStore::from_scalar_values(vec![Value::Int32(7)]).unwrap();
        let block = Block::from_columns(descriptors, vec![store], 1).unwrap();
        assert!(block.column_by_name("Id").is_ok());
        assert!(block.column_by_name("id").is_err());
    }

    #[test]
    fn row_projects_across_columns_in_order() {
        let descriptors = vec![
            ColumnDescriptor::scalar("a", ScalarType::Int32).unwrap(),
            ColumnDescriptor::scalar("b", ScalarType::String).unwrap(),
        ];
        let a = ColumnStore::from_scalar_values(vec![Value::Int32(1), Value::Int32(2)]).unwrap();
        let b = ColumnStore::from_scalar_values(vec![
            Value::String("x".to_string()),
            Value::String("y".to_string()),
        ])
        .unwrap();
        let block = Block::from_columns(descriptors, vec![a, b], 2).unwrap();
        assert_eq!(block.row(1).unwrap(), vec![Value::Int32(2), Value::String("y".to_string())]);
    }
}
