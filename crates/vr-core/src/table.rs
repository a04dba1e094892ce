//! In-memory tabular data handed over by the CSV reader

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A parsed table from a single CSV file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Table {
    /// Column definitions
    pub columns: Vec<Column>,
    /// Row data
    pub rows: Vec<Row>,
    /// Source file path (or a label for in-memory tables)
    pub source_path: PathBuf,
}

impl Table {
    /// Create a new empty table
    pub fn new(source_path: PathBuf) -> Self {
        Self {
            columns: Vec::new(),
            rows: Vec::new(),
            source_path,
        }
    }

    /// Get the number of columns
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Get the number of rows
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Find a column by name
    pub fn find_column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Index of a column that must be present
    pub fn require_column(&self, name: &str) -> Result<usize> {
        self.find_column(name)
            .map(|c| c.index)
            .ok_or_else(|| Error::MissingColumn {
                column: name.to_string(),
                path: self.source_path.clone(),
            })
    }

    /// Resolve a fixed list of required columns, failing on the first absent one
    pub fn require_columns<const N: usize>(&self, names: [&str; N]) -> Result<[usize; N]> {
        let mut indices = [0usize; N];
        for (slot, name) in indices.iter_mut().zip(names) {
            *slot = self.require_column(name)?;
        }
        Ok(indices)
    }
}

/// A column definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Column {
    /// Header text as it appears in the file
    pub name: String,
    /// Column index (0-based)
    pub index: usize,
}

impl Column {
    /// Create a new column
    pub fn new(name: String, index: usize) -> Self {
        Self { name, index }
    }
}

/// A row of data. Absent cells are stored as empty strings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Row {
    pub cells: Vec<String>,
}

impl Row {
    /// Create a new row
    pub fn new(cells: Vec<String>) -> Self {
        Self { cells }
    }

    /// Get a cell by column index, empty when out of range
    pub fn get(&self, index: usize) -> &str {
        self.cells.get(index).map(String::as_str).unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        let mut table = Table::new(PathBuf::from("sample.csv"));
        table.columns = vec![
            Column::new("Vendor Name".to_string(), 0),
            Column::new("Address".to_string(), 1),
        ];
        table.rows = vec![Row::new(vec!["Acme".to_string()])];
        table
    }

    #[test]
    fn test_require_column_present() {
        let table = sample();
        assert_eq!(table.require_column("Address").unwrap(), 1);
    }

    #[test]
    fn test_require_column_missing_is_schema_error() {
        let table = sample();
        let err = table.require_column("Net Amount").unwrap_err();
        assert!(err.is_schema_error());
        assert!(err.to_string().contains("Net Amount"));
    }

    #[test]
    fn test_require_columns_preserves_order() {
        let table = sample();
        assert_eq!(
            table.require_columns(["Address", "Vendor Name"]).unwrap(),
            [1, 0]
        );
    }

    #[test]
    fn test_row_get_out_of_range_is_empty() {
        let table = sample();
        assert_eq!(table.rows[0].get(0), "Acme");
        assert_eq!(table.rows[0].get(1), "");
        assert_eq!(table.rows[0].get(7), "");
    }
}
