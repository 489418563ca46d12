use crate::error::TableError;
use crate::value::CellValue;
use std::collections::HashSet;

/// An immutable table of named columns and labeled rows.
///
/// Cells are stored row-major. Every row holds exactly one value per column and
/// column names are unique; both are checked on construction.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<String>,
    row_labels: Vec<String>,
    cells: Vec<Vec<CellValue>>,
}

impl Table {
    /// Builds a table whose row labels are the zero-based row indices.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<CellValue>>) -> Result<Self, TableError> {
        let labels = (0..rows.len()).map(|i| i.to_string()).collect();
        Self::with_row_labels(columns, labels, rows)
    }

    pub fn with_row_labels(
        columns: Vec<String>,
        row_labels: Vec<String>,
        rows: Vec<Vec<CellValue>>,
    ) -> Result<Self, TableError> {
        let mut seen = HashSet::with_capacity(columns.len());
        for name in &columns {
            if !seen.insert(name.as_str()) {
                return Err(TableError::DuplicateColumn(name.clone()));
            }
        }
        if row_labels.len() != rows.len() {
            return Err(TableError::RowLabelCount {
                expected: rows.len(),
                found: row_labels.len(),
            });
        }
        for (i, row) in rows.iter().enumerate() {
            if row.len() != columns.len() {
                return Err(TableError::RowWidth {
                    row: i,
                    expected: columns.len(),
                    found: row.len(),
                });
            }
        }
        Ok(Self { columns, row_labels, cells: rows })
    }

    pub fn row_count(&self) -> usize {
        self.cells.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.row_count() == 0 || self.column_count() == 0
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn row_labels(&self) -> &[String] {
        &self.row_labels
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn row(&self, index: usize) -> Option<&[CellValue]> {
        self.cells.get(index).map(Vec::as_slice)
    }

    pub fn cell(&self, row: usize, column: usize) -> Option<&CellValue> {
        self.cells.get(row).and_then(|r| r.get(column))
    }
}
