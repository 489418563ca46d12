use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TableError {
    #[error("Invalid page grid shape {rows}x{columns}: both dimensions must be at least 1")]
    InvalidGridShape { rows: usize, columns: usize },

    #[error("Duplicate column name: '{0}'")]
    DuplicateColumn(String),

    #[error("Row {row} has {found} values, expected {expected}")]
    RowWidth {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("Expected {expected} row labels, got {found}")]
    RowLabelCount { expected: usize, found: usize },

    #[error("Invalid page size {width}x{height}: dimensions must be positive")]
    InvalidPageSize { width: f32, height: f32 },

    #[error("{0}")]
    Other(String),
}
