//! Reading delimited tables from disk.
use crate::error::PipelineError;
use qcpdf_table::{CellValue, Table, TableError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoaderOptions {
    pub delimiter: char,
    /// Column whose values label the rows. Without one, rows are labelled `0, 1, ...`.
    pub index_column: Option<String>,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self { delimiter: ',', index_column: None }
    }
}

/// Loads a delimited file whose first record is the header.
pub fn load_csv(path: impl AsRef<Path>, options: &LoaderOptions) -> Result<Table, PipelineError> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(PipelineError::MissingInput(path.to_path_buf()));
    }
    let delimiter = u8::try_from(options.delimiter)
        .ok()
        .filter(u8::is_ascii)
        .ok_or_else(|| TableError::Other(format!("Delimiter '{}' is not ASCII", options.delimiter)))?;

    let csv_error = |source: csv::Error| PipelineError::Csv { path: path.to_path_buf(), source };
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .from_path(path)
        .map_err(csv_error)?;

    let mut columns: Vec<String> = reader.headers().map_err(csv_error)?.iter().map(str::to_string).collect();
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(csv_error)?;
        rows.push(record.iter().map(CellValue::parse).collect::<Vec<_>>());
    }

    let table = match &options.index_column {
        None => Table::new(columns, rows)?,
        Some(index) => {
            let position = columns
                .iter()
                .position(|c| c == index)
                .ok_or_else(|| PipelineError::MissingColumn(index.clone()))?;
            columns.remove(position);
            let labels = rows.iter_mut().map(|row| row.remove(position).to_string()).collect();
            Table::with_row_labels(columns, labels, rows)?
        }
    };

    log::debug!(
        "Loaded {} with {} rows and {} columns",
        path.display(),
        table.row_count(),
        table.column_count()
    );
    Ok(table)
}

/// Lists the `.csv` files directly inside `dir`, sorted by file name.
pub fn find_tables(dir: impl AsRef<Path>) -> Result<Vec<PathBuf>, PipelineError> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        return Err(PipelineError::MissingInput(dir.to_path_buf()));
    }
    let mut tables = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let is_csv = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
        if is_csv && path.is_file() {
            tables.push(path);
        }
    }
    tables.sort();
    Ok(tables)
}
