use qcpdf_table::TableError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("PDF generation error: {0}")]
    Pdf(String),

    #[error("Invalid table layout: {0}")]
    Table(#[from] TableError),

    #[error("Invalid render options: {0}")]
    InvalidOptions(String),

    #[error("Failed to write '{path}': {message}")]
    Save { path: PathBuf, message: String },

    #[error("Other rendering error: {0}")]
    Other(String),
}

impl From<lopdf::Error> for RenderError {
    fn from(err: lopdf::Error) -> Self {
        RenderError::Pdf(err.to_string())
    }
}
