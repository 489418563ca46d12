// src/error.rs
use qcpdf_pdf_composer::ComposerError;
use qcpdf_render_lopdf::RenderError;
use qcpdf_table::TableError;
use std::path::PathBuf;
use thiserror::Error;

/// A comprehensive error type for the entire report generation pipeline.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Failed to read table '{path}': {source}")]
    Csv { path: PathBuf, source: csv::Error },

    #[error("Invalid table: {0}")]
    Table(#[from] TableError),

    #[error("Rendering failed: {0}")]
    Render(#[from] RenderError),

    #[error("Assembly failed: {0}")]
    Compose(#[from] ComposerError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration is invalid: {0}")]
    Config(#[from] serde_json::Error),

    #[error("Missing input: {}", .0.display())]
    MissingInput(PathBuf),

    #[error("Column '{0}' not found in table")]
    MissingColumn(String),
}
