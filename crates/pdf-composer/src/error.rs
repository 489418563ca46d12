use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ComposerError {
    #[error("No documents to assemble")]
    NoDocuments,

    #[error("Failed to load '{path}': {source}")]
    Load {
        path: PathBuf,
        source: lopdf::Error,
    },

    #[error("Page range {start}..{end} is outside '{path}' which has {page_count} page(s)")]
    PageRange {
        path: PathBuf,
        start: usize,
        end: usize,
        page_count: usize,
    },

    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to write '{path}': {message}")]
    Save { path: PathBuf, message: String },

    #[error("{0}")]
    Other(String),
}
