//! Paginated QC table reports.
//!
//! Loads tables from delimited files, renders each one as a grid of highlighted
//! PDF table pages and assembles the results, together with existing PDFs, into
//! a single combined document.

pub mod config;
pub mod error;
pub mod loader;
pub mod pipeline;

pub use config::{BatchConfig, ReportConfig, ReportMode, SingleFileConfig};
pub use error::PipelineError;
pub use loader::{find_tables, load_csv, LoaderOptions};
pub use pipeline::{RenderedReport, ReportOutcome, ReportPipeline};

pub use qcpdf_pdf_composer::{
    AssembledDocument, ComposerError, DocumentAssembler, MergeStrategy, PageRange, SourceDocument,
};
pub use qcpdf_render_lopdf::{RenderError, RenderOptions, RenderSummary, TableLayoutEngine};
pub use qcpdf_table::{
    paginate, CellPalette, CellValue, Color, GridShape, HighlightPredicate, HighlightRule, PageSize,
    QcColumns, Table, TableError, Threshold,
};

use std::error::Error;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

/// Formats an error and its chain of causes, one per line.
pub fn error_report(error: &dyn Error) -> String {
    let mut report = format!("Error: {}\n", error);
    let mut source = error.source();
    if source.is_some() {
        report.push_str("\nCaused by:\n");
    }
    let mut depth = 0;
    while let Some(cause) = source {
        let _ = writeln!(report, "    {}: {}", depth, cause);
        depth += 1;
        source = cause.source();
    }
    report
}

/// Writes a timestamped failure report to `<output_dir>/<file_name>`, replacing
/// any earlier report. Creates the output directory when needed.
pub fn write_error_log(
    output_dir: &Path,
    file_name: &str,
    error: &dyn Error,
) -> std::io::Result<PathBuf> {
    std::fs::create_dir_all(output_dir)?;
    let path = output_dir.join(file_name);
    let contents = format!(
        "qcpdf failed at {}\n\n{}",
        chrono::Utc::now().to_rfc3339(),
        error_report(error)
    );
    std::fs::write(&path, contents)?;
    Ok(path)
}
