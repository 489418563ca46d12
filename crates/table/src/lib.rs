//! Table model and page-grid layout for QC reports.
//!
//! This crate holds everything the renderer and the pipeline share:
//! - `Table` and the tagged `CellValue`
//! - `HighlightPredicate` and the built-in highlight rules
//! - `GridShape` / `paginate` for splitting a table into pages
//! - colours and page sizes

mod color;
mod error;
mod grid;
mod highlight;
mod page;
mod table;
mod value;

pub use color::{CellPalette, Color};
pub use error::TableError;
pub use grid::{paginate, DisplayCell, GridShape, PageGrid, PageView, Pagination};
pub use highlight::{HighlightPredicate, HighlightRule, QcColumns, Threshold, DEFAULT_THRESHOLD};
pub use page::PageSize;
pub use table::Table;
pub use value::CellValue;
