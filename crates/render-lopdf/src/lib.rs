//! Table-to-PDF rendering using lopdf.
//!
//! `TableLayoutEngine` splits a table into an `nh x nv` grid of pages and draws
//! each page as a labelled, colour-coded table in the built-in Helvetica font.

mod error;
mod layout;
mod metrics;
mod page;
mod renderer;

pub use error::RenderError;
pub use layout::TableGeometry;
pub use metrics::text_width;
pub use renderer::{RenderOptions, RenderSummary, TableLayoutEngine};
