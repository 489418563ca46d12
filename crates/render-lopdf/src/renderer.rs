use crate::error::RenderError;
use crate::layout::TableGeometry;
use crate::metrics::{BASE_FONT, FONT_RESOURCE};
use crate::page::PageContext;
use lopdf::content::Content;
use lopdf::{dictionary, Document, Object, ObjectId, Stream};
use qcpdf_table::{paginate, CellPalette, GridShape, HighlightPredicate, PageSize, Pagination, Table};
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Page and typography settings for rendered tables.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOptions {
    pub page_size: PageSize,
    pub palette: CellPalette,
    /// Preferred font size; tables that do not fit are scaled down.
    pub font_size: f32,
    pub margin: f32,
}

/// Text smaller than this is reported as hard to read.
const LEGIBLE_FONT_SIZE: f32 = 4.0;

impl RenderOptions {
    /// Checks the options and returns the page dimensions.
    pub fn validate(&self) -> Result<(f32, f32), RenderError> {
        let (width, height) = self.page_size.validate()?;
        if !self.font_size.is_finite() || self.font_size <= 0.0 {
            return Err(RenderError::InvalidOptions(format!(
                "font size must be positive, got {}",
                self.font_size
            )));
        }
        if !self.margin.is_finite() || self.margin < 0.0 || 2.0 * self.margin >= width.min(height) {
            return Err(RenderError::InvalidOptions(format!(
                "margin {} does not leave room on a {}x{} page",
                self.margin, width, height
            )));
        }
        Ok((width, height))
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            page_size: PageSize::Report,
            palette: CellPalette::default(),
            font_size: 10.0,
            margin: 36.0,
        }
    }
}

/// What a render produced, including how much of the table was left out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderSummary {
    pub pages: usize,
    pub rows_per_page: usize,
    pub columns_per_page: usize,
    pub dropped_rows: usize,
    pub dropped_columns: usize,
}

impl RenderSummary {
    fn from_pagination(pagination: &Pagination) -> Self {
        Self {
            pages: pagination.pages.len(),
            rows_per_page: pagination.rows_per_page,
            columns_per_page: pagination.columns_per_page,
            dropped_rows: pagination.dropped_rows,
            dropped_columns: pagination.dropped_columns,
        }
    }

    pub fn is_truncated(&self) -> bool {
        self.dropped_rows > 0 || self.dropped_columns > 0
    }
}

/// Builds the object graph of a table document in memory.
struct TableDocumentBuilder {
    document: Document,
    pages_id: ObjectId,
    resources_id: ObjectId,
    page_ids: Vec<ObjectId>,
}

impl TableDocumentBuilder {
    fn new() -> Self {
        let mut document = Document::with_version("1.7");
        let pages_id = document.new_object_id();

        let font_id = document.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => BASE_FONT,
            "Encoding" => "WinAnsiEncoding",
        });
        // One resources dictionary shared by every page.
        let resources_id = document.add_object(dictionary! {
            "Font" => dictionary! { FONT_RESOURCE => font_id },
        });

        let catalog_id = document.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        document.trailer.set("Root", catalog_id);

        Self { document, pages_id, resources_id, page_ids: Vec::new() }
    }

    fn add_page(&mut self, content: Content, page_width: f32, page_height: f32) -> Result<ObjectId, RenderError> {
        let content_id = self
            .document
            .add_object(Stream::new(dictionary! {}, content.encode()?));
        let page_id = self.document.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => self.pages_id,
            "MediaBox" => vec![Object::Integer(0), Object::Integer(0), page_width.into(), page_height.into()],
            "Contents" => content_id,
            "Resources" => self.resources_id,
        });
        self.page_ids.push(page_id);
        Ok(page_id)
    }

    fn finish(mut self) -> Document {
        let kids: Vec<Object> = self.page_ids.iter().map(|id| Object::Reference(*id)).collect();
        let pages_dict = dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => self.page_ids.len() as i64,
        };
        self.document.objects.insert(self.pages_id, Object::Dictionary(pages_dict));
        self.document
    }
}

/// Renders a `Table` as a grid of highlighted table pages.
#[derive(Debug, Clone, Default)]
pub struct TableLayoutEngine {
    options: RenderOptions,
}

impl TableLayoutEngine {
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Lays out every page of `table` and returns the finished document.
    ///
    /// Pages follow row-major order of the `(row band, column band)` grid. Rows and
    /// columns left over by an uneven split are not rendered; the summary reports them.
    pub fn render_document<P>(
        &self,
        table: &Table,
        shape: GridShape,
        predicate: &P,
    ) -> Result<(Document, RenderSummary), RenderError>
    where
        P: HighlightPredicate + ?Sized,
    {
        let (page_width, page_height) = self.options.validate()?;
        let pagination = paginate(table, shape)?;

        if table.is_empty() {
            log::warn!(
                "Table has {} rows and {} columns; rendering a single empty page.",
                table.row_count(),
                table.column_count()
            );
        }
        if pagination.is_truncated() {
            log::warn!(
                "Grid {} leaves {} row(s) and {} column(s) of a {}x{} table off every page.",
                shape,
                pagination.dropped_rows,
                pagination.dropped_columns,
                table.row_count(),
                table.column_count()
            );
        }

        let mut builder = TableDocumentBuilder::new();
        for grid in &pagination.pages {
            let view = grid.view(table, predicate);
            let mut page = PageContext::new(page_width, page_height);
            if !view.is_blank() {
                let geometry = TableGeometry::fit(
                    &view,
                    page_width,
                    page_height,
                    self.options.margin,
                    self.options.font_size,
                );
                if geometry.font_size < LEGIBLE_FONT_SIZE {
                    log::warn!(
                        "Page {} scaled to {:.1}pt text to fit {} rows; consider more row bands.",
                        grid.page_index + 1,
                        geometry.font_size,
                        view.row_labels.len()
                    );
                }
                page.draw_table(&view, &geometry, &self.options.palette);
            }
            if let Some(annotation) = &grid.annotation {
                page.draw_annotation(annotation, self.options.margin);
            }
            log::debug!(
                "Page {}: rows {:?}, columns {:?}",
                grid.page_index + 1,
                grid.rows,
                grid.columns
            );
            builder.add_page(page.finish(), page_width, page_height)?;
        }

        Ok((builder.finish(), RenderSummary::from_pagination(&pagination)))
    }

    /// Renders `table` and writes the document to `writer`.
    pub fn render_to_writer<P, W>(
        &self,
        table: &Table,
        writer: &mut W,
        shape: GridShape,
        predicate: &P,
    ) -> Result<RenderSummary, RenderError>
    where
        P: HighlightPredicate + ?Sized,
        W: Write,
    {
        let (mut document, summary) = self.render_document(table, shape, predicate)?;
        document
            .save_to(writer)
            .map_err(|e| RenderError::Pdf(e.to_string()))?;
        Ok(summary)
    }

    /// Renders `table` to `destination`, creating or replacing the file.
    ///
    /// The document is written to a temporary file next to `destination` and moved
    /// into place only once complete.
    pub fn render<P>(
        &self,
        table: &Table,
        destination: impl AsRef<Path>,
        shape: GridShape,
        predicate: &P,
    ) -> Result<RenderSummary, RenderError>
    where
        P: HighlightPredicate + ?Sized,
    {
        let destination = destination.as_ref();
        let (mut document, summary) = self.render_document(table, shape, predicate)?;

        let save_error = |message: String| RenderError::Save {
            path: destination.to_path_buf(),
            message,
        };
        let directory = match destination.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut temp = NamedTempFile::new_in(directory).map_err(|e| save_error(e.to_string()))?;
        document
            .save_to(temp.as_file_mut())
            .map_err(|e| save_error(e.to_string()))?;
        temp.as_file_mut().sync_all()?;
        temp.persist(destination).map_err(|e| save_error(e.error.to_string()))?;

        log::info!(
            "Rendered {} page(s) to {}",
            summary.pages,
            destination.display()
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qcpdf_table::{CellValue, Threshold};

    fn table(rows: usize, columns: usize) -> Table {
        let names = (0..columns).map(|c| format!("metric_{}", c)).collect();
        let cells = (0..rows)
            .map(|r| {
                (0..columns)
                    .map(|c| CellValue::Number((r * 10 + c) as f64 / 100.0))
                    .collect()
            })
            .collect();
        Table::new(names, cells).unwrap()
    }

    fn page_text(doc: &Document, page_number: u32) -> String {
        let page_id = doc.get_pages()[&page_number];
        String::from_utf8_lossy(&doc.get_page_content(page_id).unwrap()).to_string()
    }

    #[test]
    fn test_page_count_matches_grid() {
        let engine = TableLayoutEngine::default();
        for (nh, nv) in [(1, 1), (2, 1), (1, 2), (3, 2)] {
            let shape = GridShape::new(nh, nv).unwrap();
            let (doc, summary) = engine
                .render_document(&table(12, 4), shape, &Threshold::default())
                .unwrap();
            assert_eq!(doc.get_pages().len(), nh * nv);
            assert_eq!(summary.pages, nh * nv);
        }
    }

    #[test]
    fn test_annotations_only_on_multi_page_grids() {
        let engine = TableLayoutEngine::default();
        let (single, _) = engine
            .render_document(&table(4, 2), GridShape::SINGLE, &Threshold::default())
            .unwrap();
        assert!(!page_text(&single, 1).contains("Part-"));

        let (grid, _) = engine
            .render_document(&table(4, 2), GridShape::new(2, 2).unwrap(), &Threshold::default())
            .unwrap();
        assert!(page_text(&grid, 1).contains("(Part-1x1: Page-1)"));
        assert!(page_text(&grid, 2).contains("(Part-1x2: Page-2)"));
        assert!(page_text(&grid, 3).contains("(Part-2x1: Page-3)"));
        assert!(page_text(&grid, 4).contains("(Part-2x2: Page-4)"));
    }

    #[test]
    fn test_empty_table_renders_one_blank_page() {
        let engine = TableLayoutEngine::default();
        let empty = Table::new(vec!["a".into()], vec![]).unwrap();
        let (doc, summary) = engine
            .render_document(&empty, GridShape::new(2, 3).unwrap(), &Threshold::default())
            .unwrap();
        assert_eq!(doc.get_pages().len(), 1);
        assert_eq!(summary.pages, 1);
        assert!(!page_text(&doc, 1).contains("Tj"));
    }

    #[test]
    fn test_truncation_is_reported() {
        let engine = TableLayoutEngine::default();
        let (doc, summary) = engine
            .render_document(&table(11, 3), GridShape::new(2, 2).unwrap(), &Threshold::default())
            .unwrap();
        assert_eq!(doc.get_pages().len(), 4);
        assert_eq!(summary.rows_per_page, 5);
        assert_eq!(summary.dropped_rows, 1);
        assert_eq!(summary.dropped_columns, 1);
        assert!(summary.is_truncated());
        for page in 1..=4 {
            assert!(!page_text(&doc, page).contains("(10) Tj"));
        }
    }

    #[test]
    fn test_invalid_inputs_are_rejected() {
        let engine = TableLayoutEngine::new(RenderOptions {
            page_size: PageSize::Custom { width: 0.0, height: 100.0 },
            ..RenderOptions::default()
        });
        assert!(matches!(
            engine.render_document(&table(2, 2), GridShape::SINGLE, &Threshold::default()),
            Err(RenderError::Table(_))
        ));

        let engine = TableLayoutEngine::default();
        let bad_shape = GridShape { rows: 1, columns: 0 };
        assert!(matches!(
            engine.render_document(&table(2, 2), bad_shape, &Threshold::default()),
            Err(RenderError::Table(_))
        ));
    }

    #[test]
    fn test_invalid_options_are_rejected() {
        let bad = [
            RenderOptions { font_size: 0.0, ..RenderOptions::default() },
            RenderOptions { font_size: f32::NAN, ..RenderOptions::default() },
            RenderOptions { margin: -1.0, ..RenderOptions::default() },
            RenderOptions { margin: 306.0, ..RenderOptions::default() },
            RenderOptions { margin: f32::INFINITY, ..RenderOptions::default() },
        ];
        for options in bad {
            let engine = TableLayoutEngine::new(options.clone());
            let result = engine.render_document(&table(2, 2), GridShape::SINGLE, &Threshold::default());
            assert!(
                matches!(result, Err(RenderError::InvalidOptions(_))),
                "accepted {:?}",
                options
            );
        }
        assert!(RenderOptions { margin: 0.0, ..RenderOptions::default() }.validate().is_ok());
    }

    #[test]
    fn test_missing_destination_directory_fails_without_output() {
        let dir = tempfile::tempdir().unwrap();
        let destination = dir.path().join("absent").join("table.pdf");
        let err = TableLayoutEngine::default()
            .render(&table(2, 2), &destination, GridShape::SINGLE, &Threshold::default())
            .unwrap_err();
        assert!(matches!(err, RenderError::Save { ref path, .. } if path == &destination));
        assert!(!destination.exists());
    }

    #[test]
    fn test_render_to_writer_produces_loadable_pdf() {
        let engine = TableLayoutEngine::default();
        let mut bytes = Vec::new();
        engine
            .render_to_writer(&table(3, 3), &mut bytes, GridShape::SINGLE, &Threshold::default())
            .unwrap();
        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
    }
}
