use crate::layout::TableGeometry;
use crate::metrics::{encode_win_ansi, text_width, FONT_RESOURCE};
use lopdf::content::{Content, Operation};
use lopdf::{Object, StringFormat};
use qcpdf_table::{CellPalette, Color, PageView};

const GRID_LINE_WIDTH: f32 = 0.5;
const ANNOTATION_FONT_SIZE: f32 = 8.0;

#[derive(Default, Clone)]
struct PageRenderState {
    font_size: Option<f32>,
    fill_color: Option<Color>,
    stroke_color: Option<Color>,
}

/// Accumulates the content stream of one page.
pub(crate) struct PageContext {
    page_width: f32,
    page_height: f32,
    content: Content,
    state: PageRenderState,
}

impl PageContext {
    pub(crate) fn new(page_width: f32, page_height: f32) -> Self {
        Self {
            page_width,
            page_height,
            content: Content { operations: vec![] },
            state: PageRenderState::default(),
        }
    }

    pub(crate) fn finish(self) -> Content {
        self.content
    }

    fn push(&mut self, operator: &str, operands: Vec<Object>) {
        self.content.operations.push(Operation::new(operator, operands));
    }

    fn set_fill_color(&mut self, color: Color) {
        if self.state.fill_color != Some(color) {
            let [r, g, b] = color.to_unit();
            self.push("rg", vec![r.into(), g.into(), b.into()]);
            self.state.fill_color = Some(color);
        }
    }

    fn set_stroke_color(&mut self, color: Color) {
        if self.state.stroke_color != Some(color) {
            let [r, g, b] = color.to_unit();
            self.push("RG", vec![r.into(), g.into(), b.into()]);
            self.state.stroke_color = Some(color);
        }
    }

    /// Fills and outlines a cell given in layout coordinates.
    fn draw_cell_background(&mut self, x: f32, y: f32, width: f32, height: f32, fill: Color) {
        self.set_fill_color(fill);
        let pdf_y = self.page_height - (y + height);
        self.push("re", vec![x.into(), pdf_y.into(), width.into(), height.into()]);
        self.push("B", vec![]);
    }

    /// Draws a single line of text whose baseline sits at layout `y`.
    fn draw_text(&mut self, text: &str, x: f32, baseline_y: f32, font_size: f32) {
        if text.is_empty() {
            return;
        }
        self.push("BT", vec![]);
        if self.state.font_size != Some(font_size) {
            self.push("Tf", vec![FONT_RESOURCE.into(), font_size.into()]);
            self.state.font_size = Some(font_size);
        }
        self.set_fill_color(Color::BLACK);
        let pdf_y = self.page_height - baseline_y;
        self.push("Td", vec![x.into(), pdf_y.into()]);
        self.push(
            "Tj",
            vec![Object::String(encode_win_ansi(text), StringFormat::Literal)],
        );
        self.push("ET", vec![]);
    }

    fn draw_centered_text(&mut self, text: &str, left: f32, width: f32, baseline_y: f32, font_size: f32) {
        let x = left + (width - text_width(text, font_size)) / 2.0;
        self.draw_text(text, x, baseline_y, font_size);
    }

    /// Draws the header row, the label column and the body of `view`.
    pub(crate) fn draw_table(&mut self, view: &PageView, geometry: &TableGeometry, palette: &CellPalette) {
        self.push("w", vec![GRID_LINE_WIDTH.into()]);
        self.set_stroke_color(Color::BLACK);

        let row_height = geometry.row_height;
        let font_size = geometry.font_size;
        let baseline = geometry.baseline_offset();

        // Header row; the top-left corner stays empty.
        for (c, label) in view.column_labels.iter().enumerate() {
            let (x, w) = (geometry.column_left(c + 1), geometry.column_widths[c + 1]);
            let y = geometry.row_top(0);
            self.draw_cell_background(x, y, w, row_height, palette.header);
            self.draw_centered_text(label, x, w, y + baseline, font_size);
        }

        for (r, label) in view.row_labels.iter().enumerate() {
            let y = geometry.row_top(r + 1);
            let (x, w) = (geometry.column_left(0), geometry.column_widths[0]);
            self.draw_cell_background(x, y, w, row_height, palette.header);
            self.draw_centered_text(label, x, w, y + baseline, font_size);

            let Some(cells) = view.cells.get(r) else { continue };
            for (c, cell) in cells.iter().enumerate() {
                let (x, w) = (geometry.column_left(c + 1), geometry.column_widths[c + 1]);
                self.draw_cell_background(x, y, w, row_height, palette.fill_for(cell.highlighted));
                self.draw_centered_text(&cell.text, x, w, y + baseline, font_size);
            }
        }
    }

    /// Stamps the page-position label at the bottom centre of the page.
    pub(crate) fn draw_annotation(&mut self, text: &str, margin: f32) {
        let baseline_y = self.page_height - margin / 2.0;
        self.draw_centered_text(text, 0.0, self.page_width, baseline_y, ANNOTATION_FONT_SIZE);
    }
}
