//! Geometry of a single table page.
//!
//! Coordinates here are layout coordinates: origin at the top-left corner of the
//! page, y growing downwards. The page context flips them when emitting PDF operators.
use crate::metrics::text_width;
use qcpdf_table::PageView;

/// Row height as a multiple of the font size.
const ROW_HEIGHT_FACTOR: f32 = 1.8;
/// Horizontal cell padding as a multiple of the font size.
const PADDING_FACTOR: f32 = 0.5;

fn widest<'a>(texts: impl Iterator<Item = &'a str>, font_size: f32) -> f32 {
    let padding = font_size * PADDING_FACTOR;
    texts.map(|t| text_width(t, font_size)).fold(0.0_f32, f32::max) + 2.0 * padding
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableGeometry {
    pub left: f32,
    pub top: f32,
    /// Label column first, then one width per data column.
    pub column_widths: Vec<f32>,
    pub row_height: f32,
    pub font_size: f32,
    /// Header row first, then one row per body row.
    pub row_count: usize,
}

impl TableGeometry {
    /// Sizes columns to their widest text at `font_size`, then shrinks everything
    /// uniformly until the table fits inside the margins, and centres it.
    ///
    /// The whole table always lands on the page, however small the text becomes.
    pub fn fit(view: &PageView, page_width: f32, page_height: f32, margin: f32, font_size: f32) -> Self {
        let mut column_widths = Vec::with_capacity(view.column_labels.len() + 1);
        column_widths.push(widest(view.row_labels.iter().map(String::as_str), font_size));
        for (c, label) in view.column_labels.iter().enumerate() {
            let texts = std::iter::once(label.as_str())
                .chain(view.cells.iter().filter_map(|row| row.get(c)).map(|cell| cell.text.as_str()));
            column_widths.push(widest(texts, font_size));
        }

        let row_count = view.row_labels.len() + 1;
        let row_height = font_size * ROW_HEIGHT_FACTOR;
        let natural_width: f32 = column_widths.iter().sum();
        let natural_height = row_height * row_count as f32;

        let available_width = (page_width - 2.0 * margin).max(1.0);
        let available_height = (page_height - 2.0 * margin).max(1.0);
        let scale = (available_width / natural_width)
            .min(available_height / natural_height)
            .min(1.0);

        for w in &mut column_widths {
            *w *= scale;
        }
        let width = natural_width * scale;
        let height = natural_height * scale;

        Self {
            left: (page_width - width) / 2.0,
            top: (page_height - height) / 2.0,
            column_widths,
            row_height: row_height * scale,
            font_size: font_size * scale,
            row_count,
        }
    }

    pub fn width(&self) -> f32 {
        self.column_widths.iter().sum()
    }

    pub fn column_left(&self, column: usize) -> f32 {
        self.left + self.column_widths[..column].iter().sum::<f32>()
    }

    pub fn row_top(&self, row: usize) -> f32 {
        self.top + self.row_height * row as f32
    }

    /// Baseline offset that vertically centres cap-height text in a row.
    pub fn baseline_offset(&self) -> f32 {
        (self.row_height + self.font_size * 0.7) / 2.0
    }
}
