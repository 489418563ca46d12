//! Splitting a table into an `nh x nv` grid of pages.
//!
//! Rows are divided into `nh` bands of `row_count / nh` rows and columns into `nv`
//! bands of `column_count / nv` columns. When a count is not evenly divisible the
//! remainder is dropped: those rows or columns belong to no page.
use crate::error::TableError;
use crate::highlight::HighlightPredicate;
use crate::table::Table;
use itertools::iproduct;
use serde::{de, Deserialize, Deserializer, Serialize};
use std::fmt;
use std::ops::Range;
use std::str::FromStr;

/// Number of row bands (`rows`, a.k.a. `nh`) and column bands (`columns`, `nv`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct GridShape {
    pub rows: usize,
    pub columns: usize,
}

impl GridShape {
    pub const SINGLE: GridShape = GridShape { rows: 1, columns: 1 };

    pub fn new(rows: usize, columns: usize) -> Result<Self, TableError> {
        let shape = Self { rows, columns };
        shape.validate()?;
        Ok(shape)
    }

    pub fn validate(&self) -> Result<(), TableError> {
        if self.rows == 0 || self.columns == 0 {
            return Err(TableError::InvalidGridShape {
                rows: self.rows,
                columns: self.columns,
            });
        }
        Ok(())
    }

    pub fn is_single_page(&self) -> bool {
        self.rows == 1 && self.columns == 1
    }

    pub fn page_count(&self) -> usize {
        self.rows * self.columns
    }
}

impl Default for GridShape {
    fn default() -> Self {
        Self::SINGLE
    }
}

impl fmt::Display for GridShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.rows, self.columns)
    }
}

impl FromStr for GridShape {
    type Err = TableError;

    /// Accepts `"NHxNV"`, e.g. `"2x1"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || TableError::Other(format!("Invalid grid shape '{}', expected NHxNV", s));
        let (rows, columns) = s.trim().split_once(['x', 'X']).ok_or_else(invalid)?;
        let rows = rows.trim().parse().map_err(|_| invalid())?;
        let columns = columns.trim().parse().map_err(|_| invalid())?;
        GridShape::new(rows, columns)
    }
}

impl<'de> Deserialize<'de> for GridShape {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum GridShapeDef {
            Str(String),
            Pair(usize, usize),
            Map { rows: usize, columns: usize },
        }

        match GridShapeDef::deserialize(deserializer)? {
            GridShapeDef::Str(s) => s.parse().map_err(de::Error::custom),
            GridShapeDef::Pair(rows, columns) | GridShapeDef::Map { rows, columns } => {
                GridShape::new(rows, columns).map_err(de::Error::custom)
            }
        }
    }
}

/// One physical page: a contiguous block of rows and columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageGrid {
    /// Row band, zero-based (`i`).
    pub part_row: usize,
    /// Column band, zero-based (`j`).
    pub part_column: usize,
    /// Position in the output document, zero-based (`i * nv + j`).
    pub page_index: usize,
    pub rows: Range<usize>,
    pub columns: Range<usize>,
    /// Page-position label, present only when the grid has more than one page.
    pub annotation: Option<String>,
}

/// A body cell ready for drawing.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayCell {
    pub text: String,
    pub highlighted: bool,
}

/// The display data of a page: labels plus the body matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct PageView {
    pub column_labels: Vec<String>,
    pub row_labels: Vec<String>,
    pub cells: Vec<Vec<DisplayCell>>,
}

impl PageView {
    pub fn is_blank(&self) -> bool {
        self.column_labels.is_empty() && self.row_labels.is_empty()
    }
}

impl PageGrid {
    pub fn annotation_for(part_row: usize, part_column: usize, page_index: usize) -> String {
        format!("Part-{}x{}: Page-{}", part_row + 1, part_column + 1, page_index + 1)
    }

    /// Derives the labels, cell text and highlight flags of this page.
    pub fn view<P: HighlightPredicate + ?Sized>(&self, table: &Table, predicate: &P) -> PageView {
        let columns = &table.columns()[self.columns.clone()];
        let row_labels = table.row_labels()[self.rows.clone()].to_vec();
        let cells = self
            .rows
            .clone()
            .filter_map(|r| table.row(r))
            .map(|row| {
                columns
                    .iter()
                    .zip(&row[self.columns.clone()])
                    .map(|(name, value)| DisplayCell {
                        text: value.to_string(),
                        highlighted: predicate.highlight(name, value),
                    })
                    .collect()
            })
            .collect();
        PageView {
            column_labels: columns.to_vec(),
            row_labels,
            cells,
        }
    }
}

/// The outcome of partitioning a table.
#[derive(Debug, Clone, PartialEq)]
pub struct Pagination {
    pub shape: GridShape,
    pub rows_per_page: usize,
    pub columns_per_page: usize,
    pub dropped_rows: usize,
    pub dropped_columns: usize,
    pub pages: Vec<PageGrid>,
}

impl Pagination {
    pub fn is_truncated(&self) -> bool {
        self.dropped_rows > 0 || self.dropped_columns > 0
    }
}

fn band(index: usize, per_page: usize, total: usize) -> Range<usize> {
    let start = (index * per_page).min(total);
    let end = ((index + 1) * per_page).min(total);
    start..end
}

/// Partitions `table` into `shape.rows x shape.columns` pages in row-major order.
///
/// A table without rows or columns yields a single page covering nothing.
pub fn paginate(table: &Table, shape: GridShape) -> Result<Pagination, TableError> {
    shape.validate()?;

    let row_count = table.row_count();
    let column_count = table.column_count();

    if table.is_empty() {
        return Ok(Pagination {
            shape,
            rows_per_page: 0,
            columns_per_page: 0,
            dropped_rows: 0,
            dropped_columns: 0,
            pages: vec![PageGrid {
                part_row: 0,
                part_column: 0,
                page_index: 0,
                rows: 0..0,
                columns: 0..0,
                annotation: None,
            }],
        });
    }

    let rows_per_page = row_count / shape.rows;
    let columns_per_page = column_count / shape.columns;
    let labelled = !shape.is_single_page();

    let pages = iproduct!(0..shape.rows, 0..shape.columns)
        .map(|(i, j)| {
            let page_index = i * shape.columns + j;
            PageGrid {
                part_row: i,
                part_column: j,
                page_index,
                rows: band(i, rows_per_page, row_count),
                columns: band(j, columns_per_page, column_count),
                annotation: labelled.then(|| PageGrid::annotation_for(i, j, page_index)),
            }
        })
        .collect();

    Ok(Pagination {
        shape,
        rows_per_page,
        columns_per_page,
        dropped_rows: row_count - rows_per_page * shape.rows,
        dropped_columns: column_count - columns_per_page * shape.columns,
        pages,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::highlight::Threshold;
    use crate::value::CellValue;
    use std::collections::BTreeSet;

    fn numeric_table(rows: usize, columns: usize) -> Table {
        let names = (0..columns).map(|c| format!("c{}", c)).collect();
        let cells = (0..rows)
            .map(|r| (0..columns).map(|c| CellValue::Number((r * columns + c) as f64)).collect())
            .collect();
        Table::new(names, cells).unwrap()
    }

    fn covered(p: &Pagination) -> BTreeSet<(usize, usize)> {
        p.pages
            .iter()
            .flat_map(|page| iproduct!(page.rows.clone(), page.columns.clone()))
            .collect()
    }

    #[test]
    fn test_even_division_covers_table_exactly_once() {
        for (rows, columns, nh, nv) in [(10, 4, 2, 1), (12, 6, 3, 2), (9, 9, 3, 3), (4, 4, 1, 1)] {
            let table = numeric_table(rows, columns);
            let p = paginate(&table, GridShape::new(nh, nv).unwrap()).unwrap();
            let total: usize = p.pages.iter().map(|pg| pg.rows.len() * pg.columns.len()).sum();
            assert_eq!(total, rows * columns, "overlap for {}x{} / {}x{}", rows, columns, nh, nv);
            assert_eq!(covered(&p).len(), rows * columns);
            assert!(!p.is_truncated());
        }
    }

    #[test]
    fn test_remainder_rows_and_columns_are_dropped() {
        let table = numeric_table(11, 5);
        let p = paginate(&table, GridShape::new(2, 2).unwrap()).unwrap();
        assert_eq!(p.rows_per_page, 5);
        assert_eq!(p.columns_per_page, 2);
        assert_eq!(p.dropped_rows, 1);
        assert_eq!(p.dropped_columns, 1);
        let cells = covered(&p);
        assert!(cells.iter().all(|(r, c)| *r < 10 && *c < 4));
        assert_eq!(cells.len(), 10 * 4);
    }

    #[test]
    fn test_ten_by_four_split_in_two_row_bands() {
        let table = numeric_table(10, 4);
        let p = paginate(&table, GridShape::new(2, 1).unwrap()).unwrap();
        assert_eq!(p.pages.len(), 2);
        assert_eq!(p.pages[0].rows, 0..5);
        assert_eq!(p.pages[1].rows, 5..10);
        assert_eq!(p.pages[0].columns, 0..4);
        assert_eq!(p.pages[1].columns, 0..4);
        assert_eq!(p.pages[0].annotation.as_deref(), Some("Part-1x1: Page-1"));
        assert_eq!(p.pages[1].annotation.as_deref(), Some("Part-2x1: Page-2"));
    }

    #[test]
    fn test_row_major_order_and_labels() {
        let table = numeric_table(4, 6);
        let p = paginate(&table, GridShape::new(2, 3).unwrap()).unwrap();
        let labels: Vec<_> = p.pages.iter().map(|pg| pg.annotation.clone().unwrap()).collect();
        assert_eq!(
            labels,
            vec![
                "Part-1x1: Page-1",
                "Part-1x2: Page-2",
                "Part-1x3: Page-3",
                "Part-2x1: Page-4",
                "Part-2x2: Page-5",
                "Part-2x3: Page-6",
            ]
        );
        assert_eq!(p.pages[4].rows, 2..4);
        assert_eq!(p.pages[4].columns, 2..4);
    }

    #[test]
    fn test_single_page_has_no_annotation() {
        let table = numeric_table(3, 3);
        let p = paginate(&table, GridShape::SINGLE).unwrap();
        assert_eq!(p.pages.len(), 1);
        assert_eq!(p.pages[0].annotation, None);
    }

    #[test]
    fn test_more_bands_than_rows_still_yields_every_page() {
        let table = numeric_table(1, 2);
        let p = paginate(&table, GridShape::new(3, 1).unwrap()).unwrap();
        assert_eq!(p.pages.len(), 3);
        assert_eq!(p.rows_per_page, 0);
        assert_eq!(p.dropped_rows, 1);
        assert!(p.pages.iter().all(|pg| pg.rows.is_empty()));
    }

    #[test]
    fn test_empty_table_is_one_blank_page() {
        let table = Table::new(vec!["a".into()], vec![]).unwrap();
        let p = paginate(&table, GridShape::new(2, 2).unwrap()).unwrap();
        assert_eq!(p.pages.len(), 1);
        let view = p.pages[0].view(&table, &Threshold::default());
        assert!(view.is_blank());
    }

    #[test]
    fn test_invalid_shape() {
        let table = numeric_table(2, 2);
        let err = paginate(&table, GridShape { rows: 0, columns: 1 }).unwrap_err();
        assert_eq!(err, TableError::InvalidGridShape { rows: 0, columns: 1 });
    }

    #[test]
    fn test_view_derives_labels_and_highlights() {
        let table = Table::new(
            vec!["sample".into(), "js_score".into()],
            vec![
                vec!["A".into(), 0.05.into()],
                vec!["B".into(), 0.4.into()],
            ],
        )
        .unwrap();
        let p = paginate(&table, GridShape::SINGLE).unwrap();
        let view = p.pages[0].view(&table, &Threshold::default());
        assert_eq!(view.column_labels, vec!["sample", "js_score"]);
        assert_eq!(view.row_labels, vec!["0", "1"]);
        assert_eq!(view.cells[1][1], DisplayCell { text: "0.4".into(), highlighted: true });
        assert!(!view.cells[0][1].highlighted);
        assert!(!view.cells[1][0].highlighted);
    }

    #[test]
    fn test_shape_parsing() {
        assert_eq!("2x1".parse::<GridShape>().unwrap(), GridShape { rows: 2, columns: 1 });
        assert_eq!(" 3X4 ".parse::<GridShape>().unwrap(), GridShape { rows: 3, columns: 4 });
        assert!("0x1".parse::<GridShape>().is_err());
        assert!("2".parse::<GridShape>().is_err());
        let from_json: GridShape = serde_json::from_str("[2, 3]").unwrap();
        assert_eq!(from_json.to_string(), "2x3");
    }
}
