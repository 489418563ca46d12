//! Rules deciding which body cells get the "flagged" background.
use crate::value::CellValue;
use serde::{Deserialize, Serialize};

/// Threshold used when nothing else is configured.
pub const DEFAULT_THRESHOLD: f64 = 0.1;

/// Decides whether a body cell is highlighted.
///
/// Receives the raw cell value and the name of the column it belongs to.
pub trait HighlightPredicate {
    fn highlight(&self, column: &str, value: &CellValue) -> bool;
}

impl<F> HighlightPredicate for F
where
    F: Fn(&str, &CellValue) -> bool,
{
    fn highlight(&self, column: &str, value: &CellValue) -> bool {
        self(column, value)
    }
}

/// Flags every numeric value at or above `threshold`. Text never flags.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Threshold {
    pub threshold: f64,
}

impl Default for Threshold {
    fn default() -> Self {
        Self { threshold: DEFAULT_THRESHOLD }
    }
}

impl HighlightPredicate for Threshold {
    fn highlight(&self, _column: &str, value: &CellValue) -> bool {
        // NaN compares false, so missing numbers stay neutral.
        value.as_number().is_some_and(|v| v >= self.threshold)
    }
}

/// Flags numeric values at or above `threshold` in the QC score and pass columns.
/// Text and cells in any other column are never flagged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QcColumns {
    pub score_column: String,
    pub pass_column: String,
    #[serde(default = "default_threshold")]
    pub threshold: f64,
}

fn default_threshold() -> f64 {
    DEFAULT_THRESHOLD
}

impl Default for QcColumns {
    fn default() -> Self {
        Self {
            score_column: "js_score".to_string(),
            pass_column: "qc_pass".to_string(),
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

impl QcColumns {
    fn covers(&self, column: &str) -> bool {
        column == self.score_column || column == self.pass_column
    }
}

impl HighlightPredicate for QcColumns {
    fn highlight(&self, column: &str, value: &CellValue) -> bool {
        self.covers(column) && value.as_number().is_some_and(|v| v >= self.threshold)
    }
}

/// A configurable choice between the built-in rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum HighlightRule {
    Threshold(Threshold),
    QcColumns(QcColumns),
}

impl HighlightRule {
    /// The same rule with its threshold replaced.
    pub fn with_threshold(self, threshold: f64) -> Self {
        match self {
            HighlightRule::Threshold(_) => HighlightRule::Threshold(Threshold { threshold }),
            HighlightRule::QcColumns(rule) => HighlightRule::QcColumns(QcColumns { threshold, ..rule }),
        }
    }
}

impl Default for HighlightRule {
    fn default() -> Self {
        HighlightRule::Threshold(Threshold::default())
    }
}

impl HighlightPredicate for HighlightRule {
    fn highlight(&self, column: &str, value: &CellValue) -> bool {
        match self {
            HighlightRule::Threshold(rule) => rule.highlight(column, value),
            HighlightRule::QcColumns(rule) => rule.highlight(column, value),
        }
    }
}
