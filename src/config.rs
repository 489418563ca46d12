//! Run configuration, passed explicitly to the pipeline.
use crate::error::PipelineError;
use crate::loader::LoaderOptions;
use qcpdf_pdf_composer::MergeStrategy;
use qcpdf_render_lopdf::RenderOptions;
use qcpdf_table::{CellPalette, GridShape, HighlightRule, PageSize, QcColumns, Threshold, DEFAULT_THRESHOLD};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Which report the pipeline produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReportMode {
    /// One named table, combined with a fixed set of existing PDFs.
    #[default]
    Single,
    /// Every table in the input directory, combined with each other.
    Batch,
}

impl ReportMode {
    pub fn merge_strategy(&self) -> MergeStrategy {
        match self {
            ReportMode::Single => MergeStrategy::PositionalInsert,
            ReportMode::Batch => MergeStrategy::Concatenate,
        }
    }
}

impl fmt::Display for ReportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ReportMode::Single => "single",
            ReportMode::Batch => "batch",
        })
    }
}

impl FromStr for ReportMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "single" => Ok(ReportMode::Single),
            "batch" => Ok(ReportMode::Batch),
            _ => Err(format!("Unknown report mode '{}', expected 'single' or 'batch'", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SingleFileConfig {
    /// Table file inside the input directory.
    pub table_file: String,
    /// Existing PDFs inside the input directory, appended after the rendered table.
    pub attachments: Vec<String>,
    pub output_file: String,
}

impl Default for SingleFileConfig {
    fn default() -> Self {
        Self {
            table_file: "qc_js_univariate.csv".to_string(),
            attachments: [
                "js_1d.pdf",
                "js_1d_control.pdf",
                "js_CD4.pdf",
                "univariate_all.pdf",
                "univariate_control.pdf",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            output_file: "document-output.pdf".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BatchConfig {
    pub score_column: String,
    pub pass_column: String,
    pub output_file: String,
}

impl Default for BatchConfig {
    fn default() -> Self {
        let columns = QcColumns::default();
        Self {
            score_column: columns.score_column,
            pass_column: columns.pass_column,
            output_file: "merged.pdf".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReportConfig {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub mode: ReportMode,
    pub grid: GridShape,
    pub page_size: PageSize,
    pub font_size: f32,
    pub margin: f32,
    pub threshold: f64,
    /// Overrides the mode's palette.
    pub palette: Option<CellPalette>,
    /// Overrides the mode's highlight rule.
    pub highlight: Option<HighlightRule>,
    pub loader: LoaderOptions,
    pub single: SingleFileConfig,
    pub batch: BatchConfig,
    /// File name, inside the output directory, that receives failure reports.
    pub error_log: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        let render = RenderOptions::default();
        Self {
            input_dir: PathBuf::from("."),
            output_dir: PathBuf::from("."),
            mode: ReportMode::default(),
            grid: GridShape::default(),
            page_size: render.page_size,
            font_size: render.font_size,
            margin: render.margin,
            threshold: DEFAULT_THRESHOLD,
            palette: None,
            highlight: None,
            loader: LoaderOptions::default(),
            single: SingleFileConfig::default(),
            batch: BatchConfig::default(),
            error_log: "qcpdf-errors.txt".to_string(),
        }
    }
}

impl ReportConfig {
    pub fn new(input_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
            output_dir: output_dir.into(),
            ..Self::default()
        }
    }

    /// Reads a JSON configuration file; missing fields keep their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, PipelineError> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(PipelineError::MissingInput(path.to_path_buf()));
        }
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn from_json(json: &str) -> Result<Self, PipelineError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_mode(mut self, mode: ReportMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_grid(mut self, grid: GridShape) -> Self {
        self.grid = grid;
        self
    }

    /// Sets the highlight threshold, including that of an explicitly configured rule.
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self.highlight = self.highlight.take().map(|rule| rule.with_threshold(threshold));
        self
    }

    pub fn highlight_rule(&self) -> HighlightRule {
        if let Some(rule) = &self.highlight {
            return rule.clone();
        }
        match self.mode {
            ReportMode::Single => HighlightRule::Threshold(Threshold { threshold: self.threshold }),
            ReportMode::Batch => HighlightRule::QcColumns(QcColumns {
                score_column: self.batch.score_column.clone(),
                pass_column: self.batch.pass_column.clone(),
                threshold: self.threshold,
            }),
        }
    }

    pub fn palette(&self) -> CellPalette {
        self.palette.unwrap_or(match self.mode {
            ReportMode::Single => CellPalette::coral(),
            ReportMode::Batch => CellPalette::light_coral(),
        })
    }

    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            page_size: self.page_size,
            palette: self.palette(),
            font_size: self.font_size,
            margin: self.margin,
        }
    }

    /// Path of the assembled document.
    pub fn assembled_output(&self) -> PathBuf {
        let name = match self.mode {
            ReportMode::Single => &self.single.output_file,
            ReportMode::Batch => &self.batch.output_file,
        };
        self.output_dir.join(name)
    }
}
