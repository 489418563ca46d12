//! Runs report jobs: render each table, then assemble the combined document.
use crate::config::{ReportConfig, ReportMode};
use crate::error::PipelineError;
use crate::loader::{find_tables, load_csv};
use qcpdf_pdf_composer::{AssembledDocument, DocumentAssembler, SourceDocument};
use qcpdf_render_lopdf::{RenderSummary, TableLayoutEngine};
use qcpdf_table::HighlightRule;
use std::path::{Path, PathBuf};

/// One rendered table report.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedReport {
    pub source: PathBuf,
    pub output: PathBuf,
    pub summary: RenderSummary,
}

/// Everything a pipeline run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportOutcome {
    pub reports: Vec<RenderedReport>,
    /// `None` when there was nothing to assemble.
    pub assembled: Option<AssembledDocument>,
}

pub struct ReportPipeline {
    config: ReportConfig,
    engine: TableLayoutEngine,
    highlight: HighlightRule,
    assembler: DocumentAssembler,
}

impl ReportPipeline {
    pub fn new(config: ReportConfig) -> Self {
        let engine = TableLayoutEngine::new(config.render_options());
        let highlight = config.highlight_rule();
        let assembler = DocumentAssembler::new(config.mode.merge_strategy());
        Self { config, engine, highlight, assembler }
    }

    pub fn config(&self) -> &ReportConfig {
        &self.config
    }

    pub fn run(&self) -> Result<ReportOutcome, PipelineError> {
        self.config.grid.validate()?;
        std::fs::create_dir_all(&self.config.output_dir)?;
        log::info!(
            "Starting {} report: {} -> {}",
            self.config.mode,
            self.config.input_dir.display(),
            self.config.output_dir.display()
        );

        let outcome = match self.config.mode {
            ReportMode::Single => self.run_single()?,
            ReportMode::Batch => self.run_batch()?,
        };

        log::info!("Finished: {} table report(s)", outcome.reports.len());
        Ok(outcome)
    }

    /// Renders one table to `<output_dir>/<stem>.pdf`.
    pub fn render_table(&self, source: &Path) -> Result<RenderedReport, PipelineError> {
        log::info!("Rendering {}", source.display());
        let table = load_csv(source, &self.config.loader)?;
        let output = self.report_path(source);
        let summary = self
            .engine
            .render(&table, &output, self.config.grid, &self.highlight)?;
        Ok(RenderedReport {
            source: source.to_path_buf(),
            output,
            summary,
        })
    }

    fn report_path(&self, source: &Path) -> PathBuf {
        let stem = source
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "table".to_string());
        self.config.output_dir.join(format!("{}.pdf", stem))
    }

    fn run_single(&self) -> Result<ReportOutcome, PipelineError> {
        let single = &self.config.single;
        let report = self.render_table(&self.config.input_dir.join(&single.table_file))?;

        let mut documents = vec![SourceDocument::first_page(&report.output)];
        documents.extend(
            single
                .attachments
                .iter()
                .map(|name| SourceDocument::first_page(self.config.input_dir.join(name))),
        );
        let assembled = self
            .assembler
            .assemble(&documents, self.config.assembled_output())?;

        Ok(ReportOutcome {
            reports: vec![report],
            assembled: Some(assembled),
        })
    }

    fn run_batch(&self) -> Result<ReportOutcome, PipelineError> {
        let tables = find_tables(&self.config.input_dir)?;
        let reports = tables
            .iter()
            .map(|path| self.render_table(path))
            .collect::<Result<Vec<_>, _>>()?;

        if reports.is_empty() {
            log::warn!(
                "No tables found in {}; nothing to assemble.",
                self.config.input_dir.display()
            );
            return Ok(ReportOutcome { reports, assembled: None });
        }

        let documents: Vec<_> = reports
            .iter()
            .map(|report| SourceDocument::first_page(&report.output))
            .collect();
        let assembled = self
            .assembler
            .assemble(&documents, self.config.assembled_output())?;

        Ok(ReportOutcome {
            reports,
            assembled: Some(assembled),
        })
    }
}
