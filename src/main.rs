use clap::Parser;
use qcpdf::{
    write_error_log, GridShape, PageSize, PipelineError, ReportConfig, ReportMode, ReportOutcome,
    ReportPipeline,
};
use std::path::PathBuf;
use std::process::ExitCode;

/// Render QC tables as paginated PDF reports and assemble them into one document.
#[derive(Parser, Debug)]
#[command(name = "qcpdf", version, about, long_about = None)]
struct Cli {
    /// Directory containing the input tables (and attachments in single mode)
    #[arg(value_name = "INPUT_DIR")]
    input_dir: PathBuf,

    /// Directory receiving the rendered reports and the assembled document
    #[arg(value_name = "OUTPUT_DIR")]
    output_dir: PathBuf,

    /// JSON configuration file; command-line options take precedence
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Report mode: "single" or "batch"
    #[arg(short, long)]
    mode: Option<ReportMode>,

    /// Page grid as NHxNV, e.g. 2x1 splits the rows over two pages
    #[arg(short, long, value_name = "NHxNV")]
    grid: Option<GridShape>,

    /// Highlight numeric cells at or above this value
    #[arg(short, long)]
    threshold: Option<f64>,

    /// Page size: a4, letter, legal or report (11x8.5in)
    #[arg(long, value_parser = PageSize::parse)]
    page_size: Option<PageSize>,
}

impl Cli {
    fn to_config(&self) -> Result<ReportConfig, PipelineError> {
        let mut config = match &self.config {
            Some(path) => ReportConfig::from_json_file(path)?,
            None => ReportConfig::default(),
        };
        config.input_dir = self.input_dir.clone();
        config.output_dir = self.output_dir.clone();
        if let Some(mode) = self.mode {
            config.mode = mode;
        }
        if let Some(grid) = self.grid {
            config.grid = grid;
        }
        if let Some(threshold) = self.threshold {
            config = config.with_threshold(threshold);
        }
        if let Some(page_size) = self.page_size {
            config.page_size = page_size;
        }
        Ok(config)
    }
}

fn run(config: ReportConfig) -> Result<ReportOutcome, PipelineError> {
    ReportPipeline::new(config).run()
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let (error_log, result) = match cli.to_config() {
        Ok(config) => (config.error_log.clone(), run(config)),
        Err(e) => (ReportConfig::default().error_log, Err(e)),
    };

    match result {
        Ok(outcome) => {
            if let Some(assembled) = outcome.assembled {
                log::info!(
                    "Wrote {} ({} pages)",
                    assembled.path.display(),
                    assembled.page_count
                );
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("{}", e);
            match write_error_log(&cli.output_dir, &error_log, &e) {
                Ok(path) => log::error!("Failure details written to {}", path.display()),
                Err(log_err) => log::error!("Could not write error log: {}", log_err),
            }
            ExitCode::FAILURE
        }
    }
}
