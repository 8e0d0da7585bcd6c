mod terminal;
mod json;

pub use terminal::TerminalReporter;
pub use json::JsonReporter;

use crate::analysis::AnalysisSummary;
use miette::Result;
use std::path::PathBuf;

/// Output format for reports
#[derive(Debug, Clone, Default)]
pub enum ReportFormat {
    #[default]
    Terminal,
    Json,
}

/// Reporter for presenting unused items to the user or a host tool
pub struct Reporter {
    format: ReportFormat,
    output_path: Option<PathBuf>,
    opacity: f32,
}

impl Reporter {
    pub fn new(format: ReportFormat, output_path: Option<PathBuf>, opacity: f32) -> Self {
        Self {
            format,
            output_path,
            opacity,
        }
    }

    /// Report the results of a workspace run
    pub fn report(&self, summary: &AnalysisSummary) -> Result<()> {
        match &self.format {
            ReportFormat::Terminal => {
                let reporter = TerminalReporter::new();
                reporter.report(summary)
            }
            ReportFormat::Json => {
                let reporter = JsonReporter::new(self.output_path.clone(), self.opacity);
                reporter.report(summary)
            }
        }
    }
}
