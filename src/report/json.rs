use crate::analysis::AnalysisSummary;
use crate::model::{ItemCategory, UnusedItem};
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use std::path::PathBuf;

/// JSON reporter for editors and other host tools
pub struct JsonReporter {
    output_path: Option<PathBuf>,
    opacity: f32,
}

impl JsonReporter {
    pub fn new(output_path: Option<PathBuf>, opacity: f32) -> Self {
        Self {
            output_path,
            opacity,
        }
    }

    pub fn render(&self, summary: &AnalysisSummary) -> Result<String> {
        let report = JsonReport::from_summary(summary, self.opacity);
        serde_json::to_string_pretty(&report).into_diagnostic()
    }

    pub fn report(&self, summary: &AnalysisSummary) -> Result<()> {
        let json = self.render(summary)?;

        if let Some(path) = &self.output_path {
            std::fs::write(path, &json).into_diagnostic()?;
            eprintln!("Report written to: {}", path.display());
        } else {
            println!("{}", json);
        }

        Ok(())
    }
}

#[derive(Serialize)]
struct JsonReport {
    version: &'static str,
    opacity: f32,
    total_issues: usize,
    items: Vec<JsonItem>,
    summary: JsonSummary,
}

#[derive(Serialize)]
struct JsonItem {
    kind: ItemCategory,
    name: String,
    file: String,
    line: usize,
    /// 1-indexed, in characters
    column: usize,
    end_line: usize,
    end_column: usize,
    detail: String,
}

#[derive(Serialize)]
struct JsonSummary {
    files_analyzed: usize,
    cache_hits: usize,
    unused_exports: usize,
    unused_members: usize,
    degraded_files: usize,
    failed_files: usize,
    cancelled: bool,
}

impl From<&UnusedItem> for JsonItem {
    fn from(item: &UnusedItem) -> Self {
        Self {
            kind: item.category,
            name: item.name.clone(),
            file: item.file.to_string_lossy().to_string(),
            line: item.location.line,
            column: item.location.column,
            end_line: item.location.end_line,
            end_column: item.location.end_column,
            detail: item.detail.clone(),
        }
    }
}

impl JsonReport {
    fn from_summary(summary: &AnalysisSummary, opacity: f32) -> Self {
        let items: Vec<JsonItem> = summary.items().map(JsonItem::from).collect();

        Self {
            version: "1.0",
            opacity,
            total_issues: items.len(),
            items,
            summary: JsonSummary {
                files_analyzed: summary.files_analyzed,
                cache_hits: summary.cache_hits,
                unused_exports: summary.unused_exports,
                unused_members: summary.unused_members,
                degraded_files: summary.degraded_files,
                failed_files: summary.failed_files,
                cancelled: summary.cancelled,
            },
        }
    }
}
