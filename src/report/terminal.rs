use crate::analysis::{AnalysisSummary, FileReport};
use crate::model::{ItemCategory, UnusedItem};
use colored::Colorize;
use miette::Result;

/// Terminal reporter with colored output
pub struct TerminalReporter {
    /// Show the detail text under each item
    show_detail: bool,
}

impl TerminalReporter {
    pub fn new() -> Self {
        Self { show_detail: true }
    }

    pub fn report(&self, summary: &AnalysisSummary) -> Result<()> {
        if summary.total_unused() == 0 {
            println!("{}", "No unused exports or members found!".green().bold());
            self.print_notes(summary);
            return Ok(());
        }

        println!();
        println!(
            "{}",
            format!("Found {} unused symbols:", summary.total_unused())
                .yellow()
                .bold()
        );
        println!();

        let mut reports: Vec<&FileReport> = summary.reports.iter().collect();
        reports.sort_by(|a, b| a.path.cmp(&b.path));

        for report in reports {
            println!("{}", report.path.display().to_string().cyan().bold());
            for item in &report.items {
                self.print_item(item);
            }
            println!();
        }

        self.print_summary(summary);
        Ok(())
    }

    fn print_item(&self, item: &UnusedItem) {
        let category = match item.category {
            ItemCategory::Export => "export".yellow().bold(),
            ItemCategory::Member => "member".blue().bold(),
        };

        println!(
            "  {} {} {}",
            item.location.to_string().dimmed(),
            category,
            item.name.white()
        );

        if self.show_detail {
            println!("    {} {}", "→".dimmed(), item.detail.dimmed());
        }
    }

    fn print_summary(&self, summary: &AnalysisSummary) {
        println!("{}", "─".repeat(60).dimmed());

        let mut parts = Vec::new();
        if summary.unused_exports > 0 {
            parts.push(
                format!("{} unused exports", summary.unused_exports)
                    .yellow()
                    .to_string(),
            );
        }
        if summary.unused_members > 0 {
            parts.push(
                format!("{} unused members", summary.unused_members)
                    .blue()
                    .to_string(),
            );
        }
        println!(
            "Summary: {} in {} files analysed",
            parts.join(", "),
            summary.files_analyzed
        );

        self.print_notes(summary);
    }

    fn print_notes(&self, summary: &AnalysisSummary) {
        if summary.degraded_files > 0 {
            println!(
                "{}",
                format!(
                    "⚠ Project search failed for {} files; their results rely on same-file usage only",
                    summary.degraded_files
                )
                .yellow()
            );
        }
        if summary.failed_files > 0 {
            println!(
                "{}",
                format!("⚠ {} files could not be read or parsed", summary.failed_files).yellow()
            );
        }
        if summary.cancelled {
            println!("{}", "Analysis was cancelled; results are partial".yellow());
        }
    }
}

impl Default for TerminalReporter {
    fn default() -> Self {
        Self::new()
    }
}
