mod analyzer;
mod resolver;

pub use analyzer::{AnalysisSummary, Analyzer, CancellationToken, FileReport};
pub use resolver::{export_import_pattern, LocalSource, UsageResolver};
