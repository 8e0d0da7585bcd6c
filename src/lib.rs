//! unused-exports - Find unused exports and unused class members in TypeScript/JavaScript
//!
//! This library reports module-level exports that no other file imports and
//! private class members that are never accessed.
//!
//! # Architecture
//!
//! The analysis pipeline consists of:
//! 1. **File Discovery** - Find all .ts, .tsx, .js and .jsx files
//! 2. **Extraction** - Parse each file with tree-sitter and collect exports and class members
//! 3. **Exclusion** - Skip symbols carrying framework-managed decorators
//! 4. **Resolution** - Look for usages in the same file, then across the project
//! 5. **Caching** - Remember per-file verdicts keyed by content hash
//! 6. **Reporting** - Output unused items for the terminal or a host tool

pub mod analysis;
pub mod cache;
pub mod config;
pub mod discovery;
pub mod filter;
pub mod model;
pub mod parser;
pub mod report;
pub mod search;
pub mod watch;

pub use analysis::{AnalysisSummary, Analyzer, CancellationToken, FileReport, LocalSource, UsageResolver};
pub use cache::AnalysisCache;
pub use config::Config;
pub use discovery::FileFinder;
pub use filter::{ExclusionFilter, DEFAULT_EXCLUDE_DECORATORS};
pub use model::{AccessLevel, Symbol, SymbolKind, UnusedItem, UsageVerdict};
pub use parser::{Extraction, TypeScriptExtractor};
pub use report::{ReportFormat, Reporter};
pub use search::{select_provider, RipgrepProvider, ScanProvider, SearchProvider, SearchQuery};
