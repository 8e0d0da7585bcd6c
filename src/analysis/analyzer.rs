// Per-file and per-workspace analysis pipeline:
// extract -> filter -> select -> resolve -> cache -> report

use super::resolver::UsageResolver;
use crate::cache::{AnalysisCache, CacheStats};
use crate::config::{Config, PathPatterns};
use crate::discovery::is_supported_file;
use crate::filter::ExclusionFilter;
use crate::model::{ItemCategory, Symbol, UnusedItem, UsageVerdict};
use crate::parser::{ExtractError, TypeScriptExtractor};
use crate::search::{select_provider, SearchProvider};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, trace, warn};

/// Shared flag checked between files of a workspace run
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    pub fn reset(&self) {
        self.cancelled.store(false, Ordering::SeqCst);
    }
}

/// Analysis result for one file
#[derive(Debug, Clone, Default)]
pub struct FileReport {
    pub path: PathBuf,

    /// Unused symbols, in extraction order
    pub items: Vec<UnusedItem>,

    /// Every verdict computed for the file
    pub verdicts: Vec<UsageVerdict>,

    /// Served from the cache without re-analysis
    pub from_cache: bool,

    /// At least one verdict fell back to local evidence
    pub degraded: bool,

    /// Syntax errors were skipped during extraction
    pub had_errors: bool,

    /// The file could not be parsed at all
    pub failed: bool,
}

impl FileReport {
    fn empty(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            ..Self::default()
        }
    }

    fn from_verdicts(path: &Path, verdicts: Vec<UsageVerdict>) -> Self {
        let items = verdicts
            .iter()
            .filter(|v| !v.is_used)
            .map(UnusedItem::from_verdict)
            .collect();
        let degraded = verdicts.iter().any(UsageVerdict::is_degraded);
        Self {
            path: path.to_path_buf(),
            items,
            verdicts,
            degraded,
            ..Self::default()
        }
    }

    pub fn unused_exports(&self) -> usize {
        self.count(ItemCategory::Export)
    }

    pub fn unused_members(&self) -> usize {
        self.count(ItemCategory::Member)
    }

    fn count(&self, category: ItemCategory) -> usize {
        self.items.iter().filter(|i| i.category == category).count()
    }
}

/// Totals for a workspace run
#[derive(Debug, Clone, Default)]
pub struct AnalysisSummary {
    pub files_analyzed: usize,
    pub cache_hits: usize,
    pub unused_exports: usize,
    pub unused_members: usize,
    pub degraded_files: usize,
    pub failed_files: usize,
    pub cancelled: bool,

    /// Reports of files with at least one unused item
    pub reports: Vec<FileReport>,
}

impl AnalysisSummary {
    pub fn total_unused(&self) -> usize {
        self.unused_exports + self.unused_members
    }

    pub fn items(&self) -> impl Iterator<Item = &UnusedItem> {
        self.reports.iter().flat_map(|r| r.items.iter())
    }

    fn record(&mut self, report: FileReport) {
        self.files_analyzed += 1;
        if report.from_cache {
            self.cache_hits += 1;
        }
        if report.degraded {
            self.degraded_files += 1;
        }
        if report.failed {
            self.failed_files += 1;
        }
        self.unused_exports += report.unused_exports();
        self.unused_members += report.unused_members();
        if !report.items.is_empty() {
            self.reports.push(report);
        }
    }
}

/// Drives extraction, filtering, resolution and caching
pub struct Analyzer {
    root: PathBuf,
    config: Config,
    extractor: TypeScriptExtractor,
    filter: ExclusionFilter,
    resolver: UsageResolver,
    cache: AnalysisCache,
    exclude: PathPatterns,
}

impl Analyzer {
    pub fn new(
        root: &Path,
        config: Config,
        provider: Box<dyn SearchProvider>,
    ) -> Result<Self, ExtractError> {
        let mut resolver = UsageResolver::new(root, provider);
        resolver.set_exclude_patterns(&config.exclude);
        resolver.set_search_excludes(&config.search.exclude_globs);

        Ok(Self {
            root: root.to_path_buf(),
            extractor: TypeScriptExtractor::new()?,
            filter: ExclusionFilter::new(config.exclude_decorators.iter().cloned()),
            cache: AnalysisCache::new(Duration::from_secs(config.cache_max_age_secs)),
            exclude: PathPatterns::new(root, &config.exclude),
            resolver,
            config,
        })
    }

    /// Analyzer using the search provider chosen by the configuration
    pub fn with_default_provider(root: &Path, config: Config) -> Result<Self, ExtractError> {
        let provider = select_provider(&config);
        Self::new(root, config, provider)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn provider_name(&self) -> &'static str {
        self.resolver.provider_name()
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Whether `path` takes part in analysis at all
    pub fn is_analyzable(&self, path: &Path) -> bool {
        is_supported_file(path) && !self.exclude.is_match(path)
    }

    /// Analyse one file's content
    pub fn analyze_source(&mut self, path: &Path, content: &str) -> FileReport {
        if !self.config.enabled || !self.is_analyzable(path) {
            return FileReport::empty(path);
        }

        if !self.cache.has_changed(path, content) {
            if let Some(entry) = self.cache.get(path) {
                trace!("Cache hit for {}", path.display());
                let verdicts = entry.ordered_verdicts().into_iter().cloned().collect();
                let mut report = FileReport::from_verdicts(path, verdicts);
                report.from_cache = true;
                return report;
            }
        }

        let extraction = self.extractor.extract(path, content);
        if extraction.failed {
            return FileReport {
                failed: true,
                ..FileReport::empty(path)
            };
        }

        let symbols = self.select(extraction.symbols.clone(), path);
        let verdicts = self
            .resolver
            .resolve_batch(&symbols, &extraction.local_source());

        let mut report = FileReport::from_verdicts(path, verdicts);
        report.had_errors = extraction.had_errors();

        // Degraded verdicts are retried on the next run instead of being cached
        if !report.degraded {
            self.cache
                .put(path, symbols, report.verdicts.clone(), content);
        }

        debug!(
            "{}: {} symbols analysed, {} unused",
            path.display(),
            report.verdicts.len(),
            report.items.len()
        );
        report
    }

    /// Read and analyse one file; unreadable files yield `None`
    pub fn analyze_file(&mut self, path: &Path) -> Option<FileReport> {
        match std::fs::read_to_string(path) {
            Ok(content) => Some(self.analyze_source(path, &content)),
            Err(e) => {
                warn!("Failed to read {}: {}", path.display(), e);
                None
            }
        }
    }

    /// Analyse files one after another, stopping at a file boundary on cancellation
    pub fn analyze_workspace(
        &mut self,
        files: &[PathBuf],
        token: &CancellationToken,
    ) -> AnalysisSummary {
        self.analyze_workspace_with(files, token, |_| {})
    }

    /// Like [`Analyzer::analyze_workspace`], calling `on_file` after each file
    pub fn analyze_workspace_with<F>(
        &mut self,
        files: &[PathBuf],
        token: &CancellationToken,
        mut on_file: F,
    ) -> AnalysisSummary
    where
        F: FnMut(&Path),
    {
        let mut summary = AnalysisSummary::default();

        for file in files {
            if token.is_cancelled() {
                info!("Analysis cancelled after {} files", summary.files_analyzed);
                summary.cancelled = true;
                break;
            }
            match self.analyze_file(file) {
                Some(report) => summary.record(report),
                None => summary.failed_files += 1,
            }
            on_file(file);
        }

        summary
    }

    /// Drop cached results for `path` and for files whose verdicts relied on it
    pub fn notify_changed(&mut self, path: &Path) -> usize {
        self.cache.invalidate(path);
        let related = self.cache.invalidate_related(path);
        if !related.is_empty() {
            debug!(
                "{} changed, invalidated {} dependent file(s)",
                path.display(),
                related.len()
            );
        }
        related.len()
    }

    /// Apply a new configuration; cached results are discarded
    pub fn reload_config(&mut self, config: Config) {
        if config.search.provider != self.config.search.provider {
            self.resolver.set_provider(select_provider(&config));
        }
        self.filter
            .set_exclusion_markers(config.exclude_decorators.iter().cloned());
        self.exclude = PathPatterns::new(&self.root, &config.exclude);
        self.resolver.set_exclude_patterns(&config.exclude);
        self.resolver
            .set_search_excludes(&config.search.exclude_globs);
        self.cache
            .set_max_age(Duration::from_secs(config.cache_max_age_secs));
        self.cache.clear();
        self.config = config;
        info!("Configuration reloaded");
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    /// Symbols that go to resolution, in extraction order
    fn select(&self, symbols: Vec<Symbol>, path: &Path) -> Vec<Symbol> {
        let members_allowed =
            self.config.analyze_class_members && !self.config.is_member_excluded(path);

        self.filter
            .filter_analyzable(symbols)
            .into_iter()
            .filter(|symbol| {
                if symbol.is_member() {
                    members_allowed && self.config.analyzes_access(symbol.access)
                } else {
                    self.config.include_default_exports || !symbol.is_default_export()
                }
            })
            .collect()
    }
}
