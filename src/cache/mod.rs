//! In-memory analysis cache
//!
//! Stores, per file, the symbols and verdicts of the last analysis keyed by a
//! content fingerprint, so unchanged files are not re-extracted or re-searched.

use crate::model::{Symbol, UsageVerdict};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::trace;

/// Default lifetime of a cache entry
pub const DEFAULT_MAX_AGE: Duration = Duration::from_secs(300);

/// Stable content hash (SHA-256, hex)
pub fn fingerprint(content: &str) -> String {
    let digest = Sha256::digest(content.as_bytes());
    digest.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Cached data for a single file; replaced wholesale, never patched
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub file_path: PathBuf,

    /// Symbols analysed in this file, in extraction order
    pub symbols: Vec<Symbol>,

    /// Verdicts in extraction order; several symbols may share a key
    /// (accessor pairs, overloads, declaration merging)
    pub verdicts: Vec<UsageVerdict>,

    pub fingerprint: String,
    pub created_at: Instant,
}

impl CacheEntry {
    /// Verdicts in symbol order
    pub fn ordered_verdicts(&self) -> Vec<&UsageVerdict> {
        self.verdicts.iter().collect()
    }

    /// True when any verdict lists `file` as an external reference
    pub fn depends_on(&self, file: &Path) -> bool {
        self.verdicts.iter().any(|v| v.references_file(file))
    }
}

/// Per-file cache of extraction and resolution results
#[derive(Debug)]
pub struct AnalysisCache {
    entries: HashMap<PathBuf, CacheEntry>,
    max_age: Duration,
}

impl Default for AnalysisCache {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_AGE)
    }
}

impl AnalysisCache {
    pub fn new(max_age: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            max_age,
        }
    }

    pub fn set_max_age(&mut self, max_age: Duration) {
        self.max_age = max_age;
    }

    /// Entry for `path`, evicting it first when older than the max age
    pub fn get(&mut self, path: &Path) -> Option<&CacheEntry> {
        self.get_at(path, Instant::now())
    }

    pub(crate) fn get_at(&mut self, path: &Path, now: Instant) -> Option<&CacheEntry> {
        let expired = self
            .entries
            .get(path)
            .map(|entry| now.saturating_duration_since(entry.created_at) > self.max_age)?;

        if expired {
            trace!("Cache entry for {} expired", path.display());
            self.entries.remove(path);
            return None;
        }
        self.entries.get(path)
    }

    /// Store the results for `path`, replacing any previous entry
    pub fn put(
        &mut self,
        path: &Path,
        symbols: Vec<Symbol>,
        verdicts: Vec<UsageVerdict>,
        content: &str,
    ) {
        let entry = CacheEntry {
            file_path: path.to_path_buf(),
            symbols,
            verdicts,
            fingerprint: fingerprint(content),
            created_at: Instant::now(),
        };
        self.entries.insert(path.to_path_buf(), entry);
    }

    /// False only when `content` is identical to what produced the entry
    pub fn has_changed(&self, path: &Path, content: &str) -> bool {
        match self.entries.get(path) {
            Some(entry) => entry.fingerprint != fingerprint(content),
            None => true,
        }
    }

    pub fn invalidate(&mut self, path: &Path) {
        if self.entries.remove(path).is_some() {
            trace!("Invalidated cache entry for {}", path.display());
        }
    }

    /// Evict every entry whose verdicts were justified by `changed`.
    /// Returns the evicted paths.
    pub fn invalidate_related(&mut self, changed: &Path) -> Vec<PathBuf> {
        let related: Vec<PathBuf> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.depends_on(changed))
            .map(|(path, _)| path.clone())
            .collect();

        for path in &related {
            self.entries.remove(path);
            trace!(
                "Invalidated {} (referenced from {})",
                path.display(),
                changed.display()
            );
        }
        related
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            total_files: self.entries.len(),
            total_symbols: self.entries.values().map(|e| e.symbols.len()).sum(),
            total_verdicts: self.entries.values().map(|e| e.verdicts.len()).sum(),
        }
    }
}

/// Cache statistics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheStats {
    pub total_files: usize,
    pub total_symbols: usize,
    pub total_verdicts: usize,
}

impl std::fmt::Display for CacheStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} files, {} symbols, {} verdicts cached",
            self.total_files, self.total_symbols, self.total_verdicts
        )
    }
}
