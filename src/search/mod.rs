//! Project-wide text search used by the external phase of usage resolution
//!
//! Two providers implement [`SearchProvider`]: [`RipgrepProvider`] shells out
//! to `rg`, and [`ScanProvider`] walks and scans files in-process. Which one
//! is used is decided at start-up by [`select_provider`].

mod ripgrep;
mod scan;

pub use ripgrep::RipgrepProvider;
pub use scan::ScanProvider;

use crate::config::{Config, ProviderChoice};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// File globs searched for references
pub const SOURCE_GLOBS: [&str; 8] = [
    "*.ts", "*.tsx", "*.mts", "*.cts", "*.js", "*.jsx", "*.mjs", "*.cjs",
];

/// Errors that can occur during a project search
#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Search tool not available: {0}")]
    Unavailable(String),

    #[error("Search failed with status {status:?}: {stderr}")]
    Failed { status: Option<i32>, stderr: String },

    #[error("Invalid search pattern: {0}")]
    InvalidPattern(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// One search request: files under `root` containing `pattern`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub pattern: String,

    /// Match `pattern` as a fixed string instead of a regex
    pub literal: bool,

    /// Let matches span lines
    pub multiline: bool,

    pub include_globs: Vec<String>,
    pub exclude_globs: Vec<String>,
    pub root: PathBuf,
}

impl SearchQuery {
    pub fn regex(pattern: impl Into<String>, root: &Path) -> Self {
        Self {
            pattern: pattern.into(),
            literal: false,
            multiline: false,
            include_globs: SOURCE_GLOBS.iter().map(|g| g.to_string()).collect(),
            exclude_globs: Vec::new(),
            root: root.to_path_buf(),
        }
    }

    pub fn literal(pattern: impl Into<String>, root: &Path) -> Self {
        Self {
            literal: true,
            ..Self::regex(pattern, root)
        }
    }

    pub fn multiline(mut self) -> Self {
        self.multiline = true;
        self
    }

    pub fn excluding(mut self, globs: &[String]) -> Self {
        self.exclude_globs.extend(globs.iter().cloned());
        self
    }
}

/// Finds the files that contain a pattern.
///
/// "No matches" is `Ok(vec![])`; `Err` is reserved for real failures,
/// which callers treat as degraded evidence rather than aborting.
pub trait SearchProvider: Send + Sync {
    fn search(&self, query: &SearchQuery) -> Result<Vec<PathBuf>, SearchError>;

    fn name(&self) -> &'static str;
}

/// Pick a provider for the configured choice and what is installed
pub fn select_provider(config: &Config) -> Box<dyn SearchProvider> {
    let ripgrep = which::which("rg").ok();

    match (config.search.provider, ripgrep) {
        (ProviderChoice::Scan, _) => {
            debug!("Using in-process scan provider");
            Box::new(ScanProvider::new())
        }
        (_, Some(path)) => {
            debug!("Using ripgrep at {}", path.display());
            Box::new(RipgrepProvider::with_binary(path))
        }
        (ProviderChoice::Ripgrep, None) => {
            // Kept as requested; every search reports the tool as unavailable
            warn!("ripgrep requested but `rg` was not found on PATH");
            Box::new(RipgrepProvider::new())
        }
        (ProviderChoice::Auto, None) => {
            debug!("ripgrep not found, falling back to in-process scan");
            Box::new(ScanProvider::new())
        }
    }
}
