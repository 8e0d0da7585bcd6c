use super::{SearchError, SearchProvider, SearchQuery};
use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::WalkBuilder;
use rayon::prelude::*;
use regex::{Regex, RegexBuilder};
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// In-process search: walks the project and scans each candidate file
#[derive(Debug, Clone, Default)]
pub struct ScanProvider;

impl ScanProvider {
    pub fn new() -> Self {
        Self
    }

    fn candidates(query: &SearchQuery) -> Result<Vec<PathBuf>, SearchError> {
        let include = build_globset(&query.include_globs)?;
        let exclude = build_globset(&query.exclude_globs)?;

        let walker = WalkBuilder::new(&query.root)
            .hidden(true)
            .git_ignore(true)
            .git_global(true)
            .git_exclude(true)
            .build();

        let files = walker
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().map(|ft| ft.is_file()).unwrap_or(false))
            .map(|entry| entry.into_path())
            .filter(|path| {
                let relative = path.strip_prefix(&query.root).unwrap_or(path);
                (include.is_empty() || include.is_match(relative)) && !exclude.is_match(relative)
            })
            .collect();
        Ok(files)
    }
}

enum Matcher<'a> {
    Literal(&'a str),
    Pattern(Regex),
}

impl Matcher<'_> {
    fn is_match(&self, text: &str) -> bool {
        match self {
            Matcher::Literal(needle) => text.contains(needle),
            Matcher::Pattern(re) => re.is_match(text),
        }
    }
}

fn build_globset(globs: &[String]) -> Result<GlobSet, SearchError> {
    let mut builder = GlobSetBuilder::new();
    for glob in globs {
        let glob = Glob::new(glob).map_err(|e| SearchError::InvalidPattern(e.to_string()))?;
        builder.add(glob);
    }
    builder
        .build()
        .map_err(|e| SearchError::InvalidPattern(e.to_string()))
}

fn file_matches(path: &Path, matcher: &Matcher) -> bool {
    match std::fs::read_to_string(path) {
        Ok(content) => matcher.is_match(&content),
        Err(e) => {
            // Unreadable files are skipped, never fatal
            debug!("Skipping {}: {}", path.display(), e);
            false
        }
    }
}

impl SearchProvider for ScanProvider {
    fn search(&self, query: &SearchQuery) -> Result<Vec<PathBuf>, SearchError> {
        let matcher = if query.literal {
            Matcher::Literal(&query.pattern)
        } else {
            // Whole files are matched at once, so patterns may always cross lines
            let re = RegexBuilder::new(&query.pattern)
                .multi_line(true)
                .build()
                .map_err(|e| SearchError::InvalidPattern(e.to_string()))?;
            Matcher::Pattern(re)
        };

        let candidates = Self::candidates(query)?;
        trace!(
            "scan {:?}: {} candidate files under {}",
            query.pattern,
            candidates.len(),
            query.root.display()
        );

        let mut matches: Vec<PathBuf> = candidates
            .into_par_iter()
            .filter(|path| file_matches(path, &matcher))
            .collect();
        matches.sort();
        Ok(matches)
    }

    fn name(&self) -> &'static str {
        "scan"
    }
}
