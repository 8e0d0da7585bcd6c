use crate::config::{Config, PathPatterns};
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// Type of source file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileType {
    TypeScript,
    Tsx,
    JavaScript,
    Jsx,
}

impl FileType {
    /// Determine file type from path
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?;

        match extension {
            "ts" | "mts" | "cts" => Some(FileType::TypeScript),
            "tsx" => Some(FileType::Tsx),
            "js" | "mjs" | "cjs" => Some(FileType::JavaScript),
            "jsx" => Some(FileType::Jsx),
            _ => None,
        }
    }

    pub fn is_typescript(&self) -> bool {
        matches!(self, FileType::TypeScript | FileType::Tsx)
    }
}

/// True for files the analyzer can extract symbols from
pub fn is_supported_file(path: &Path) -> bool {
    FileType::from_path(path).is_some()
}

/// File finder for discovering source files in a project
pub struct FileFinder {
    exclude: PathPatterns,
}

impl FileFinder {
    pub fn new(root: &Path, config: &Config) -> Self {
        Self {
            exclude: PathPatterns::new(root, &config.exclude),
        }
    }

    /// All supported, non-excluded files under `root`, sorted by path
    pub fn find_files(&self, root: &Path) -> Vec<PathBuf> {
        debug!("Scanning for files in: {}", root.display());

        if !root.exists() {
            trace!("Directory does not exist: {}", root.display());
            return Vec::new();
        }

        let walker = WalkBuilder::new(root)
            .hidden(true)           // Skip hidden files
            .git_ignore(true)       // Respect .gitignore
            .git_global(true)       // Respect global gitignore
            .git_exclude(true)      // Respect .git/info/exclude
            .ignore(true)           // Respect .ignore files
            .parents(true)          // Check parent directories for ignore files
            .follow_links(false)    // Don't follow symlinks
            .build();

        let mut files: Vec<PathBuf> = walker
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
            .filter_map(|entry| {
                let path = entry.path();

                if !is_supported_file(path) {
                    return None;
                }
                if self.exclude.is_match(path) {
                    trace!("Excluding: {}", path.display());
                    return None;
                }

                Some(entry.into_path())
            })
            .collect();

        files.sort();
        debug!("Found {} files", files.len());
        files
    }
}

/// Statistics about discovered files
#[derive(Debug, Default, PartialEq, Eq)]
pub struct FileStats {
    pub typescript_files: usize,
    pub tsx_files: usize,
    pub javascript_files: usize,
    pub jsx_files: usize,
}

impl FileStats {
    pub fn from_files(files: &[PathBuf]) -> Self {
        let mut stats = Self::default();
        for file in files {
            match FileType::from_path(file) {
                Some(FileType::TypeScript) => stats.typescript_files += 1,
                Some(FileType::Tsx) => stats.tsx_files += 1,
                Some(FileType::JavaScript) => stats.javascript_files += 1,
                Some(FileType::Jsx) => stats.jsx_files += 1,
                None => {}
            }
        }
        stats
    }

    pub fn total(&self) -> usize {
        self.typescript_files + self.tsx_files + self.javascript_files + self.jsx_files
    }
}

impl std::fmt::Display for FileStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} TypeScript, {} TSX, {} JavaScript, {} JSX",
            self.typescript_files, self.tsx_files, self.javascript_files, self.jsx_files
        )
    }
}
