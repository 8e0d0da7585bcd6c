use crate::filter::DEFAULT_EXCLUDE_DECORATORS;
use crate::model::AccessLevel;
use globset::{Glob, GlobSet, GlobSetBuilder};
use miette::{IntoDiagnostic, Result, WrapErr};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Names searched in the project root when no config file is given
pub const DEFAULT_CONFIG_NAMES: [&str; 6] = [
    ".unused-exports.yml",
    ".unused-exports.yaml",
    ".unused-exports.toml",
    "unused-exports.yml",
    "unused-exports.yaml",
    "unused-exports.toml",
];

const MIN_OPACITY: f32 = 0.1;
const MAX_OPACITY: f32 = 1.0;

/// Configuration for unused export analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Master switch; a disabled analyzer reports nothing
    pub enabled: bool,

    /// Highlight intensity handed to the presentation layer
    pub opacity: f32,

    /// Glob patterns of files never analysed
    pub exclude: Vec<String>,

    /// Report `export default` symbols as well
    pub include_default_exports: bool,

    /// Quiet period before re-analysis in watch mode
    pub debounce_ms: u64,

    /// Reserved for tuning; currently informational
    pub analysis_strategy: AnalysisStrategy,

    /// Report unused class members
    pub analyze_class_members: bool,

    /// Decorators that mark a symbol as framework-managed
    pub exclude_decorators: Vec<String>,

    /// File name patterns (`*` wildcard) skipped by member analysis
    pub exclude_member_patterns: Vec<String>,

    /// Member access levels that are analysed
    pub member_access_levels: Vec<AccessLevel>,

    /// Seconds before a cache entry is considered stale
    pub cache_max_age_secs: u64,

    /// Project-wide search configuration
    pub search: SearchConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisStrategy {
    Fast,
    Accurate,
    #[default]
    Hybrid,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Which search provider to use
    pub provider: ProviderChoice,

    /// Globs excluded from project-wide search
    pub exclude_globs: Vec<String>,
}

/// Search provider selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderChoice {
    /// ripgrep when installed, otherwise the in-process scan
    #[default]
    Auto,
    Ripgrep,
    Scan,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            enabled: true,
            opacity: 0.5,
            exclude: vec![
                "**/node_modules/**".to_string(),
                "**/*.d.ts".to_string(),
                "**/index.ts".to_string(),
                "**/index.tsx".to_string(),
            ],
            include_default_exports: false,
            debounce_ms: 1000,
            analysis_strategy: AnalysisStrategy::default(),
            analyze_class_members: true,
            exclude_decorators: DEFAULT_EXCLUDE_DECORATORS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            exclude_member_patterns: vec![
                "*.entity.ts".to_string(),
                "*.dto.ts".to_string(),
                "*.model.ts".to_string(),
            ],
            member_access_levels: vec![AccessLevel::Private],
            cache_max_age_secs: 300,
            search: SearchConfig::default(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            provider: ProviderChoice::default(),
            exclude_globs: vec![
                "**/node_modules/**".to_string(),
                "**/*.d.ts".to_string(),
                "**/dist/**".to_string(),
                "**/build/**".to_string(),
            ],
        }
    }
}

impl Config {
    /// Load configuration from a file (YAML or TOML)
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .into_diagnostic()
            .wrap_err_with(|| format!("Failed to read config file: {}", path.display()))?;

        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");

        let config: Self = match extension {
            "yml" | "yaml" => serde_yaml::from_str(&contents)
                .into_diagnostic()
                .wrap_err("Failed to parse YAML config")?,
            "toml" => toml::from_str(&contents)
                .into_diagnostic()
                .wrap_err("Failed to parse TOML config")?,
            _ => {
                // Try YAML first, then TOML
                if let Ok(config) = serde_yaml::from_str(&contents) {
                    config
                } else {
                    toml::from_str(&contents)
                        .into_diagnostic()
                        .wrap_err("Failed to parse config file")?
                }
            }
        };

        debug!("Loaded config from {}", path.display());
        Ok(config.normalized())
    }

    /// Try to load configuration from default locations
    pub fn from_default_locations(project_root: &Path) -> Result<Self> {
        match Self::find_default(project_root) {
            Some(path) => Self::from_file(&path),
            None => Ok(Self::default()),
        }
    }

    /// First existing default config file in `project_root`
    pub fn find_default(project_root: &Path) -> Option<PathBuf> {
        DEFAULT_CONFIG_NAMES
            .iter()
            .map(|name| project_root.join(name))
            .find(|path| path.exists())
    }

    /// Clamp out-of-range values
    pub fn normalized(mut self) -> Self {
        if !(MIN_OPACITY..=MAX_OPACITY).contains(&self.opacity) {
            let clamped = if self.opacity.is_nan() {
                Self::default().opacity
            } else {
                self.opacity.clamp(MIN_OPACITY, MAX_OPACITY)
            };
            warn!("opacity {} out of range, using {}", self.opacity, clamped);
            self.opacity = clamped;
        }
        self
    }

    pub fn analyzes_access(&self, access: AccessLevel) -> bool {
        self.member_access_levels.contains(&access)
    }

    /// Whether member analysis skips this file by name
    pub fn is_member_excluded(&self, path: &Path) -> bool {
        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            return false;
        };
        self.exclude_member_patterns
            .iter()
            .any(|pattern| wildcard_match(pattern, file_name))
    }
}

/// Compiled glob patterns matched against root-relative paths
#[derive(Debug, Clone)]
pub struct PathPatterns {
    root: PathBuf,
    set: GlobSet,
}

impl PathPatterns {
    /// Invalid patterns are logged and skipped
    pub fn new(root: &Path, patterns: &[String]) -> Self {
        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            match Glob::new(pattern) {
                Ok(glob) => {
                    builder.add(glob);
                }
                Err(e) => warn!("Ignoring invalid pattern {:?}: {}", pattern, e),
            }
        }
        let set = builder.build().unwrap_or_else(|e| {
            warn!("Failed to compile exclude patterns: {}", e);
            GlobSet::empty()
        });

        Self {
            root: root.to_path_buf(),
            set,
        }
    }

    pub fn empty() -> Self {
        Self {
            root: PathBuf::new(),
            set: GlobSet::empty(),
        }
    }

    pub fn is_match(&self, path: &Path) -> bool {
        if self.set.is_empty() {
            return false;
        }
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        self.set.is_match(relative) || self.set.is_match(path)
    }
}

/// Match `text` against a pattern where `*` matches any run of characters
/// and every other character is literal.
pub fn wildcard_match(pattern: &str, text: &str) -> bool {
    let mut parts = pattern.split('*');
    let first = parts.next().unwrap_or("");
    let Some(mut rest) = text.strip_prefix(first) else {
        return false;
    };

    let middle: Vec<&str> = parts.collect();
    let Some((last, middle)) = middle.split_last() else {
        // No `*` at all
        return rest.is_empty();
    };

    for part in middle {
        match rest.find(part) {
            Some(idx) => rest = &rest[idx + part.len()..],
            None => return false,
        }
    }
    rest.len() >= last.len() && rest.ends_with(last)
}
