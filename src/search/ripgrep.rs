use super::{SearchError, SearchProvider, SearchQuery};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, trace};

/// ripgrep's exit status when nothing matched
const NO_MATCHES: i32 = 1;

/// Search provider backed by the `rg` executable
#[derive(Debug, Clone)]
pub struct RipgrepProvider {
    binary: PathBuf,
}

impl Default for RipgrepProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl RipgrepProvider {
    pub fn new() -> Self {
        Self::with_binary(PathBuf::from("rg"))
    }

    pub fn with_binary(binary: PathBuf) -> Self {
        Self { binary }
    }

    fn args(query: &SearchQuery) -> Vec<String> {
        let mut args = vec![
            "--files-with-matches".to_string(),
            "--color".to_string(),
            "never".to_string(),
        ];
        if query.multiline {
            args.push("--multiline".to_string());
        }
        if query.literal {
            args.push("--fixed-strings".to_string());
        }
        for glob in &query.include_globs {
            args.push("--glob".to_string());
            args.push(glob.clone());
        }
        for glob in &query.exclude_globs {
            args.push("--glob".to_string());
            args.push(format!("!{}", glob));
        }
        args.push("-e".to_string());
        args.push(query.pattern.clone());
        args.push(".".to_string());
        args
    }
}

/// Turn `rg -l` output into absolute paths under `root`
fn parse_paths(stdout: &str, root: &Path) -> Vec<PathBuf> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| root.join(line.strip_prefix("./").unwrap_or(line)))
        .collect()
}

impl SearchProvider for RipgrepProvider {
    fn search(&self, query: &SearchQuery) -> Result<Vec<PathBuf>, SearchError> {
        trace!("rg {:?} in {}", query.pattern, query.root.display());

        // `output()` drains stdout and stderr before returning
        let output = Command::new(&self.binary)
            .args(Self::args(query))
            .current_dir(&query.root)
            .output()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => SearchError::Unavailable(self.binary.display().to_string()),
                _ => SearchError::Io(e),
            })?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stderr.trim().is_empty() {
            debug!("rg: {}", stderr.trim());
        }

        if !output.status.success() {
            if output.status.code() == Some(NO_MATCHES) {
                return Ok(Vec::new());
            }
            return Err(SearchError::Failed {
                status: output.status.code(),
                stderr: stderr.trim().to_string(),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(parse_paths(&stdout, &query.root))
    }

    fn name(&self) -> &'static str {
        "ripgrep"
    }
}
