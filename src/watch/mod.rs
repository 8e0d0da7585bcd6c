//! Watch mode
//!
//! Re-runs analysis when source files or the configuration change. Bursts of
//! file system events are coalesced by the debouncer into one batch per quiet
//! period, and any relevant event cancels the analysis that is still running.

use crate::analysis::CancellationToken;
use crate::discovery::is_supported_file;
use colored::Colorize;
use notify::RecursiveMode;
use notify_debouncer_mini::{new_debouncer, DebounceEventResult, DebouncedEventKind};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// Watch mode errors
#[derive(Error, Debug)]
pub enum WatchError {
    #[error("Failed to create file watcher: {0}")]
    WatcherError(#[from] notify::Error),
    #[error("Failed to receive events: {0}")]
    RecvError(#[from] std::sync::mpsc::RecvError),
}

/// Directories whose changes never trigger re-analysis
const IGNORED_DIRS: [&str; 4] = ["node_modules", "dist", "build", ".git"];

/// File watcher for continuous analysis
pub struct FileWatcher {
    /// Debounce duration in milliseconds
    debounce_ms: u64,
    /// Configuration file whose changes also trigger a run
    config_path: Option<PathBuf>,
}

impl FileWatcher {
    pub fn new(debounce_ms: u64) -> Self {
        Self {
            debounce_ms,
            config_path: None,
        }
    }

    pub fn with_config_path(mut self, path: Option<PathBuf>) -> Self {
        self.config_path = path;
        self
    }

    /// Start watching `root`.
    ///
    /// `on_change` runs once up front with no paths, then once per debounced
    /// batch with the changed paths. `token` is cancelled as soon as a relevant
    /// event arrives, so a run in progress stops at its next file boundary.
    /// Returning `false` from `on_change` stops watching.
    pub fn watch<F>(
        &self,
        root: &Path,
        token: &CancellationToken,
        mut on_change: F,
    ) -> Result<(), WatchError>
    where
        F: FnMut(&[PathBuf]) -> bool,
    {
        let (tx, rx) = channel();
        let handler_token = token.clone();
        let config_path = self.config_path.clone();

        let mut debouncer = new_debouncer(
            Duration::from_millis(self.debounce_ms),
            move |result: DebounceEventResult| {
                if let Ok(events) = &result {
                    if events
                        .iter()
                        .any(|e| is_relevant(&e.path, config_path.as_deref()))
                    {
                        handler_token.cancel();
                    }
                }
                // The receiver is gone only after watching stopped
                let _ = tx.send(result);
            },
        )?;

        debouncer.watcher().watch(root, RecursiveMode::Recursive)?;

        println!();
        println!("{}", "👁  Watch mode active. Press Ctrl+C to stop.".cyan().bold());
        println!("{}", format!("   Watching: {}", root.display()).dimmed());
        println!();

        if !on_change(&[]) {
            return Ok(());
        }

        loop {
            let first = rx.recv()?;
            let changed = self.collect_changes(first, &rx);
            if changed.is_empty() {
                continue;
            }

            println!();
            println!(
                "{}",
                format!(
                    "🔄 Changes detected in {} file(s), re-analyzing...",
                    changed.len()
                )
                .yellow()
            );
            for path in changed.iter().take(5) {
                if let Some(name) = path.file_name() {
                    println!("   • {}", name.to_string_lossy().dimmed());
                }
            }
            if changed.len() > 5 {
                println!("   • ... and {} more", changed.len() - 5);
            }
            println!();

            if !on_change(&changed) {
                break;
            }
        }

        Ok(())
    }

    /// Relevant paths of `first` plus every batch already queued behind it
    fn collect_changes(
        &self,
        first: DebounceEventResult,
        rx: &Receiver<DebounceEventResult>,
    ) -> Vec<PathBuf> {
        let mut changed: Vec<PathBuf> = Vec::new();
        let mut pending = Some(first);

        while let Some(result) = pending.take() {
            match result {
                Ok(events) => {
                    for event in events {
                        if !matches!(
                            event.kind,
                            DebouncedEventKind::Any | DebouncedEventKind::AnyContinuous
                        ) {
                            continue;
                        }
                        if is_relevant(&event.path, self.config_path.as_deref())
                            && !changed.contains(&event.path)
                        {
                            changed.push(event.path);
                        }
                    }
                }
                Err(e) => warn!("Watch error: {:?}", e),
            }
            pending = rx.try_recv().ok();
        }

        debug!("{} relevant change(s)", changed.len());
        changed
    }
}

/// Whether a change to `path` should trigger re-analysis
fn is_relevant(path: &Path, config_path: Option<&Path>) -> bool {
    if config_path.is_some_and(|c| c == path) {
        return true;
    }
    if !is_supported_file(path) {
        return false;
    }
    !path.components().any(|c| {
        c.as_os_str()
            .to_str()
            .is_some_and(|name| IGNORED_DIRS.contains(&name))
    })
}
