//! Workspace analysis tests
//!
//! End-to-end runs over small projects written to a temporary directory,
//! using the in-process scan provider for project search.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use unused_exports::config::Config;
use unused_exports::model::AccessLevel;
use unused_exports::search::{ScanProvider, SearchError, SearchProvider, SearchQuery};
use unused_exports::{AnalysisSummary, Analyzer, CancellationToken, FileFinder};

const UTIL: &str = r#"export function used() {}
export function unused() {}
export const LOCAL = 1;
console.log(LOCAL);
"#;

const SERVICE: &str = r#"export class Service {
  private cache = new Map<string, number>();
  private stale = 0;
  run() {
    return this.cache.size;
  }
  reset() {}
}
"#;

const MAIN: &str = r#"import { used } from './util';
import { Service } from './service';

used();
new Service().run();
"#;

struct Project {
    _dir: TempDir,
    root: PathBuf,
}

impl Project {
    fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let root = dir.path().canonicalize().unwrap();
        let project = Self { _dir: dir, root };

        project.write("src/util.ts", UTIL);
        project.write("src/service.ts", SERVICE);
        project.write("src/main.ts", MAIN);
        project.write("src/index.ts", "export * from './util';\nexport const barrel = 1;\n");
        project.write("node_modules/pkg/lib.ts", "export const vendored = 1;\n");
        project
    }

    fn write(&self, relative: &str, content: &str) {
        let path = self.root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn path(&self, relative: &str) -> PathBuf {
        self.root.join(relative)
    }

    fn analyzer(&self, config: Config) -> Analyzer {
        Analyzer::new(&self.root, config, Box::new(ScanProvider::new())).unwrap()
    }

    fn files(&self, config: &Config) -> Vec<PathBuf> {
        FileFinder::new(&self.root, config).find_files(&self.root)
    }

    fn run(&self, analyzer: &mut Analyzer) -> AnalysisSummary {
        let files = self.files(analyzer.config());
        analyzer.analyze_workspace(&files, &CancellationToken::new())
    }
}

fn unused_names(summary: &AnalysisSummary) -> HashSet<String> {
    summary.items().map(|i| i.name.clone()).collect()
}

fn names(list: &[&str]) -> HashSet<String> {
    list.iter().map(|s| s.to_string()).collect()
}

struct FailingProvider;

impl SearchProvider for FailingProvider {
    fn search(&self, _query: &SearchQuery) -> Result<Vec<PathBuf>, SearchError> {
        Err(SearchError::Unavailable("offline".to_string()))
    }

    fn name(&self) -> &'static str {
        "failing"
    }
}

// ============================================================================
// Discovery
// ============================================================================

#[test]
fn test_discovery_skips_excluded_files() {
    let project = Project::new();
    let files = project.files(&Config::default());

    assert_eq!(
        files,
        vec![
            project.path("src/main.ts"),
            project.path("src/service.ts"),
            project.path("src/util.ts"),
        ]
    );
}

// ============================================================================
// Verdicts
// ============================================================================

#[test]
fn test_unused_exports_and_private_members() {
    let project = Project::new();
    let mut analyzer = project.analyzer(Config::default());
    let summary = project.run(&mut analyzer);

    assert_eq!(summary.files_analyzed, 3);
    assert_eq!(summary.unused_exports, 1);
    assert_eq!(summary.unused_members, 1);
    assert_eq!(unused_names(&summary), names(&["unused", "stale"]));
    assert_eq!(summary.degraded_files, 0);
    assert!(!summary.cancelled);

    let util = summary
        .reports
        .iter()
        .find(|r| r.path == project.path("src/util.ts"))
        .unwrap();
    assert_eq!(util.items[0].location.line, 2);
}

#[test]
fn test_public_members_searched_across_project() {
    let project = Project::new();
    let config = Config {
        member_access_levels: vec![AccessLevel::Private, AccessLevel::Public],
        ..Config::default()
    };
    let mut analyzer = project.analyzer(config);
    let summary = project.run(&mut analyzer);

    assert_eq!(unused_names(&summary), names(&["unused", "stale", "reset"]));
}

#[test]
fn test_members_disabled() {
    let project = Project::new();
    let config = Config {
        analyze_class_members: false,
        ..Config::default()
    };
    let mut analyzer = project.analyzer(config);
    let summary = project.run(&mut analyzer);

    assert_eq!(summary.unused_members, 0);
    assert_eq!(unused_names(&summary), names(&["unused"]));
}

#[test]
fn test_default_export_found_through_module_path() {
    let project = Project::new();
    project.write("src/widget.tsx", "export default function Widget() {\n  return null;\n}\n");
    project.write("src/orphan.tsx", "export default function Orphan() {\n  return null;\n}\n");
    project.write("src/page.tsx", "import MyWidget from './widget';\n\nMyWidget();\n");

    let config = Config {
        include_default_exports: true,
        ..Config::default()
    };
    let mut analyzer = project.analyzer(config);
    let summary = project.run(&mut analyzer);

    let unused = unused_names(&summary);
    assert!(unused.contains("Orphan"));
    assert!(!unused.contains("Widget"));
}

// ============================================================================
// Caching and invalidation
// ============================================================================

#[test]
fn test_second_run_served_from_cache() {
    let project = Project::new();
    let mut analyzer = project.analyzer(Config::default());

    let first = project.run(&mut analyzer);
    let second = project.run(&mut analyzer);

    assert_eq!(first.cache_hits, 0);
    assert_eq!(second.cache_hits, second.files_analyzed);
    assert_eq!(unused_names(&first), unused_names(&second));
}

#[test]
fn test_edited_file_is_reanalysed() {
    let project = Project::new();
    let mut analyzer = project.analyzer(Config::default());
    project.run(&mut analyzer);

    project.write(
        "src/util.ts",
        "export function used() {}\nexport const LOCAL = 1;\nconsole.log(LOCAL);\n",
    );
    let summary = project.run(&mut analyzer);

    assert_eq!(summary.cache_hits, 2);
    assert_eq!(unused_names(&summary), names(&["stale"]));
}

#[test]
fn test_importer_change_invalidates_dependents() {
    let project = Project::new();
    let mut analyzer = project.analyzer(Config::default());
    project.run(&mut analyzer);

    let main = project.path("src/main.ts");
    project.write("src/main.ts", "console.log('nothing imported');\n");
    let evicted = analyzer.notify_changed(&main);

    // util.ts relied on main.ts for `used`, service.ts for `Service`
    assert_eq!(evicted, 2);

    let summary = project.run(&mut analyzer);
    assert_eq!(summary.cache_hits, 0);
    assert_eq!(
        unused_names(&summary),
        names(&["used", "unused", "Service", "stale"])
    );
}

#[test]
fn test_reload_config_applies_new_excludes() {
    let project = Project::new();
    let mut analyzer = project.analyzer(Config::default());
    project.run(&mut analyzer);

    let mut config = Config::default();
    config.exclude.push("**/util.ts".to_string());
    analyzer.reload_config(config);

    let summary = project.run(&mut analyzer);
    assert_eq!(summary.files_analyzed, 2);
    assert_eq!(unused_names(&summary), names(&["stale"]));
}

#[test]
fn test_degraded_results_are_not_cached() {
    let project = Project::new();
    let mut analyzer =
        Analyzer::new(&project.root, Config::default(), Box::new(FailingProvider)).unwrap();

    let first = project.run(&mut analyzer);
    assert!(first.degraded_files > 0);

    // `LOCAL` keeps its local evidence; unreferenced exports fall back to unused
    let unused = unused_names(&first);
    assert!(unused.contains("unused"));
    assert!(!unused.contains("LOCAL"));

    let second = project.run(&mut analyzer);
    assert!(second.cache_hits < second.files_analyzed);
}

// ============================================================================
// Cancellation
// ============================================================================

#[test]
fn test_cancel_between_files() {
    let project = Project::new();
    let mut analyzer = project.analyzer(Config::default());
    let files = project.files(analyzer.config());
    let token = CancellationToken::new();

    let mut seen: Vec<PathBuf> = Vec::new();
    let summary = analyzer.analyze_workspace_with(&files, &token, |path: &Path| {
        seen.push(path.to_path_buf());
        token.cancel();
    });

    assert!(summary.cancelled);
    assert_eq!(summary.files_analyzed, 1);
    assert_eq!(seen.len(), 1);
}
