//! Usage resolver integration tests
//!
//! The external phase runs against a recording provider so that the
//! queries handed to project search can be inspected.

use regex::RegexBuilder;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use unused_exports::analysis::{export_import_pattern, LocalSource, UsageResolver};
use unused_exports::model::{AccessLevel, ExternalPhase, Location, Span, Symbol, SymbolKind};
use unused_exports::parser::TypeScriptExtractor;
use unused_exports::search::{SearchError, SearchProvider, SearchQuery};

/// Returns fixed files and remembers every query it receives
#[derive(Clone, Default)]
struct RecordingProvider {
    files: Vec<PathBuf>,
    queries: Arc<Mutex<Vec<SearchQuery>>>,
}

impl RecordingProvider {
    fn returning(files: &[&str]) -> Self {
        Self {
            files: files.iter().map(PathBuf::from).collect(),
            queries: Arc::default(),
        }
    }

    fn queries(&self) -> Vec<SearchQuery> {
        self.queries.lock().unwrap().clone()
    }
}

impl SearchProvider for RecordingProvider {
    fn search(&self, query: &SearchQuery) -> Result<Vec<PathBuf>, SearchError> {
        self.queries.lock().unwrap().push(query.clone());
        Ok(self.files.clone())
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}

fn resolver(provider: &RecordingProvider) -> UsageResolver {
    UsageResolver::new(Path::new("/project"), Box::new(provider.clone()))
}

fn export_symbol(name: &str, file: &str) -> Symbol {
    Symbol::export(
        name.to_string(),
        SymbolKind::Function,
        false,
        PathBuf::from(file),
        Span::new(0, 0),
        Location::new(1, 1, 1, 1),
    )
}

// ============================================================================
// Queries handed to the provider
// ============================================================================

#[test]
fn test_public_member_uses_literal_property_query() {
    let provider = RecordingProvider::returning(&[]);
    let resolver = resolver(&provider);

    let source = "class Api {\n  fetchAll() {}\n}\n";
    let mut extractor = TypeScriptExtractor::new().unwrap();
    let extraction = extractor.extract(Path::new("/project/src/api.ts"), source);
    let member = extraction.members().next().unwrap().clone();
    assert_eq!(member.access, AccessLevel::Public);

    let verdict = resolver.resolve(&member, &extraction.local_source());
    assert!(!verdict.is_used);

    let queries = provider.queries();
    assert_eq!(queries.len(), 1);
    assert_eq!(queries[0].pattern, ".fetchAll");
    assert!(queries[0].literal);
    assert_eq!(queries[0].root, PathBuf::from("/project"));
}

#[test]
fn test_export_uses_multiline_regex_with_search_excludes() {
    let provider = RecordingProvider::returning(&[]);
    let mut resolver = resolver(&provider);
    resolver.set_search_excludes(&["**/dist/**".to_string()]);

    let symbol = export_symbol("formatDate", "/project/src/date.ts");
    resolver.resolve(&symbol, &LocalSource::from_text("export function formatDate() {}\n"));

    let queries = provider.queries();
    assert_eq!(queries.len(), 1);
    assert!(!queries[0].literal);
    assert!(queries[0].multiline);
    assert!(queries[0].pattern.contains("formatDate"));
    assert_eq!(queries[0].exclude_globs, vec!["**/dist/**".to_string()]);
}

#[test]
fn test_protected_member_never_searched() {
    let provider = RecordingProvider::returning(&["/project/src/child.ts"]);
    let resolver = resolver(&provider);

    let source = "class Base {\n  protected hook() {}\n}\n";
    let mut extractor = TypeScriptExtractor::new().unwrap();
    let extraction = extractor.extract(Path::new("/project/src/base.ts"), source);
    let member = extraction.members().next().unwrap().clone();

    let verdict = resolver.resolve(&member, &extraction.local_source());
    assert!(!verdict.is_used);
    assert_eq!(verdict.external, ExternalPhase::NotApplicable);
    assert!(provider.queries().is_empty());
}

// ============================================================================
// Filtering of search hits
// ============================================================================

#[test]
fn test_declaring_file_and_non_source_hits_ignored() {
    let provider = RecordingProvider::returning(&[
        "/project/src/date.ts",
        "/project/README.md",
        "/project/src/types.json",
    ]);
    let resolver = resolver(&provider);

    let symbol = export_symbol("formatDate", "/project/src/date.ts");
    let verdict = resolver.resolve(&symbol, &LocalSource::from_text("export function formatDate() {}\n"));

    assert!(!verdict.is_used);
    assert_eq!(verdict.external, ExternalPhase::Searched { matches: 0 });
}

#[test]
fn test_external_importer_marks_used() {
    let provider = RecordingProvider::returning(&["/project/src/view.tsx"]);
    let resolver = resolver(&provider);

    let symbol = export_symbol("formatDate", "/project/src/date.ts");
    let verdict = resolver.resolve(&symbol, &LocalSource::from_text("export function formatDate() {}\n"));

    assert!(verdict.is_used);
    assert!(verdict.references_file(Path::new("/project/src/view.tsx")));
}

// ============================================================================
// Local phase on plain text
// ============================================================================

#[test]
fn test_plain_text_import_lines_not_evidence() {
    let provider = RecordingProvider::returning(&[]);
    let resolver = resolver(&provider);

    let text = "import { shared } from './shared';\nexport function shared2() {}\n";
    let symbol = export_symbol("shared", "/project/src/x.ts");
    let verdict = resolver.resolve(&symbol, &LocalSource::from_text(text));

    assert!(!verdict.is_used);
    assert_eq!(provider.queries().len(), 1);
}

#[test]
fn test_optional_chaining_counts_as_access() {
    let provider = RecordingProvider::returning(&[]);
    let resolver = resolver(&provider);

    let source = "class Store {\n  private items?: string[];\n  size() {\n    return this?.items?.length;\n  }\n}\n";
    let mut extractor = TypeScriptExtractor::new().unwrap();
    let extraction = extractor.extract(Path::new("/project/src/store.ts"), source);
    let items = extraction
        .members()
        .find(|m| m.name == "items")
        .unwrap()
        .clone();

    let verdict = resolver.resolve(&items, &extraction.local_source());
    assert!(verdict.is_used);
    assert_eq!(verdict.external, ExternalPhase::Skipped);
}

// ============================================================================
// Import pattern
// ============================================================================

#[test]
fn test_import_pattern_multiline_and_boundaries() {
    let symbol = export_symbol("helper", "/project/src/util.ts");
    let re = RegexBuilder::new(&export_import_pattern(&symbol))
        .multi_line(true)
        .build()
        .unwrap();

    assert!(re.is_match("import {\n  other,\n  helper,\n} from './util';"));
    assert!(re.is_match("import type { helper } from './util';"));
    assert!(re.is_match("export { helper as h } from './util';"));
    assert!(!re.is_match("import { helperX } from './util';"));
    assert!(!re.is_match("import { myhelper } from './util';"));
    assert!(!re.is_match("const helper = 1;"));
}
