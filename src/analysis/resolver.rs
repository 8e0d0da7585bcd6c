//! Usage resolution: decides whether a symbol is referenced.
//!
//! Resolution runs in two phases. The local phase scans the declaring file's
//! text and always runs. The external phase asks a [`SearchProvider`] for
//! other files that import or access the symbol, and only runs when the local
//! phase found nothing and the symbol's visibility allows outside references.

use crate::config::PathPatterns;
use crate::discovery::is_supported_file;
use crate::model::{
    AccessLevel, ExternalPhase, Location, Reference, ReferenceForm, Span, Symbol, UsageVerdict,
};
use crate::parser::Extraction;
use crate::search::{SearchError, SearchProvider, SearchQuery};
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use tracing::{debug, trace, warn};

/// Text of the declaring file as seen by the local phase
#[derive(Debug, Clone)]
pub struct LocalSource<'a> {
    code: &'a str,
    import_spans: Cow<'a, [Span]>,
}

impl<'a> LocalSource<'a> {
    /// Plain text; lines starting with `import` are treated as import statements
    pub fn from_text(text: &'a str) -> Self {
        let mut spans = Vec::new();
        let mut offset = 0;
        for line in text.split_inclusive('\n') {
            if is_import_line(line) {
                spans.push(Span::new(offset, offset + line.len()));
            }
            offset += line.len();
        }
        Self {
            code: text,
            import_spans: Cow::Owned(spans),
        }
    }

    /// Literal-masked code and exact import statement ranges from the extractor
    pub fn from_extraction(extraction: &'a Extraction) -> Self {
        Self {
            code: extraction.code(),
            import_spans: Cow::Borrowed(extraction.import_spans()),
        }
    }

    pub fn code(&self) -> &str {
        self.code
    }

    fn in_import(&self, start: usize, end: usize) -> bool {
        self.import_spans
            .iter()
            .any(|span| span.contains_range(start, end))
    }
}

impl Extraction {
    pub fn local_source(&self) -> LocalSource<'_> {
        LocalSource::from_extraction(self)
    }
}

fn is_import_line(line: &str) -> bool {
    line.trim_start()
        .strip_prefix("import")
        .and_then(|rest| rest.chars().next())
        .map_or(false, |c| c.is_whitespace() || c == '{' || c == '*')
}

pub(crate) fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '$'
}

fn char_before(text: &str, offset: usize) -> Option<char> {
    text.get(..offset).and_then(|s| s.chars().next_back())
}

fn char_at(text: &str, offset: usize) -> Option<char> {
    text.get(offset..).and_then(|s| s.chars().next())
}

/// Resolves symbols to used/unused verdicts
pub struct UsageResolver {
    root: PathBuf,
    provider: Box<dyn SearchProvider>,
    exclude: PathPatterns,
    search_excludes: Vec<String>,
}

impl UsageResolver {
    pub fn new(root: &Path, provider: Box<dyn SearchProvider>) -> Self {
        Self {
            root: root.to_path_buf(),
            provider,
            exclude: PathPatterns::empty(),
            search_excludes: Vec::new(),
        }
    }

    /// Files matching these patterns never count as external references
    pub fn set_exclude_patterns(&mut self, patterns: &[String]) {
        self.exclude = PathPatterns::new(&self.root, patterns);
    }

    /// Globs handed to the search provider as excludes
    pub fn set_search_excludes(&mut self, globs: &[String]) {
        self.search_excludes = globs.to_vec();
    }

    pub fn set_provider(&mut self, provider: Box<dyn SearchProvider>) {
        self.provider = provider;
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve one symbol against the text of its declaring file
    pub fn resolve(&self, symbol: &Symbol, source: &LocalSource) -> UsageVerdict {
        let local = if symbol.is_member() {
            local_member_references(symbol, source)
        } else {
            local_export_references(symbol, source)
        };

        if !local.is_empty() {
            trace!("{}: {} local reference(s)", symbol.key(), local.len());
            return UsageVerdict::local(symbol.clone(), local, ExternalPhase::Skipped);
        }

        let Some(query) = self.external_query(symbol) else {
            return UsageVerdict::local(symbol.clone(), local, ExternalPhase::NotApplicable);
        };

        match self.search_external(symbol, &query) {
            Ok(files) => {
                trace!("{}: {} external reference(s)", symbol.key(), files.len());
                UsageVerdict::external(symbol.clone(), files)
            }
            Err(e) => {
                warn!(
                    "Project search for {} failed ({}), using local evidence only: {}",
                    symbol.key(),
                    self.provider.name(),
                    e
                );
                UsageVerdict::local(symbol.clone(), local, ExternalPhase::Degraded)
            }
        }
    }

    /// Resolve symbols one after another, in input order
    pub fn resolve_batch(&self, symbols: &[Symbol], source: &LocalSource) -> Vec<UsageVerdict> {
        symbols.iter().map(|s| self.resolve(s, source)).collect()
    }

    fn external_query(&self, symbol: &Symbol) -> Option<SearchQuery> {
        let query = match symbol.access {
            // Only the declaring class can reference these
            AccessLevel::Private => return None,
            // Subclasses in other files are not searched; protected members are
            // resolved like private ones, which can report members only used by
            // subclasses as unused.
            AccessLevel::Protected if symbol.is_member() => return None,
            _ if symbol.is_member() => {
                SearchQuery::literal(format!(".{}", symbol.name), &self.root)
            }
            _ => SearchQuery::regex(export_import_pattern(symbol), &self.root).multiline(),
        };
        Some(query.excluding(&self.search_excludes))
    }

    fn search_external(
        &self,
        symbol: &Symbol,
        query: &SearchQuery,
    ) -> Result<Vec<PathBuf>, SearchError> {
        let files = self.provider.search(query)?;
        let total = files.len();

        let kept: Vec<PathBuf> = files
            .into_iter()
            .filter(|file| file != &symbol.file)
            .filter(|file| is_supported_file(file))
            .filter(|file| !self.exclude.is_match(file))
            .collect();

        if kept.len() != total {
            debug!(
                "{}: {} of {} search hits kept after filtering",
                symbol.key(),
                kept.len(),
                total
            );
        }
        Ok(kept)
    }
}

/// Word-boundary occurrences outside the declaration header and import statements
fn local_export_references(symbol: &Symbol, source: &LocalSource) -> Vec<Reference> {
    // An anonymous default export has no name to reference
    if symbol.is_default_export() && symbol.name == "default" {
        return Vec::new();
    }

    let code = source.code;
    let name = symbol.name.as_str();

    code.match_indices(name)
        .map(|(start, _)| (start, start + name.len()))
        .filter(|&(start, end)| {
            !char_before(code, start).is_some_and(is_ident_char)
                && !char_at(code, end).is_some_and(is_ident_char)
        })
        .filter(|&(start, end)| !symbol.span.contains_range(start, end))
        .filter(|&(start, end)| !source.in_import(start, end))
        .map(|(start, end)| local_reference(code, start, end, ReferenceForm::Access))
        .collect()
}

/// `receiver.name` / `receiver?.name` occurrences outside the member itself
fn local_member_references(symbol: &Symbol, source: &LocalSource) -> Vec<Reference> {
    let code = source.code;
    let name = symbol.name.as_str();
    let mut references = Vec::new();
    let mut last_start = None;

    for (start, _) in code.match_indices(name) {
        let end = start + name.len();
        if char_at(code, end).is_some_and(is_ident_char) {
            continue;
        }
        if symbol.span.contains_range(start, end) || last_start == Some(start) {
            continue;
        }

        let before = code[..start].trim_end();
        let Some(before) = before.strip_suffix('.') else {
            continue;
        };
        let receiver = before.strip_suffix('?').unwrap_or(before).trim_end();
        // Spread (`...name`) and numeric literals are not property access
        let has_receiver = receiver
            .chars()
            .next_back()
            .is_some_and(|c| is_ident_char(c) || c == ')' || c == ']');
        if !has_receiver {
            continue;
        }

        let after = code[end..].trim_start();
        let form = if after.starts_with('(') {
            ReferenceForm::Call
        } else if after.starts_with('=') && !after.starts_with("==") && !after.starts_with("=>") {
            ReferenceForm::Assignment
        } else {
            ReferenceForm::Access
        };

        last_start = Some(start);
        references.push(local_reference(code, start, end, form));
    }

    references
}

fn local_reference(code: &str, start: usize, end: usize, form: ReferenceForm) -> Reference {
    let span = Span::new(start, end);
    Reference::Local {
        span,
        location: Location::from_span(code, span),
        form,
    }
}

/// Regex matching a file that imports or re-exports the symbol
pub fn export_import_pattern(symbol: &Symbol) -> String {
    let mut alternatives = Vec::new();

    if !(symbol.is_default_export() && symbol.name == "default") {
        let name = regex::escape(&symbol.name);
        // `{ a, name as b }` with `name` as a whole identifier inside the braces
        let braced = format!(r"\{{(?:[^}}]*[^\w$])?{}(?:[^\w$}}][^}}]*)?\}}", name);
        alternatives.push(format!(r"import\s+(?:type\s+)?(?:[\w$]+\s*,\s*)?{}", braced));
        alternatives.push(format!(r"import\s+(?:type\s+)?{}\s*(?:,|from\b)", name));
        alternatives.push(format!(r"export\s+(?:type\s+)?{}\s*from\b", braced));
    }

    if symbol.is_default_export() {
        if let Some(stem) = symbol.file.file_stem().and_then(|s| s.to_str()) {
            // Default imports may rename the symbol; match on the module path instead
            alternatives.push(format!(
                r#"import\s+(?:type\s+)?[\w$]+\s*(?:,\s*\{{[^}}]*\}}\s*)?from\s*['"](?:[^'"]*/)?{}(?:\.[cm]?[jt]sx?)?['"]"#,
                regex::escape(stem)
            ));
        }
    }

    alternatives.join("|")
}
