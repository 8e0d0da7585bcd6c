use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Byte range within a file's text (half-open)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// True when `[start, end)` lies entirely inside this span
    pub fn contains_range(&self, start: usize, end: usize) -> bool {
        start >= self.start && end <= self.end
    }

    pub fn contains(&self, offset: usize) -> bool {
        offset >= self.start && offset < self.end
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Line/column position pair, both 1-indexed; columns count characters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    pub line: usize,
    pub column: usize,
    pub end_line: usize,
    pub end_column: usize,
}

impl Location {
    pub fn new(line: usize, column: usize, end_line: usize, end_column: usize) -> Self {
        Self {
            line,
            column,
            end_line,
            end_column,
        }
    }

    /// Compute a location for a byte span by scanning the text
    pub fn from_span(text: &str, span: Span) -> Self {
        let (line, column) = line_col(text, span.start);
        let (end_line, end_column) = line_col(text, span.end);
        Self::new(line, column, end_line, end_column)
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

fn line_col(text: &str, offset: usize) -> (usize, usize) {
    let offset = offset.min(text.len());
    let before = &text.as_bytes()[..offset];
    let line = before.iter().filter(|&&b| b == b'\n').count() + 1;
    let line_start = before
        .iter()
        .rposition(|&b| b == b'\n')
        .map(|p| p + 1)
        .unwrap_or(0);
    let column = text
        .get(line_start..offset)
        .map_or(offset - line_start, |prefix| prefix.chars().count());
    (line, column + 1)
}

/// Kind of declared symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SymbolKind {
    // Module-level declarations
    Class,
    Function,
    Const,
    Let,
    Var,
    Type,
    Interface,
    Enum,
    Namespace,

    // Class members
    Property,
    Method,
    Getter,
    Setter,
}

impl SymbolKind {
    pub fn is_member(&self) -> bool {
        matches!(
            self,
            SymbolKind::Property | SymbolKind::Method | SymbolKind::Getter | SymbolKind::Setter
        )
    }

    pub fn is_binding(&self) -> bool {
        matches!(self, SymbolKind::Const | SymbolKind::Let | SymbolKind::Var)
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            SymbolKind::Class => "class",
            SymbolKind::Function => "function",
            SymbolKind::Const => "const",
            SymbolKind::Let => "let",
            SymbolKind::Var => "var",
            SymbolKind::Type => "type",
            SymbolKind::Interface => "interface",
            SymbolKind::Enum => "enum",
            SymbolKind::Namespace => "namespace",
            SymbolKind::Property => "property",
            SymbolKind::Method => "method",
            SymbolKind::Getter => "getter",
            SymbolKind::Setter => "setter",
        }
    }

    /// Map the keyword of a variable declaration to its kind
    pub fn from_binding_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "const" => Some(SymbolKind::Const),
            "let" => Some(SymbolKind::Let),
            "var" => Some(SymbolKind::Var),
            _ => None,
        }
    }
}

impl std::fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Access modifier of a class member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessLevel {
    #[default]
    Public,
    Protected,
    Private,
}

impl AccessLevel {
    pub fn from_modifier(modifier: &str) -> Self {
        match modifier.trim() {
            "private" => AccessLevel::Private,
            "protected" => AccessLevel::Protected,
            _ => AccessLevel::Public, // TypeScript default is public
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AccessLevel::Public => "public",
            AccessLevel::Protected => "protected",
            AccessLevel::Private => "private",
        }
    }
}

impl std::fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a symbol was declared
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "origin", rename_all = "lowercase")]
pub enum Origin {
    /// Module-level `export` declaration
    Export { is_default: bool },
    /// Member of a class body
    Member { container: String },
}

/// A declared symbol subject to usage analysis
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Symbol {
    /// Simple name (e.g., "helper", "count", "#secret")
    pub name: String,

    pub kind: SymbolKind,

    /// Export or class member
    pub origin: Origin,

    /// Access level; always public for module-level exports
    pub access: AccessLevel,

    /// File the symbol was extracted from
    pub file: PathBuf,

    /// Declaration range in bytes
    pub span: Span,

    /// Declaration range as line/column
    pub location: Location,

    /// Attached decorator names
    pub markers: Vec<String>,
}

impl Symbol {
    pub fn export(
        name: String,
        kind: SymbolKind,
        is_default: bool,
        file: PathBuf,
        span: Span,
        location: Location,
    ) -> Self {
        Self {
            name,
            kind,
            origin: Origin::Export { is_default },
            access: AccessLevel::Public,
            file,
            span,
            location,
            markers: Vec::new(),
        }
    }

    pub fn member(
        name: String,
        kind: SymbolKind,
        container: String,
        access: AccessLevel,
        file: PathBuf,
        span: Span,
        location: Location,
    ) -> Self {
        Self {
            name,
            kind,
            origin: Origin::Member { container },
            access,
            file,
            span,
            location,
            markers: Vec::new(),
        }
    }

    pub fn with_markers(mut self, markers: Vec<String>) -> Self {
        self.markers = markers;
        self
    }

    pub fn is_export(&self) -> bool {
        matches!(self.origin, Origin::Export { .. })
    }

    pub fn is_member(&self) -> bool {
        matches!(self.origin, Origin::Member { .. })
    }

    pub fn is_default_export(&self) -> bool {
        matches!(self.origin, Origin::Export { is_default: true })
    }

    pub fn container(&self) -> Option<&str> {
        match &self.origin {
            Origin::Member { container } => Some(container),
            Origin::Export { .. } => None,
        }
    }

    pub fn has_markers(&self) -> bool {
        !self.markers.is_empty()
    }

    /// Key used for per-file verdict lookup: `name` for exports,
    /// `Container.name` for members
    pub fn key(&self) -> String {
        match &self.origin {
            Origin::Export { .. } => self.name.clone(),
            Origin::Member { container } => format!("{}.{}", container, self.name),
        }
    }

    /// Human readable description used by reporters
    pub fn detail(&self) -> String {
        match &self.origin {
            Origin::Export { .. } => format!("Unused {}", self.kind),
            Origin::Member { container } => {
                format!("Unused {} {} in {}", self.access, self.kind, container)
            }
        }
    }

    pub fn display(&self) -> String {
        format!(
            "{} {} ({}:{})",
            self.kind.display_name(),
            self.name,
            self.file.display(),
            self.location
        )
    }
}
