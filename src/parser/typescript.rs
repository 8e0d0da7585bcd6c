use super::common::{
    decorator_name, decorator_names, keyword_token, node_location, node_span, node_text,
    pattern_bindings, range_location,
};
use crate::model::{AccessLevel, Span, Symbol, SymbolKind};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, trace, warn};
use tree_sitter::{Language, Node, Parser as TsParser};

/// Container name used for class expressions without a name
pub const ANONYMOUS_CLASS: &str = "AnonymousClass";

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Failed to load {dialect:?} grammar: {source}")]
    Grammar {
        dialect: Dialect,
        #[source]
        source: tree_sitter::LanguageError,
    },
}

/// Grammar variant used for a file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    TypeScript,
    /// TSX grammar, also used for plain JavaScript and JSX
    Tsx,
}

impl Dialect {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("ts") | Some("mts") | Some("cts") => Dialect::TypeScript,
            _ => Dialect::Tsx,
        }
    }

    fn language(&self) -> Language {
        match self {
            Dialect::TypeScript => tree_sitter_typescript::language_typescript(),
            Dialect::Tsx => tree_sitter_typescript::language_tsx(),
        }
    }
}

/// Result of extracting one file
#[derive(Debug, Clone)]
pub struct Extraction {
    pub path: PathBuf,

    /// Exports and class members in source order
    pub symbols: Vec<Symbol>,

    /// Number of syntax error nodes skipped during extraction
    pub error_nodes: usize,

    /// The parser produced no tree at all
    pub failed: bool,

    /// Source text with comments and literal text blanked out
    code: String,

    /// Byte ranges of import statements
    import_spans: Vec<Span>,
}

impl Extraction {
    fn failure(path: &Path, source: &str) -> Self {
        Self {
            path: path.to_path_buf(),
            symbols: Vec::new(),
            error_nodes: 0,
            failed: true,
            code: source.to_string(),
            import_spans: Vec::new(),
        }
    }

    pub fn had_errors(&self) -> bool {
        self.failed || self.error_nodes > 0
    }

    /// Code view used for usage search; same byte length and line breaks as the input
    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn import_spans(&self) -> &[Span] {
        &self.import_spans
    }

    pub fn exports(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.iter().filter(|s| s.is_export())
    }

    pub fn members(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.iter().filter(|s| s.is_member())
    }
}

/// Symbol extractor for TypeScript and JavaScript sources using tree-sitter
pub struct TypeScriptExtractor {
    typescript: TsParser,
    tsx: TsParser,
}

impl TypeScriptExtractor {
    pub fn new() -> Result<Self, ExtractError> {
        Ok(Self {
            typescript: Self::parser_for(Dialect::TypeScript)?,
            tsx: Self::parser_for(Dialect::Tsx)?,
        })
    }

    fn parser_for(dialect: Dialect) -> Result<TsParser, ExtractError> {
        let mut parser = TsParser::new();
        parser
            .set_language(&dialect.language())
            .map_err(|source| ExtractError::Grammar { dialect, source })?;
        Ok(parser)
    }

    /// Extract exported symbols and class members from one file.
    ///
    /// Never fails: unparseable input yields an empty extraction with
    /// `failed` set, and syntax errors are skipped and counted.
    pub fn extract(&mut self, path: &Path, source: &str) -> Extraction {
        let parser = match Dialect::from_path(path) {
            Dialect::TypeScript => &mut self.typescript,
            Dialect::Tsx => &mut self.tsx,
        };

        // Nothing from a previous file may influence this parse
        parser.reset();

        let Some(tree) = parser.parse(source, None) else {
            warn!("Failed to parse {}", path.display());
            return Extraction::failure(path, source);
        };

        let mut walk = Walk::new(path, source);
        walk.visit(tree.root_node());

        if walk.error_nodes > 0 {
            debug!(
                "{}: skipped {} syntax error node(s)",
                path.display(),
                walk.error_nodes
            );
        }
        trace!("{}: extracted {} symbols", path.display(), walk.symbols.len());

        walk.finish()
    }
}

/// Per-call extraction state; dropped when the call returns
struct Walk<'s> {
    path: &'s Path,
    source: &'s str,
    symbols: Vec<Symbol>,
    seen: HashSet<(String, Span)>,
    masked: Vec<Span>,
    import_spans: Vec<Span>,
    error_nodes: usize,
}

impl<'s> Walk<'s> {
    fn new(path: &'s Path, source: &'s str) -> Self {
        Self {
            path,
            source,
            symbols: Vec::new(),
            seen: HashSet::new(),
            masked: Vec::new(),
            import_spans: Vec::new(),
            error_nodes: 0,
        }
    }

    fn finish(self) -> Extraction {
        let code = mask_text(self.source, &self.masked);
        Extraction {
            path: self.path.to_path_buf(),
            symbols: self.symbols,
            error_nodes: self.error_nodes,
            failed: false,
            code,
            import_spans: self.import_spans,
        }
    }

    fn visit(&mut self, node: Node) {
        if node.is_error() {
            self.error_nodes += 1;
            return;
        }
        if node.is_missing() {
            self.error_nodes += 1;
        }

        match node.kind() {
            "comment" | "string" | "regex" => {
                self.masked.push(node_span(node));
                return;
            }
            "template_string" => {
                self.mask_template(node);
                return;
            }
            "import_statement" => self.import_spans.push(node_span(node)),
            // Exports inside namespace or ambient module bodies are reached through the namespace
            "export_statement" if is_module_level(node) => self.extract_export(node),
            "class_declaration" | "abstract_class_declaration" | "class" => {
                self.extract_class_members(node)
            }
            _ => {}
        }

        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            self.visit(child);
        }
    }

    /// Blank the literal parts of a template string but keep `${...}` code visible
    fn mask_template(&mut self, node: Node) {
        let mut start = node.start_byte();
        let mut cursor = node.walk();
        let substitutions: Vec<Node> = node
            .named_children(&mut cursor)
            .filter(|c| c.kind() == "template_substitution")
            .collect();

        for sub in substitutions {
            self.masked.push(Span::new(start, sub.start_byte()));
            self.visit_substitution(sub);
            start = sub.end_byte();
        }
        self.masked.push(Span::new(start, node.end_byte()));
    }

    fn visit_substitution(&mut self, sub: Node) {
        let mut cursor = sub.walk();
        for child in sub.named_children(&mut cursor) {
            self.visit(child);
        }
    }

    // ---------------------------------------------------------------------
    // Exports
    // ---------------------------------------------------------------------

    fn extract_export(&mut self, stmt: Node) {
        let is_default = keyword_token(stmt, "default").is_some();
        let markers = decorator_names(stmt, self.source);

        if let Some(decl) = stmt.child_by_field_name("declaration") {
            self.export_declaration(stmt, decl, is_default, &markers);
        } else if is_default {
            if let Some(value) = stmt.child_by_field_name("value") {
                self.export_default_value(stmt, value, &markers);
            }
        }
        // `export { a }` / `export * from` re-export existing names and declare nothing
    }

    fn export_declaration(&mut self, stmt: Node, decl: Node, is_default: bool, markers: &[String]) {
        match decl.kind() {
            "class_declaration" | "abstract_class_declaration" => {
                let mut all_markers = markers.to_vec();
                all_markers.extend(decorator_names(decl, self.source));
                self.push_export(
                    stmt,
                    decl.child_by_field_name("name"),
                    SymbolKind::Class,
                    is_default,
                    all_markers,
                );
            }
            "function_signature" if self.is_overload_signature(stmt, decl) => {
                // Overload header; the implementation below declares the symbol
                if let Some(name) = decl.child_by_field_name("name") {
                    self.masked.push(Span::new(stmt.start_byte(), name.end_byte()));
                }
            }
            "function_declaration" | "generator_function_declaration" | "function_signature" => {
                self.push_export(
                    stmt,
                    decl.child_by_field_name("name"),
                    SymbolKind::Function,
                    is_default,
                    markers.to_vec(),
                );
            }
            "lexical_declaration" | "variable_declaration" => {
                let kind = decl
                    .child(0)
                    .and_then(|keyword| SymbolKind::from_binding_keyword(keyword.kind()))
                    .unwrap_or(SymbolKind::Const);

                let mut cursor = decl.walk();
                let declarators: Vec<Node> = decl
                    .named_children(&mut cursor)
                    .filter(|c| c.kind() == "variable_declarator")
                    .collect();

                for declarator in declarators {
                    let Some(name) = declarator.child_by_field_name("name") else {
                        continue;
                    };
                    let mut bindings = Vec::new();
                    pattern_bindings(name, &mut bindings);
                    for binding in bindings {
                        self.push_export(stmt, Some(binding), kind, is_default, markers.to_vec());
                    }
                }
            }
            "type_alias_declaration" => {
                self.push_export(
                    stmt,
                    decl.child_by_field_name("name"),
                    SymbolKind::Type,
                    is_default,
                    markers.to_vec(),
                );
            }
            "interface_declaration" => {
                self.push_export(
                    stmt,
                    decl.child_by_field_name("name"),
                    SymbolKind::Interface,
                    is_default,
                    markers.to_vec(),
                );
            }
            "enum_declaration" => {
                self.push_export(
                    stmt,
                    decl.child_by_field_name("name"),
                    SymbolKind::Enum,
                    is_default,
                    markers.to_vec(),
                );
            }
            "internal_module" | "module" => {
                // `declare module "pkg"` names a module, not a symbol
                let name = decl
                    .child_by_field_name("name")
                    .filter(|n| n.kind() != "string");
                self.push_export(stmt, name, SymbolKind::Namespace, is_default, markers.to_vec());
            }
            "ambient_declaration" => {
                let mut cursor = decl.walk();
                let inner: Vec<Node> = decl.named_children(&mut cursor).collect();
                for child in inner {
                    self.export_declaration(stmt, child, is_default, markers);
                }
            }
            other => trace!("Ignoring export of {}", other),
        }
    }

    /// `export function f(): T;` directly followed by another exported `f`
    fn is_overload_signature(&self, stmt: Node, decl: Node) -> bool {
        let Some(name) = decl.child_by_field_name("name") else {
            return false;
        };

        let mut next = stmt.next_named_sibling();
        while let Some(node) = next.filter(|n| n.kind() == "comment") {
            next = node.next_named_sibling();
        }

        next.filter(|n| n.kind() == "export_statement")
            .and_then(|n| n.child_by_field_name("declaration"))
            .filter(|d| matches!(d.kind(), "function_declaration" | "function_signature"))
            .and_then(|d| d.child_by_field_name("name"))
            .is_some_and(|n| node_text(n, self.source) == node_text(name, self.source))
    }

    fn export_default_value(&mut self, stmt: Node, value: Node, markers: &[String]) {
        let (name, kind) = match value.kind() {
            "identifier" => (Some(value), SymbolKind::Const),
            "class" => (value.child_by_field_name("name"), SymbolKind::Class),
            "function" | "function_expression" | "generator_function" | "arrow_function" => {
                (value.child_by_field_name("name"), SymbolKind::Function)
            }
            _ => (None, SymbolKind::Const),
        };

        if name.is_some() {
            self.push_export(stmt, name, kind, true, markers.to_vec());
            return;
        }

        // Anonymous default export: highlight `export default`
        let end = keyword_token(stmt, "default")
            .map(|d| (d.end_byte(), d.end_position()))
            .unwrap_or((stmt.end_byte(), stmt.end_position()));
        let symbol = Symbol::export(
            "default".to_string(),
            kind,
            true,
            self.path.to_path_buf(),
            Span::new(stmt.start_byte(), end.0),
            range_location(self.source, (stmt.start_byte(), stmt.start_position()), end),
        )
        .with_markers(markers.to_vec());
        self.push(symbol);
    }

    fn push_export(
        &mut self,
        stmt: Node,
        name_node: Option<Node>,
        kind: SymbolKind,
        is_default: bool,
        markers: Vec<String>,
    ) {
        let Some(name_node) = name_node else {
            return;
        };

        // `namespace A.B` is imported as `A`
        let name = node_text(name_node, self.source)
            .split('.')
            .next()
            .unwrap_or("")
            .trim();
        if name.is_empty() {
            return;
        }

        let symbol = Symbol::export(
            name.to_string(),
            kind,
            is_default,
            self.path.to_path_buf(),
            Span::new(stmt.start_byte(), name_node.end_byte()),
            range_location(
                self.source,
                (stmt.start_byte(), stmt.start_position()),
                (name_node.end_byte(), name_node.end_position()),
            ),
        )
        .with_markers(markers);
        self.push(symbol);
    }

    // ---------------------------------------------------------------------
    // Class members
    // ---------------------------------------------------------------------

    fn extract_class_members(&mut self, class: Node) {
        let container = class
            .child_by_field_name("name")
            .map(|n| node_text(n, self.source).to_string())
            .unwrap_or_else(|| ANONYMOUS_CLASS.to_string());

        let Some(body) = class.child_by_field_name("body") else {
            return;
        };

        // Method decorators are siblings that precede the method in the class body
        let mut pending: Vec<String> = Vec::new();
        let mut cursor = body.walk();
        let members: Vec<Node> = body.named_children(&mut cursor).collect();

        for member in members {
            match member.kind() {
                "decorator" => {
                    if let Some(name) = decorator_name(member, self.source) {
                        pending.push(name);
                    }
                }
                "comment" => {}
                "public_field_definition" | "field_definition" => {
                    let mut markers = std::mem::take(&mut pending);
                    markers.extend(decorator_names(member, self.source));
                    self.push_member(&container, member, SymbolKind::Property, markers);
                }
                "method_definition" => {
                    let mut markers = std::mem::take(&mut pending);
                    markers.extend(decorator_names(member, self.source));
                    let kind = method_kind(member);
                    self.push_member(&container, member, kind, markers);
                }
                // Overload and abstract signatures have no body to analyse
                _ => pending.clear(),
            }
        }
    }

    fn push_member(&mut self, container: &str, member: Node, kind: SymbolKind, markers: Vec<String>) {
        let Some(name_node) = member
            .child_by_field_name("name")
            .or_else(|| member.child_by_field_name("property"))
        else {
            return;
        };

        // Computed, string and numeric keys cannot be matched by name
        let name = match name_node.kind() {
            "property_identifier" | "private_property_identifier" | "identifier" => {
                node_text(name_node, self.source)
            }
            _ => return,
        };
        if name.is_empty() || (kind == SymbolKind::Method && name == "constructor") {
            return;
        }

        let access = if name.starts_with('#') {
            AccessLevel::Private
        } else {
            accessibility(member, self.source)
        };

        let symbol = Symbol::member(
            name.to_string(),
            kind,
            container.to_string(),
            access,
            self.path.to_path_buf(),
            node_span(member),
            node_location(member, self.source),
        )
        .with_markers(markers);
        self.push(symbol);
    }

    fn push(&mut self, symbol: Symbol) {
        if self.seen.insert((symbol.key(), symbol.span)) {
            self.symbols.push(symbol);
        }
    }
}

fn is_module_level(node: Node) -> bool {
    node.parent().map_or(true, |p| p.kind() == "program")
}

fn accessibility(member: Node, source: &str) -> AccessLevel {
    let mut cursor = member.walk();
    let modifier = member
        .named_children(&mut cursor)
        .find(|c| c.kind() == "accessibility_modifier");
    modifier
        .map(|m| AccessLevel::from_modifier(node_text(m, source)))
        .unwrap_or_default()
}

/// `get`/`set` keywords before the name turn a method into an accessor
fn method_kind(method: Node) -> SymbolKind {
    let name = method.child_by_field_name("name");
    let mut cursor = method.walk();
    for child in method.children(&mut cursor) {
        if Some(child) == name {
            break;
        }
        if !child.is_named() {
            match child.kind() {
                "get" => return SymbolKind::Getter,
                "set" => return SymbolKind::Setter,
                _ => {}
            }
        }
    }
    SymbolKind::Method
}

/// Replace masked byte ranges with spaces, keeping line breaks
fn mask_text(source: &str, masked: &[Span]) -> String {
    let mut bytes = source.as_bytes().to_vec();
    let len = bytes.len();
    for span in masked {
        let (start, end) = (span.start.min(len), span.end.min(len));
        for byte in &mut bytes[start..end] {
            if *byte != b'\n' && *byte != b'\r' {
                *byte = b' ';
            }
        }
    }
    String::from_utf8(bytes).unwrap_or_else(|_| source.to_string())
}
