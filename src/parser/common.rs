use crate::model::{Location, Span};
use tree_sitter::{Node, Point};

/// Convert a tree-sitter node's range to a 1-indexed `Location`
pub fn node_location(node: Node, source: &str) -> Location {
    range_location(
        source,
        (node.start_byte(), node.start_position()),
        (node.end_byte(), node.end_position()),
    )
}

/// Build a location from two (byte offset, point) pairs
pub fn range_location(source: &str, start: (usize, Point), end: (usize, Point)) -> Location {
    Location::new(
        start.1.row + 1, // tree-sitter uses 0-indexed lines
        char_column(source, start),
        end.1.row + 1,
        char_column(source, end),
    )
}

/// 1-indexed character column; tree-sitter points count bytes
fn char_column(source: &str, (byte, point): (usize, Point)) -> usize {
    byte.checked_sub(point.column)
        .and_then(|line_start| source.get(line_start..byte))
        .map_or(point.column, |prefix| prefix.chars().count())
        + 1
}

pub fn node_span(node: Node) -> Span {
    Span::new(node.start_byte(), node.end_byte())
}

/// Extract text from a node
pub fn node_text<'a>(node: Node, source: &'a str) -> &'a str {
    source.get(node.start_byte()..node.end_byte()).unwrap_or("")
}

/// Find all named children of a specific kind
pub fn children_of_kind<'a>(node: Node<'a>, kind: &str) -> Vec<Node<'a>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|child| child.kind() == kind)
        .collect()
}

/// Find an anonymous keyword token (e.g. `default`, `get`) among direct children
pub fn keyword_token<'a>(node: Node<'a>, keyword: &str) -> Option<Node<'a>> {
    let mut cursor = node.walk();
    let found = node
        .children(&mut cursor)
        .find(|child| !child.is_named() && child.kind() == keyword);
    found
}

/// Name of a decorator: the last identifier of its expression
/// (`@Column()` -> `Column`, `@ns.Inject()` -> `Inject`)
pub fn decorator_name(decorator: Node, source: &str) -> Option<String> {
    let expr = decorator.named_child(0)?;
    decorator_expression_name(expr, source)
}

fn decorator_expression_name(expr: Node, source: &str) -> Option<String> {
    match expr.kind() {
        "identifier" => Some(node_text(expr, source).to_string()),
        "call_expression" => decorator_expression_name(expr.child_by_field_name("function")?, source),
        "member_expression" => expr
            .child_by_field_name("property")
            .map(|p| node_text(p, source).to_string()),
        "parenthesized_expression" => decorator_expression_name(expr.named_child(0)?, source),
        _ => None,
    }
}

/// Names of the decorators that are direct children of `node`
pub fn decorator_names(node: Node, source: &str) -> Vec<String> {
    children_of_kind(node, "decorator")
        .into_iter()
        .filter_map(|d| decorator_name(d, source))
        .collect()
}

/// Identifier nodes bound by a declarator name, which may be a destructuring pattern
pub fn pattern_bindings<'a>(node: Node<'a>, out: &mut Vec<Node<'a>>) {
    match node.kind() {
        "identifier" | "shorthand_property_identifier_pattern" => out.push(node),
        "pair_pattern" => {
            if let Some(value) = node.child_by_field_name("value") {
                pattern_bindings(value, out);
            }
        }
        "object_assignment_pattern" | "assignment_pattern" => {
            if let Some(left) = node.child_by_field_name("left") {
                pattern_bindings(left, out);
            }
        }
        "object_pattern" | "array_pattern" | "rest_pattern" => {
            let mut cursor = node.walk();
            for child in node.named_children(&mut cursor) {
                pattern_bindings(child, out);
            }
        }
        _ => {}
    }
}
