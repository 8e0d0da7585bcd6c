//! Extractor integration tests
//!
//! These tests run the tree-sitter extractor over realistic TypeScript,
//! TSX and JavaScript sources and check the exports and class members it
//! reports.

use std::path::Path;
use unused_exports::model::{AccessLevel, Symbol, SymbolKind};
use unused_exports::parser::{Extraction, TypeScriptExtractor};

fn extract(file: &str, source: &str) -> Extraction {
    let mut extractor = TypeScriptExtractor::new().expect("grammar should load");
    extractor.extract(Path::new(file), source)
}

fn export_names(extraction: &Extraction) -> Vec<&str> {
    extraction.exports().map(|s| s.name.as_str()).collect()
}

fn member_names(extraction: &Extraction) -> Vec<&str> {
    extraction.members().map(|s| s.name.as_str()).collect()
}

fn find<'a>(extraction: &'a Extraction, name: &str) -> &'a Symbol {
    extraction
        .symbols
        .iter()
        .find(|s| s.name == name)
        .unwrap_or_else(|| panic!("symbol {} not extracted", name))
}

// ============================================================================
// Exports
// ============================================================================

#[test]
fn test_tsx_component_exports() {
    let source = r#"import React from 'react';

export interface ButtonProps {
  label: string;
}

export const Button = ({ label }: ButtonProps) => <button>{label}</button>;

export default function App() {
  return <Button label="go" />;
}
"#;
    let extraction = extract("/project/src/App.tsx", source);

    assert!(!extraction.had_errors());
    assert_eq!(export_names(&extraction), vec!["ButtonProps", "Button", "App"]);
    assert_eq!(find(&extraction, "ButtonProps").kind, SymbolKind::Interface);
    assert_eq!(find(&extraction, "Button").kind, SymbolKind::Const);

    let app = find(&extraction, "App");
    assert_eq!(app.kind, SymbolKind::Function);
    assert!(app.is_default_export());
    assert!(!find(&extraction, "Button").is_default_export());
}

#[test]
fn test_export_locations_are_one_based() {
    let extraction = extract(
        "/project/src/consts.ts",
        "// header\nexport const LIMIT = 10;\n",
    );

    let limit = find(&extraction, "LIMIT");
    assert_eq!(limit.location.line, 2);
    assert_eq!(limit.location.column, 1);
    assert_eq!(limit.location.end_line, 2);
}

#[test]
fn test_namespace_exports_only_outer_name() {
    let extraction = extract(
        "/project/src/utils.ts",
        "export namespace Utils {\n  export const inner = 1;\n}\n",
    );

    assert_eq!(export_names(&extraction), vec!["Utils"]);
    assert_eq!(find(&extraction, "Utils").kind, SymbolKind::Namespace);
}

#[test]
fn test_reexports_declare_nothing() {
    let extraction = extract(
        "/project/src/barrel.ts",
        "export { a, b as c } from './a';\nexport * from './b';\n",
    );

    assert!(extraction.exports().next().is_none());
}

// ============================================================================
// Class members
// ============================================================================

#[test]
fn test_accessibility_modifiers() {
    let source = r#"class Service {
  private cache = new Map<string, number>();
  protected retries = 3;
  public label = 'svc';
  constructor(private readonly http: Http) {}
  private async load(): Promise<void> {}
}
"#;
    let extraction = extract("/project/src/service.ts", source);

    assert_eq!(
        member_names(&extraction),
        vec!["cache", "retries", "label", "load"]
    );
    assert_eq!(find(&extraction, "cache").access, AccessLevel::Private);
    assert_eq!(find(&extraction, "retries").access, AccessLevel::Protected);
    assert_eq!(find(&extraction, "label").access, AccessLevel::Public);

    let load = find(&extraction, "load");
    assert_eq!(load.kind, SymbolKind::Method);
    assert_eq!(load.access, AccessLevel::Private);
    assert_eq!(load.container(), Some("Service"));
    assert_eq!(load.key(), "Service.load");
}

#[test]
fn test_javascript_private_fields() {
    let source = r#"export class Counter {
  #count = 0;
  static #instances = 0;
  increment() {
    this.#count++;
  }
  get value() {
    return this.#count;
  }
}
"#;
    let extraction = extract("/project/src/counter.js", source);

    assert_eq!(export_names(&extraction), vec!["Counter"]);
    assert_eq!(
        member_names(&extraction),
        vec!["#count", "#instances", "increment", "value"]
    );
    assert_eq!(find(&extraction, "#count").access, AccessLevel::Private);
    assert_eq!(find(&extraction, "#instances").access, AccessLevel::Private);
    assert_eq!(find(&extraction, "increment").access, AccessLevel::Public);
    assert_eq!(find(&extraction, "value").kind, SymbolKind::Getter);
}

#[test]
fn test_abstract_signatures_skipped() {
    let source = r#"export abstract class Shape {
  private id = 1;
  abstract area(): number;
}
"#;
    let extraction = extract("/project/src/shape.ts", source);

    assert_eq!(export_names(&extraction), vec!["Shape"]);
    assert_eq!(member_names(&extraction), vec!["id"]);
}

#[test]
fn test_angular_decorators_captured() {
    let source = r#"@Component({ selector: 'app-root' })
export class AppComponent {
  @Input() title: string;

  @HostListener('click')
  private onClick() {}

  private plain = 1;
}
"#;
    let extraction = extract("/project/src/app.component.ts", source);

    assert!(find(&extraction, "AppComponent")
        .markers
        .contains(&"Component".to_string()));
    assert_eq!(find(&extraction, "title").markers, vec!["Input".to_string()]);
    assert_eq!(
        find(&extraction, "onClick").markers,
        vec!["HostListener".to_string()]
    );
    assert!(find(&extraction, "plain").markers.is_empty());
}

// ============================================================================
// Robustness
// ============================================================================

#[test]
fn test_syntax_errors_are_skipped() {
    let source = "export function ok() {}\nexport const = ;\nclass {\n";
    let extraction = extract("/project/src/broken.ts", source);

    assert!(extraction.had_errors());
    assert!(!extraction.failed);
    assert!(export_names(&extraction).contains(&"ok"));
}

#[test]
fn test_empty_file() {
    let extraction = extract("/project/src/empty.ts", "");

    assert!(extraction.symbols.is_empty());
    assert!(!extraction.had_errors());
}

#[test]
fn test_one_extractor_many_files() {
    let mut extractor = TypeScriptExtractor::new().unwrap();

    let first = extractor.extract(
        Path::new("/project/src/a.ts"),
        "export class A {\n  private x = 1;\n}\n",
    );
    let second = extractor.extract(Path::new("/project/src/b.tsx"), "export const B = <div />;\n");
    let third = extractor.extract(
        Path::new("/project/src/a.ts"),
        "export class A {\n  private x = 1;\n}\n",
    );

    assert_eq!(export_names(&second), vec!["B"]);
    assert_eq!(first.symbols, third.symbols);
}
