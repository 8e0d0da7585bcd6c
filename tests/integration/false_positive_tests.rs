//! False positive tests
//!
//! These tests check that symbols used through indirect mechanisms are not
//! reported, and that text which only looks like a usage does not hide a
//! genuinely unused symbol.
//!
//! Categories covered:
//! 1. Framework decorators (TypeORM, class-validator, Angular, MobX)
//! 2. Entity and DTO files matched by name
//! 3. Usages inside template substitutions, callbacks and accessors
//! 4. Names appearing only in comments, strings or longer identifiers

use std::path::{Path, PathBuf};
use unused_exports::config::Config;
use unused_exports::search::{SearchError, SearchProvider, SearchQuery};
use unused_exports::Analyzer;

/// Project search that never finds anything
struct NoMatches;

impl SearchProvider for NoMatches {
    fn search(&self, _query: &SearchQuery) -> Result<Vec<PathBuf>, SearchError> {
        Ok(Vec::new())
    }

    fn name(&self) -> &'static str {
        "none"
    }
}

fn unused_in(file: &str, source: &str) -> Vec<String> {
    unused_with(Config::default(), file, source)
}

fn unused_with(config: Config, file: &str, source: &str) -> Vec<String> {
    let mut analyzer = Analyzer::new(Path::new("/project"), config, Box::new(NoMatches)).unwrap();
    analyzer
        .analyze_source(&Path::new("/project").join(file), source)
        .items
        .into_iter()
        .map(|i| i.name)
        .collect()
}

// ============================================================================
// Framework decorators
// ============================================================================

#[test]
fn test_typeorm_columns_not_reported() {
    let source = r#"@Entity()
class User {
  @PrimaryGeneratedColumn()
  private id: number;

  @Column({ nullable: true })
  private nickname: string;

  @ManyToOne(() => Team, (team) => team.members)
  private team: Team;

  private scratch = 0;
}
"#;
    assert_eq!(unused_in("src/user.ts", source), vec!["scratch"]);
}

#[test]
fn test_validation_decorators_not_reported() {
    let source = r#"class CreateUserInput {
  @IsEmail()
  private email: string;

  @IsOptional()
  @MaxLength(20)
  private nickname?: string;
}
"#;
    assert!(unused_in("src/create-user.ts", source).is_empty());
}

#[test]
fn test_angular_bindings_not_reported() {
    let source = r#"class ToolbarComponent {
  @Input() private title: string;
  @Output() private closed = new EventEmitter<void>();

  @HostListener('window:resize')
  private onResize() {}
}
"#;
    assert!(unused_in("src/toolbar.component.ts", source).is_empty());
}

#[test]
fn test_custom_markers_from_config() {
    let source = "class Job {\n  @Scheduled('0 * * * *')\n  private tick() {}\n}\n";

    assert_eq!(unused_in("src/job.ts", source), vec!["tick"]);

    let mut config = Config::default();
    config.exclude_decorators.push("Scheduled".to_string());
    assert!(unused_with(config, "src/job.ts", source).is_empty());
}

#[test]
fn test_decorated_export_not_reported() {
    let source = "@Injectable()\nexport class Mailer {}\n";
    assert!(unused_in("src/mailer.ts", source).is_empty());
}

// ============================================================================
// Entity and DTO files
// ============================================================================

#[test]
fn test_entity_and_dto_files_skip_member_analysis() {
    let source = "class Order {\n  private total = 0;\n}\n";

    assert!(unused_in("src/order.entity.ts", source).is_empty());
    assert!(unused_in("src/order.dto.ts", source).is_empty());
    assert!(unused_in("src/order.model.ts", source).is_empty());
    assert_eq!(unused_in("src/order.ts", source), vec!["total"]);
}

// ============================================================================
// Indirect usages
// ============================================================================

#[test]
fn test_usage_inside_template_substitution() {
    let source = r#"class Greeter {
  private name = 'world';
  greet() {
    return `hello ${this.name}!`;
  }
}
"#;
    assert!(unused_in("src/greeter.ts", source).is_empty());
}

#[test]
fn test_usage_inside_arrow_callback() {
    let source = r#"class Poller {
  private timer?: number;
  private tick() {}
  start() {
    this.timer = window.setInterval(() => this.tick(), 1000);
  }
}
"#;
    assert!(unused_in("src/poller.ts", source).is_empty());
}

#[test]
fn test_private_accessor_used_as_property() {
    let source = r#"class Cart {
  private items: number[] = [];
  private get total() {
    return this.items.length;
  }
  describe() {
    return `${this.total} items`;
  }
}
"#;
    assert!(unused_in("src/cart.ts", source).is_empty());
}

#[test]
fn test_export_used_in_same_file() {
    let source = "export const DEFAULT_LIMIT = 10;\nexport function page(limit = DEFAULT_LIMIT) {\n  return limit;\n}\n";
    assert_eq!(unused_in("src/paging.ts", source), vec!["page"]);
}

// ============================================================================
// Look-alikes that are not usages
// ============================================================================

#[test]
fn test_names_in_comments_and_strings_do_not_count() {
    let source = r#"class Vault {
  private secret = 42;
  log() {
    // this.secret is never read
    console.log("this.secret");
    console.log(`this.secret`);
  }
}
"#;
    assert_eq!(unused_in("src/vault.ts", source), vec!["secret"]);
}

#[test]
fn test_longer_identifiers_do_not_count() {
    let source = r#"class Chart {
  private data = [];
  private dataset = [];
  render() {
    return this.dataset;
  }
}
"#;
    assert_eq!(unused_in("src/chart.ts", source), vec!["data"]);
}

#[test]
fn test_bare_name_is_not_member_access() {
    let source = r#"class Parser {
  private depth = 0;
  parse(depth: number) {
    return depth + 1;
  }
}
"#;
    assert_eq!(unused_in("src/parser.ts", source), vec!["depth"]);
}
