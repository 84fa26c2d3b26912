//! Code unit extraction using tree-sitter
//!
//! Extracts functions and methods from source files:
//! - Java methods and constructors
//! - TypeScript functions, class methods, and closures bound to names
//! - Rust functions, impl/trait methods, and `let`-bound closures
//!
//! Units come out sorted by start line, ties kept in query match order.

use super::{CodeUnit, CommentAttacher, Language, SiblingIndex, UnitKind, ANONYMOUS_UNIT};
use crate::config::Heuristics;
use crate::error::{ChunkError, Result};
use std::collections::HashMap;
use std::path::Path;
use streaming_iterator::StreamingIterator;
use tracing::{debug, warn};
use tree_sitter::{Node, Query, QueryCursor};

/// Identifier node kinds accepted as the name of a bound closure
const BINDING_NAME_KINDS: &[&str] = &[
    "identifier",
    "property_identifier",
    "private_property_identifier",
];

/// What a query capture stands for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CaptureRole {
    Method,
    Function,
    Closure,
    Ignored,
}

impl CaptureRole {
    fn from_name(name: &str) -> Self {
        match name {
            "method" => CaptureRole::Method,
            "function" => CaptureRole::Function,
            "closure" => CaptureRole::Closure,
            _ => CaptureRole::Ignored,
        }
    }
}

/// A compiled unit query with its capture roles
struct UnitQuery {
    query: Query,
    roles: Vec<CaptureRole>,
}

impl UnitQuery {
    fn compile(language: Language) -> Result<Self> {
        let query = language.compile_unit_query()?;
        let roles = query
            .capture_names()
            .iter()
            .map(|name| CaptureRole::from_name(name))
            .collect();

        Ok(Self { query, roles })
    }
}

/// Nodes making up one unit before text is pulled out
struct UnitNodes<'tree> {
    name: String,
    kind: UnitKind,
    body: Node<'tree>,
    anchor: Node<'tree>,
}

/// Extracts code units from source files
pub struct UnitExtractor {
    queries: HashMap<Language, UnitQuery>,
    attacher: CommentAttacher,
}

impl UnitExtractor {
    /// Create an extractor with every grammar's query compiled
    pub fn new(heuristics: &Heuristics) -> Result<Self> {
        let queries = Language::ALL
            .iter()
            .map(|&language| UnitQuery::compile(language).map(|q| (language, q)))
            .collect::<Result<HashMap<_, _>>>()?;

        Ok(Self {
            queries,
            attacher: CommentAttacher::new(&heuristics.doc_comment_markers),
        })
    }

    /// Extract units from a file, picking the grammar from its extension.
    ///
    /// Unsupported extensions yield no units.
    pub fn extract_file(&self, path: &Path, content: &str) -> Vec<CodeUnit> {
        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");

        match Language::from_extension(extension) {
            Some(language) => self.extract(content, &path.to_string_lossy(), language),
            None => {
                debug!("No grammar for {:?}, skipping", path);
                Vec::new()
            }
        }
    }

    /// Extract units from source text. Parse failures are logged and yield no units.
    pub fn extract(&self, source: &str, file_path: &str, language: Language) -> Vec<CodeUnit> {
        match self.try_extract(source, file_path, language) {
            Ok(units) => units,
            Err(e) => {
                warn!("Failed to extract units from {}: {}", file_path, e);
                Vec::new()
            }
        }
    }

    /// Extract units, surfacing parse failures
    pub fn try_extract(
        &self,
        source: &str,
        file_path: &str,
        language: Language,
    ) -> Result<Vec<CodeUnit>> {
        let unit_query = self.queries.get(&language).ok_or_else(|| ChunkError::Grammar {
            language: language.to_string(),
            reason: "query not compiled".to_string(),
        })?;

        let tree = language.parse(source).map_err(|e| match e {
            ChunkError::Parse { reason, .. } => ChunkError::Parse {
                path: file_path.to_string(),
                reason,
            },
            other => other,
        })?;

        let root = tree.root_node();
        if root.has_error() {
            debug!("{} has syntax errors, extracting what parsed", file_path);
        }

        let mut siblings = SiblingIndex::new();
        let mut units = Vec::new();

        let mut cursor = QueryCursor::new();
        let mut matches = cursor.matches(&unit_query.query, root, source.as_bytes());

        while let Some(m) = matches.next() {
            for capture in m.captures {
                let role = unit_query
                    .roles
                    .get(capture.index as usize)
                    .copied()
                    .unwrap_or(CaptureRole::Ignored);

                let Some(nodes) = resolve_unit(language, role, capture.node, source) else {
                    continue;
                };

                let Ok(body) = nodes.body.utf8_text(source.as_bytes()) else {
                    continue;
                };

                let docstring = self
                    .attacher
                    .attach(language, &mut siblings, nodes.anchor, source);

                units.push(
                    CodeUnit::new(
                        file_path,
                        &nodes.name,
                        nodes.kind,
                        body,
                        language,
                        nodes.body.start_position().row + 1,
                        nodes.body.end_position().row + 1,
                    )
                    .with_docstring(docstring),
                );
            }
        }

        units.sort_by_key(|u| u.start_line);

        debug!("Extracted {} {} units from {}", units.len(), language, file_path);
        Ok(units)
    }
}

/// Work out name, kind, body span and comment anchor for a captured node
fn resolve_unit<'tree>(
    language: Language,
    role: CaptureRole,
    node: Node<'tree>,
    source: &str,
) -> Option<UnitNodes<'tree>> {
    match role {
        CaptureRole::Method | CaptureRole::Function => {
            let name = node
                .child_by_field_name("name")
                .and_then(|n| n.utf8_text(source.as_bytes()).ok())
                .unwrap_or(ANONYMOUS_UNIT)
                .to_string();

            let kind = if role == CaptureRole::Method || is_in_method_container(language, node) {
                UnitKind::Method
            } else {
                UnitKind::Function
            };

            Some(UnitNodes {
                name,
                kind,
                body: node,
                anchor: lift_exports(language, node),
            })
        }
        CaptureRole::Closure => {
            let binding = node.parent()?;
            let name = binding_name(binding, source);

            let kind = if language.member_bindings().contains(&binding.kind()) {
                UnitKind::Method
            } else {
                UnitKind::Function
            };

            let body = enclosing_statement(language, binding).unwrap_or(binding);

            Some(UnitNodes {
                name,
                kind,
                body,
                anchor: lift_exports(language, body),
            })
        }
        CaptureRole::Ignored => None,
    }
}

/// Declared identifier of a closure binding, or the anonymous sentinel
fn binding_name(binding: Node<'_>, source: &str) -> String {
    binding
        .child_by_field_name("name")
        .or_else(|| binding.child_by_field_name("pattern"))
        .filter(|n| BINDING_NAME_KINDS.contains(&n.kind()))
        .and_then(|n| n.utf8_text(source.as_bytes()).ok())
        .filter(|name| !name.is_empty())
        .unwrap_or(ANONYMOUS_UNIT)
        .to_string()
}

/// The `const`/`let`/`var` statement around a declarator, when it binds only this name
fn enclosing_statement<'tree>(language: Language, binding: Node<'tree>) -> Option<Node<'tree>> {
    let statement = binding.parent()?;
    if !language.declaration_statements().contains(&statement.kind()) {
        return None;
    }

    let mut cursor = statement.walk();
    let declarators = statement
        .named_children(&mut cursor)
        .filter(|n| n.kind() == binding.kind())
        .count();

    (declarators == 1).then_some(statement)
}

/// Climb through `export` wrappers so the comment above them is found
fn lift_exports<'tree>(language: Language, node: Node<'tree>) -> Node<'tree> {
    let mut anchor = node;
    while let Some(parent) = anchor.parent() {
        if language.export_wrappers().contains(&parent.kind()) {
            anchor = parent;
        } else {
            break;
        }
    }
    anchor
}

/// Whether a function sits directly in an impl/trait body
fn is_in_method_container(language: Language, node: Node<'_>) -> bool {
    node.parent()
        .and_then(|list| list.parent())
        .map(|block| language.method_containers().contains(&block.kind()))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> UnitExtractor {
        UnitExtractor::new(&Heuristics::default()).unwrap()
    }

    #[test]
    fn test_extract_java_methods() {
        let code = r#"
public class Account {
    private int balance;

    /**
     * Adds funds to the account.
     */
    public void deposit(int amount) {
        validate(amount);
        balance += amount;
    }

    // plain helper
    private void validate(int amount) {
        if (amount < 0) throw new IllegalArgumentException();
    }

    public Account() {
        this.balance = 0;
    }
}
"#;

        let units = extractor().extract(code, "Account.java", Language::Java);

        let names: Vec<_> = units.iter().map(|u| u.name.as_str()).collect();
        assert_eq!(names, vec!["deposit", "validate", "Account"]);
        assert!(units.iter().all(|u| u.unit_kind == UnitKind::Method));
        assert!(units.iter().all(|u| u.file_path == "Account.java"));

        assert!(units[0].docstring.starts_with("/**"));
        assert!(units[0].docstring.contains("Adds funds"));
        assert!(units[0].body.starts_with("public void deposit"));
        assert_eq!(units[0].start_line, 8);
        assert_eq!(units[0].end_line, 11);

        assert_eq!(units[1].docstring, "// plain helper");
        assert_eq!(units[2].docstring, "");
    }

    #[test]
    fn test_extract_typescript_units() {
        let code = r#"
/** Adds two numbers. */
export function add(a: number, b: number): number {
  return a + b;
}

// Doubles a value.
const double = (x: number) => x * 2;

let first = () => 1, second = function () { return 2; };

const { pick } = { pick: () => 3 };

class Greeter {
  greet(name: string): string {
    return `hi ${name}`;
  }

  onClick = () => {
    this.greet("click");
  };
}
"#;

        let units = extractor().extract(code, "src/math.ts", Language::TypeScript);
        let summary: Vec<_> = units
            .iter()
            .map(|u| (u.name.as_str(), u.unit_kind))
            .collect();

        assert_eq!(
            summary,
            vec![
                ("add", UnitKind::Function),
                ("double", UnitKind::Function),
                ("first", UnitKind::Function),
                ("second", UnitKind::Function),
                ("greet", UnitKind::Method),
                ("onClick", UnitKind::Method),
            ]
        );

        // the comment sits above the export wrapper
        assert_eq!(units[0].docstring, "/** Adds two numbers. */");
        // single-binding statements keep the whole declaration
        assert_eq!(units[1].body, "const double = (x: number) => x * 2;");
        assert_eq!(units[1].docstring, "// Doubles a value.");
        // multi-binding statements fall back to the declarator
        assert_eq!(units[2].body, "first = () => 1");
        assert_eq!(units[2].start_line, units[3].start_line);
    }

    #[test]
    fn test_unresolvable_closure_name_is_anonymous() {
        let code = "const { length } = () => 1;\nvar g = [() => 1][0];\nconst h = () => 1;\n";
        let units = extractor().extract(code, "a.ts", Language::TypeScript);
        let names: Vec<_> = units.iter().map(|u| u.name.as_str()).collect();
        assert_eq!(names, vec![ANONYMOUS_UNIT, "h"]);
    }

    #[test]
    fn test_rust_closure_bindings() {
        let code = "fn main() {\n    let _ = |x: i32| x + 1;\n    let apply = |x: i32| x * 2;\n}\n";
        let units = extractor().extract(code, "main.rs", Language::Rust);
        let names: Vec<_> = units.iter().map(|u| u.name.as_str()).collect();
        assert_eq!(names, vec!["main", ANONYMOUS_UNIT, "apply"]);
        assert_eq!(units[2].body, "let apply = |x: i32| x * 2;");
        assert_eq!(units[2].unit_kind, UnitKind::Function);
    }

    #[test]
    fn test_extract_rust_units() {
        let code = r#"
/// Entry point
fn main() {
    run();
}

struct Counter(u32);

impl Counter {
    /// Bumps the counter.
    pub fn bump(&mut self) {
        self.0 += 1;
    }
}
"#;

        let units = extractor().extract(code, "lib.rs", Language::Rust);
        let summary: Vec<_> = units
            .iter()
            .map(|u| (u.name.as_str(), u.unit_kind, u.docstring.as_str()))
            .collect();

        assert_eq!(
            summary,
            vec![
                ("main", UnitKind::Function, "/// Entry point"),
                ("bump", UnitKind::Method, "/// Bumps the counter."),
            ]
        );
    }

    #[test]
    fn test_tsx_grammar() {
        let code = "export const App = () => <div>hello</div>;\n";
        let units = extractor().extract(code, "App.tsx", Language::Tsx);
        assert_eq!(units.len(), 1);
        assert_eq!(units[0].name, "App");
        assert_eq!(units[0].language, Language::Tsx);
    }

    #[test]
    fn test_units_sorted_by_start_line() {
        let code = r#"
class Outer {
    void a() { x(); }
    class Inner {
        void b() { y(); }
    }
    void c() { z(); }
}
"#;
        let units = extractor().extract(code, "Outer.java", Language::Java);
        let lines: Vec<_> = units.iter().map(|u| u.start_line).collect();
        let mut sorted = lines.clone();
        sorted.sort();
        assert_eq!(lines, sorted);
        assert_eq!(units.len(), 3);
    }

    #[test]
    fn test_unknown_extension_yields_nothing() {
        let units = extractor().extract_file(Path::new("script.py"), "def f():\n    return 1\n");
        assert!(units.is_empty());

        let units = extractor().extract_file(Path::new("Makefile"), "all:\n\techo hi\n");
        assert!(units.is_empty());
    }

    #[test]
    fn test_extract_file_dispatches_on_extension() {
        let units = extractor().extract_file(
            Path::new("src/Service.java"),
            "class Service { void start() { boot(); } }",
        );
        assert_eq!(units.len(), 1);
        assert_eq!(units[0].file_path, "src/Service.java");
    }

    #[test]
    fn test_malformed_input_does_not_fail() {
        let units = extractor().extract("class {{{ void ( ;;", "Broken.java", Language::Java);
        assert!(units.iter().all(|u| !u.body.is_empty()));

        let units = extractor().extract("", "Empty.java", Language::Java);
        assert!(units.is_empty());
    }
}
