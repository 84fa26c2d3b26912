//! Supported grammars
//!
//! Each variant answers the same fixed set of questions: how to parse, which
//! structural query finds its units, which node kinds are comments, and how
//! declarations are wrapped. Adding a language means adding a variant here.

use crate::error::{ChunkError, Result};
use serde::{Deserialize, Serialize};

/// Supported programming languages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Java,
    TypeScript,
    Tsx,
    Rust,
}

const JAVA_UNITS: &str = r#"
(method_declaration) @method
(constructor_declaration) @method
"#;

const TYPESCRIPT_UNITS: &str = r#"
(function_declaration) @function
(generator_function_declaration) @function
(method_definition) @method
(variable_declarator
  value: [(arrow_function) (function_expression)] @closure)
(public_field_definition
  value: [(arrow_function) (function_expression)] @closure)
"#;

const RUST_UNITS: &str = r#"
(function_item) @function
(let_declaration
  value: (closure_expression) @closure)
"#;

impl Language {
    /// Every supported language
    pub const ALL: [Language; 4] = [
        Language::Java,
        Language::TypeScript,
        Language::Tsx,
        Language::Rust,
    ];

    /// Detect language from file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "java" => Some(Language::Java),
            "ts" | "mts" | "cts" => Some(Language::TypeScript),
            "tsx" => Some(Language::Tsx),
            "rs" => Some(Language::Rust),
            _ => None,
        }
    }

    /// Get the tree-sitter language for this language
    pub fn tree_sitter_language(&self) -> tree_sitter::Language {
        match self {
            Language::Java => tree_sitter_java::LANGUAGE.into(),
            Language::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            Language::Tsx => tree_sitter_typescript::LANGUAGE_TSX.into(),
            Language::Rust => tree_sitter_rust::LANGUAGE.into(),
        }
    }

    /// Structural query capturing `@method`, `@function` and `@closure` nodes
    pub fn unit_query(&self) -> &'static str {
        match self {
            Language::Java => JAVA_UNITS,
            Language::TypeScript | Language::Tsx => TYPESCRIPT_UNITS,
            Language::Rust => RUST_UNITS,
        }
    }

    /// Node kinds the grammar uses for comments
    pub fn comment_kinds(&self) -> &'static [&'static str] {
        match self {
            Language::Java | Language::Rust => &["block_comment", "line_comment"],
            Language::TypeScript | Language::Tsx => &["comment"],
        }
    }

    /// Nodes that wrap a declaration without changing it (`export function f`)
    pub fn export_wrappers(&self) -> &'static [&'static str] {
        match self {
            Language::TypeScript | Language::Tsx => &["export_statement"],
            Language::Java | Language::Rust => &[],
        }
    }

    /// Statements holding one or more variable declarators
    pub fn declaration_statements(&self) -> &'static [&'static str] {
        match self {
            Language::TypeScript | Language::Tsx => &["lexical_declaration", "variable_declaration"],
            Language::Java | Language::Rust => &[],
        }
    }

    /// Bindings that attach a closure to a class rather than a variable
    pub fn member_bindings(&self) -> &'static [&'static str] {
        match self {
            Language::TypeScript | Language::Tsx => &["public_field_definition"],
            Language::Java | Language::Rust => &[],
        }
    }

    /// Blocks whose function items are methods
    pub fn method_containers(&self) -> &'static [&'static str] {
        match self {
            Language::Rust => &["impl_item", "trait_item"],
            Language::Java | Language::TypeScript | Language::Tsx => &[],
        }
    }

    /// Parse source text into a syntax tree
    pub fn parse(&self, source: &str) -> Result<tree_sitter::Tree> {
        let mut parser = tree_sitter::Parser::new();
        parser
            .set_language(&self.tree_sitter_language())
            .map_err(|e| ChunkError::Grammar {
                language: self.to_string(),
                reason: e.to_string(),
            })?;

        parser.parse(source, None).ok_or_else(|| ChunkError::Parse {
            path: String::new(),
            reason: format!("{} parser returned no tree", self),
        })
    }

    /// Compile the unit query against this grammar
    pub fn compile_unit_query(&self) -> Result<tree_sitter::Query> {
        tree_sitter::Query::new(&self.tree_sitter_language(), self.unit_query()).map_err(|e| {
            ChunkError::Grammar {
                language: self.to_string(),
                reason: e.to_string(),
            }
        })
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Language::Java => write!(f, "java"),
            Language::TypeScript => write!(f, "typescript"),
            Language::Tsx => write!(f, "tsx"),
            Language::Rust => write!(f, "rust"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_extension() {
        assert_eq!(Language::from_extension("java"), Some(Language::Java));
        assert_eq!(Language::from_extension("TS"), Some(Language::TypeScript));
        assert_eq!(Language::from_extension("tsx"), Some(Language::Tsx));
        assert_eq!(Language::from_extension("rs"), Some(Language::Rust));
        assert_eq!(Language::from_extension("py"), None);
        assert_eq!(Language::from_extension(""), None);
    }

    #[test]
    fn test_every_query_compiles() {
        for language in Language::ALL {
            let query = language.compile_unit_query().unwrap();
            assert!(!query.capture_names().is_empty(), "{language} has no captures");
        }
    }

    #[test]
    fn test_parse_produces_tree() {
        let tree = Language::Java
            .parse("class A { void run() { go(); } }")
            .unwrap();
        assert_eq!(tree.root_node().kind(), "program");
    }

    #[test]
    fn test_serde_names_match_display() {
        for language in Language::ALL {
            let json = serde_json::to_string(&language).unwrap();
            assert_eq!(json, format!("\"{}\"", language));
        }
    }
}
