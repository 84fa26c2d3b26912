//! Code unit extraction
//!
//! This module turns raw source text into ordered [`CodeUnit`]s:
//! - Parsing and structural queries per grammar (tree-sitter)
//! - Name resolution, including closures bound to variables
//! - One-hop documentation comment attachment
//! - Triviality filtering of accessor-like units

pub mod code;
pub mod comment;
pub mod filter;
pub mod language;

pub use code::UnitExtractor;
pub use comment::{CommentAttacher, SiblingIndex};
pub use filter::TrivialityFilter;
pub use language::Language;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Name given to units whose identifier cannot be resolved
pub const ANONYMOUS_UNIT: &str = "anonymous";

/// Compute a stable hash for content
pub fn content_hash(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}

/// Kind of extracted declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitKind {
    Method,
    Function,
}

impl std::fmt::Display for UnitKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnitKind::Method => write!(f, "method"),
            UnitKind::Function => write!(f, "function"),
        }
    }
}

/// One function or method declaration extracted from a file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeUnit {
    /// Resolved identifier, or [`ANONYMOUS_UNIT`]
    pub name: String,
    /// Grammar the unit was parsed with
    pub language: Language,
    /// Exact source span of the declaration
    pub body: String,
    /// Directly preceding doc comment, empty when there is none
    pub docstring: String,
    /// First line of the declaration (1-indexed)
    pub start_line: usize,
    /// Last line of the declaration (1-indexed)
    pub end_line: usize,
    /// Path or source identifier of the containing file
    pub file_path: String,
    /// Method or free function
    pub unit_kind: UnitKind,
}

impl CodeUnit {
    /// Create a unit without a docstring
    pub fn new(
        file_path: &str,
        name: &str,
        unit_kind: UnitKind,
        body: &str,
        language: Language,
        start_line: usize,
        end_line: usize,
    ) -> Self {
        let name = if name.trim().is_empty() {
            ANONYMOUS_UNIT
        } else {
            name
        };
        let start_line = start_line.max(1);

        Self {
            name: name.to_string(),
            language,
            body: body.to_string(),
            docstring: String::new(),
            start_line,
            end_line: end_line.max(start_line),
            file_path: file_path.to_string(),
            unit_kind,
        }
    }

    /// Attach a documentation comment
    pub fn with_docstring(mut self, docstring: impl Into<String>) -> Self {
        self.docstring = docstring.into();
        self
    }

    /// Text packed into code chunks: docstring, newline, body
    pub fn entry_text(&self) -> String {
        if self.docstring.is_empty() {
            self.body.clone()
        } else {
            format!("{}\n{}", self.docstring, self.body)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_text_with_docstring() {
        let unit = CodeUnit::new(
            "Account.java",
            "deposit",
            UnitKind::Method,
            "void deposit(int amount) { balance += amount; }",
            Language::Java,
            3,
            3,
        )
        .with_docstring("/** Adds funds. */");

        assert_eq!(
            unit.entry_text(),
            "/** Adds funds. */\nvoid deposit(int amount) { balance += amount; }"
        );
    }

    #[test]
    fn test_entry_text_without_docstring() {
        let unit = CodeUnit::new("a.ts", "f", UnitKind::Function, "function f() {}", Language::TypeScript, 1, 1);
        assert_eq!(unit.entry_text(), "function f() {}");
    }

    #[test]
    fn test_blank_name_and_line_invariants() {
        let unit = CodeUnit::new("a.rs", "  ", UnitKind::Function, "|| 1", Language::Rust, 0, 0);
        assert_eq!(unit.name, ANONYMOUS_UNIT);
        assert_eq!(unit.start_line, 1);
        assert!(unit.start_line <= unit.end_line);
    }

    #[test]
    fn test_content_hash_is_stable() {
        assert_eq!(content_hash("abc"), content_hash("abc"));
        assert_ne!(content_hash("abc"), content_hash("abd"));
        assert_eq!(content_hash("").len(), 64);
    }
}
