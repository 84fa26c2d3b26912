//! Documentation comment attachment
//!
//! A unit gets a docstring only when the single named sibling directly before
//! it is a comment whose text starts with a doc marker. Runs of comments are
//! not concatenated and nothing further back is inspected.
//!
//! This is an approximation: decorators (`@dec()`) and attributes
//! (`#[inline]`) are named siblings too, so a doc comment placed above them is
//! not attached to the unit they annotate.

use super::Language;
use std::collections::HashMap;
use tree_sitter::Node;

/// Ordered named children per parent node, built on first use.
///
/// Looking up the previous sibling becomes an index lookup into the array of
/// the parent's children instead of a walk over sibling pointers.
#[derive(Default)]
pub struct SiblingIndex<'tree> {
    by_parent: HashMap<usize, Vec<Node<'tree>>>,
}

impl<'tree> SiblingIndex<'tree> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Named sibling directly before `node`, if any
    pub fn preceding(&mut self, node: Node<'tree>) -> Option<Node<'tree>> {
        let parent = node.parent()?;
        let siblings = self.by_parent.entry(parent.id()).or_insert_with(|| {
            let mut cursor = parent.walk();
            parent.named_children(&mut cursor).collect()
        });

        let position = siblings.iter().position(|s| s.id() == node.id())?;
        position.checked_sub(1).map(|i| siblings[i])
    }
}

/// Finds the doc comment directly preceding a unit
#[derive(Debug, Clone)]
pub struct CommentAttacher {
    markers: Vec<String>,
}

impl CommentAttacher {
    /// Create an attacher recognising the given doc comment markers
    pub fn new(markers: &[String]) -> Self {
        Self {
            markers: markers
                .iter()
                .map(|m| m.trim().to_string())
                .filter(|m| !m.is_empty())
                .collect(),
        }
    }

    /// Trimmed comment text if a node of `kind` with `text` counts as a doc comment
    pub fn doc_text(&self, language: Language, kind: &str, text: &str) -> Option<String> {
        if !language.comment_kinds().contains(&kind) {
            return None;
        }

        let trimmed = text.trim();
        if self.markers.iter().any(|m| trimmed.starts_with(m.as_str())) {
            Some(trimmed.to_string())
        } else {
            None
        }
    }

    /// Docstring for the unit anchored at `anchor`, or an empty string
    pub fn attach<'tree>(
        &self,
        language: Language,
        siblings: &mut SiblingIndex<'tree>,
        anchor: Node<'tree>,
        source: &str,
    ) -> String {
        siblings
            .preceding(anchor)
            .and_then(|prev| {
                let text = prev.utf8_text(source.as_bytes()).ok()?;
                self.doc_text(language, prev.kind(), text)
            })
            .unwrap_or_default()
    }
}

impl Default for CommentAttacher {
    fn default() -> Self {
        Self::new(&["/**".to_string(), "//".to_string()])
    }
}
