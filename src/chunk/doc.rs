//! Documentation segmentation
//!
//! Two stages:
//! - Structural split on header lines (`#...`) and horizontal rules
//! - Length split of oversized sections into overlapping windows, preferring
//!   to end a window on a paragraph break
//!
//! All lengths and offsets are counted in characters.

use super::{ChunkKind, SemanticChunk};
use crate::error::ConfigError;
use pulldown_cmark::{Event, Parser, Tag, TagEnd};
use tracing::debug;

/// Lines that end the current section when seen on their own
const HORIZONTAL_RULES: &[&str] = &["---", "***", "___"];

/// Marker for a header line (matched on trimmed text)
const HEADER_MARKER: char = '#';

/// Paragraph break preferred as a window boundary
const PARAGRAPH_BREAK: &str = "\n\n";

/// A carved window as byte offsets into its section
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Window {
    start: usize,
    end: usize,
}

/// Splits documentation into overlapping, size-bounded chunks
#[derive(Debug, Clone, Copy)]
pub struct DocumentSegmenter {
    max_chars: usize,
    overlap_chars: usize,
}

impl DocumentSegmenter {
    /// Create a segmenter; the overlap must be smaller than the window size
    pub fn new(max_chars: usize, overlap_chars: usize) -> Result<Self, ConfigError> {
        if max_chars == 0 {
            return Err(ConfigError::NonPositive {
                field: "doc_max_chars",
            });
        }
        if overlap_chars >= max_chars {
            return Err(ConfigError::OverlapTooLarge {
                overlap: overlap_chars,
                max_chars,
            });
        }

        Ok(Self {
            max_chars,
            overlap_chars,
        })
    }

    /// Split a document into chunks
    pub fn segment(&self, content: &str, source: &str, file_type: &str) -> Vec<SemanticChunk> {
        if content.trim().is_empty() {
            return Vec::new();
        }

        let sections = split_sections(content);
        let mut chunks = Vec::new();

        for (index, section) in sections.iter().enumerate() {
            let heading = section_heading(section);

            let base = |id: String, text: &str| {
                let chunk = SemanticChunk::new(id, text.to_string(), ChunkKind::Doc)
                    .with_meta("source", source)
                    .with_meta("file_type", file_type)
                    .with_meta("section_index", index);
                match &heading {
                    Some(h) => chunk.with_meta("heading", h.as_str()),
                    None => chunk,
                }
            };

            if section.chars().count() <= self.max_chars {
                let text = section.trim();
                if !text.is_empty() {
                    chunks.push(base(format!("{}::doc_{}", source, index), text));
                }
                continue;
            }

            let mut sub_index = 0;
            for window in self.carve(section) {
                let text = section[window.start..window.end].trim();
                if text.is_empty() {
                    continue;
                }

                chunks.push(
                    base(format!("{}::doc_{}_{}", source, index, sub_index), text)
                        .with_meta("sub_index", sub_index),
                );
                sub_index += 1;
            }
        }

        debug!(
            "Segmented {} into {} sections and {} chunks",
            source,
            sections.len(),
            chunks.len()
        );

        chunks
    }

    /// Carve a section into overlapping windows.
    ///
    /// A window covers `[start, start + max_chars)` characters, shortened to the
    /// last paragraph break inside it when that break lies after `start` and
    /// after the previous window's end. The next window starts `overlap_chars`
    /// before the previous end; when that would not move forward, it starts at
    /// the previous end instead. Both bounds strictly increase, so carving ends.
    ///
    /// The fallback only happens after a window cut short on a paragraph break
    /// near its start, and such seams carry no overlap.
    fn carve(&self, text: &str) -> Vec<Window> {
        // byte offset of every char, plus the end of the text
        let offsets: Vec<usize> = text
            .char_indices()
            .map(|(i, _)| i)
            .chain(std::iter::once(text.len()))
            .collect();
        let total = offsets.len() - 1;

        let mut windows = Vec::new();
        let mut start = 0;
        let mut last_end = 0;

        while start < total {
            let mut end = (start + self.max_chars).min(total);

            if end < total {
                let (from, to) = (offsets[start], offsets[end]);
                if let Some(pos) = text[from..to].rfind(PARAGRAPH_BREAK) {
                    let break_at = offsets.partition_point(|&o| o < from + pos);
                    if break_at > start && break_at > last_end {
                        end = break_at;
                    }
                }
            }

            windows.push(Window {
                start: offsets[start],
                end: offsets[end],
            });
            last_end = end;

            start = if end < total {
                let next = end.saturating_sub(self.overlap_chars);
                if next > start {
                    next
                } else {
                    end
                }
            } else {
                total
            };
        }

        windows
    }
}

impl Default for DocumentSegmenter {
    fn default() -> Self {
        Self {
            max_chars: 1500,
            overlap_chars: 150,
        }
    }
}

/// Split on header lines and horizontal rules.
///
/// A marker line opens a new section only when the current one already has
/// lines, so a leading header never produces an empty section. Lines are kept
/// verbatim; a document without markers is a single section.
pub fn split_sections(content: &str) -> Vec<String> {
    let mut sections = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in content.split('\n') {
        let trimmed = line.trim();
        let is_boundary = trimmed.starts_with(HEADER_MARKER) || HORIZONTAL_RULES.contains(&trimmed);

        if is_boundary && !current.is_empty() {
            sections.push(current.join("\n"));
            current.clear();
        }
        current.push(line);
    }

    if !current.is_empty() {
        sections.push(current.join("\n"));
    }

    sections
}

/// Text of the first Markdown heading in a section, if any
fn section_heading(section: &str) -> Option<String> {
    let mut in_heading = false;
    let mut heading_text = String::new();

    for event in Parser::new(section) {
        match event {
            Event::Start(Tag::Heading { .. }) => {
                in_heading = true;
                heading_text.clear();
            }
            Event::End(TagEnd::Heading(_)) => {
                let text = heading_text.trim();
                if !text.is_empty() {
                    return Some(text.to_string());
                }
                in_heading = false;
            }
            Event::Text(text) if in_heading => {
                heading_text.push_str(&text);
            }
            Event::Code(code) if in_heading => {
                heading_text.push_str(&code);
            }
            _ => {}
        }
    }

    None
}
