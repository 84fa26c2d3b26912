//! Packing code units into size-bounded chunks
//!
//! Units of one file are folded, in source order, into an accumulator that is
//! flushed whenever the next entry would push it past `max_chars`. A unit that
//! is larger than the limit on its own still becomes exactly one chunk; code is
//! never truncated. Files never share a chunk.

use super::{ChunkKind, SemanticChunk};
use crate::error::ConfigError;
use crate::extract::{CodeUnit, Language};
use tracing::debug;

/// Separator placed between entries of one chunk
pub const ENTRY_SEPARATOR: &str = "\n\n";

/// Merges the units of a file into code chunks
#[derive(Debug, Clone, Copy)]
pub struct CodeMerger {
    max_chars: usize,
}

/// Running state of the fold over one file's units
struct Accumulator<'a> {
    file_path: &'a str,
    entries: Vec<String>,
    length: usize,
    language: Option<Language>,
    span: Option<(usize, usize)>,
    ordinal: usize,
    chunks: Vec<SemanticChunk>,
}

impl<'a> Accumulator<'a> {
    fn new(file_path: &'a str) -> Self {
        Self {
            file_path,
            entries: Vec::new(),
            length: 0,
            language: None,
            span: None,
            ordinal: 0,
            chunks: Vec::new(),
        }
    }

    fn push(mut self, unit: &CodeUnit, max_chars: usize) -> Self {
        let entry = unit.entry_text();
        let entry_len = entry.chars().count();

        if self.length + entry_len > max_chars && !self.entries.is_empty() {
            self = self.flush();
        }

        self.length += entry_len;
        self.entries.push(entry);
        self.language = Some(unit.language);
        self.span = Some(match self.span {
            Some((start, end)) => (start.min(unit.start_line), end.max(unit.end_line)),
            None => (unit.start_line, unit.end_line),
        });
        self
    }

    fn flush(mut self) -> Self {
        if self.entries.is_empty() {
            return self;
        }

        let unit_count = self.entries.len();
        let content = std::mem::take(&mut self.entries).join(ENTRY_SEPARATOR);

        let mut chunk = SemanticChunk::new(
            format!("{}::chunk_{}", self.file_path, self.ordinal),
            content,
            ChunkKind::Code,
        )
        .with_meta("file_path", self.file_path)
        .with_meta("chunk_index", self.ordinal)
        .with_meta("unit_count", unit_count);

        if let Some(language) = self.language.take() {
            chunk = chunk.with_meta("language", language.to_string());
        }
        if let Some((start, end)) = self.span.take() {
            chunk = chunk
                .with_meta("start_line", start)
                .with_meta("end_line", end);
        }

        self.chunks.push(chunk);
        self.ordinal += 1;
        self.length = 0;
        self
    }

    fn finish(self) -> Vec<SemanticChunk> {
        self.flush().chunks
    }
}

impl CodeMerger {
    /// Create a merger with the given chunk limit
    pub fn new(max_chars: usize) -> Result<Self, ConfigError> {
        if max_chars == 0 {
            return Err(ConfigError::NonPositive {
                field: "code_max_chars",
            });
        }
        Ok(Self { max_chars })
    }

    /// Merge the units of one file, already sorted by start line
    pub fn merge_file(&self, file_path: &str, units: &[CodeUnit]) -> Vec<SemanticChunk> {
        let chunks = units
            .iter()
            .fold(Accumulator::new(file_path), |acc, unit| {
                acc.push(unit, self.max_chars)
            })
            .finish();

        debug!(
            "Merged {} units of {} into {} chunks",
            units.len(),
            file_path,
            chunks.len()
        );

        chunks
    }

    /// Merge units from any number of files.
    ///
    /// Files are processed in the order they first appear; each file's units
    /// are stable-sorted by start line before merging.
    pub fn merge_units(&self, units: Vec<CodeUnit>) -> Vec<SemanticChunk> {
        let mut files: Vec<(String, Vec<CodeUnit>)> = Vec::new();

        for unit in units {
            match files.iter_mut().find(|(path, _)| *path == unit.file_path) {
                Some((_, group)) => group.push(unit),
                None => files.push((unit.file_path.clone(), vec![unit])),
            }
        }

        files
            .into_iter()
            .flat_map(|(path, mut group)| {
                group.sort_by_key(|u| u.start_line);
                self.merge_file(&path, &group)
            })
            .collect()
    }
}

impl Default for CodeMerger {
    fn default() -> Self {
        Self { max_chars: 2048 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::MetadataValue;
    use crate::extract::UnitKind;

    fn unit(file: &str, name: &str, line: usize, body: &str) -> CodeUnit {
        CodeUnit::new(file, name, UnitKind::Method, body, Language::Java, line, line + 2)
    }

    fn sized(file: &str, name: &str, line: usize, len: usize) -> CodeUnit {
        let body = format!("void {}() {{{}}}", name, "x".repeat(len.saturating_sub(name.len() + 10)));
        unit(file, name, line, &body)
    }

    #[test]
    fn test_small_units_share_a_chunk() {
        let merger = CodeMerger::new(2048).unwrap();
        let units = vec![
            unit("A.java", "a", 1, "void a() { x(); }"),
            unit("A.java", "b", 5, "void b() { y(); }").with_docstring("/** B */"),
        ];

        let chunks = merger.merge_file("A.java", &units);

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].id, "A.java::chunk_0");
        assert_eq!(
            chunks[0].content,
            "void a() { x(); }\n\n/** B */\nvoid b() { y(); }"
        );
        assert_eq!(chunks[0].chunk_kind, ChunkKind::Code);
        assert_eq!(chunks[0].meta("language"), Some(&MetadataValue::from("java")));
        assert_eq!(chunks[0].meta("unit_count"), Some(&MetadataValue::Integer(2)));
        assert_eq!(chunks[0].meta("start_line"), Some(&MetadataValue::Integer(1)));
        assert_eq!(chunks[0].meta("end_line"), Some(&MetadataValue::Integer(7)));
    }

    #[test]
    fn test_flushes_before_exceeding_limit() {
        let merger = CodeMerger::new(100).unwrap();
        let units = vec![
            sized("A.java", "a", 1, 40),
            sized("A.java", "b", 5, 40),
            sized("A.java", "c", 9, 40),
        ];

        let chunks = merger.merge_file("A.java", &units);

        let ids: Vec<_> = chunks.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["A.java::chunk_0", "A.java::chunk_1"]);
        assert_eq!(chunks[0].meta("unit_count"), Some(&MetadataValue::Integer(2)));
        assert_eq!(chunks[1].meta("chunk_index"), Some(&MetadataValue::Integer(1)));
    }

    #[test]
    fn test_oversized_unit_passes_through_whole() {
        let merger = CodeMerger::new(50).unwrap();
        let big = sized("A.java", "big", 10, 500);
        let units = vec![sized("A.java", "a", 1, 20), big.clone(), sized("A.java", "c", 40, 20)];

        let chunks = merger.merge_file("A.java", &units);

        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[1].content, big.entry_text());
        assert!(chunks[1].content.chars().count() > 50);
    }

    #[test]
    fn test_merging_is_lossless_and_ordered() {
        let merger = CodeMerger::new(120).unwrap();
        let units: Vec<_> = (0..12)
            .map(|i| sized("A.java", &format!("m{}", i), i * 4 + 1, 25 + i * 7))
            .collect();

        let chunks = merger.merge_file("A.java", &units);

        let rebuilt: Vec<String> = chunks
            .iter()
            .flat_map(|c| c.content.split(ENTRY_SEPARATOR).map(str::to_string))
            .collect();
        let expected: Vec<String> = units.iter().map(CodeUnit::entry_text).collect();
        assert_eq!(rebuilt, expected);
    }

    #[test]
    fn test_merging_is_deterministic() {
        let merger = CodeMerger::new(90).unwrap();
        let units: Vec<_> = (0..8)
            .map(|i| sized("A.java", &format!("m{}", i), i + 1, 30 + i * 5))
            .collect();

        assert_eq!(
            merger.merge_file("A.java", &units),
            merger.merge_file("A.java", &units)
        );
    }

    #[test]
    fn test_files_are_merged_independently() {
        let merger = CodeMerger::new(2048).unwrap();
        let units = vec![
            unit("B.java", "late", 20, "void late() {}"),
            unit("A.java", "a", 1, "void a() {}"),
            unit("B.java", "early", 2, "void early() {}"),
        ];

        let chunks = merger.merge_units(units);

        let ids: Vec<_> = chunks.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["B.java::chunk_0", "A.java::chunk_0"]);
        assert!(chunks[0].content.starts_with("void early()"));
        assert_eq!(chunks[1].meta("file_path"), Some(&MetadataValue::from("A.java")));
    }

    #[test]
    fn test_empty_input_yields_nothing() {
        let merger = CodeMerger::default();
        assert!(merger.merge_file("A.java", &[]).is_empty());
        assert!(merger.merge_units(Vec::new()).is_empty());
    }

    #[test]
    fn test_zero_limit_is_rejected() {
        assert!(CodeMerger::new(0).is_err());
    }
}
