//! Chunking pipeline
//!
//! Routes each raw document to the code path (extract, attach comments,
//! filter, merge) or the documentation path (segment) by its file type.
//! Batches fan out one rayon task per document; results are joined in input
//! order so chunk IDs and their order stay reproducible.

use crate::chunk::{CodeMerger, DocumentSegmenter, SemanticChunk};
use crate::config::ChunkerConfig;
use crate::error::Result;
use crate::extract::{CodeUnit, Language, TrivialityFilter, UnitExtractor};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// File types routed to the documentation path
pub const DOC_FILE_TYPES: &[&str] = &[
    "md", "markdown", "mdx", "rst", "txt", "text", "html", "htm", "adoc",
];

/// A document handed over by an ingestion collaborator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawDocument {
    /// Full text of the file
    pub content: String,
    /// Identifier used to build chunk IDs (usually a path)
    pub source: String,
    /// Extension, dotted extension, or file name used for dispatch
    pub file_type: String,
}

impl RawDocument {
    pub fn new(
        content: impl Into<String>,
        source: impl Into<String>,
        file_type: impl Into<String>,
    ) -> Self {
        Self {
            content: content.into(),
            source: source.into(),
            file_type: file_type.into(),
        }
    }

    /// Build a document whose file type is taken from the source path
    pub fn from_path(source: impl Into<String>, content: impl Into<String>) -> Self {
        let source = source.into();
        Self {
            content: content.into(),
            file_type: normalize_file_type(&source),
            source,
        }
    }
}

/// Which path a document takes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    Code(Language),
    Doc,
    Unknown,
}

impl ContentKind {
    /// Classify a file type such as `"ts"`, `".md"` or `"src/App.tsx"`
    pub fn classify(file_type: &str) -> Self {
        let normalized = normalize_file_type(file_type);

        if let Some(language) = Language::from_extension(&normalized) {
            ContentKind::Code(language)
        } else if DOC_FILE_TYPES.contains(&normalized.as_str()) {
            ContentKind::Doc
        } else {
            ContentKind::Unknown
        }
    }
}

/// Lowercased extension of a file type, path, or dotted extension
pub fn normalize_file_type(file_type: &str) -> String {
    let trimmed = file_type.trim();
    let name = trimmed.rsplit(['/', '\\']).next().unwrap_or(trimmed);
    let extension = match name.rsplit_once('.') {
        Some((_, ext)) => ext,
        None => name,
    };
    extension.to_lowercase()
}

/// Downstream consumer of chunks, such as an index writer
pub trait ChunkSink {
    /// Receive all chunks of one document
    fn accept(&mut self, source: &str, chunks: Vec<SemanticChunk>) -> anyhow::Result<()>;
}

impl ChunkSink for Vec<SemanticChunk> {
    fn accept(&mut self, _source: &str, chunks: Vec<SemanticChunk>) -> anyhow::Result<()> {
        self.extend(chunks);
        Ok(())
    }
}

/// Stateless orchestrator over the code and documentation paths
pub struct ChunkingPipeline {
    extractor: UnitExtractor,
    filter: TrivialityFilter,
    merger: CodeMerger,
    segmenter: DocumentSegmenter,
}

impl ChunkingPipeline {
    /// Build a pipeline, rejecting invalid configuration
    pub fn new(config: &ChunkerConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            extractor: UnitExtractor::new(&config.heuristics)?,
            filter: TrivialityFilter::new(&config.heuristics),
            merger: CodeMerger::new(config.limits.code_max_chars)?,
            segmenter: DocumentSegmenter::new(
                config.limits.doc_max_chars,
                config.limits.doc_overlap_chars,
            )?,
        })
    }

    /// Extracted, comment-attached and filtered units of a code document.
    ///
    /// Documents that are not code yield no units.
    pub fn extract_units(&self, document: &RawDocument) -> Vec<CodeUnit> {
        match ContentKind::classify(&document.file_type) {
            ContentKind::Code(language) => {
                let units = self
                    .extractor
                    .extract(&document.content, &document.source, language);
                let extracted = units.len();
                let kept = self.filter.retain(units);

                debug!(
                    "{}: kept {} of {} units after triviality filter",
                    document.source,
                    kept.len(),
                    extracted
                );
                kept
            }
            ContentKind::Doc | ContentKind::Unknown => Vec::new(),
        }
    }

    /// Chunk a single document
    pub fn chunk_document(&self, document: &RawDocument) -> Vec<SemanticChunk> {
        match ContentKind::classify(&document.file_type) {
            ContentKind::Code(_) => {
                let units = self.extract_units(document);
                self.merger.merge_file(&document.source, &units)
            }
            ContentKind::Doc => self.segmenter.segment(
                &document.content,
                &document.source,
                &normalize_file_type(&document.file_type),
            ),
            ContentKind::Unknown => {
                debug!(
                    "Skipping {} with unsupported type {:?}",
                    document.source, document.file_type
                );
                Vec::new()
            }
        }
    }

    /// Chunk already extracted units, grouped per file in encounter order
    pub fn chunk_units(&self, units: Vec<CodeUnit>) -> Vec<SemanticChunk> {
        self.merger.merge_units(self.filter.retain(units))
    }

    /// Chunk a batch in parallel; output follows input order
    pub fn chunk_batch(&self, documents: &[RawDocument]) -> Vec<SemanticChunk> {
        self.chunk_per_document(documents)
            .into_iter()
            .flatten()
            .collect()
    }

    /// Chunk a batch and hand each document's chunks to `sink` in input order.
    ///
    /// Returns the number of chunks delivered.
    pub fn run_into<S: ChunkSink + ?Sized>(
        &self,
        documents: &[RawDocument],
        sink: &mut S,
    ) -> anyhow::Result<usize> {
        let mut delivered = 0;

        for (document, chunks) in documents.iter().zip(self.chunk_per_document(documents)) {
            delivered += chunks.len();
            sink.accept(&document.source, chunks)?;
        }

        Ok(delivered)
    }

    fn chunk_per_document(&self, documents: &[RawDocument]) -> Vec<Vec<SemanticChunk>> {
        let results: Vec<Vec<SemanticChunk>> = documents
            .par_iter()
            .map(|document| self.chunk_document(document))
            .collect();

        debug!(
            "Chunked {} documents into {} chunks",
            documents.len(),
            results.iter().map(Vec::len).sum::<usize>()
        );

        results
    }
}
