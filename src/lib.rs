//! semchunk - Semantic chunking of source code and documentation
//!
//! This library turns raw files into bounded-size, retrieval-ready chunks:
//! code is split along method and function boundaries, documentation along
//! headers with overlapping windows for long sections.

pub mod chunk;
pub mod cli;
pub mod config;
pub mod error;
pub mod extract;
pub mod pipeline;

/// Re-export commonly used types
pub use chunk::{ChunkKind, CodeMerger, DocumentSegmenter, MetadataValue, SemanticChunk};
pub use config::{ChunkLimits, ChunkerConfig, Heuristics};
pub use error::{ChunkError, ConfigError};
pub use extract::{CodeUnit, Language, UnitExtractor, UnitKind};
pub use pipeline::{ChunkSink, ChunkingPipeline, ContentKind, RawDocument};
