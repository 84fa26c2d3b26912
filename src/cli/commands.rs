//! Command implementations

use crate::chunk::SemanticChunk;
use crate::config::ChunkerConfig;
use crate::extract::{CodeUnit, UnitExtractor};
use crate::pipeline::{ChunkSink, ChunkingPipeline, ContentKind, RawDocument};
use anyhow::{Context, Result};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Collect supported files under the given paths as raw documents.
///
/// Directories are walked recursively in file-name order. Unsupported types
/// are skipped without being read; unreadable files are skipped with a warning.
pub fn collect_documents(paths: &[PathBuf], hidden: bool) -> Result<Vec<RawDocument>> {
    let mut documents = Vec::new();

    for root in paths {
        if !root.exists() {
            anyhow::bail!("Path does not exist: {:?}", root);
        }

        let walker = WalkDir::new(root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !is_skipped(entry, hidden));

        for entry in walker {
            let entry = entry.with_context(|| format!("Failed to walk {:?}", root))?;
            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            let source = path.to_string_lossy().to_string();

            if ContentKind::classify(&source) == ContentKind::Unknown {
                debug!("Skipping unsupported file {:?}", path);
                continue;
            }

            match std::fs::read_to_string(path) {
                Ok(content) => documents.push(RawDocument::from_path(source, content)),
                Err(e) => warn!("Failed to read {:?}: {}", path, e),
            }
        }
    }

    Ok(documents)
}

/// Build and dependency directories never worth chunking
const SKIPPED_DIRS: &[&str] = &["target", "node_modules"];

fn is_skipped(entry: &walkdir::DirEntry, hidden: bool) -> bool {
    let name = entry.file_name().to_string_lossy();

    if !hidden && name.starts_with('.') {
        return true;
    }
    entry.file_type().is_dir() && SKIPPED_DIRS.contains(&name.as_ref())
}

/// Writes each chunk as one JSON object per line
pub struct JsonLinesSink<W: Write> {
    writer: W,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> ChunkSink for JsonLinesSink<W> {
    fn accept(&mut self, _source: &str, chunks: Vec<SemanticChunk>) -> Result<()> {
        for chunk in &chunks {
            serde_json::to_writer(&mut self.writer, chunk)?;
            writeln!(self.writer)?;
        }
        Ok(())
    }
}

/// Writes a human-readable summary per document
pub struct TextSink<W: Write> {
    writer: W,
}

impl<W: Write> TextSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> ChunkSink for TextSink<W> {
    fn accept(&mut self, source: &str, chunks: Vec<SemanticChunk>) -> Result<()> {
        if chunks.is_empty() {
            return Ok(());
        }

        writeln!(self.writer, "{} ({} chunks)", source, chunks.len())?;
        for chunk in &chunks {
            let preview = chunk.content.lines().next().unwrap_or("");
            writeln!(
                self.writer,
                "  {} [{}] {} chars: {}",
                chunk.id,
                chunk.chunk_kind,
                chunk.content.chars().count(),
                truncate(preview, 60)
            )?;
        }
        writeln!(self.writer)?;
        Ok(())
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let mut short: String = text.chars().take(max_chars).collect();
        short.push_str("...");
        short
    }
}

/// Chunk every supported file under `paths` into `sink`
pub fn chunk<S: ChunkSink + ?Sized>(
    pipeline: &ChunkingPipeline,
    paths: &[PathBuf],
    hidden: bool,
    sink: &mut S,
) -> Result<usize> {
    let documents = collect_documents(paths, hidden)?;
    info!("Chunking {} documents", documents.len());

    let delivered = pipeline.run_into(&documents, sink)?;
    info!("Produced {} chunks", delivered);

    Ok(delivered)
}

/// Extracted units of one code file, optionally before the triviality filter
pub fn units(config: &ChunkerConfig, file: &Path, unfiltered: bool) -> Result<Vec<CodeUnit>> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {:?}", file))?;
    let document = RawDocument::from_path(file.to_string_lossy(), content);

    if !matches!(ContentKind::classify(&document.file_type), ContentKind::Code(_)) {
        anyhow::bail!("Not a supported source file: {:?}", file);
    }

    if unfiltered {
        let extractor = UnitExtractor::new(&config.heuristics)?;
        Ok(extractor.extract_file(file, &document.content))
    } else {
        Ok(ChunkingPipeline::new(config)?.extract_units(&document))
    }
}

/// Print units in JSON format
pub fn print_units_json(units: &[CodeUnit], out: &mut impl Write) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, units)?;
    writeln!(out)?;
    Ok(())
}

/// Print units in text format
pub fn print_units_text(units: &[CodeUnit], out: &mut impl Write) -> Result<()> {
    if units.is_empty() {
        writeln!(out, "No code units found.")?;
        return Ok(());
    }

    for unit in units {
        writeln!(out, "{} ({}, {})", unit.name, unit.unit_kind, unit.language)?;
        writeln!(out, "  Lines: {}-{}", unit.start_line, unit.end_line)?;
        if let Some(doc) = unit.docstring.lines().next() {
            writeln!(out, "  Doc: {}", doc)?;
        }
    }
    Ok(())
}

/// Print the effective configuration, or write the defaults to a file
pub fn config(
    effective: &ChunkerConfig,
    write: Option<&Path>,
    force: bool,
    out: &mut impl Write,
) -> Result<()> {
    match write {
        Some(path) => {
            if path.exists() && !force {
                anyhow::bail!("{:?} already exists. Use --force to overwrite.", path);
            }
            ChunkerConfig::default().save(path)?;
            writeln!(out, "Wrote default configuration to {:?}", path)?;
        }
        None => {
            write!(out, "{}", effective.to_toml()?)?;
        }
    }
    Ok(())
}
