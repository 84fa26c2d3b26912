//! Error types for the chunking core
//!
//! Only configuration and grammar setup are fatal. Parse failures are turned
//! into empty results (plus a warning) before they leave the extractor.

use thiserror::Error;

/// Rejected chunker configuration
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{field} must be greater than zero")]
    NonPositive { field: &'static str },

    #[error("overlap of {overlap} chars must be smaller than max_chars ({max_chars})")]
    OverlapTooLarge { overlap: usize, max_chars: usize },

    #[error("at least one documentation comment marker is required")]
    NoDocMarkers,
}

/// Errors raised while building or running the chunking core
#[derive(Debug, Error)]
pub enum ChunkError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to set up {language} grammar: {reason}")]
    Grammar { language: String, reason: String },

    #[error("failed to parse {path}: {reason}")]
    Parse { path: String, reason: String },
}

pub type Result<T, E = ChunkError> = std::result::Result<T, E>;
