//! Chunker configuration
//!
//! Size limits are the only knobs the core strictly needs. The comment and
//! triviality heuristics live next to them so they can be tuned without code
//! changes, but their defaults reproduce the stock behaviour.

use crate::error::ConfigError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// File name looked up by [`ChunkerConfig::load_or_default`]
pub const CONFIG_FILE_NAME: &str = "semchunk.toml";

/// Full configuration handed to the pipeline
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChunkerConfig {
    /// Size limits for code and documentation chunks
    #[serde(default)]
    pub limits: ChunkLimits,

    /// Textual heuristics used while extracting code units
    #[serde(default)]
    pub heuristics: Heuristics,
}

/// Size limits, counted in characters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkLimits {
    /// Upper bound for a merged code chunk (single oversized units pass through)
    #[serde(default = "default_code_max_chars")]
    pub code_max_chars: usize,

    /// Upper bound for a documentation window
    #[serde(default = "default_doc_max_chars")]
    pub doc_max_chars: usize,

    /// Characters shared between consecutive documentation windows
    #[serde(default = "default_doc_overlap_chars")]
    pub doc_overlap_chars: usize,
}

/// Approximations used by the comment attacher and the triviality filter.
///
/// Neither is a parser: a doc comment is recognised by its leading text and a
/// unit's complexity by counting terminator characters in its body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Heuristics {
    /// Prefixes marking a comment as documentation (matched on trimmed text)
    #[serde(default = "default_doc_comment_markers")]
    pub doc_comment_markers: Vec<String>,

    /// Name prefixes (case-insensitive) of accessor-like units
    #[serde(default = "default_accessor_prefixes")]
    pub accessor_prefixes: Vec<String>,

    /// Character counted as a statement terminator
    #[serde(default = "default_statement_terminator")]
    pub statement_terminator: char,

    /// Accessors with at most this many terminators are dropped
    #[serde(default = "default_max_trivial_terminators")]
    pub max_trivial_terminators: usize,
}

fn default_code_max_chars() -> usize {
    2048
}

fn default_doc_max_chars() -> usize {
    1500
}

fn default_doc_overlap_chars() -> usize {
    150
}

fn default_doc_comment_markers() -> Vec<String> {
    vec!["/**".to_string(), "//".to_string()]
}

fn default_accessor_prefixes() -> Vec<String> {
    vec!["get".to_string(), "set".to_string(), "is".to_string()]
}

fn default_statement_terminator() -> char {
    ';'
}

fn default_max_trivial_terminators() -> usize {
    2
}

impl Default for ChunkLimits {
    fn default() -> Self {
        Self {
            code_max_chars: default_code_max_chars(),
            doc_max_chars: default_doc_max_chars(),
            doc_overlap_chars: default_doc_overlap_chars(),
        }
    }
}

impl Default for Heuristics {
    fn default() -> Self {
        Self {
            doc_comment_markers: default_doc_comment_markers(),
            accessor_prefixes: default_accessor_prefixes(),
            statement_terminator: default_statement_terminator(),
            max_trivial_terminators: default_max_trivial_terminators(),
        }
    }
}

impl ChunkLimits {
    /// Reject limits the chunkers cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.code_max_chars == 0 {
            return Err(ConfigError::NonPositive {
                field: "code_max_chars",
            });
        }
        if self.doc_max_chars == 0 {
            return Err(ConfigError::NonPositive {
                field: "doc_max_chars",
            });
        }
        if self.doc_overlap_chars >= self.doc_max_chars {
            return Err(ConfigError::OverlapTooLarge {
                overlap: self.doc_overlap_chars,
                max_chars: self.doc_max_chars,
            });
        }
        Ok(())
    }
}

impl Heuristics {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.doc_comment_markers.iter().all(|m| m.trim().is_empty()) {
            return Err(ConfigError::NoDocMarkers);
        }
        Ok(())
    }
}

impl ChunkerConfig {
    /// Validate every section of the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.limits.validate()?;
        self.heuristics.validate()
    }

    /// Load a configuration file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let config: ChunkerConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;
        config
            .validate()
            .with_context(|| format!("Invalid configuration in {:?}", path))?;
        Ok(config)
    }

    /// Load `semchunk.toml` from a directory or return defaults
    pub fn load_or_default(dir: &Path) -> Result<Self> {
        let config_path = dir.join(CONFIG_FILE_NAME);

        if config_path.exists() {
            Self::load(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Render as pretty TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize configuration")
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = self.to_toml()?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {:?}", parent))?;
        }

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {:?}", path))?;

        Ok(())
    }
}
