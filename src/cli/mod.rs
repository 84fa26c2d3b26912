//! CLI interface using clap
//!
//! Provides the command-line host around the chunking pipeline

mod commands;

pub use commands::*;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// semchunk - Semantic chunking for code and documentation
#[derive(Parser, Debug)]
#[command(name = "semchunk")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Configuration file (defaults to ./semchunk.toml when present)
    #[arg(short, long, global = true, env = "SEMCHUNK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format (text, json)
    #[arg(short = 'o', long, global = true, default_value = "text")]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Chunk files and directories
    Chunk(ChunkArgs),

    /// List the code units extracted from a file
    Units(UnitsArgs),

    /// Show or write configuration
    Config(ConfigArgs),
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Arguments for chunk command
#[derive(Parser, Debug)]
pub struct ChunkArgs {
    /// Files or directories to chunk
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Include hidden files and directories
    #[arg(long)]
    pub hidden: bool,
}

/// Arguments for units command
#[derive(Parser, Debug)]
pub struct UnitsArgs {
    /// Source file to inspect
    pub file: PathBuf,

    /// Show units dropped by the triviality filter as well
    #[arg(long)]
    pub unfiltered: bool,
}

/// Arguments for config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Write the default configuration to this file
    #[arg(long)]
    pub write: Option<PathBuf>,

    /// Overwrite an existing file
    #[arg(short, long)]
    pub force: bool,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::parse_from(["semchunk", "chunk", "src", "docs/guide.md"]);

        if let Commands::Chunk(args) = cli.command {
            assert_eq!(args.paths, vec![PathBuf::from("src"), PathBuf::from("docs/guide.md")]);
            assert!(!args.hidden);
        } else {
            panic!("expected chunk command");
        }
        assert_eq!(cli.format, OutputFormat::Text);
    }

    #[test]
    fn test_global_flags() {
        let cli = Cli::parse_from([
            "semchunk",
            "units",
            "A.java",
            "--format",
            "json",
            "--config",
            "custom.toml",
            "-v",
        ]);

        assert!(cli.verbose);
        assert_eq!(cli.format, OutputFormat::Json);
        assert_eq!(cli.config, Some(PathBuf::from("custom.toml")));
        assert!(matches!(cli.command, Commands::Units(_)));
    }

    #[test]
    fn test_chunk_requires_paths() {
        assert!(Cli::try_parse_from(["semchunk", "chunk"]).is_err());
    }

    #[test]
    fn test_config_command() {
        let cli = Cli::parse_from(["semchunk", "config", "--write", "semchunk.toml", "--force"]);
        if let Commands::Config(args) = cli.command {
            assert_eq!(args.write, Some(PathBuf::from("semchunk.toml")));
            assert!(args.force);
        } else {
            panic!("expected config command");
        }
    }
}
