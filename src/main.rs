//! semchunk - Semantic chunking tool
//!
//! Splits source code and documentation into retrieval-ready chunks and
//! prints them as text or JSON lines.

use anyhow::{Context, Result};
use semchunk::cli::{self, Cli, Commands, JsonLinesSink, OutputFormat, TextSink};
use semchunk::{ChunkerConfig, ChunkingPipeline};
use std::io::Write;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse_args();

    // Setup logging on stderr so stdout stays machine-readable
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let config = load_config(&cli)?;
    let stdout = std::io::stdout();

    match cli.command {
        Commands::Chunk(args) => {
            let pipeline = ChunkingPipeline::new(&config)?;
            let out = stdout.lock();

            match cli.format {
                OutputFormat::Json => {
                    let mut sink = JsonLinesSink::new(out);
                    cli::chunk(&pipeline, &args.paths, args.hidden, &mut sink)?;
                    sink.into_inner().flush()?;
                }
                OutputFormat::Text => {
                    let mut sink = TextSink::new(out);
                    let total = cli::chunk(&pipeline, &args.paths, args.hidden, &mut sink)?;
                    let mut out = sink.into_inner();
                    writeln!(out, "Total: {} chunks", total)?;
                    out.flush()?;
                }
            }
        }

        Commands::Units(args) => {
            let units = cli::units(&config, &args.file, args.unfiltered)?;
            let mut out = stdout.lock();

            match cli.format {
                OutputFormat::Json => cli::print_units_json(&units, &mut out)?,
                OutputFormat::Text => cli::print_units_text(&units, &mut out)?,
            }
        }

        Commands::Config(args) => {
            let mut out = stdout.lock();
            cli::config(&config, args.write.as_deref(), args.force, &mut out)?;
        }
    }

    Ok(())
}

/// Load the configuration named on the command line, or `semchunk.toml` from
/// the working directory
fn load_config(cli: &Cli) -> Result<ChunkerConfig> {
    match &cli.config {
        Some(path) => ChunkerConfig::load(path),
        None => {
            let cwd = std::env::current_dir().context("Failed to read current directory")?;
            ChunkerConfig::load_or_default(&cwd)
        }
    }
}
