//! CLI module for knowhow.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// knowhow - Hybrid search over work-conversation transcripts
///
/// Finds the passages of your transcripts that answer a question, using BM25 and
/// embeddings together, and returns them with their neighbouring context.
#[derive(Parser, Debug)]
#[command(name = "knowhow")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Search transcripts and print stitched context blocks
    Search {
        /// Search query
        query: String,

        /// Transcript files or directories (defaults to the configured directory)
        paths: Vec<PathBuf>,

        /// Number of ranked chunks to stitch from
        #[arg(short = 'k', long)]
        top_k: Option<usize>,

        /// Weight of the embedding score (0 = BM25 only, 1 = embeddings only)
        #[arg(short, long)]
        alpha: Option<f32>,

        /// Neighbouring chunks to include on each side of a hit
        #[arg(short, long)]
        window: Option<usize>,

        /// Token budget for each stitched block
        #[arg(short, long)]
        max_tokens: Option<usize>,

        /// Print blocks as JSON
        #[arg(long)]
        json: bool,
    },

    /// Chunk transcripts and report token sizes
    Chunks {
        /// Transcript files or directories (defaults to the configured directory)
        paths: Vec<PathBuf>,

        /// Number of largest chunks to list
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,
}
