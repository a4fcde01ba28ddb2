use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "paper-scout",
    about = "Grounded literature briefs from recent arXiv papers",
    version
)]
pub struct Cli {
    /// TOML config file (defaults apply when omitted)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the recency half-life, in weeks
    #[arg(long, global = true)]
    pub half_life_weeks: Option<f64>,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch papers, rank evidence and write a cited brief
    Brief {
        /// Research question
        #[arg(short, long)]
        query: String,

        /// Number of papers to fetch
        #[arg(long)]
        papers: Option<usize>,

        /// Number of evidence items handed to the model
        #[arg(short, long)]
        k: Option<usize>,

        /// Output directory for briefs
        #[arg(short, long, default_value = "briefs")]
        out: PathBuf,
    },

    /// Fetch papers and print ranked evidence without drafting
    Evidence {
        /// Research question
        #[arg(short, long)]
        query: String,

        /// Number of papers to fetch
        #[arg(long)]
        papers: Option<usize>,

        /// Number of evidence items
        #[arg(short, long)]
        k: Option<usize>,

        /// Print JSON instead of markdown
        #[arg(long)]
        json: bool,
    },

    /// Rank a local corpus from a JSON request file: {"query", "corpus", "k"}
    Rank {
        /// Path to the request file
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Check that the local Ollama endpoint answers
    Health,
}
