//! Command line argument parsing for the Tazabot CLI using clap.

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Tazabot - intent resolution for a restaurant chatbot
#[derive(Parser, Debug, Clone)]
#[command(name = "tazabot")]
#[command(about = "Intent resolution engine for a restaurant chatbot")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
pub struct TazabotArgs {
    /// Verbosity level (0=quiet, 1=normal, 2=verbose, 3=debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (overrides verbose)
    #[arg(short, long)]
    pub quiet: bool,

    /// Output format
    #[arg(short = 'f', long = "format", default_value = "human")]
    pub output_format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,

    /// Engine configuration file (JSON)
    #[arg(short, long, value_name = "CONFIG_FILE", env = "TAZABOT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

impl TazabotArgs {
    /// Get the effective verbosity level
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            match self.verbose {
                0 => 1, // Default to normal
                n => n,
            }
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Train the classifier and write a snapshot
    Train(TrainArgs),

    /// Classify a message with a saved snapshot
    Predict(PredictArgs),

    /// Answer one message, or chat interactively from stdin
    Chat(ChatArgs),

    /// Fuzzy search the menu by dish name
    Search(SearchArgs),

    /// Show snapshot metadata
    Inspect(InspectArgs),

    /// List menu items or menu statistics
    Menu(MenuArgs),
}

/// Arguments for training
#[derive(Parser, Debug, Clone)]
pub struct TrainArgs {
    /// Training corpus file (JSON)
    #[arg(long, value_name = "CORPUS_FILE")]
    pub corpus: Option<PathBuf>,

    /// Snapshot directory to write
    #[arg(short, long, value_name = "MODEL_DIR")]
    pub model_dir: Option<PathBuf>,

    /// Number of training epochs
    #[arg(short, long)]
    pub epochs: Option<usize>,

    /// Mini-batch size
    #[arg(short, long)]
    pub batch_size: Option<usize>,

    /// Adam learning rate
    #[arg(short, long)]
    pub learning_rate: Option<f32>,

    /// Seed for reproducible training
    #[arg(long)]
    pub seed: Option<u64>,
}

/// Arguments for prediction
#[derive(Parser, Debug, Clone)]
pub struct PredictArgs {
    /// Message to classify
    #[arg(value_name = "TEXT")]
    pub text: String,

    /// Snapshot directory to load
    #[arg(short, long, value_name = "MODEL_DIR")]
    pub model_dir: Option<PathBuf>,

    /// Confidence threshold overriding the configured one
    #[arg(short, long)]
    pub threshold: Option<f32>,

    /// Also print the full probability distribution
    #[arg(long)]
    pub all: bool,
}

/// Arguments for chatting
#[derive(Parser, Debug, Clone)]
pub struct ChatArgs {
    /// Message to answer; reads messages from stdin when omitted
    #[arg(value_name = "MESSAGE")]
    pub message: Option<String>,

    /// Snapshot directory to load
    #[arg(short, long, value_name = "MODEL_DIR")]
    pub model_dir: Option<PathBuf>,

    /// Menu file (JSON)
    #[arg(long, value_name = "MENU_FILE")]
    pub menu: Option<PathBuf>,

    /// Seed for reproducible response choice
    #[arg(long)]
    pub seed: Option<u64>,
}

/// Arguments for menu search
#[derive(Parser, Debug, Clone)]
pub struct SearchArgs {
    /// Dish name to look for
    #[arg(value_name = "TERM")]
    pub term: String,

    /// Menu file (JSON)
    #[arg(long, value_name = "MENU_FILE")]
    pub menu: Option<PathBuf>,
}

/// Arguments for snapshot inspection
#[derive(Parser, Debug, Clone)]
pub struct InspectArgs {
    /// Snapshot directory to inspect
    #[arg(short, long, value_name = "MODEL_DIR")]
    pub model_dir: Option<PathBuf>,
}

/// Arguments for menu listing
#[derive(Parser, Debug, Clone)]
pub struct MenuArgs {
    /// Menu file (JSON)
    #[arg(long, value_name = "MENU_FILE")]
    pub menu: Option<PathBuf>,

    /// Only list available items
    #[arg(short, long)]
    pub available: bool,

    /// Show statistics instead of items
    #[arg(short, long, conflicts_with = "available")]
    pub stats: bool,
}

/// Output formats for CLI
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
}
