//! CLI command definitions.

use clap::{Args, Parser, Subcommand};
use huntchapter::Universe;
use std::path::PathBuf;

/// HuntChapter - choice-based adventures written by language models
#[derive(Parser, Debug)]
#[command(name = "huntchapter")]
#[command(about = "Choice-based adventures written by language models", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file layered over the defaults
    #[arg(short, long, global = true, env = "HUNTCHAPTER_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Play a story in the terminal
    Play(PlayArgs),

    /// Serve the generation relay and the game API
    Serve {
        /// Address to listen on, overriding the configuration
        #[arg(long)]
        bind: Option<String>,
    },

    /// List saved sessions
    Sessions {
        /// Print the summaries as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Options of the `play` command
#[derive(Args, Debug, Clone, Default)]
pub struct PlayArgs {
    /// Preset universe (frontieres, arcanes, metropole, heritages)
    #[arg(long, value_parser = clap::value_parser!(Universe))]
    pub universe: Option<Universe>,

    /// Literary genre
    #[arg(long)]
    pub genre: Option<String>,

    /// Narrative tone
    #[arg(long)]
    pub tone: Option<String>,

    /// Point of view
    #[arg(long)]
    pub pov: Option<String>,

    /// Setting of the adventure
    #[arg(long)]
    pub setting: Option<String>,

    /// Save the session after every turn
    #[arg(long)]
    pub save: bool,

    /// Continue a saved session instead of starting one
    #[arg(long, conflicts_with_all = ["universe", "genre", "tone", "pov", "setting"])]
    pub resume: Option<String>,
}
