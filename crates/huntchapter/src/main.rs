//! HuntChapter CLI binary.
//!
//! This binary provides command-line access to HuntChapter:
//! - Play a story in the terminal
//! - Serve the generation relay and the game API
//! - List saved sessions

use clap::Parser;
use huntchapter::HuntChapterConfig;

mod cli;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use cli::{Cli, Commands, list_sessions, play, serve};

    // Credentials may live in a .env file
    dotenvy::dotenv().ok();

    // Parse command-line arguments
    let cli = Cli::parse();

    // Initialize tracing
    let log_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    let filter = tracing_subscriber::EnvFilter::builder()
        .with_default_directive(log_level.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = HuntChapterConfig::load_with(cli.config.as_deref())?;

    // Execute the requested command
    match cli.command {
        Commands::Play(args) => {
            play(config, args).await?;
        }

        Commands::Serve { bind } => {
            serve(config, bind).await?;
        }

        Commands::Sessions { json } => {
            list_sessions(config, json).await?;
        }
    }

    Ok(())
}
