//! Foresight CLI - adversarial search playground
//!
//! This CLI provides a unified interface for:
//! - Playing two alpha-beta agents against each other on a connect-N board
//! - Running expectimax escape episodes in the grid world
//! - Training the temporal-difference learning agent over repeated episodes

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "foresight")]
#[command(version, about = "Depth-bounded adversarial search toolkit", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play two alpha-beta agents against each other on a connect-N board
    Duel(foresight::cli::DuelArgs),

    /// Run one expectimax escape episode in the grid world
    Escape(foresight::cli::EscapeArgs),

    /// Train the TD learning agent over repeated escape episodes
    Train(foresight::cli::TrainArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Duel(args) => foresight::cli::duel(args),
        Commands::Escape(args) => foresight::cli::escape(args),
        Commands::Train(args) => foresight::cli::train(args),
    }
}
