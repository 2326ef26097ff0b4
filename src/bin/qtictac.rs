//! qtictac CLI - Self-play Q-learning for tic-tac-toe
//!
//! This CLI provides:
//! - Training X and O value tables by self-play
//! - Evaluating a trained policy
//! - Playing against a trained policy in the terminal

use anyhow::Result;
use clap::{Parser, Subcommand};
use env_logger::Env;

#[derive(Parser)]
#[command(name = "qtictac")]
#[command(version, about = "Self-play Q-learning for tic-tac-toe", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train both roles by self-play
    Train(Box<qtictac::cli::commands::train::TrainArgs>),

    /// Evaluate a trained policy
    Evaluate(qtictac::cli::commands::evaluate::EvaluateArgs),

    /// Play against a trained policy
    Play(qtictac::cli::commands::play::PlayArgs),
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Train(args) => qtictac::cli::commands::train::execute(*args),
        Commands::Evaluate(args) => qtictac::cli::commands::evaluate::execute(args),
        Commands::Play(args) => qtictac::cli::commands::play::execute(args),
    }
}
