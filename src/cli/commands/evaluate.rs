//! Evaluate command - Greedy self-play and play against a random opponent

use std::{fs::File, path::PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;

use crate::{
    adapters::MsgPackRepository,
    cli::{
        config::parse_player_token,
        output::{format_number, format_percent, print_kv, print_section, print_subsection},
    },
    pipeline::{EvaluationResult, evaluate_against_random, play_greedy_match},
    ports::PolicyRepository,
    q_learning::TrainedPolicy,
    tictactoe::{GameOutcome, Player},
};

#[derive(Parser, Debug)]
#[command(about = "Evaluate a trained policy")]
pub struct EvaluateArgs {
    /// Path to a trained policy file
    pub policy: PathBuf,

    /// Number of games per role against the random opponent
    #[arg(long, short = 'g', default_value_t = 1000)]
    pub games: usize,

    /// Only evaluate this role (`x` or `o`)
    #[arg(long)]
    pub role: Option<String>,

    /// Random seed for the opponent
    #[arg(long)]
    pub seed: Option<u64>,

    /// Export results to a JSON file
    #[arg(long)]
    pub export: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct EvaluationExport {
    greedy_outcome: String,
    greedy_moves: Vec<usize>,
    vs_random: Vec<EvaluationResult>,
}

fn describe(outcome: GameOutcome) -> String {
    match outcome {
        GameOutcome::Win(player) => format!("{player} wins"),
        GameOutcome::Draw => "draw".to_string(),
    }
}

pub fn execute(args: EvaluateArgs) -> Result<()> {
    let saved = MsgPackRepository::new()
        .load(&args.policy)
        .with_context(|| format!("failed to load policy from {}", args.policy.display()))?;
    let policy: TrainedPolicy = saved.to_policy().context("stored policy is malformed")?;

    let roles = match &args.role {
        Some(token) => vec![parse_player_token(token, "--role")?],
        None => vec![Player::X, Player::O],
    };

    print_section("Policy Evaluation");
    print_kv("Policy", &args.policy.display().to_string());
    print_kv("Trained episodes", &format_number(saved.metadata.episodes));
    print_kv("X entries", &format_number(policy.table(Player::X).len()));
    print_kv("O entries", &format_number(policy.table(Player::O).len()));
    if let Some(rate) = saved.metadata.final_draw_rate {
        print_kv("Final window draws", &format_percent(rate));
    }

    let greedy = play_greedy_match(&policy)?;
    let greedy_moves: Vec<usize> = greedy.moves.iter().map(|m| m.position).collect();
    print_subsection("Greedy self-play");
    print_kv("Moves", &format!("{greedy_moves:?}"));
    print_kv("Outcome", &describe(greedy.outcome));

    let mut results = Vec::with_capacity(roles.len());
    for (i, role) in roles.into_iter().enumerate() {
        let seed = args.seed.map(|s| s.wrapping_add(i as u64));
        let result = evaluate_against_random(&policy, role, args.games, seed)?;

        print_subsection(&format!("{role} vs random ({} games)", args.games));
        print_kv("Wins", &format_percent(result.win_rate));
        print_kv("Draws", &format_percent(result.draw_rate));
        print_kv("Losses", &format_percent(result.loss_rate));
        results.push(result);
    }

    if let Some(path) = &args.export {
        let file = File::create(path)
            .with_context(|| format!("failed to create {}", path.display()))?;
        let export = EvaluationExport {
            greedy_outcome: describe(greedy.outcome),
            greedy_moves,
            vs_random: results,
        };
        serde_json::to_writer_pretty(file, &export).context("failed to write evaluation")?;
        println!("\nSaved evaluation to {}", path.display());
    }

    Ok(())
}
