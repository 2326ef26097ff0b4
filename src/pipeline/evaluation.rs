//! Evaluation of trained policies
//!
//! A trained policy plays its role greedily; the opponent is either a uniform
//! random mover or the same policy playing the other role.

use rand::{Rng, SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};

use crate::{
    Error, Result,
    q_learning::TrainedPolicy,
    tictactoe::{GameEnvironment, GameOutcome, Move, Player},
};

/// Results from a series of evaluation games
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    /// Role the policy played
    pub role: Player,
    pub games: usize,
    pub wins: usize,
    pub draws: usize,
    pub losses: usize,
    pub win_rate: f64,
    pub draw_rate: f64,
    pub loss_rate: f64,
}

impl EvaluationResult {
    pub fn new(role: Player, wins: usize, draws: usize, losses: usize) -> Self {
        let games = wins + draws + losses;
        let total = games.max(1) as f64;
        Self {
            role,
            games,
            wins,
            draws,
            losses,
            win_rate: wins as f64 / total,
            draw_rate: draws as f64 / total,
            loss_rate: losses as f64 / total,
        }
    }
}

/// A game played greedily by both roles
#[derive(Debug, Clone, PartialEq)]
pub struct GreedyMatch {
    pub outcome: GameOutcome,
    pub moves: Vec<Move>,
}

/// Play `games` games with `policy` as `role` against a uniform random
/// opponent.
///
/// # Errors
///
/// Returns [`Error::InvalidConfiguration`] if `games` is zero.
pub fn evaluate_against_random(
    policy: &TrainedPolicy,
    role: Player,
    games: usize,
    seed: Option<u64>,
) -> Result<EvaluationResult> {
    if games == 0 {
        return Err(Error::InvalidConfiguration {
            message: "evaluation needs at least one game".to_string(),
        });
    }

    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_rng(&mut rand::rng()),
    };
    let mut env = GameEnvironment::new();
    let (mut wins, mut draws, mut losses) = (0, 0, 0);

    for _ in 0..games {
        env.reset();
        let outcome = loop {
            let action = if env.player_turn() == role {
                policy.select_action(&env)?
            } else {
                let legal = env.available_actions();
                legal[rng.random_range(0..legal.len())]
            };
            env.step(action)?;
            if let Some(outcome) = env.outcome() {
                break outcome;
            }
        };

        match outcome {
            GameOutcome::Win(winner) if winner == role => wins += 1,
            GameOutcome::Win(_) => losses += 1,
            GameOutcome::Draw => draws += 1,
        }
    }

    let result = EvaluationResult::new(role, wins, draws, losses);
    log::info!(
        "{} vs random over {} games: win {:.3} draw {:.3} loss {:.3}",
        role,
        games,
        result.win_rate,
        result.draw_rate,
        result.loss_rate
    );
    Ok(result)
}

/// Play one game where both roles follow the policy greedily.
///
/// Deterministic for a given policy.
pub fn play_greedy_match(policy: &TrainedPolicy) -> Result<GreedyMatch> {
    let mut env = GameEnvironment::new();
    let mut moves = Vec::with_capacity(9);

    loop {
        let player = env.player_turn();
        let position = policy.select_action(&env)?;
        env.step(position)?;
        moves.push(Move { position, player });
        if let Some(outcome) = env.outcome() {
            return Ok(GreedyMatch { outcome, moves });
        }
    }
}
