//! Play command - A terminal game against a trained policy

use std::{
    io::{self, BufRead, Write},
    path::PathBuf,
};

use anyhow::{Context, Result};
use clap::Parser;

use crate::{
    adapters::MsgPackRepository,
    cli::{config::parse_player_token, output::render_board},
    ports::PolicyRepository,
    q_learning::TrainedPolicy,
    tictactoe::{GameEnvironment, GameOutcome, Player},
};

#[derive(Parser, Debug)]
#[command(about = "Play against a trained policy")]
pub struct PlayArgs {
    /// Path to a trained policy file
    pub policy: PathBuf,

    /// Which token you play (`x` moves first)
    #[arg(long, default_value = "x")]
    pub human: String,
}

/// Run one game, reading the human's moves from `input`.
///
/// Returns `None` if the human quits or the input ends before the game does.
pub fn play_session<R: BufRead, W: Write>(
    policy: &TrainedPolicy,
    human: Player,
    mut input: R,
    mut output: W,
) -> Result<Option<GameOutcome>> {
    let mut env = GameEnvironment::new();
    writeln!(output, "You are {human}. Enter a cell number (0-8), or q to quit.")?;

    loop {
        if let Some(outcome) = env.outcome() {
            writeln!(output, "\n{}\n", render_board(env.board()))?;
            let message = match outcome {
                GameOutcome::Win(winner) if winner == human => "You win!".to_string(),
                GameOutcome::Win(winner) => format!("{winner} wins."),
                GameOutcome::Draw => "Draw.".to_string(),
            };
            writeln!(output, "{message}")?;
            return Ok(Some(outcome));
        }

        if env.player_turn() != human {
            let action = policy.select_action(&env)?;
            env.step(action)?;
            writeln!(output, "AI plays {action}")?;
            continue;
        }

        writeln!(output, "\n{}\n", render_board(env.board()))?;
        write!(output, "{human} > ")?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let line = line.trim();
        if line.eq_ignore_ascii_case("q") {
            return Ok(None);
        }

        let position = match line.parse::<usize>() {
            Ok(position) => position,
            Err(_) => {
                writeln!(output, "'{line}' is not a cell number")?;
                continue;
            }
        };
        if let Err(e) = env.step(position) {
            writeln!(output, "{e}")?;
        }
    }
}

pub fn execute(args: PlayArgs) -> Result<()> {
    let human = parse_player_token(&args.human, "--human")?;
    let saved = MsgPackRepository::new()
        .load(&args.policy)
        .with_context(|| format!("failed to load policy from {}", args.policy.display()))?;
    let policy = saved.to_policy().context("stored policy is malformed")?;

    let stdin = io::stdin();
    play_session(&policy, human, stdin.lock(), io::stdout())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(human: Player, input: &str) -> (Option<GameOutcome>, String) {
        let mut out = Vec::new();
        let outcome =
            play_session(&TrainedPolicy::default(), human, input.as_bytes(), &mut out).unwrap();
        (outcome, String::from_utf8(out).unwrap())
    }

    // An untrained policy has all-zero values, so the AI always takes the
    // lowest free cell.

    #[test]
    fn test_human_x_wins_diagonal() {
        let (outcome, text) = run(Player::X, "4\n2\n6\n");
        assert_eq!(outcome, Some(GameOutcome::Win(Player::X)));
        assert!(text.contains("AI plays 0"));
        assert!(text.contains("AI plays 1"));
        assert!(text.contains("You win!"));
    }

    #[test]
    fn test_ai_moves_first_when_human_is_o() {
        let (outcome, text) = run(Player::O, "4\n8\n");
        assert_eq!(outcome, Some(GameOutcome::Win(Player::X)));
        assert!(text.starts_with("You are O."));
        assert!(text.contains("X wins."));
    }

    #[test]
    fn test_bad_input_is_reported_and_quit_stops() {
        let (outcome, text) = run(Player::X, "4\n4\nabc\n9\nq\n");
        assert_eq!(outcome, None);
        assert!(text.contains("already occupied"));
        assert!(text.contains("'abc' is not a cell number"));
        assert!(text.contains("out of bounds"));
    }

    #[test]
    fn test_end_of_input_stops() {
        let (outcome, _) = run(Player::X, "");
        assert_eq!(outcome, None);
    }
}
