//! Shared configuration helpers for CLI commands

use std::{fs::File, io::BufReader, path::Path};

use anyhow::{Context, Result, anyhow};

use crate::{pipeline::TrainingConfig, tictactoe::Player};

/// Load a training configuration from a JSON file.
///
/// Missing fields take their default values.
pub fn load_training_config(path: &Path) -> Result<TrainingConfig> {
    let file = File::open(path)
        .with_context(|| format!("failed to open config file {}", path.display()))?;
    let config: TrainingConfig = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("failed to parse config file {}", path.display()))?;
    Ok(config)
}

pub(crate) fn parse_player_token(value: &str, flag: &str) -> Result<Player> {
    match value.trim().to_ascii_lowercase().as_str() {
        "x" | "first" => Ok(Player::X),
        "o" | "second" => Ok(Player::O),
        other => Err(anyhow!(
            "Invalid value '{other}' for {flag} (expected 'x' or 'o')"
        )),
    }
}
