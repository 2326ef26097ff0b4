//! Observer implementations for training pipelines
//!
//! Observers allow composable data collection during training without coupling
//! the training loop to terminals or files.

use std::{cell::RefCell, rc::Rc};

use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};

use crate::{
    Result,
    pipeline::WindowStats,
    ports::Observer,
    tictactoe::{GameOutcome, Player},
};

/// Progress bar observer - Shows training progress
pub struct ProgressObserver {
    progress_bar: Option<ProgressBar>,
    x_wins: usize,
    o_wins: usize,
    draws: usize,
    last_draw_rate: Option<f64>,
}

impl ProgressObserver {
    /// Create a new progress observer
    pub fn new() -> Self {
        Self {
            progress_bar: None,
            x_wins: 0,
            o_wins: 0,
            draws: 0,
            last_draw_rate: None,
        }
    }

    fn message(&self) -> String {
        match self.last_draw_rate {
            Some(rate) => format!(
                "X:{} O:{} D:{} window draw {:.0}%",
                self.x_wins,
                self.o_wins,
                self.draws,
                rate * 100.0
            ),
            None => format!("X:{} O:{} D:{}", self.x_wins, self.o_wins, self.draws),
        }
    }
}

impl Default for ProgressObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl Observer for ProgressObserver {
    fn on_training_start(&mut self, total_episodes: usize) -> Result<()> {
        let pb = ProgressBar::new(total_episodes as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} episodes ({msg})")
                .map_err(|e| crate::Error::ProgressBarTemplate {
                    message: e.to_string(),
                })?
                .progress_chars("=>-"),
        );
        self.progress_bar = Some(pb);
        Ok(())
    }

    fn on_episode_end(
        &mut self,
        episode: usize,
        outcome: GameOutcome,
        _moves: usize,
        _epsilon: f64,
    ) -> Result<()> {
        match outcome {
            GameOutcome::Win(Player::X) => self.x_wins += 1,
            GameOutcome::Win(Player::O) => self.o_wins += 1,
            GameOutcome::Draw => self.draws += 1,
        }

        if let Some(pb) = &self.progress_bar {
            pb.set_position(episode as u64 + 1);
            pb.set_message(self.message());
        }
        Ok(())
    }

    fn on_window(&mut self, stats: &WindowStats) -> Result<()> {
        self.last_draw_rate = Some(stats.draw_rate);
        Ok(())
    }

    fn on_training_end(&mut self) -> Result<()> {
        if let Some(pb) = &self.progress_bar {
            pb.finish_with_message(self.message());
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
struct MetricsState {
    x_wins: usize,
    o_wins: usize,
    draws: usize,
    move_counts: Vec<usize>,
    best_draw_rate: Option<f64>,
}

/// Metrics observer - Tracks training metrics
///
/// Clones share their counters, so one clone can be handed to the trainer
/// while another is kept to read the summary afterwards.
#[derive(Debug, Clone, Default)]
pub struct MetricsObserver {
    state: Rc<RefCell<MetricsState>>,
}

impl MetricsObserver {
    /// Create a new metrics observer
    pub fn new() -> Self {
        Self::default()
    }

    /// Get metrics summary
    pub fn summary(&self) -> MetricsSummary {
        let state = self.state.borrow();
        let total = state.move_counts.len();
        let rate = |count: usize| {
            if total == 0 {
                0.0
            } else {
                count as f64 / total as f64
            }
        };
        let avg_game_length = if total == 0 {
            0.0
        } else {
            state.move_counts.iter().sum::<usize>() as f64 / total as f64
        };

        MetricsSummary {
            total_episodes: total,
            x_wins: state.x_wins,
            o_wins: state.o_wins,
            draws: state.draws,
            x_win_rate: rate(state.x_wins),
            o_win_rate: rate(state.o_wins),
            draw_rate: rate(state.draws),
            avg_game_length,
            best_window_draw_rate: state.best_draw_rate,
        }
    }
}

/// Summary of training metrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsSummary {
    pub total_episodes: usize,
    pub x_wins: usize,
    pub o_wins: usize,
    pub draws: usize,
    pub x_win_rate: f64,
    pub o_win_rate: f64,
    pub draw_rate: f64,
    pub avg_game_length: f64,
    pub best_window_draw_rate: Option<f64>,
}

impl Observer for MetricsObserver {
    fn on_episode_end(
        &mut self,
        _episode: usize,
        outcome: GameOutcome,
        moves: usize,
        _epsilon: f64,
    ) -> Result<()> {
        let mut state = self.state.borrow_mut();
        match outcome {
            GameOutcome::Win(Player::X) => state.x_wins += 1,
            GameOutcome::Win(Player::O) => state.o_wins += 1,
            GameOutcome::Draw => state.draws += 1,
        }
        state.move_counts.push(moves);
        Ok(())
    }

    fn on_window(&mut self, stats: &WindowStats) -> Result<()> {
        let mut state = self.state.borrow_mut();
        let best = state.best_draw_rate.map_or(stats.draw_rate, |b| b.max(stats.draw_rate));
        state.best_draw_rate = Some(best);
        Ok(())
    }
}
