//! Observer port - abstraction for training observation and data collection
//!
//! This port defines the interface for observing training events,
//! allowing composable data collection without coupling the training
//! loop to progress bars, logs or metric files.

use crate::{Result, pipeline::WindowStats, tictactoe::GameOutcome};

/// Observer trait for monitoring self-play training
///
/// # Event Sequence
///
/// 1. `on_training_start(total_episodes)` - Once at the beginning
/// 2. For each episode:
///    - `on_episode_end(episode, outcome, moves, epsilon)` - after both
///      tables were updated
///    - `on_window(stats)` - after every `eval_interval` episodes
/// 3. `on_training_end()` - Once at the end
///
/// # Examples
///
/// ```no_run
/// use qtictac::{ports::Observer, tictactoe::GameOutcome};
///
/// struct DrawCounter {
///     draws: usize,
/// }
///
/// impl Observer for DrawCounter {
///     fn on_episode_end(
///         &mut self,
///         _episode: usize,
///         outcome: GameOutcome,
///         _moves: usize,
///         _epsilon: f64,
///     ) -> qtictac::Result<()> {
///         if outcome.is_draw() {
///             self.draws += 1;
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait Observer {
    /// Called when training starts.
    fn on_training_start(&mut self, _total_episodes: usize) -> Result<()> {
        Ok(())
    }

    /// Called when an episode ends.
    ///
    /// # Parameters
    ///
    /// * `episode` - Index of the episode (0-based)
    /// * `outcome` - Final result of the game
    /// * `moves` - Number of moves played
    /// * `epsilon` - Exploration rate used for the episode
    fn on_episode_end(
        &mut self,
        _episode: usize,
        _outcome: GameOutcome,
        _moves: usize,
        _epsilon: f64,
    ) -> Result<()> {
        Ok(())
    }

    /// Called when an evaluation window closes.
    fn on_window(&mut self, _stats: &WindowStats) -> Result<()> {
        Ok(())
    }

    /// Called when training ends.
    fn on_training_end(&mut self) -> Result<()> {
        Ok(())
    }
}
