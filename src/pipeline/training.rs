//! Self-play training loop
//!
//! Both roles learn at once from the same stream of games. During an episode
//! each role only records the (state, action) pairs it played; when the game
//! ends the terminal reward is pushed through every recorded pair of each
//! role's table. Intermediate steps never update the tables.

use std::{path::Path, time::Instant};

use serde::{Deserialize, Serialize};

use crate::{
    Error, Result,
    ports::Observer,
    q_learning::{
        ActionSelector, SavedPolicy, TdParams, TrainedPolicy, TrainingMetadata, ValueTable,
    },
    tictactoe::{GameEnvironment, GameOutcome, Player, StateKey},
};

/// Training configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Number of self-play episodes
    pub episodes: usize,

    /// Learning rate α
    pub learning_rate: f64,

    /// Discount factor γ
    pub discount: f64,

    /// Exploration rate of the first episode
    pub epsilon_initial: f64,

    /// Multiplicative decay applied once per episode
    pub epsilon_decay: f64,

    /// Lower bound on the exploration rate
    pub epsilon_min: f64,

    /// Episodes per evaluation window
    pub eval_interval: usize,

    /// Random seed
    pub seed: Option<u64>,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            episodes: 5_000,
            learning_rate: 0.1,
            discount: 0.9,
            epsilon_initial: 1.0,
            epsilon_decay: 0.995,
            epsilon_min: 0.0,
            eval_interval: 25,
            seed: None,
        }
    }
}

impl TrainingConfig {
    pub fn with_episodes(mut self, episodes: usize) -> Self {
        self.episodes = episodes;
        self
    }

    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    pub fn with_discount(mut self, discount: f64) -> Self {
        self.discount = discount;
        self
    }

    pub fn with_epsilon(mut self, initial: f64, decay: f64) -> Self {
        self.epsilon_initial = initial;
        self.epsilon_decay = decay;
        self
    }

    pub fn with_epsilon_min(mut self, epsilon_min: f64) -> Self {
        self.epsilon_min = epsilon_min;
        self
    }

    pub fn with_eval_interval(mut self, eval_interval: usize) -> Self {
        self.eval_interval = eval_interval;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Check that every parameter is in range.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        let invalid = |message: String| Err(Error::InvalidConfiguration { message });

        if self.episodes == 0 {
            return invalid("episodes must be at least 1".to_string());
        }
        if self.eval_interval == 0 {
            return invalid("eval_interval must be at least 1".to_string());
        }
        if !(self.learning_rate > 0.0 && self.learning_rate <= 1.0) {
            return invalid(format!(
                "learning_rate {} must be in (0, 1]",
                self.learning_rate
            ));
        }
        if !(0.0..=1.0).contains(&self.discount) {
            return invalid(format!("discount {} must be in [0, 1]", self.discount));
        }
        if !(0.0..=1.0).contains(&self.epsilon_initial) {
            return invalid(format!(
                "epsilon_initial {} must be in [0, 1]",
                self.epsilon_initial
            ));
        }
        if !(self.epsilon_decay > 0.0 && self.epsilon_decay <= 1.0) {
            return invalid(format!(
                "epsilon_decay {} must be in (0, 1]",
                self.epsilon_decay
            ));
        }
        if !(0.0..=self.epsilon_initial).contains(&self.epsilon_min) {
            return invalid(format!(
                "epsilon_min {} must be in [0, epsilon_initial]",
                self.epsilon_min
            ));
        }
        Ok(())
    }

    /// Exploration rate for a 0-based episode index
    pub fn epsilon_at(&self, episode: usize) -> f64 {
        (self.epsilon_initial * self.epsilon_decay.powf(episode as f64)).max(self.epsilon_min)
    }

    pub fn td_params(&self) -> TdParams {
        TdParams::new(self.learning_rate, self.discount)
    }
}

/// Win/draw rates over one evaluation window
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindowStats {
    /// Number of episodes completed when the window closed
    pub episode: usize,
    pub x_win_rate: f64,
    pub o_win_rate: f64,
    pub draw_rate: f64,
    /// Exploration rate of the window's last episode
    pub epsilon: f64,
}

/// Outcome tallies for the window in progress
#[derive(Debug, Default)]
struct WindowCounter {
    x_wins: usize,
    o_wins: usize,
    draws: usize,
    episodes: usize,
}

impl WindowCounter {
    fn record(&mut self, outcome: GameOutcome) {
        match outcome {
            GameOutcome::Win(Player::X) => self.x_wins += 1,
            GameOutcome::Win(Player::O) => self.o_wins += 1,
            GameOutcome::Draw => self.draws += 1,
        }
        self.episodes += 1;
    }

    fn close(&mut self, episode: usize, epsilon: f64) -> WindowStats {
        let total = self.episodes.max(1) as f64;
        let stats = WindowStats {
            episode,
            x_win_rate: self.x_wins as f64 / total,
            o_win_rate: self.o_wins as f64 / total,
            draw_rate: self.draws as f64 / total,
            epsilon,
        };
        *self = Self::default();
        stats
    }
}

/// Summary of a training run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainingReport {
    /// Total episodes played
    pub episodes: usize,

    pub x_wins: usize,

    pub o_wins: usize,

    pub draws: usize,

    /// One entry per complete evaluation window
    pub windows: Vec<WindowStats>,

    /// Whether each episode ended in a draw
    pub draw_games: Vec<bool>,

    /// Wall-clock duration in seconds
    pub elapsed_secs: f64,
}

impl TrainingReport {
    pub fn first_window(&self) -> Option<&WindowStats> {
        self.windows.first()
    }

    pub fn last_window(&self) -> Option<&WindowStats> {
        self.windows.last()
    }

    /// Draw rate over the whole run
    pub fn draw_rate(&self) -> f64 {
        if self.episodes == 0 {
            0.0
        } else {
            self.draws as f64 / self.episodes as f64
        }
    }

    /// Save report to JSON file
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = std::fs::File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }

    /// Load report from JSON file
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let report = serde_json::from_reader(file)?;
        Ok(report)
    }
}

/// Result of a single self-play episode
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpisodeResult {
    pub outcome: GameOutcome,
    pub moves: usize,
    pub epsilon: f64,
}

/// Everything a finished run produces
#[derive(Debug, Clone)]
pub struct TrainingRun {
    pub config: TrainingConfig,
    pub policy: TrainedPolicy,
    pub report: TrainingReport,
}

impl TrainingRun {
    /// Metadata stored next to the saved tables
    pub fn metadata(&self) -> TrainingMetadata {
        TrainingMetadata {
            episodes: self.report.episodes,
            learning_rate: self.config.learning_rate,
            discount: self.config.discount,
            epsilon_initial: self.config.epsilon_initial,
            epsilon_decay: self.config.epsilon_decay,
            eval_interval: self.config.eval_interval,
            seed: self.config.seed,
            final_draw_rate: self.report.last_window().map(|w| w.draw_rate),
        }
    }

    pub fn to_saved(&self) -> Result<SavedPolicy> {
        SavedPolicy::from_policy(&self.policy, self.metadata())
    }
}

/// Terminal rewards for (X, O) given who made the final move and the raw
/// environment reward
fn terminal_rewards(mover: Player, reward: f64) -> (f64, f64) {
    match mover {
        Player::X => (reward, -reward),
        Player::O => (-reward, reward),
    }
}

/// Push one terminal reward through a role's whole trajectory
fn backup(
    table: &mut ValueTable,
    trajectory: &[(StateKey, usize)],
    reward: f64,
    next_state: &StateKey,
    next_legal: &[usize],
    params: TdParams,
) {
    for &(state, action) in trajectory {
        table.update(state, action, reward, next_state, next_legal, params);
    }
}

/// Self-play trainer for the X and O value tables
pub struct Trainer {
    config: TrainingConfig,
    env: GameEnvironment,
    selector: ActionSelector,
    policy: TrainedPolicy,
    observers: Vec<Box<dyn Observer>>,
}

impl Trainer {
    /// Create a trainer with empty tables.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration does not validate.
    pub fn new(config: TrainingConfig) -> Result<Self> {
        config.validate()?;
        let selector = match config.seed {
            Some(seed) => ActionSelector::with_seed(seed),
            None => ActionSelector::new(),
        };
        Ok(Self {
            config,
            env: GameEnvironment::new(),
            selector,
            policy: TrainedPolicy::default(),
            observers: Vec::new(),
        })
    }

    /// Add an observer to the trainer
    pub fn with_observer(mut self, observer: Box<dyn Observer>) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Tables learned so far
    pub fn policy(&self) -> &TrainedPolicy {
        &self.policy
    }

    /// Play one episode at the exploration rate of `episode` and update both
    /// tables from its outcome.
    pub fn run_episode(&mut self, episode: usize) -> Result<EpisodeResult> {
        let epsilon = self.config.epsilon_at(episode);
        let mut state = self.env.reset();
        let mut x_moves: Vec<(StateKey, usize)> = Vec::with_capacity(5);
        let mut o_moves: Vec<(StateKey, usize)> = Vec::with_capacity(4);

        loop {
            let role = self.env.player_turn();
            let legal = self.env.available_actions();
            let action = self
                .selector
                .select(self.policy.table(role), &state, &legal, epsilon)?;

            match role {
                Player::X => x_moves.push((state, action)),
                Player::O => o_moves.push((state, action)),
            }

            let step = self.env.step(action)?;
            if !step.terminated {
                state = step.state;
                continue;
            }

            let (x_reward, o_reward) = terminal_rewards(role, step.reward);
            let next_legal = self.env.available_actions();
            let params = self.config.td_params();

            backup(
                self.policy.table_mut(Player::X),
                &x_moves,
                x_reward,
                &step.state,
                &next_legal,
                params,
            );
            backup(
                self.policy.table_mut(Player::O),
                &o_moves,
                o_reward,
                &step.state,
                &next_legal,
                params,
            );

            let outcome = if step.reward == 0.0 {
                GameOutcome::Draw
            } else {
                GameOutcome::Win(role)
            };

            return Ok(EpisodeResult {
                outcome,
                moves: x_moves.len() + o_moves.len(),
                epsilon,
            });
        }
    }

    /// Run every configured episode and hand back the learned tables.
    ///
    /// Consumes the trainer, so no table or counter outlives the run.
    pub fn run(mut self) -> Result<TrainingRun> {
        let start = Instant::now();
        let episodes = self.config.episodes;
        let interval = self.config.eval_interval;

        log::info!(
            "training {} episodes (alpha={}, gamma={}, epsilon={}x{}^n, seed={:?})",
            episodes,
            self.config.learning_rate,
            self.config.discount,
            self.config.epsilon_initial,
            self.config.epsilon_decay,
            self.config.seed
        );

        for observer in &mut self.observers {
            observer.on_training_start(episodes)?;
        }

        let mut report = TrainingReport {
            draw_games: Vec::with_capacity(episodes),
            ..TrainingReport::default()
        };
        let mut window = WindowCounter::default();

        for episode in 0..episodes {
            let result = self.run_episode(episode)?;

            match result.outcome {
                GameOutcome::Win(Player::X) => report.x_wins += 1,
                GameOutcome::Win(Player::O) => report.o_wins += 1,
                GameOutcome::Draw => report.draws += 1,
            }
            report.draw_games.push(result.outcome.is_draw());
            report.episodes += 1;
            window.record(result.outcome);

            for observer in &mut self.observers {
                observer.on_episode_end(episode, result.outcome, result.moves, result.epsilon)?;
            }

            if (episode + 1).is_multiple_of(interval) {
                let stats = window.close(episode + 1, result.epsilon);
                log::debug!(
                    "completed episode {:>7}  x={:.3} o={:.3} draw={:.3} epsilon={:.4}",
                    stats.episode,
                    stats.x_win_rate,
                    stats.o_win_rate,
                    stats.draw_rate,
                    stats.epsilon
                );
                for observer in &mut self.observers {
                    observer.on_window(&stats)?;
                }
                report.windows.push(stats);
            }
        }

        for observer in &mut self.observers {
            observer.on_training_end()?;
        }

        report.elapsed_secs = start.elapsed().as_secs_f64();
        log::info!(
            "training finished in {:.2}s: X {} / O {} / draws {} ({} X entries, {} O entries)",
            report.elapsed_secs,
            report.x_wins,
            report.o_wins,
            report.draws,
            self.policy.table(Player::X).len(),
            self.policy.table(Player::O).len()
        );

        Ok(TrainingRun {
            config: self.config,
            policy: self.policy,
            report,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use super::*;

    #[test]
    fn test_default_config() {
        let config = TrainingConfig::default();
        assert_eq!(config.episodes, 5_000);
        assert_eq!(config.learning_rate, 0.1);
        assert_eq!(config.discount, 0.9);
        assert_eq!(config.epsilon_initial, 1.0);
        assert_eq!(config.epsilon_decay, 0.995);
        assert_eq!(config.eval_interval, 25);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_epsilon_schedule() {
        let config = TrainingConfig::default();
        assert_eq!(config.epsilon_at(0), 1.0);
        assert!((config.epsilon_at(1) - 0.995).abs() < 1e-12);
        assert!((config.epsilon_at(100) - 0.995f64.powi(100)).abs() < 1e-12);

        let floored = config.with_epsilon_min(0.05);
        assert_eq!(floored.epsilon_at(10_000), 0.05);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let bad = [
            TrainingConfig::default().with_episodes(0),
            TrainingConfig::default().with_eval_interval(0),
            TrainingConfig::default().with_learning_rate(0.0),
            TrainingConfig::default().with_learning_rate(1.5),
            TrainingConfig::default().with_discount(-0.1),
            TrainingConfig::default().with_epsilon(1.2, 0.99),
            TrainingConfig::default().with_epsilon(1.0, 0.0),
            TrainingConfig::default().with_epsilon_min(2.0),
        ];
        for config in bad {
            assert!(
                matches!(config.validate(), Err(Error::InvalidConfiguration { .. })),
                "{config:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_config_json_fills_defaults() {
        let config: TrainingConfig =
            serde_json::from_str(r#"{"episodes": 40, "seed": 3}"#).unwrap();
        assert_eq!(config.episodes, 40);
        assert_eq!(config.seed, Some(3));
        assert_eq!(config.eval_interval, 25);
    }

    #[test]
    fn test_terminal_rewards() {
        assert_eq!(terminal_rewards(Player::X, 1.0), (1.0, -1.0));
        assert_eq!(terminal_rewards(Player::O, 1.0), (-1.0, 1.0));
        assert_eq!(terminal_rewards(Player::X, 0.0), (0.0, -0.0));
    }

    #[test]
    fn test_single_episode_backs_up_terminal_reward() {
        let config = TrainingConfig::default().with_seed(5);
        let mut trainer = Trainer::new(config).unwrap();
        let result = trainer.run_episode(0).unwrap();

        let x_table = trainer.policy().table(Player::X);
        let o_table = trainer.policy().table(Player::O);

        // Every recorded pair is updated exactly once from zero with a zero
        // future term, so it holds learning_rate * reward.
        assert_eq!(x_table.len() + o_table.len(), result.moves);
        assert_eq!(x_table.len(), result.moves.div_ceil(2));

        let x_expected = 0.1 * result.outcome.reward_for(Player::X);
        let o_expected = 0.1 * result.outcome.reward_for(Player::O);
        assert!(x_table.iter().all(|(_, _, v)| (v - x_expected).abs() < 1e-12));
        assert!(o_table.iter().all(|(_, _, v)| (v - o_expected).abs() < 1e-12));
    }

    #[test]
    fn test_seeded_runs_are_reproducible() {
        let config = TrainingConfig::default().with_episodes(300).with_seed(9);
        let a = Trainer::new(config.clone()).unwrap().run().unwrap();
        let b = Trainer::new(config).unwrap().run().unwrap();

        assert_eq!(a.policy, b.policy);
        assert_eq!(a.report.windows, b.report.windows);
        assert_eq!(a.report.draw_games, b.report.draw_games);
    }

    #[test]
    fn test_report_tallies() {
        let config = TrainingConfig::default()
            .with_episodes(110)
            .with_eval_interval(25)
            .with_seed(1);
        let run = Trainer::new(config).unwrap().run().unwrap();
        let report = &run.report;

        assert_eq!(report.episodes, 110);
        assert_eq!(report.x_wins + report.o_wins + report.draws, 110);
        assert_eq!(report.draw_games.len(), 110);
        assert_eq!(
            report.draw_games.iter().filter(|&&d| d).count(),
            report.draws
        );

        // The trailing 10 episodes do not form a window
        assert_eq!(report.windows.len(), 4);
        assert_eq!(report.windows[3].episode, 100);
        for window in &report.windows {
            let total = window.x_win_rate + window.o_win_rate + window.draw_rate;
            assert!((total - 1.0).abs() < 1e-12);
        }

        let metadata = run.metadata();
        assert_eq!(metadata.episodes, 110);
        assert_eq!(metadata.seed, Some(1));
        assert_eq!(metadata.final_draw_rate, Some(report.windows[3].draw_rate));
    }

    #[derive(Default)]
    struct Events {
        started: Option<usize>,
        episodes: usize,
        windows: usize,
        finished: bool,
    }

    struct RecordingObserver(Rc<RefCell<Events>>);

    impl Observer for RecordingObserver {
        fn on_training_start(&mut self, total_episodes: usize) -> Result<()> {
            self.0.borrow_mut().started = Some(total_episodes);
            Ok(())
        }

        fn on_episode_end(
            &mut self,
            _episode: usize,
            _outcome: GameOutcome,
            moves: usize,
            _epsilon: f64,
        ) -> Result<()> {
            assert!((5..=9).contains(&moves));
            self.0.borrow_mut().episodes += 1;
            Ok(())
        }

        fn on_window(&mut self, _stats: &WindowStats) -> Result<()> {
            self.0.borrow_mut().windows += 1;
            Ok(())
        }

        fn on_training_end(&mut self) -> Result<()> {
            self.0.borrow_mut().finished = true;
            Ok(())
        }
    }

    #[test]
    fn test_observers_see_every_event() {
        let events = Rc::new(RefCell::new(Events::default()));
        let config = TrainingConfig::default()
            .with_episodes(60)
            .with_eval_interval(20)
            .with_seed(2);

        Trainer::new(config)
            .unwrap()
            .with_observer(Box::new(RecordingObserver(Rc::clone(&events))))
            .run()
            .unwrap();

        let events = events.borrow();
        assert_eq!(events.started, Some(60));
        assert_eq!(events.episodes, 60);
        assert_eq!(events.windows, 3);
        assert!(events.finished);
    }

    #[test]
    fn test_report_json_roundtrip() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("report.json");
        let report = TrainingReport {
            episodes: 4,
            x_wins: 1,
            o_wins: 1,
            draws: 2,
            windows: vec![WindowStats {
                episode: 4,
                x_win_rate: 0.25,
                o_win_rate: 0.25,
                draw_rate: 0.5,
                epsilon: 0.125,
            }],
            draw_games: vec![false, true, false, true],
            elapsed_secs: 1.5,
        };

        report.save_json(&path).unwrap();
        let loaded = TrainingReport::load_json(&path).unwrap();

        assert_eq!(loaded, report);
        assert_eq!(loaded.draw_rate(), 0.5);
    }

    #[test]
    fn test_report_load_missing_file() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        assert!(matches!(
            TrainingReport::load_json(temp_dir.path().join("absent.json")),
            Err(Error::Io { .. })
        ));
    }
}
