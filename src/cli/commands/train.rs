//! Train command - Self-play Q-learning for both roles

use std::{
    fs::File,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use serde_json::to_writer_pretty;

use crate::{
    adapters::MsgPackRepository,
    cli::{
        config::load_training_config,
        output::{format_number, format_percent, print_kv, print_section, print_subsection},
    },
    export::MetricsCsvExporter,
    pipeline::{
        MetricsObserver, MetricsSummary, ProgressObserver, Trainer, TrainingConfig, TrainingRun,
        WindowStats,
    },
    ports::PolicyRepository,
};

#[derive(Debug, Serialize)]
struct TrainingSummaryFile {
    config: TrainingConfig,
    episodes: usize,
    x_wins: usize,
    o_wins: usize,
    draws: usize,
    draw_rate: f64,
    first_window: Option<WindowStats>,
    final_window: Option<WindowStats>,
    metrics: MetricsSummary,
    x_entries: usize,
    o_entries: usize,
    elapsed_secs: f64,
}

impl TrainingSummaryFile {
    fn new(run: &TrainingRun, metrics: MetricsSummary) -> Self {
        let (x, o) = (
            run.policy.table(crate::tictactoe::Player::X),
            run.policy.table(crate::tictactoe::Player::O),
        );
        Self {
            config: run.config.clone(),
            episodes: run.report.episodes,
            x_wins: run.report.x_wins,
            o_wins: run.report.o_wins,
            draws: run.report.draws,
            draw_rate: run.report.draw_rate(),
            first_window: run.report.first_window().copied(),
            final_window: run.report.last_window().copied(),
            metrics,
            x_entries: x.len(),
            o_entries: o.len(),
            elapsed_secs: run.report.elapsed_secs,
        }
    }
}

fn sanitize_summary_path(raw: &Path) -> PathBuf {
    let mut normalized = raw.to_path_buf();
    let raw_str = raw.as_os_str().to_string_lossy();

    // Treat trailing separators or missing filename as a directory target.
    if raw_str.ends_with(std::path::MAIN_SEPARATOR) || normalized.file_name().is_none() {
        normalized.push("training_summary.json");
        return normalized;
    }

    match normalized.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("json") => normalized,
        _ => {
            normalized.set_extension("json");
            normalized
        }
    }
}

#[derive(Parser, Debug)]
#[command(about = "Train X and O value tables by self-play")]
pub struct TrainArgs {
    /// JSON file with a training configuration; flags below override it
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// Number of self-play episodes
    #[arg(long, short = 'e')]
    pub episodes: Option<usize>,

    /// Learning rate α (0.0-1.0)
    #[arg(long)]
    pub learning_rate: Option<f64>,

    /// Discount factor γ (0.0-1.0)
    #[arg(long)]
    pub discount: Option<f64>,

    /// Initial exploration rate ε
    #[arg(long)]
    pub epsilon: Option<f64>,

    /// Multiplicative ε decay per episode
    #[arg(long)]
    pub epsilon_decay: Option<f64>,

    /// Lower bound on ε
    #[arg(long)]
    pub epsilon_min: Option<f64>,

    /// Episodes per evaluation window
    #[arg(long)]
    pub eval_interval: Option<usize>,

    /// Random seed for reproducibility
    #[arg(long)]
    pub seed: Option<u64>,

    /// Output file for the trained policy (MessagePack)
    #[arg(long, short = 'O')]
    pub output: Option<PathBuf>,

    /// Optional CSV file for per-window win/draw rates
    #[arg(long)]
    pub windows_csv: Option<PathBuf>,

    /// Optional CSV file for the per-episode draw series
    #[arg(long)]
    pub draws_csv: Option<PathBuf>,

    /// Optional path for writing a summary JSON file
    #[arg(long)]
    pub summary: Option<PathBuf>,

    /// Show progress bar
    #[arg(long, default_value_t = false)]
    pub progress: bool,
}

impl TrainArgs {
    /// Resolve the configuration: file (or defaults), then explicit flags.
    pub fn training_config(&self) -> Result<TrainingConfig> {
        let mut config = match &self.config {
            Some(path) => load_training_config(path)?,
            None => TrainingConfig::default(),
        };

        if let Some(episodes) = self.episodes {
            config.episodes = episodes;
        }
        if let Some(learning_rate) = self.learning_rate {
            config.learning_rate = learning_rate;
        }
        if let Some(discount) = self.discount {
            config.discount = discount;
        }
        if let Some(epsilon) = self.epsilon {
            config.epsilon_initial = epsilon;
        }
        if let Some(decay) = self.epsilon_decay {
            config.epsilon_decay = decay;
        }
        if let Some(epsilon_min) = self.epsilon_min {
            config.epsilon_min = epsilon_min;
        }
        if let Some(eval_interval) = self.eval_interval {
            config.eval_interval = eval_interval;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }

        config.validate().context("invalid training configuration")?;
        Ok(config)
    }
}

pub fn execute(args: TrainArgs) -> Result<()> {
    let config = args.training_config()?;

    print_section("Self-Play Q-Learning");
    print_kv("Episodes", &format_number(config.episodes));
    print_kv("Learning rate", &config.learning_rate.to_string());
    print_kv("Discount", &config.discount.to_string());
    print_kv(
        "Epsilon",
        &format!("{} x {}^n", config.epsilon_initial, config.epsilon_decay),
    );
    print_kv("Eval interval", &config.eval_interval.to_string());
    if let Some(seed) = config.seed {
        print_kv("Seed", &seed.to_string());
    }

    let metrics = MetricsObserver::new();
    let mut trainer = Trainer::new(config)?.with_observer(Box::new(metrics.clone()));
    if args.progress {
        trainer = trainer.with_observer(Box::new(ProgressObserver::new()));
    }

    let run = trainer.run()?;
    let summary = metrics.summary();

    print_subsection("Results");
    print_kv("X wins", &format_number(run.report.x_wins));
    print_kv("O wins", &format_number(run.report.o_wins));
    print_kv("Draws", &format_number(run.report.draws));
    print_kv("Avg game length", &format!("{:.2}", summary.avg_game_length));
    if let (Some(first), Some(last)) = (run.report.first_window(), run.report.last_window()) {
        print_kv("First window draws", &format_percent(first.draw_rate));
        print_kv("Final window draws", &format_percent(last.draw_rate));
    }
    print_kv("Elapsed", &format!("{:.2}s", run.report.elapsed_secs));

    if let Some(path) = &args.output {
        MsgPackRepository::new()
            .save(&run.to_saved()?, path)
            .with_context(|| format!("failed to save policy to {}", path.display()))?;
        println!("\nSaved policy to {}", path.display());
    }

    if let Some(path) = &args.windows_csv {
        MetricsCsvExporter::export_windows(&run.report, path)
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!("Saved window rates to {}", path.display());
    }

    if let Some(path) = &args.draws_csv {
        MetricsCsvExporter::export_draw_games(&run.report, path)
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!("Saved draw series to {}", path.display());
    }

    if let Some(raw) = &args.summary {
        let path = sanitize_summary_path(raw);
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let file = File::create(&path)
            .with_context(|| format!("failed to create summary file {}", path.display()))?;
        to_writer_pretty(file, &TrainingSummaryFile::new(&run, summary))
            .context("failed to write training summary")?;
        println!("Saved summary to {}", path.display());
    }

    Ok(())
}
