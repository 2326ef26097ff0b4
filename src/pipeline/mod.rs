//! Training and evaluation pipeline
//!
//! This module provides:
//! - Self-play training of the X and O value tables
//! - Evaluation of learned policies against a random opponent
//! - Observers that report progress during training

pub mod evaluation;
pub mod observers;
pub mod training;

pub use evaluation::{EvaluationResult, GreedyMatch, evaluate_against_random, play_greedy_match};
pub use observers::{MetricsObserver, MetricsSummary, ProgressObserver};
pub use training::{
    EpisodeResult, Trainer, TrainingConfig, TrainingReport, TrainingRun, WindowStats,
};

pub use crate::ports::Observer;
