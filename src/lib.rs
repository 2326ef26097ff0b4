//! Self-play tabular Q-learning for tic-tac-toe
//!
//! This crate provides:
//! - A tic-tac-toe environment with reset/step semantics and validation
//! - Sparse state-action value tables with ε-greedy selection
//! - A self-play trainer that learns separate X and O tables from terminal
//!   rewards, with per-window win/draw statistics
//! - Policy persistence, CSV metric export and a small CLI
//!
//! # Example
//!
//! ```
//! use qtictac::pipeline::{Trainer, TrainingConfig};
//!
//! let config = TrainingConfig::default().with_episodes(100).with_seed(7);
//! let run = Trainer::new(config)?.run()?;
//! assert_eq!(run.report.episodes, 100);
//! assert_eq!(run.report.windows.len(), 4);
//! # Ok::<(), qtictac::Error>(())
//! ```

pub mod adapters;
pub mod cli;
pub mod error;
pub mod export;
pub mod pipeline;
pub mod ports;
pub mod q_learning;
pub mod tictactoe;

pub use error::{Error, Result};
