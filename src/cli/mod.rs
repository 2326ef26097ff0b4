//! Command-line interface for training, evaluating and playing against
//! self-play Q-learning agents.

pub mod commands;
pub mod config;
pub mod output;
