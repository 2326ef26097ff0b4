//! Command implementations for the qtictac CLI

pub mod evaluate;
pub mod play;
pub mod train;
