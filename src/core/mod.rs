//! Ambient infrastructure: configuration, errors and terminal output.

pub mod config;
pub mod error;
pub mod output;
pub mod progress;
