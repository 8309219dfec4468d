//! Spinner helpers shared by fetch and extraction
//!
//! indicatif hides the spinner on its own when stderr is not a terminal, so
//! these are safe to use from build logs.

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

const SPINNER_CHARS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";

const TICK_INTERVAL_MS: u64 = 80;

/// Create a spinner progress bar with standard styling.
pub fn create_spinner(message: &str) -> ProgressBar {
    let style = ProgressStyle::default_spinner()
        .template("     {spinner:.cyan} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_chars(SPINNER_CHARS);

    let pb = ProgressBar::new_spinner();
    pb.set_style(style);
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(TICK_INTERVAL_MS));
    pb
}

/// RAII guard that clears a progress bar when dropped.
///
/// Fetch and extraction bail out with `?` all over the place; the guard keeps
/// a failed step from leaving a spinner behind.
pub struct ProgressGuard(ProgressBar);

impl ProgressGuard {
    pub fn spinner(message: &str) -> Self {
        Self(create_spinner(message))
    }
}

impl Drop for ProgressGuard {
    fn drop(&mut self) {
        self.0.finish_and_clear();
    }
}
