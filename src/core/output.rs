//! Colored terminal output for acquisition progress and diagnostics
//!
//! Uses owo-colors. Everything that is not a failure goes to stdout; warnings
//! and errors go to stderr so a buildpack's own output stays readable.

use owo_colors::OwoColorize;

/// Print an action header (blue, bold)
/// Example: "==> Fetching Go 1.22"
pub fn action(message: &str) {
    println!("{} {}", "==>".blue().bold(), message.bold());
}

/// Print a detail line (dimmed)
/// Example: "     cache hit: https://..."
pub fn detail(message: &str) {
    println!("     {}", message.dimmed());
}

/// Print an info message (cyan)
pub fn info(message: &str) {
    println!("{} {}", "::".cyan(), message);
}

/// Print a warning message (yellow)
pub fn warning(message: &str) {
    eprintln!("{} {}", "warning:".yellow().bold(), message.yellow());
}

/// Print an error message (red)
pub fn error(message: &str) {
    eprintln!("{} {}", "error:".red().bold(), message.red());
}
