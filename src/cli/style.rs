//! Terminal styling helpers
//!
//! Output goes through `anstream`, which strips the escapes again when
//! stdout is not a terminal.

use indicatif::ProgressStyle;
use owo_colors::OwoColorize;
use std::fmt::Display;

/// Check mark used for completed steps
pub const CHECK: &str = "✓";

/// Semantic styles for CLI output
pub trait Stylize {
    /// De-emphasized detail text
    fn muted(&self) -> String;
    /// Headings and key values
    fn emphasis(&self) -> String;
    /// Names (branches, commits)
    fn accent(&self) -> String;
    /// Positive outcome
    fn success(&self) -> String;
    /// Problems the operator should look at
    fn warn(&self) -> String;
}

impl<T: Display + ?Sized> Stylize for T {
    fn muted(&self) -> String {
        self.to_string().dimmed().to_string()
    }

    fn emphasis(&self) -> String {
        self.to_string().bold().to_string()
    }

    fn accent(&self) -> String {
        self.to_string().cyan().to_string()
    }

    fn success(&self) -> String {
        self.to_string().green().to_string()
    }

    fn warn(&self) -> String {
        self.to_string().yellow().to_string()
    }
}

/// Green check mark
pub fn check() -> String {
    CHECK.success()
}

/// Muted arrow for "from -> to" lines
pub fn arrow() -> String {
    "→".muted()
}

/// Spinner used while waiting on the VCS
pub fn spinner_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.cyan} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ ")
}
