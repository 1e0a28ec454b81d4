//! Spinner for the import pipeline.
//!
//! Hidden when stdout is not a TTY, under `--quiet`, and for `--json`.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use super::color::ColorMode;

/// Progress feedback mode based on output context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressMode {
    /// Interactive TTY: animated spinner
    Interactive,
    /// Non-TTY or `--quiet`: final results only
    Quiet,
    /// Machine-readable output: nothing but the JSON document
    Silent,
}

impl ProgressMode {
    pub fn detect(quiet: bool, json: bool, color_mode: ColorMode) -> Self {
        if json {
            Self::Silent
        } else if quiet || color_mode == ColorMode::Never || !atty::is(atty::Stream::Stdout) {
            Self::Quiet
        } else {
            Self::Interactive
        }
    }

    pub fn is_interactive(&self) -> bool {
        matches!(self, Self::Interactive)
    }
}

const SPINNER_CHARS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";

/// An indeterminate spinner that wraps indicatif.
pub struct Progress {
    bar: ProgressBar,
}

impl Progress {
    /// Start a spinner; a hidden bar when `mode` is not interactive.
    pub fn spinner(message: &str, mode: ProgressMode) -> Self {
        if !mode.is_interactive() {
            return Self {
                bar: ProgressBar::hidden(),
            };
        }

        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg} ({elapsed})")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars(SPINNER_CHARS);
        bar.set_style(style);
        bar.set_message(message.to_string());
        bar.enable_steady_tick(Duration::from_millis(80));
        Self { bar }
    }

    /// Stop the spinner and erase its line.
    pub fn finish_clear(&self) {
        self.bar.finish_and_clear();
    }
}

impl Drop for Progress {
    fn drop(&mut self) {
        if !self.bar.is_finished() {
            self.bar.finish_and_clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_is_silent() {
        assert_eq!(ProgressMode::detect(false, true, ColorMode::Always), ProgressMode::Silent);
        assert!(!ProgressMode::Silent.is_interactive());
    }

    #[test]
    fn test_quiet_and_no_color_suppress_spinner() {
        assert_eq!(ProgressMode::detect(true, false, ColorMode::Always), ProgressMode::Quiet);
        assert_eq!(ProgressMode::detect(false, false, ColorMode::Never), ProgressMode::Quiet);
    }

    #[test]
    fn test_hidden_spinner_is_inert() {
        let progress = Progress::spinner("Listing", ProgressMode::Quiet);
        progress.finish_clear();
    }
}
