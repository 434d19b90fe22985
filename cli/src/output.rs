//! Styled terminal output for the uploader.

use console::{Term, style};
use std::fmt::Display;

const BAR_WIDTH: usize = 30;

/// Terminal output helper.
pub struct Output {
    term: Term,
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}

impl Output {
    pub fn new() -> Self {
        Self {
            term: Term::stdout(),
        }
    }

    /// Print a success message with a green checkmark.
    pub fn success(&self, message: impl Display) {
        drop(
            self.term
                .write_line(&format!("{} {}", style("✓").green().bold(), message)),
        );
    }

    /// Print an error message with a red X.
    pub fn error(&self, message: impl Display) {
        drop(
            self.term
                .write_line(&format!("{} {}", style("✗").red().bold(), message)),
        );
    }

    pub fn info(&self, message: impl Display) {
        drop(
            self.term
                .write_line(&format!("{} {}", style("ℹ").blue().bold(), message)),
        );
    }

    /// Print a labeled value with indentation.
    pub fn labeled_indent(&self, label: impl Display, value: impl Display, indent: usize) {
        let spaces = " ".repeat(indent);
        drop(
            self.term
                .write_line(&format!("{spaces}{}: {}", style(label).dim(), value)),
        );
    }

    /// Redraw the progress bar in place. Skipped when stdout is not a terminal.
    pub fn progress(&self, label: impl Display, percent: u8) {
        if !self.term.is_term() {
            return;
        }
        drop(self.term.clear_line());
        drop(self.term.write_str(&format!(
            "{} {} {}",
            style(label).dim(),
            style(progress_bar(percent)).cyan(),
            style(format!("{percent:>3}%")).bold()
        )));
    }

    /// Leave the progress line so the next message starts on a fresh one.
    pub fn finish_progress(&self) {
        if self.term.is_term() {
            drop(self.term.write_line(""));
        }
    }
}

fn progress_bar(percent: u8) -> String {
    let filled = usize::from(percent.min(100)) * BAR_WIDTH / 100;
    format!(
        "[{}{}]",
        "█".repeat(filled),
        "░".repeat(BAR_WIDTH - filled)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bar_fills_proportionally() {
        assert_eq!(progress_bar(0), format!("[{}]", "░".repeat(BAR_WIDTH)));
        assert_eq!(progress_bar(100), format!("[{}]", "█".repeat(BAR_WIDTH)));
        assert_eq!(progress_bar(50).matches('█').count(), BAR_WIDTH / 2);
    }

    #[test]
    fn bar_clamps_overshoot() {
        assert_eq!(progress_bar(250), progress_bar(100));
    }
}
