//! CLI presenter for output formatting

use std::io::{self, Write};
use std::time::Duration;

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};

use crate::domain::clip::AudioClip;

/// Presenter for terminal output formatting
pub struct Presenter {
    spinner: Option<ProgressBar>,
}

impl Presenter {
    /// Create a new presenter
    pub fn new() -> Self {
        Self { spinner: None }
    }

    /// Start a spinner with message
    pub fn start_spinner(&mut self, message: &str) {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner()
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
                .template("{spinner:.cyan} {msg}")
                .unwrap(),
        );
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        self.spinner = Some(spinner);
    }

    /// Mark spinner as success and finish
    pub fn spinner_success(&mut self, message: &str) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_with_message(format!("{} {}", "✓".green(), message));
        }
    }

    /// Mark spinner as failed and finish
    pub fn spinner_fail(&mut self, message: &str) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_with_message(format!("{} {}", "✗".red(), message));
        }
    }

    /// Stop spinner without status
    pub fn stop_spinner(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
    }

    /// Print info message to stderr
    pub fn info(&self, message: &str) {
        eprintln!("{} {}", "ℹ".cyan(), message);
    }

    /// Print success message to stderr
    pub fn success(&self, message: &str) {
        eprintln!("{} {}", "✓".green(), message);
    }

    /// Print warning message to stderr
    pub fn warn(&self, message: &str) {
        eprintln!("{} {}", "⚠".yellow(), message);
    }

    /// Print error message to stderr
    pub fn error(&self, message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Output text to stdout
    pub fn output(&self, text: &str) {
        println!("{}", text);
    }

    /// Print the interactive prompt without a newline
    pub fn prompt(&self) {
        print!("{} ", ">".cyan());
        let _ = io::stdout().flush();
    }

    /// Format a duration as seconds with centiseconds
    pub fn format_duration(duration: Duration) -> String {
        format!("{:.2}s", duration.as_secs_f64())
    }

    /// One-line clip summary, mirroring the session status label
    pub fn clip_line(&self, clip: Option<&AudioClip>, remembered: bool) -> String {
        match clip {
            Some(clip) => {
                let kept = if remembered { " [remembered]" } else { "" };
                format!(
                    "Clip: {} | Duration: {}{}",
                    clip.display_name(),
                    Self::format_duration(clip.duration()),
                    kept
                )
            }
            None => "Clip: none | Duration: 0.00s".to_string(),
        }
    }

    /// Print a numbered device entry
    pub fn device_entry(&self, index: usize, name: &str, selected: bool) {
        let marker = if selected { "*".green().to_string() } else { " ".to_string() };
        println!("  {} {}. {}", marker, index, name);
    }
}

impl Default for Presenter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::clip::CAPTURE_FORMAT;

    #[test]
    fn format_duration_centiseconds() {
        assert_eq!(
            Presenter::format_duration(Duration::from_millis(2000)),
            "2.00s"
        );
        assert_eq!(
            Presenter::format_duration(Duration::from_millis(1234)),
            "1.23s"
        );
    }

    #[test]
    fn clip_line_with_no_clip() {
        let presenter = Presenter::new();
        assert_eq!(
            presenter.clip_line(None, false),
            "Clip: none | Duration: 0.00s"
        );
    }

    #[test]
    fn clip_line_shows_name_and_duration() {
        let presenter = Presenter::new();
        let clip = AudioClip::new("/tmp/take.wav", CAPTURE_FORMAT, Duration::from_secs(2));

        let line = presenter.clip_line(Some(&clip), false);
        assert!(line.contains("take.wav"));
        assert!(line.contains("2.00s"));
        assert!(!line.contains("remembered"));
    }

    #[test]
    fn clip_line_marks_remembered() {
        let presenter = Presenter::new();
        let clip = AudioClip::new("/tmp/take.wav", CAPTURE_FORMAT, Duration::from_secs(1));

        let line = presenter.clip_line(Some(&clip), true);
        assert!(line.contains("[remembered]"));
    }
}
