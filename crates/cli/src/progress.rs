use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Spinner shown on stderr while waiting on the provider.
///
/// indicatif hides it automatically when stderr is not a terminal.
pub struct WaitSpinner {
    spinner: ProgressBar,
}

impl WaitSpinner {
    pub fn start(message: &str) -> Self {
        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ ")
            .template("{spinner:.cyan} {msg} {elapsed:.dim}")
        {
            spinner.set_style(style);
        }
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(Duration::from_millis(80));

        Self { spinner }
    }

    pub fn finish_success(&self, message: &str) {
        self.spinner
            .finish_with_message(format!("✓ {message}").green().to_string());
    }

    pub fn finish_error(&self, message: &str) {
        self.spinner
            .finish_with_message(format!("✗ {message}").red().to_string());
    }
}
