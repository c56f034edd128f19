//! Progress bar display for model pulls

use indicatif::{ProgressBar, ProgressStyle};

/// Progress display for the multi-model pull step
pub struct PullProgress {
    bar: ProgressBar,
}

impl PullProgress {
    /// Create a new progress display with total model count
    pub fn new(total_models: u64) -> Self {
        let style = ProgressStyle::default_bar()
            .template("[{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-");

        let bar = ProgressBar::new(total_models);
        bar.set_style(style);

        Self { bar }
    }

    /// Show the model currently being pulled
    pub fn start_model(&self, model: &str) {
        self.bar.set_message(model.to_string());
    }

    /// Mark the current model done
    pub fn finish_model(&self) {
        self.bar.inc(1);
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}
