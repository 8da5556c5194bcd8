//! Terminal download progress using indicatif.

use std::sync::{Mutex, PoisonError};

use binwrap_core::ProgressReporter;
use indicatif::{ProgressBar, ProgressStyle};

/// Progress reporter drawing a bar (or a spinner when the size is unknown)
/// on stderr.
pub struct CliProgress {
    bar: Mutex<Option<ProgressBar>>,
}

impl CliProgress {
    pub const fn new() -> Self {
        Self {
            bar: Mutex::new(None),
        }
    }

    fn create_download_bar(total: u64) -> ProgressBar {
        let pb = ProgressBar::new(total);
        if let Ok(style) = ProgressStyle::default_bar().template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec}) {msg}",
        ) {
            pb.set_style(style.progress_chars("█▓░"));
        }
        pb
    }

    fn create_spinner() -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) =
            ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {bytes} {msg}")
        {
            pb.set_style(style);
        }
        pb
    }

    fn with_bar(&self, f: impl FnOnce(&mut Option<ProgressBar>)) {
        let mut guard = self.bar.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard);
    }
}

impl Default for CliProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressReporter for CliProgress {
    fn start(&self, message: &str, total: Option<u64>) {
        let pb = match total {
            Some(t) if t > 0 => Self::create_download_bar(t),
            _ => Self::create_spinner(),
        };
        pb.set_message(message.to_string());
        self.with_bar(|bar| *bar = Some(pb));
    }

    fn update(&self, current: u64, total: Option<u64>) {
        self.with_bar(|bar| {
            if let Some(pb) = bar {
                if let Some(t) = total {
                    pb.set_length(t);
                }
                pb.set_position(current);
            }
        });
    }

    fn finish(&self, message: &str) {
        self.with_bar(|bar| {
            if let Some(pb) = bar.take() {
                pb.finish_with_message(message.to_string());
            }
        });
    }

    fn finish_with_error(&self, message: &str) {
        self.with_bar(|bar| {
            if let Some(pb) = bar.take() {
                pb.abandon_with_message(message.to_string());
            }
        });
    }
}
